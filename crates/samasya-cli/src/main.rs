mod display;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use samasya_ai::config::{DEFAULT_REFERER, OPENROUTER_URL};
use samasya_ai::{Classifier, ClassifierConfig, ModelCandidates};
use samasya_core::ClassificationRequest;
use samasya_sync::UploadClient;

#[derive(Parser)]
#[command(name = "samasya", version, about = "SahiSamasya civic issue photo tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a photo to the backend (falls back to an embedded data URL).
    Upload {
        path: PathBuf,
        /// Declared content type; sniffed from the file when omitted.
        #[arg(long)]
        mime: Option<String>,
        #[command(flatten)]
        backend: BackendArgs,
        /// Print JSON instead of a card.
        #[arg(long)]
        json: bool,
    },
    /// Classify a local photo or remote image addresses.
    Classify {
        #[arg(required_unless_present = "urls")]
        path: Option<PathBuf>,
        /// Publicly reachable image address (repeatable).
        #[arg(long = "url")]
        urls: Vec<String>,
        #[arg(long)]
        mime: Option<String>,
        /// Prompt text; the built-in classification prompt when omitted.
        #[arg(long)]
        prompt: Option<String>,
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long)]
        json: bool,
    },
    /// Upload a photo, then classify it: the draft for a new report.
    Report {
        path: PathBuf,
        #[arg(long)]
        mime: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[command(flatten)]
        backend: BackendArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct BackendArgs {
    /// Client host; the upload API is assumed on port 3000 of it.
    #[arg(long, env = "SAHISAMASYA_HOST", default_value = "localhost")]
    host: String,
    /// Explicit upload API base, e.g. `http://10.0.0.5:3000/api`.
    #[arg(long, env = "SAHISAMASYA_API_BASE")]
    api_base: Option<String>,
    /// Bearer token for the upload endpoint.
    #[arg(long, env = "SAHISAMASYA_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl BackendArgs {
    fn client(&self) -> UploadClient {
        match &self.api_base {
            Some(base) => UploadClient::new(base.clone(), self.token.clone()),
            None => UploadClient::for_host(&self.host, self.token.clone()),
        }
    }
}

#[derive(Args)]
struct ModelArgs {
    /// OpenRouter API key; classification is disabled without one.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Primary model.
    #[arg(long, env = "OPENROUTER_MODEL")]
    model: Option<String>,
    /// Comma-separated fallback models.
    #[arg(long, env = "OPENROUTER_FALLBACK_MODELS")]
    fallback_models: Option<String>,
    #[arg(long, env = "OPENROUTER_URL", default_value = OPENROUTER_URL)]
    openrouter_url: String,
    /// Origin sent as `HTTP-Referer`.
    #[arg(long, env = "SAHISAMASYA_ORIGIN", default_value = DEFAULT_REFERER)]
    referer: String,
}

impl ModelArgs {
    fn classifier(&self) -> Classifier {
        let models =
            ModelCandidates::from_settings(self.model.as_deref(), self.fallback_models.as_deref());
        Classifier::new(
            ClassifierConfig::new(self.api_key.clone())
                .with_models(models)
                .with_endpoint(self.openrouter_url.clone())
                .with_referer(self.referer.clone()),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("samasya v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Upload {
            path,
            mime,
            backend,
            json,
        } => {
            let photo = pipeline::load_photo(&path, mime.as_deref()).await?;
            let upload = backend
                .client()
                .upload(Some(&photo))
                .await
                .context("validating photo")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&upload)?);
            } else {
                display::print_upload(&upload);
            }
        }
        Command::Classify {
            path,
            urls,
            mime,
            prompt,
            model,
            json,
        } => {
            let mut request = ClassificationRequest::new(prompt.unwrap_or_default());
            if let Some(path) = path {
                let photo = pipeline::load_photo(&path, mime.as_deref()).await?;
                request = request.with_embedded_image(photo.data_url());
            }
            for url in urls {
                request = request.with_image_address(url);
            }

            let result = model.classifier().classify(&request).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                display::print_classification(result.as_ref());
            }
        }
        Command::Report {
            path,
            mime,
            prompt,
            backend,
            model,
            json,
        } => {
            let photo = pipeline::load_photo(&path, mime.as_deref()).await?;
            let stats = pipeline::run_report(
                &backend.client(),
                &model.classifier(),
                &photo,
                prompt.as_deref().unwrap_or_default(),
            )
            .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats.draft)?);
            } else {
                display::print_report(&stats.draft);
                eprintln!("  Drafted in {:.2}s", stats.elapsed_secs);
            }
        }
    }

    Ok(())
}
