//! Photo classification over a chain of candidate models.
//!
//! One request walks the candidate list in order, one call at a time:
//!
//! ```text
//! NotStarted ─┬─> Disabled
//!             ├─> NoImage
//!             └─> TryingModel(0) ─> TryingModel(1) ─> ... ─┬─> Succeeded(result)
//!                   (only on HTTP-level failure)           └─> DefaultFallback
//! ```
//!
//! An HTTP status failure moves on to the next model. Any answer the model
//! actually gives ends the walk, whether or not it validates: a
//! well-formed but wrong category is taken as authoritative and yields the
//! default result.

use samasya_core::{Category, ClassificationRequest, ClassificationResult};
use tracing::{error, info, warn};

use crate::config::ClassifierConfig;
use crate::openrouter::{ChatCompletion, ChatError, ChatMessage, ContentPart, OpenRouterClient};
use crate::salvage::salvage;

/// Built-in prompt, used when the request carries none.
pub fn default_prompt() -> String {
    format!(
        "Analyze this civic issue image and classify it into one of these categories: {}.\n\n\
         Return JSON format: {{\"category\": \"category_name\", \"title\": \"Brief title\"}}",
        Category::vocabulary()
    )
}

/// Why a request ended on the default result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Every candidate returned a non-success status.
    AllModelsFailed { last_status: u16 },
    /// A model answered, but nothing valid could be extracted.
    InvalidAnswer { model: String },
    /// The answer had no text content.
    EmptyAnswer { model: String },
    /// Transport or decoding failure; the walk was aborted.
    Aborted { model: String, error: String },
}

/// Terminal state of one classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No API key configured.
    Disabled,
    /// Neither embedded data nor addresses were supplied.
    NoImage,
    Succeeded {
        model: String,
        result: ClassificationResult,
    },
    DefaultFallback(FallbackReason),
}

impl Outcome {
    /// The caller-facing result: `None` only when classification is disabled.
    pub fn into_result(self) -> Option<ClassificationResult> {
        match self {
            Self::Disabled => None,
            Self::NoImage | Self::DefaultFallback(_) => Some(ClassificationResult::fallback()),
            Self::Succeeded { result, .. } => Some(result),
        }
    }
}

/// What one model attempt tells the walk to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// HTTP-level failure: try the next candidate.
    NextModel { status: u16, message: String },
    /// The walk is over.
    Finish(Outcome),
}

/// Decide the next step from one attempt's response.
///
/// This is the only place the continue/stop asymmetry lives: status
/// failures continue, everything else finishes.
pub fn step_for(model: &str, response: Result<ChatCompletion, ChatError>) -> Step {
    let completion = match response {
        Ok(completion) => completion,
        Err(ChatError::Status { status, message }) => {
            return Step::NextModel { status, message };
        }
        Err(e) => {
            return Step::Finish(Outcome::DefaultFallback(FallbackReason::Aborted {
                model: model.to_string(),
                error: e.to_string(),
            }));
        }
    };

    let Some(content) = completion.first_content() else {
        warn!(model, "model answered without text content");
        return Step::Finish(Outcome::DefaultFallback(FallbackReason::EmptyAnswer {
            model: model.to_string(),
        }));
    };
    info!(model, raw = content, "model answered");

    let salvaged = salvage(content);
    match salvaged.validate() {
        Some(result) => {
            info!(
                model,
                category = %result.category,
                strategy = ?salvaged.strategy(),
                "valid classification"
            );
            Step::Finish(Outcome::Succeeded {
                model: model.to_string(),
                result,
            })
        }
        None => {
            warn!(model, strategy = ?salvaged.strategy(), "invalid or missing classification");
            Step::Finish(Outcome::DefaultFallback(FallbackReason::InvalidAnswer {
                model: model.to_string(),
            }))
        }
    }
}

/// Build the single user message: prompt text plus image attachments.
///
/// Embedded data is preferred; otherwise every address is attached in order.
pub fn build_messages(request: &ClassificationRequest) -> Vec<ChatMessage> {
    let prompt = if request.prompt_text.trim().is_empty() {
        default_prompt()
    } else {
        request.prompt_text.clone()
    };

    let mut content = vec![ContentPart::text(prompt)];
    match request.embedded() {
        Some(data) => content.push(ContentPart::image(data)),
        None => content.extend(request.image_addresses.iter().map(ContentPart::image)),
    }
    vec![ChatMessage::user(content)]
}

/// Classification requester.
pub struct Classifier {
    config: ClassifierConfig,
    client: Option<OpenRouterClient>,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let client = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .map(|key| OpenRouterClient::new(key, &config));
        Self { config, client }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Classify a photo. Never fails: `None` when disabled, otherwise a
    /// result whose category is always in the vocabulary.
    pub async fn classify(&self, request: &ClassificationRequest) -> Option<ClassificationResult> {
        self.run(request).await.into_result()
    }

    /// Walk the candidate models and report the terminal state.
    pub async fn run(&self, request: &ClassificationRequest) -> Outcome {
        let Some(client) = &self.client else {
            warn!("OpenRouter API key not configured, skipping classification");
            return Outcome::Disabled;
        };

        if !request.has_image() {
            warn!("no image data or addresses provided, skipping classification");
            return Outcome::NoImage;
        }

        let messages = build_messages(request);
        let models = &self.config.models;
        let total = models.len();
        let mut last_status = 0;

        for (i, model) in models.iter().enumerate() {
            info!(model, attempt = i + 1, total, "trying model");
            let response = client.complete(model, &messages).await;

            match step_for(model, response) {
                Step::Finish(outcome) => {
                    if let Outcome::DefaultFallback(FallbackReason::Aborted { error, .. }) =
                        &outcome
                    {
                        error!(model, error = %error, "classification aborted");
                    }
                    return outcome;
                }
                Step::NextModel { status, message } => {
                    error!(model, status, message = %message, "model failed");
                    last_status = status;
                }
            }
        }

        if let Some(hint) = status_hint(last_status) {
            error!(status = last_status, hint, "all models failed");
        } else {
            warn!(status = last_status, "all models failed, using fallback response");
        }
        Outcome::DefaultFallback(FallbackReason::AllModelsFailed { last_status })
    }
}

/// Likely cause of the final failure, for the operator log.
fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        400 => Some(
            "bad request: model name unavailable, image URL not publicly reachable, \
             malformed request, or key lacks permission",
        ),
        401 => Some("unauthorized: check the OpenRouter API key"),
        429 => Some("rate limited: too many requests"),
        _ => None,
    }
}
