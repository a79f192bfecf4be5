//! Photo upload to the SahiSamasya backend, degrading to an embedded data URL.
//!
//! Only pre-flight validation can fail. Once a photo is accepted, every
//! network or server problem is logged and answered with the photo's data
//! URL, so the report being composed always has a usable reference.

use samasya_core::{PhotoFile, UploadResult};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Largest accepted photo: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const API_PORT: u16 = 3000;

/// Pre-flight validation failures. Nothing is sent when one of these occurs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UploadError {
    #[error("no file provided")]
    MissingFile,
    #[error("file size must be less than 10MB (got {size} bytes)")]
    TooLarge { size: u64 },
    #[error("only image files are allowed (got {mime_type:?})")]
    NotAnImage { mime_type: String },
    #[error("authentication required for file upload")]
    Unauthenticated,
}

/// Why a network attempt failed. Never surfaces to the caller.
#[derive(Error, Debug)]
enum AttemptError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("upload rejected: {0}")]
    Rejected(String),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadedFile>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct UploadedFile {
    file_url: String,
    file_name: String,
    file_size: u64,
    file_type: String,
}

/// API base for the page's host: the backend runs on port 3000 of the same
/// machine, or of `localhost` during local development.
pub fn api_base_for_host(host: &str) -> String {
    match host {
        "localhost" | "127.0.0.1" | "::1" | "[::1]" => format!("http://localhost:{API_PORT}/api"),
        _ => format!("http://{host}:{API_PORT}/api"),
    }
}

/// HTTP upload client for the backend's `/upload/single` endpoint.
pub struct UploadClient {
    client: reqwest::Client,
    api_base: String,
    auth_token: Option<String>,
}

impl UploadClient {
    /// `api_base` should be like `http://localhost:3000/api` (trailing slash is trimmed).
    pub fn new(api_base: String, auth_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            auth_token: auth_token.filter(|t| !t.is_empty()),
        }
    }

    pub fn for_host(host: &str, auth_token: Option<String>) -> Self {
        Self::new(api_base_for_host(host), auth_token)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Origin that relative file URLs are resolved against.
    fn origin(&self) -> &str {
        self.api_base
            .strip_suffix("/api")
            .unwrap_or(&self.api_base)
    }

    /// Validate, upload, and fall back to the embedded representation on
    /// any failure after validation.
    pub async fn upload(&self, file: Option<&PhotoFile>) -> Result<UploadResult, UploadError> {
        let (file, token) = self.validate(file)?;
        info!(name = %file.name, size = file.byte_size(), "uploading file");

        match self.send(file, token).await {
            Ok(result) => {
                info!(address = %result.address, "upload complete");
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, name = %file.name, "upload failed, falling back to data URL");
                Ok(UploadResult::embedded(file))
            }
        }
    }

    fn validate<'a>(
        &'a self,
        file: Option<&'a PhotoFile>,
    ) -> Result<(&'a PhotoFile, &'a str), UploadError> {
        let file = file.ok_or(UploadError::MissingFile)?;
        if file.byte_size() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                size: file.byte_size(),
            });
        }
        if !file.is_image() {
            return Err(UploadError::NotAnImage {
                mime_type: file.mime_type.clone(),
            });
        }
        let token = self
            .auth_token
            .as_deref()
            .ok_or(UploadError::Unauthenticated)?;
        Ok((file, token))
    }

    async fn send(&self, file: &PhotoFile, token: &str) -> Result<UploadResult, AttemptError> {
        let url = format!("{}/upload/single", self.api_base);

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = reqwest::multipart::Form::new().part("photo", part);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<UploadResponse>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| format!("upload failed with status: {}", status.as_u16()));
            return Err(AttemptError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)?;
        let data = match parsed {
            UploadResponse {
                success: true,
                data: Some(data),
                ..
            } => data,
            UploadResponse { message, .. } => {
                return Err(AttemptError::Rejected(
                    message.unwrap_or_else(|| "upload failed".to_string()),
                ));
            }
        };

        Ok(UploadResult {
            address: self.absolute_url(&data.file_url),
            name: data.file_name,
            byte_size: data.file_size,
            mime_type: data.file_type,
            embedded_data: Some(file.data_url()),
        })
    }

    fn absolute_url(&self, file_url: &str) -> String {
        if file_url.starts_with("http") {
            file_url.to_string()
        } else {
            format!("{}{}", self.origin(), file_url)
        }
    }
}
