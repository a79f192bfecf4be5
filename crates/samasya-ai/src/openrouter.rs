//! OpenRouter chat-completions client (OpenAI-compatible wire format).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ClassifierConfig;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Request ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

// ── Response ──

#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Trimmed text content of the first choice.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .map(str::trim)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Pull `error.message` out of an error body, falling back to the raw text.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string())
        })
}

/// HTTP client for one chat-completions endpoint.
pub struct OpenRouterClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    referer: String,
    app_title: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, config: &ClassifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key,
            referer: config.referer.clone(),
            app_title: config.app_title.clone(),
        }
    }

    /// Send one completion request for `model`.
    ///
    /// Non-2xx responses come back as [`ChatError::Status`] so the caller can
    /// tell them apart from transport and decoding failures.
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatCompletion, ChatError> {
        let body = ChatRequest { model, messages };
        debug!(model, endpoint = %self.endpoint, "sending chat completion");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.app_title)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_wire_shape() {
        let msg = ChatMessage::user(vec![
            ContentPart::text("classify"),
            ContentPart::image("data:image/png;base64,YWJj"),
        ]);
        let body = ChatRequest {
            model: "openai/gpt-4o-mini",
            messages: std::slice::from_ref(&msg),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "openai/gpt-4o-mini",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "classify"},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,YWJj"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn first_content_is_trimmed() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "gen-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "  {\"category\":\"parks\"}\n"}}]
        }))
        .unwrap();
        assert_eq!(completion.first_content(), Some("{\"category\":\"parks\"}"));
    }

    #[test]
    fn first_content_missing() {
        let empty: ChatCompletion = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_content(), None);

        let null_content: ChatCompletion =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(null_content.first_content(), None);
    }

    #[test]
    fn error_message_prefers_body() {
        let msg = error_message(
            r#"{"error":{"message":"No endpoints found","code":404}}"#,
            reqwest::StatusCode::NOT_FOUND,
        );
        assert_eq!(msg, "No endpoints found");
    }

    #[test]
    fn error_message_falls_back_to_reason() {
        let msg = error_message("<html>", reqwest::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(msg, "Too Many Requests");
    }
}
