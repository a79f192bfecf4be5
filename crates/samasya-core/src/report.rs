//! Per-request entities passed between the upload and classification steps.
//!
//! Nothing here is persisted: every value is built for one user action and
//! dropped afterwards.

use serde::{Deserialize, Serialize};

use crate::category::{Category, DEFAULT_TITLE};
use crate::data_url::{is_data_url, to_data_url};

/// A photo as selected by the citizen, with its declared content type.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn data_url(&self) -> String {
        to_data_url(&self.mime_type, &self.bytes)
    }
}

/// Reference to an uploaded photo.
///
/// `address` is always usable: either the backend's absolute file URL or,
/// when the upload could not be completed, the data URL itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub address: String,
    pub name: String,
    pub byte_size: u64,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_data: Option<String>,
}

impl UploadResult {
    /// The degraded result: the photo travels inline instead of by URL.
    pub fn embedded(file: &PhotoFile) -> Self {
        let data_url = file.data_url();
        Self {
            address: data_url.clone(),
            name: file.name.clone(),
            byte_size: file.byte_size(),
            mime_type: file.mime_type.clone(),
            embedded_data: Some(data_url),
        }
    }

    /// True when the backend was not reached and `address` is a data URL.
    pub fn is_embedded(&self) -> bool {
        is_data_url(&self.address)
    }
}

/// Input to the classification requester.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub prompt_text: String,
    pub image_addresses: Vec<String>,
    pub embedded_image: Option<String>,
}

impl ClassificationRequest {
    pub fn new(prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            ..Default::default()
        }
    }

    pub fn with_embedded_image(mut self, data_url: impl Into<String>) -> Self {
        self.embedded_image = Some(data_url.into());
        self
    }

    pub fn with_image_address(mut self, address: impl Into<String>) -> Self {
        self.image_addresses.push(address.into());
        self
    }

    /// Build a request for a freshly uploaded photo, carrying both its
    /// address and (when available) its embedded data.
    pub fn for_upload(prompt_text: impl Into<String>, upload: &UploadResult) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            image_addresses: vec![upload.address.clone()],
            embedded_image: upload.embedded_data.clone(),
        }
    }

    /// The embedded image, if present and non-empty.
    pub fn embedded(&self) -> Option<&str> {
        self.embedded_image.as_deref().filter(|d| !d.is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.embedded().is_some() || !self.image_addresses.is_empty()
    }
}

/// A structured label for a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub title: String,
}

impl ClassificationResult {
    /// `{ other, "Civic Issue Report" }`, returned whenever classification
    /// cannot produce a trustworthy answer.
    pub fn fallback() -> Self {
        Self {
            category: Category::Other,
            title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Result for a category, using the derived title when none was given.
    pub fn with_title(category: Category, title: Option<&str>) -> Self {
        let title = match title {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => category.default_title(),
        };
        Self { category, title }
    }
}

/// What a composed report hands to the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDraft {
    pub photo: UploadResult,
    pub classification: Option<ClassificationResult>,
}
