//! Embedded (`data:` URL) representation of file content.
//!
//! A data URL carries the bytes inline, so it stays usable when the upload
//! backend is unreachable and can be sent to the model directly.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Whether an address is an embedded representation rather than a network location.
pub fn is_data_url(address: &str) -> bool {
    address.starts_with("data:")
}
