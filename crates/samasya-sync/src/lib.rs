//! Backend sync: photo upload with embedded-data fallback.

pub mod upload;

pub use upload::{MAX_UPLOAD_BYTES, UploadClient, UploadError, api_base_for_host};
