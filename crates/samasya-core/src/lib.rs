pub mod category;
pub mod data_url;
pub mod report;

pub use category::{Category, DEFAULT_TITLE, UnknownCategory};
pub use data_url::{is_data_url, to_data_url};
pub use report::{ClassificationRequest, ClassificationResult, PhotoFile, ReportDraft, UploadResult};
