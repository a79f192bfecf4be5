//! Report pipeline: read photo → upload → classify the uploaded reference.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use samasya_ai::Classifier;
use samasya_core::{ClassificationRequest, PhotoFile, ReportDraft};
use samasya_sync::UploadClient;
use tracing::info;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Read a photo from disk. The declared content type is `mime` when given,
/// otherwise sniffed from the file's magic bytes.
pub async fn load_photo(path: &Path, mime: Option<&str>) -> anyhow::Result<PhotoFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let mime_type = match mime {
        Some(m) => m.to_string(),
        None => sniff_mime(&bytes).to_string(),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(PhotoFile::new(name, mime_type, bytes))
}

pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(FALLBACK_MIME)
}

pub struct ReportStats {
    pub draft: ReportDraft,
    pub elapsed_secs: f64,
}

/// Upload a photo and classify it. Only upload validation errors fail.
pub async fn run_report(
    uploader: &UploadClient,
    classifier: &Classifier,
    photo: &PhotoFile,
    prompt: &str,
) -> anyhow::Result<ReportStats> {
    let start = Instant::now();

    let upload = uploader
        .upload(Some(photo))
        .await
        .context("validating photo")?;

    let request = ClassificationRequest::for_upload(prompt, &upload);
    let classification = classifier.classify(&request).await;

    let elapsed_secs = start.elapsed().as_secs_f64();
    info!(
        embedded = upload.is_embedded(),
        category = classification.as_ref().map(|c| c.category.as_str()),
        elapsed_secs,
        "report drafted"
    );

    Ok(ReportStats {
        draft: ReportDraft {
            photo: upload,
            classification,
        },
        elapsed_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use samasya_ai::{ClassifierConfig, ModelCandidates};
    use samasya_core::{Category, ClassificationResult};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn sniffs_png_and_unknown() {
        assert_eq!(sniff_mime(PNG_MAGIC), "image/png");
        assert_eq!(sniff_mime(b"plain text"), FALLBACK_MIME);
    }

    #[tokio::test]
    async fn load_photo_reads_name_and_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("streetlight.png");
        tokio::fs::write(&file, PNG_MAGIC).await.unwrap();

        let photo = load_photo(&file, None).await.unwrap();
        assert_eq!(photo.name, "streetlight.png");
        assert_eq!(photo.mime_type, "image/png");

        let declared = load_photo(&file, Some("image/webp")).await.unwrap();
        assert_eq!(declared.mime_type, "image/webp");
    }

    #[tokio::test]
    async fn load_photo_missing_file_errors() {
        let err = load_photo(Path::new("/nonexistent/samasya.png"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("reading /nonexistent/samasya.png"));
    }

    #[tokio::test]
    async fn embedded_fallback_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload/single"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let photo = PhotoFile::new("bin.png", "image/png", PNG_MAGIC.to_vec());
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_partial_json(json!({
                "messages": [{"content": [{"type": "text"}, {"image_url": {"url": photo.data_url()}}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "{\"category\":\"waste_management\",\"title\":\"Overflowing bin\"}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploader = UploadClient::new(format!("{}/api", server.uri()), Some("tok".into()));
        let classifier = Classifier::new(
            ClassifierConfig::new(Some("sk-test".into()))
                .with_endpoint(format!("{}/chat", server.uri()))
                .with_models(ModelCandidates::new("a", vec![])),
        );

        let stats = run_report(&uploader, &classifier, &photo, "").await.unwrap();
        assert!(stats.draft.photo.is_embedded());
        assert_eq!(
            stats.draft.classification,
            Some(ClassificationResult {
                category: Category::WasteManagement,
                title: "Overflowing bin".into()
            })
        );
    }

    #[tokio::test]
    async fn validation_error_stops_the_pipeline() {
        let uploader = UploadClient::new("http://localhost:3000/api".into(), None);
        let classifier = Classifier::new(ClassifierConfig::new(None));
        let photo = PhotoFile::new("bin.png", "image/png", PNG_MAGIC.to_vec());

        let err = run_report(&uploader, &classifier, &photo, "")
            .await
            .err()
            .unwrap();
        assert!(
            err.chain()
                .any(|e| e.to_string() == "authentication required for file upload")
        );
    }
}
