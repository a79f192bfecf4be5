//! Vertical card display for upload results, classifications, and report drafts.
//!
//! Data URLs are summarised to a short prefix and their length.

use samasya_core::{ClassificationResult, ReportDraft, UploadResult, is_data_url};

const DATA_URL_PREVIEW: usize = 48;

// ── Public API ──

pub fn print_upload(upload: &UploadResult) {
    for line in upload_lines(upload) {
        println!("{line}");
    }
}

pub fn print_classification(result: Option<&ClassificationResult>) {
    for line in classification_lines(result) {
        println!("{line}");
    }
}

pub fn print_report(draft: &ReportDraft) {
    print_upload(&draft.photo);
    println!();
    print_classification(draft.classification.as_ref());
}

// ── Rendering ──

pub fn upload_lines(upload: &UploadResult) -> Vec<String> {
    let mut lines = vec![format!("=== {} ===", upload.name), "Photo".to_string()];
    lines.push(row("address", &summarise(&upload.address)));
    lines.push(row("mime_type", &upload.mime_type));
    lines.push(row("byte_size", &upload.byte_size.to_string()));
    lines.push(row(
        "stored",
        if upload.is_embedded() {
            "embedded (backend unreachable)"
        } else {
            "backend"
        },
    ));
    if let Some(data) = &upload.embedded_data {
        lines.push(row("embedded_data", &summarise(data)));
    }
    lines
}

pub fn classification_lines(result: Option<&ClassificationResult>) -> Vec<String> {
    let mut lines = vec!["Classification".to_string()];
    match result {
        Some(r) => {
            lines.push(row("category", r.category.as_str()));
            lines.push(row("title", &r.title));
        }
        None => lines.push(row("status", "disabled (no OpenRouter API key)")),
    }
    lines
}

fn row(key: &str, value: &str) -> String {
    format!("  {key:<14} {value}")
}

/// Shorten data URLs to their header plus a short prefix of the payload.
pub fn summarise(address: &str) -> String {
    if !is_data_url(address) || address.len() <= DATA_URL_PREVIEW {
        return address.to_string();
    }
    let cut = address
        .char_indices()
        .nth(DATA_URL_PREVIEW)
        .map(|(i, _)| i)
        .unwrap_or(address.len());
    format!("{}... ({} chars)", &address[..cut], address.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use samasya_core::{Category, PhotoFile};

    #[test]
    fn short_addresses_are_untouched() {
        assert_eq!(summarise("http://h/a.png"), "http://h/a.png");
        assert_eq!(
            summarise("data:image/png;base64,YWJj"),
            "data:image/png;base64,YWJj"
        );
    }

    #[test]
    fn long_data_urls_are_summarised() {
        let url = format!("data:image/png;base64,{}", "A".repeat(200));
        let s = summarise(&url);
        assert!(s.starts_with("data:image/png;base64,AAAA"));
        assert!(s.ends_with(&format!("... ({} chars)", url.len())));
        assert!(s.len() < url.len());
    }

    #[test]
    fn upload_card_marks_embedded_fallback() {
        let file = PhotoFile::new("a.png", "image/png", vec![1; 100]);
        let lines = upload_lines(&UploadResult::embedded(&file));
        assert_eq!(lines[0], "=== a.png ===");
        assert!(lines.contains(&"  stored         embedded (backend unreachable)".to_string()));
        assert!(lines.contains(&"  byte_size      100".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("  embedded_data  data:image/png")));
    }

    #[test]
    fn classification_card() {
        let lines = classification_lines(Some(&ClassificationResult {
            category: Category::Drainage,
            title: "Blocked drain".into(),
        }));
        assert_eq!(
            lines,
            [
                "Classification",
                "  category       drainage",
                "  title          Blocked drain",
            ]
        );
        assert!(classification_lines(None)[1].contains("disabled"));
    }
}
