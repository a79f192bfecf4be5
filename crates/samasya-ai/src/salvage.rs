//! Recover a classification from free-form model output.
//!
//! Models are asked for a bare JSON object but often wrap it in prose or
//! markdown fences, or ignore the format entirely. The strategies are:
//!
//! 1. [`Strategy::BraceSpan`]: when the text contains a span from the first
//!    `{` to the last `}` (across newlines), that span is parsed as JSON.
//! 2. [`Strategy::Direct`]: when there is no such span, the whole trimmed
//!    text is parsed as JSON.
//! 3. [`Strategy::TokenScan`]: only when the JSON parse failed, the leftmost
//!    vocabulary tag anywhere in the text, case-insensitively.
//!
//! Any JSON value that parses is final. It only validates when it is an
//! object with a vocabulary `category`; a bare string or array is invalid.

use std::sync::LazyLock;

use regex::Regex;
use samasya_core::{Category, ClassificationResult, DEFAULT_TITLE};
use serde_json::Value;

static BRACE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

static CATEGORY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = Category::ALL
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)({alternation})")).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    BraceSpan,
    Direct,
    TokenScan,
}

/// What the salvage pass extracted, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Salvaged {
    /// A parsed JSON value, from `BraceSpan` or `Direct`.
    Json { strategy: Strategy, value: Value },
    /// A vocabulary tag found by `TokenScan`, lowercased.
    Token(String),
    Nothing,
}

impl Salvaged {
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Self::Json { strategy, .. } => Some(*strategy),
            Self::Token(_) => Some(Strategy::TokenScan),
            Self::Nothing => None,
        }
    }

    /// Validate against the vocabulary.
    ///
    /// JSON needs to be an object with a non-empty string `category` in the
    /// vocabulary; its `title` is kept when it is a non-empty string and
    /// derived from the category otherwise. Tokens always carry the default
    /// title.
    pub fn validate(&self) -> Option<ClassificationResult> {
        match self {
            Self::Json { value, .. } => {
                let fields = value.as_object()?;
                let category = fields
                    .get("category")
                    .and_then(Value::as_str)
                    .filter(|c| !c.is_empty())?
                    .parse::<Category>()
                    .ok()?;
                let title = fields.get("title").and_then(Value::as_str);
                Some(ClassificationResult::with_title(category, title))
            }
            Self::Token(tag) => tag.parse::<Category>().ok().map(|category| {
                ClassificationResult {
                    category,
                    title: DEFAULT_TITLE.to_string(),
                }
            }),
            Self::Nothing => None,
        }
    }
}

/// Run the strategies in order over raw model output.
pub fn salvage(text: &str) -> Salvaged {
    let text = text.trim();

    let (strategy, candidate) = match BRACE_SPAN.find(text) {
        Some(span) => (Strategy::BraceSpan, span.as_str()),
        None => (Strategy::Direct, text),
    };
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Salvaged::Json { strategy, value };
    }

    match CATEGORY_TOKEN.captures(text) {
        Some(caps) => Salvaged::Token(caps[1].to_lowercase()),
        None => Salvaged::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_of(text: &str) -> Option<Category> {
        salvage(text).validate().map(|r| r.category)
    }

    #[test]
    fn bare_object() {
        let s = salvage(r#"{"category":"streetlights","title":"Broken light"}"#);
        assert_eq!(s.strategy(), Some(Strategy::BraceSpan));
        assert_eq!(
            s.validate(),
            Some(ClassificationResult {
                category: Category::Streetlights,
                title: "Broken light".into()
            })
        );
    }

    #[test]
    fn object_inside_markdown_fence() {
        let text = "Here is the result:\n```json\n{\n  \"category\": \"waste_management\",\n  \"title\": \"Overflowing bin\"\n}\n```";
        let s = salvage(text);
        assert_eq!(s.strategy(), Some(Strategy::BraceSpan));
        assert_eq!(s.validate().unwrap().title, "Overflowing bin");
    }

    #[test]
    fn prose_falls_back_to_token_scan() {
        let s = salvage("The image shows a blocked Drainage channel near the road.");
        assert_eq!(s, Salvaged::Token("drainage".into()));
        assert_eq!(
            s.validate(),
            Some(ClassificationResult {
                category: Category::Drainage,
                title: "Civic Issue Report".into()
            })
        );
    }

    #[test]
    fn token_scan_takes_leftmost_match() {
        assert_eq!(
            category_of("traffic jam caused by poor road_maintenance"),
            Some(Category::Traffic)
        );
    }

    #[test]
    fn token_scan_matches_inside_words() {
        assert_eq!(category_of("another problem"), Some(Category::Other));
    }

    #[test]
    fn broken_brace_span_still_scans_tokens() {
        let s = salvage("{category: parks} looks like a park issue");
        assert_eq!(s.strategy(), Some(Strategy::TokenScan));
        assert_eq!(s.validate().unwrap().category, Category::Parks);
    }

    #[test]
    fn parsed_object_is_final_even_when_invalid() {
        // The tag appears in the text, but the parsed object wins.
        let s = salvage(r#"{"category":"bogus_tag","note":"maybe drainage"}"#);
        assert_eq!(s.strategy(), Some(Strategy::BraceSpan));
        assert_eq!(s.validate(), None);
    }

    #[test]
    fn bare_json_string_is_final_and_invalid() {
        let s = salvage(r#""streetlights""#);
        assert_eq!(
            s,
            Salvaged::Json {
                strategy: Strategy::Direct,
                value: Value::String("streetlights".into())
            }
        );
        assert_eq!(s.validate(), None);
    }

    #[test]
    fn non_object_json_is_invalid() {
        assert_eq!(salvage(r#"["drainage"]"#).validate(), None);
        assert_eq!(salvage("42").validate(), None);
        assert_eq!(salvage("null").validate(), None);
    }

    #[test]
    fn object_inside_array_is_found_by_brace_span() {
        let s = salvage(r#"[{"category":"parks","title":"Broken bench"}]"#);
        assert_eq!(s.strategy(), Some(Strategy::BraceSpan));
        assert_eq!(s.validate().unwrap().category, Category::Parks);
    }

    #[test]
    fn object_without_category_is_invalid() {
        assert_eq!(salvage(r#"{"title":"Something"}"#).validate(), None);
        assert_eq!(salvage(r#"{"category":""}"#).validate(), None);
        assert_eq!(salvage(r#"{"category":7}"#).validate(), None);
    }

    #[test]
    fn category_match_is_case_sensitive_in_objects() {
        assert_eq!(salvage(r#"{"category":"Parks"}"#).validate(), None);
    }

    #[test]
    fn missing_title_is_derived() {
        let r = salvage(r#"{"category":"water_supply"}"#).validate().unwrap();
        assert_eq!(r.title, "Water Supply Issue");
        let r = salvage(r#"{"category":"parks","title":null}"#).validate().unwrap();
        assert_eq!(r.title, "Parks Issue");
    }

    #[test]
    fn nothing_recognisable() {
        let s = salvage("I cannot help with that.");
        assert_eq!(s, Salvaged::Nothing);
        assert_eq!(s.validate(), None);
        assert_eq!(salvage("").validate(), None);
    }

    #[test]
    fn every_valid_result_is_in_vocabulary() {
        let samples = [
            r#"{"category":"noise_pollution"}"#,
            "NOISE_POLLUTION from a loudspeaker",
            "water_supply",
            r#"{"category":"unknown"}"#,
            "nothing here",
        ];
        for text in samples {
            if let Some(r) = salvage(text).validate() {
                assert!(Category::ALL.contains(&r.category));
            }
        }
    }
}
