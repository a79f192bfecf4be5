//! Classification settings, injected into [`Classifier`](crate::Classifier) at construction.

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_PRIMARY_MODEL: &str = "x-ai/grok-4-fast:free";
pub const DEFAULT_FALLBACK_MODELS: &[&str] = &["openai/gpt-4o-mini", "anthropic/claude-3-haiku"];
pub const DEFAULT_REFERER: &str = "http://localhost";
pub const APP_TITLE: &str = "SahiSamasya Mobile";

/// Ordered model identifiers: primary first, fallbacks after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates {
    models: Vec<String>,
}

impl ModelCandidates {
    pub fn new(primary: impl Into<String>, fallbacks: Vec<String>) -> Self {
        let mut models = Vec::with_capacity(fallbacks.len() + 1);
        models.push(primary.into());
        models.extend(fallbacks);
        Self { models }
    }

    /// Build from the optional primary and the optional comma-separated
    /// fallback list, filling in the defaults for whatever is unset.
    pub fn from_settings(primary: Option<&str>, fallbacks_csv: Option<&str>) -> Self {
        let primary = primary
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PRIMARY_MODEL);
        let fallbacks = match fallbacks_csv {
            Some(csv) => parse_model_list(csv),
            None => DEFAULT_FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
        };
        Self::new(primary, fallbacks)
    }

    pub fn primary(&self) -> &str {
        &self.models[0]
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }
}

impl Default for ModelCandidates {
    fn default() -> Self {
        Self::from_settings(None, None)
    }
}

/// Split a comma-separated model list, trimming entries and dropping empties.
pub fn parse_model_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// OpenRouter key. `None` disables classification.
    pub api_key: Option<String>,
    pub models: ModelCandidates,
    /// Chat-completions endpoint.
    pub endpoint: String,
    /// Sent as `HTTP-Referer`.
    pub referer: String,
    /// Sent as `X-Title`.
    pub app_title: String,
}

impl ClassifierConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            models: ModelCandidates::default(),
            endpoint: OPENROUTER_URL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            app_title: APP_TITLE.to_string(),
        }
    }

    pub fn with_models(mut self, models: ModelCandidates) -> Self {
        self.models = models;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }
}
