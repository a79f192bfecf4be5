//! Photo classification: OpenRouter chat completions with model fallback and
//! salvage of free-form answers.

pub mod classifier;
pub mod config;
pub mod openrouter;
pub mod salvage;

pub use classifier::{Classifier, FallbackReason, Outcome, Step, default_prompt};
pub use config::{ClassifierConfig, ModelCandidates};
pub use openrouter::{ChatError, OpenRouterClient};
pub use salvage::{Salvaged, Strategy, salvage};
