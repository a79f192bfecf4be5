//! The closed vocabulary of civic issue categories.
//!
//! Every report carries exactly one of these tags. Tags coming from outside
//! (model output, stored records) are matched exactly; anything else is an
//! [`UnknownCategory`] and callers resolve it to [`Category::Other`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used whenever no better one is available.
pub const DEFAULT_TITLE: &str = "Civic Issue Report";

/// A civic issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    RoadMaintenance,
    Streetlights,
    WasteManagement,
    WaterSupply,
    Drainage,
    Parks,
    Traffic,
    NoisePollution,
    Other,
}

/// A tag that is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category tag: {0:?}")]
pub struct UnknownCategory(pub String);

impl Category {
    /// All categories, in the order they are presented to the model.
    pub const ALL: [Category; 9] = [
        Category::RoadMaintenance,
        Category::Streetlights,
        Category::WasteManagement,
        Category::WaterSupply,
        Category::Drainage,
        Category::Parks,
        Category::Traffic,
        Category::NoisePollution,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoadMaintenance => "road_maintenance",
            Self::Streetlights => "streetlights",
            Self::WasteManagement => "waste_management",
            Self::WaterSupply => "water_supply",
            Self::Drainage => "drainage",
            Self::Parks => "parks",
            Self::Traffic => "traffic",
            Self::NoisePollution => "noise_pollution",
            Self::Other => "other",
        }
    }

    /// Resolve a tag, mapping anything outside the vocabulary to `Other`.
    pub fn resolve(tag: &str) -> Self {
        tag.parse().unwrap_or(Self::Other)
    }

    /// Human title derived from the tag: `road_maintenance` → `Road Maintenance Issue`.
    pub fn default_title(&self) -> String {
        let words: Vec<String> = self
            .as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect();
        format!("{} Issue", words.join(" "))
    }

    /// The vocabulary as a comma-separated list, for prompts.
    pub fn vocabulary() -> String {
        Self::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Exact, case-sensitive match against the vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
