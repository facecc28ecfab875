//! Closed vocabularies: attribute category and mapping provenance

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taxo_common::Error;

/// Attribute family a term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fiber,
    Color,
    Pattern,
    Weave,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Fiber,
        Category::Color,
        Category::Pattern,
        Category::Weave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fiber => "fiber",
            Category::Color => "color",
            Category::Pattern => "pattern",
            Category::Weave => "weave",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fiber" => Ok(Category::Fiber),
            "color" => Ok(Category::Color),
            "pattern" => Ok(Category::Pattern),
            "weave" => Ok(Category::Weave),
            other => Err(Error::validation(format!("Unknown category: '{}'", other))),
        }
    }
}

/// Where a dictionary mapping came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Entered or approved by a human
    Manual,
    /// Proposed by a language model
    LlmSuggested,
    /// Derived from shopper corrections
    UserFeedback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Manual => "manual",
            Provenance::LlmSuggested => "llm_suggested",
            Provenance::UserFeedback => "user_feedback",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provenance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "manual" => Ok(Provenance::Manual),
            "llm_suggested" => Ok(Provenance::LlmSuggested),
            "user_feedback" => Ok(Provenance::UserFeedback),
            other => Err(Error::validation(format!("Unknown provenance: '{}'", other))),
        }
    }
}
