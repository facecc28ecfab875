//! Unknown term review lifecycle
//!
//! A term missing from the dictionary is queued as `pending`. Reviewers may
//! mark it `reviewing`, then settle it as `approved`, `rejected` or `skipped`.
//! Settled states are final:
//!
//! ```text
//! pending ──► reviewing ──► approved | rejected | skipped
//!    └────────────────────► approved | rejected | skipped
//! ```

use super::{normalize_term, Category};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taxo_common::{Error, Result};
use uuid::Uuid;

/// Maximum number of distinct contexts kept per unknown term
pub const MAX_CONTEXTS: usize = 10;

/// Review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStatus {
    Pending,
    Reviewing,
    Approved,
    Rejected,
    Skipped,
}

impl UnknownStatus {
    pub const ALL: [UnknownStatus; 5] = [
        UnknownStatus::Pending,
        UnknownStatus::Reviewing,
        UnknownStatus::Approved,
        UnknownStatus::Rejected,
        UnknownStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownStatus::Pending => "pending",
            UnknownStatus::Reviewing => "reviewing",
            UnknownStatus::Approved => "approved",
            UnknownStatus::Rejected => "rejected",
            UnknownStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnknownStatus::Approved | UnknownStatus::Rejected | UnknownStatus::Skipped
        )
    }

    pub fn can_transition_to(&self, next: UnknownStatus) -> bool {
        match (self, next) {
            (UnknownStatus::Pending, UnknownStatus::Reviewing) => true,
            (UnknownStatus::Pending | UnknownStatus::Reviewing, next) => next.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnknownStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UnknownStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| Error::validation(format!("Unknown review status: '{}'", s)))
    }
}

/// Where an unknown term was seen
///
/// Scrapers send either plain text (e.g. the product title) or a JSON object
/// carrying product metadata; both end up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermContext {
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "productId", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, alias = "productUrl", skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
}

impl TermContext {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            product_id: None,
            image_url: None,
            product_url: None,
        }
    }

    /// Parse a raw context payload
    ///
    /// JSON objects are read as structured context; anything else (including
    /// JSON that doesn't fit) is kept verbatim as text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            match serde_json::from_str::<TermContext>(trimmed) {
                Ok(context) if !context.is_empty() => return context,
                _ => {}
            }
        }
        Self::text(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.product_id.is_none()
            && self.image_url.is_none()
            && self.product_url.is_none()
    }

    /// Literal serialized form; two contexts are duplicates when these are equal
    pub fn dedup_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.text.clone())
    }
}

/// Append `context` to a context list unless it is empty, already present
/// (literal comparison) or the list holds `MAX_CONTEXTS` entries
pub fn append_context(contexts: &mut Vec<TermContext>, context: TermContext) -> bool {
    if context.is_empty() || contexts.len() >= MAX_CONTEXTS {
        return false;
    }
    let key = context.dedup_key();
    if contexts.iter().any(|c| c.dedup_key() == key) {
        return false;
    }
    contexts.push(context);
    true
}

/// A term with no dictionary mapping, queued for human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownTerm {
    pub id: Uuid,
    /// Trimmed, lowercased
    pub term: String,
    pub category: Category,
    pub occurrences: u64,
    /// Distinct contexts in first-seen order, at most `MAX_CONTEXTS`
    pub contexts: Vec<TermContext>,
    pub status: UnknownStatus,
    pub source_platform: Option<String>,
    pub llm_suggestion: Option<String>,
    pub llm_confidence: Option<f64>,
    pub human_mapping: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl UnknownTerm {
    /// First sighting of a term: pending, one occurrence
    pub fn new(
        term: &str,
        category: Category,
        context: Option<TermContext>,
        source_platform: Option<String>,
    ) -> Result<Self> {
        let now = Utc::now();
        let mut unknown = Self {
            id: Uuid::new_v4(),
            term: normalize_term(term),
            category,
            occurrences: 1,
            contexts: Vec::new(),
            status: UnknownStatus::Pending,
            source_platform,
            llm_suggestion: None,
            llm_confidence: None,
            human_mapping: None,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            first_seen_at: now,
            last_seen_at: now,
        };
        unknown.validate()?;
        if let Some(context) = context {
            unknown.add_context(context);
        }
        Ok(unknown)
    }

    /// Check entity invariants
    pub fn validate(&self) -> Result<()> {
        if self.term.trim().is_empty() {
            return Err(Error::validation("Unknown term requires a non-empty term"));
        }
        if let Some(confidence) = self.llm_confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(Error::validation(format!(
                    "LLM confidence must be within [0, 1], got {}",
                    confidence
                )));
            }
        }
        if self.contexts.len() > MAX_CONTEXTS {
            return Err(Error::validation(format!(
                "Unknown term '{}' holds {} contexts (max {})",
                self.term,
                self.contexts.len(),
                MAX_CONTEXTS
            )));
        }
        Ok(())
    }

    /// Append a context unless it is a duplicate or the list is full
    ///
    /// Returns true when the context was stored.
    pub fn add_context(&mut self, context: TermContext) -> bool {
        append_context(&mut self.contexts, context)
    }

    /// Another sighting: bump the counter, maybe keep the context. Status is untouched.
    pub fn record_occurrence(&mut self, context: Option<TermContext>) {
        self.occurrences = self.occurrences.saturating_add(1);
        self.last_seen_at = Utc::now();
        if let Some(context) = context {
            self.add_context(context);
        }
    }

    /// Attach a machine suggestion; never promoted without a human decision
    pub fn set_llm_suggestion(&mut self, suggestion: &str, confidence: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::validation(format!(
                "LLM confidence must be within [0, 1], got {}",
                confidence
            )));
        }
        self.llm_suggestion = Some(suggestion.trim().to_string());
        self.llm_confidence = Some(confidence);
        Ok(())
    }

    pub fn start_review(&mut self, reviewer: Option<String>) -> Result<()> {
        self.ensure_transition(UnknownStatus::Reviewing)?;
        self.status = UnknownStatus::Reviewing;
        self.reviewed_by = reviewer;
        Ok(())
    }

    pub fn approve(
        &mut self,
        canonical_value: &str,
        reviewer: Option<String>,
        notes: Option<String>,
    ) -> Result<()> {
        self.ensure_transition(UnknownStatus::Approved)?;
        let canonical_value = canonical_value.trim();
        if canonical_value.is_empty() {
            return Err(Error::validation(format!(
                "Approval of '{}' requires a canonical value",
                self.term
            )));
        }
        self.human_mapping = Some(canonical_value.to_string());
        self.settle(UnknownStatus::Approved, reviewer, notes);
        Ok(())
    }

    pub fn reject(&mut self, reviewer: Option<String>, notes: Option<String>) -> Result<()> {
        self.ensure_transition(UnknownStatus::Rejected)?;
        self.settle(UnknownStatus::Rejected, reviewer, notes);
        Ok(())
    }

    pub fn skip(&mut self, reviewer: Option<String>, notes: Option<String>) -> Result<()> {
        self.ensure_transition(UnknownStatus::Skipped)?;
        self.settle(UnknownStatus::Skipped, reviewer, notes);
        Ok(())
    }

    fn ensure_transition(&self, next: UnknownStatus) -> Result<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "Unknown term {} ('{}') is {}; cannot move to {}",
                self.id, self.term, self.status, next
            )))
        }
    }

    fn settle(&mut self, status: UnknownStatus, reviewer: Option<String>, notes: Option<String>) {
        self.status = status;
        self.reviewed_by = reviewer;
        self.reviewed_at = Some(Utc::now());
        self.review_notes = notes;
    }
}

/// Review queue query
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownFilter {
    /// `None` lists every status
    pub status: Option<UnknownStatus>,
    pub category: Option<Category>,
    pub min_occurrences: u64,
    pub limit: Option<usize>,
}

impl Default for UnknownFilter {
    fn default() -> Self {
        Self {
            status: Some(UnknownStatus::Pending),
            category: None,
            min_occurrences: 1,
            limit: None,
        }
    }
}

impl UnknownFilter {
    pub fn matches(&self, unknown: &UnknownTerm) -> bool {
        self.status.map_or(true, |s| unknown.status == s)
            && self.category.map_or(true, |c| unknown.category == c)
            && unknown.occurrences >= self.min_occurrences
    }
}
