//! Review Workflow
//!
//! Human decisions on queued unknown terms. This is the only code that moves
//! an unknown term out of `pending`, and the only runtime path that creates
//! dictionary mappings. Machine suggestions are never promoted here without a
//! reviewer supplying the canonical value.

use crate::db::{DictionaryRepository, UnknownTermRepository};
use crate::models::{
    normalize_locale, Category, DictionaryMapping, Provenance, UnknownFilter, UnknownStatus,
    UnknownTerm,
};
use crate::services::NormalizationService;
use std::collections::BTreeMap;
use std::sync::Arc;
use taxo_common::{Error, Result};
use tracing::info;
use uuid::Uuid;

/// Default locale of scraped terms
pub const DEFAULT_SOURCE_LOCALE: &str = "fr";

/// Default locale of canonical values
pub const DEFAULT_TARGET_LOCALE: &str = "en";

/// Reviewer input for an approval
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub canonical_value: String,
    pub validated_by: Option<String>,
    pub notes: Option<String>,
    pub source_locale: String,
    pub target_locale: String,
}

impl Approval {
    pub fn new(canonical_value: impl Into<String>) -> Self {
        Self {
            canonical_value: canonical_value.into(),
            validated_by: None,
            notes: None,
            source_locale: DEFAULT_SOURCE_LOCALE.to_string(),
            target_locale: DEFAULT_TARGET_LOCALE.to_string(),
        }
    }

    pub fn validated_by(mut self, reviewer: Option<String>) -> Self {
        self.validated_by = reviewer;
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn locales(mut self, source_locale: &str, target_locale: &str) -> Self {
        self.source_locale = source_locale.to_string();
        self.target_locale = target_locale.to_string();
        self
    }
}

/// Review queue counts
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReviewStats {
    pub by_status: Vec<(UnknownStatus, u64)>,
}

impl ReviewStats {
    pub fn count(&self, status: UnknownStatus) -> u64 {
        self.by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, n)| *n)
    }

    pub fn open(&self) -> u64 {
        self.count(UnknownStatus::Pending) + self.count(UnknownStatus::Reviewing)
    }
}

/// Approve / reject / skip use cases
pub struct ReviewWorkflow {
    dictionary: Arc<dyn DictionaryRepository>,
    unknowns: Arc<dyn UnknownTermRepository>,
    normalizer: Arc<NormalizationService>,
}

impl ReviewWorkflow {
    pub fn new(
        dictionary: Arc<dyn DictionaryRepository>,
        unknowns: Arc<dyn UnknownTermRepository>,
        normalizer: Arc<NormalizationService>,
    ) -> Self {
        Self {
            dictionary,
            unknowns,
            normalizer,
        }
    }

    async fn load(&self, unknown_id: Uuid) -> Result<UnknownTerm> {
        self.unknowns
            .get_by_id(unknown_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Unknown term {}", unknown_id)))
    }

    /// Turn an unknown term into a dictionary mapping
    ///
    /// # Errors
    /// * `Error::NotFound` - no unknown term with this id
    /// * `Error::InvalidState` - the term is already approved, rejected or skipped
    /// * `Error::Validation` - empty canonical value or locale
    ///
    /// Nothing is written when any of these is returned.
    pub async fn approve_mapping(
        &self,
        unknown_id: Uuid,
        approval: Approval,
    ) -> Result<DictionaryMapping> {
        let mut unknown = self.load(unknown_id).await?;

        unknown.approve(
            &approval.canonical_value,
            approval.validated_by.clone(),
            approval.notes.clone(),
        )?;

        let target_locale = normalize_locale(&approval.target_locale);
        if target_locale.is_empty() {
            return Err(Error::validation("Approval requires a target locale"));
        }
        let translations =
            BTreeMap::from([(target_locale, approval.canonical_value.trim().to_string())]);

        let mapping = DictionaryMapping::new(
            &unknown.term,
            &approval.source_locale,
            translations,
            unknown.category,
            Provenance::Manual,
            1.0,
        )?
        .with_validated_by(approval.validated_by.clone())
        .with_notes(approval.notes.clone());

        let stored = self.dictionary.save(&mapping).await?;
        // The dictionary changed even if the queue update below fails
        self.normalizer.invalidate_cache().await;
        self.unknowns.update(&unknown).await?;

        info!(
            "Approved unknown {} term '{}' -> '{}' (mapping {}, by {})",
            unknown.category,
            unknown.term,
            approval.canonical_value.trim(),
            stored.id,
            approval.validated_by.as_deref().unwrap_or("unknown reviewer")
        );

        Ok(stored)
    }

    /// Close an unknown term without creating a mapping. There is no un-reject.
    pub async fn reject_unknown(
        &self,
        unknown_id: Uuid,
        rejected_by: Option<String>,
        notes: Option<String>,
    ) -> Result<UnknownTerm> {
        let mut unknown = self.load(unknown_id).await?;
        unknown.reject(rejected_by, notes)?;
        self.unknowns.update(&unknown).await?;

        info!("Rejected unknown {} term '{}'", unknown.category, unknown.term);
        Ok(unknown)
    }

    /// Set an unknown term aside without a decision on its meaning
    pub async fn skip_unknown(
        &self,
        unknown_id: Uuid,
        skipped_by: Option<String>,
        notes: Option<String>,
    ) -> Result<UnknownTerm> {
        let mut unknown = self.load(unknown_id).await?;
        unknown.skip(skipped_by, notes)?;
        self.unknowns.update(&unknown).await?;

        info!("Skipped unknown {} term '{}'", unknown.category, unknown.term);
        Ok(unknown)
    }

    /// Claim a pending term for review
    pub async fn start_review(
        &self,
        unknown_id: Uuid,
        reviewer: Option<String>,
    ) -> Result<UnknownTerm> {
        let mut unknown = self.load(unknown_id).await?;
        unknown.start_review(reviewer)?;
        self.unknowns.update(&unknown).await?;
        Ok(unknown)
    }

    /// Review queue, most frequent terms first
    pub async fn get_unknowns(&self, filter: &UnknownFilter) -> Result<Vec<UnknownTerm>> {
        let mut unknowns = self.unknowns.find_all(filter).await?;
        unknowns.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.term.cmp(&b.term))
        });
        Ok(unknowns)
    }

    /// Pending terms of one category
    pub async fn pending_for(&self, category: Category) -> Result<Vec<UnknownTerm>> {
        self.get_unknowns(&UnknownFilter {
            category: Some(category),
            ..UnknownFilter::default()
        })
        .await
    }

    pub async fn review_stats(&self) -> Result<ReviewStats> {
        Ok(ReviewStats {
            by_status: self.unknowns.count_by_status().await?,
        })
    }
}
