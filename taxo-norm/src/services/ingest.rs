//! Scrape ingestion helper: resolve a term or queue it for review

use crate::db::UnknownTermRepository;
use crate::models::{Category, TermContext};
use crate::services::{Lookup, NormalizationService};
use serde::Serialize;
use std::sync::Arc;
use taxo_common::Result;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    Resolved {
        canonical: String,
        mapping_id: Uuid,
        confidence: f64,
    },
    Queued {
        unknown_id: Uuid,
    },
}

impl IngestOutcome {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            IngestOutcome::Resolved { canonical, .. } => Some(canonical),
            IngestOutcome::Queued { .. } => None,
        }
    }
}

pub struct Ingestor {
    normalizer: Arc<NormalizationService>,
    unknowns: Arc<dyn UnknownTermRepository>,
}

impl Ingestor {
    pub fn new(
        normalizer: Arc<NormalizationService>,
        unknowns: Arc<dyn UnknownTermRepository>,
    ) -> Self {
        Self {
            normalizer,
            unknowns,
        }
    }

    /// Look a term up; on a miss, log the sighting in the review queue
    ///
    /// Blank terms fail with a validation error from the queue.
    pub async fn normalize_or_log(
        &self,
        term: &str,
        locale: &str,
        category: Category,
        context: Option<TermContext>,
        source_platform: Option<&str>,
    ) -> Result<IngestOutcome> {
        match self.normalizer.lookup(term, locale, category).await? {
            Lookup::Resolved {
                canonical,
                mapping_id,
                confidence,
            } => Ok(IngestOutcome::Resolved {
                canonical,
                mapping_id,
                confidence,
            }),
            Lookup::Unknown => {
                let unknown_id = self
                    .unknowns
                    .log_or_increment(term, category, context, source_platform)
                    .await?;
                Ok(IngestOutcome::Queued { unknown_id })
            }
        }
    }
}
