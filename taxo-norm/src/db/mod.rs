//! Persistence contracts for the dictionary and the unknown-term queue
//!
//! Services depend only on these traits. `sqlite` implementations back the
//! CLI; `memory` implementations serve tests and embedders.

pub mod dictionary;
pub mod memory;
pub mod unknown_terms;

pub use dictionary::SqliteDictionaryRepository;
pub use memory::{InMemoryDictionaryRepository, InMemoryUnknownTermRepository};
pub use unknown_terms::SqliteUnknownTermRepository;

use crate::models::{Category, DictionaryMapping, TermContext, UnknownFilter, UnknownStatus, UnknownTerm};
use async_trait::async_trait;
use taxo_common::Result;
use uuid::Uuid;

/// Dictionary store
#[async_trait]
pub trait DictionaryRepository: Send + Sync {
    /// All mappings of a category, optionally restricted to one source locale
    async fn get_by_category(
        &self,
        category: Category,
        locale: Option<&str>,
    ) -> Result<Vec<DictionaryMapping>>;

    async fn get_all(&self) -> Result<Vec<DictionaryMapping>>;

    /// Exact lookup on the unique key; `term` is normalized before matching
    async fn find_by_term(
        &self,
        term: &str,
        locale: &str,
        category: Category,
    ) -> Result<Option<DictionaryMapping>>;

    /// Upsert on (source_term, source_locale, category)
    ///
    /// On conflict the stored row keeps its id and usage count; every other
    /// field is replaced. Returns the stored record.
    async fn save(&self, mapping: &DictionaryMapping) -> Result<DictionaryMapping>;

    /// `Error::NotFound` when no mapping has this id
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// `Error::NotFound` when no mapping has this id
    async fn increment_usage(&self, id: Uuid) -> Result<()>;
}

/// Unknown-term review queue store
#[async_trait]
pub trait UnknownTermRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<UnknownTerm>>;

    /// Records matching `filter`, most frequent first (ties by term)
    async fn find_all(&self, filter: &UnknownFilter) -> Result<Vec<UnknownTerm>>;

    /// Full-row update; `Error::NotFound` when the id is absent
    async fn update(&self, unknown: &UnknownTerm) -> Result<()>;

    /// Atomic upsert keyed by (normalized term, category)
    ///
    /// Creates a pending record with one occurrence, or increments an existing
    /// record's occurrences and appends `context` when it is new and the list
    /// has room. Never changes status. Returns the record id.
    async fn log_or_increment(
        &self,
        term: &str,
        category: Category,
        context: Option<TermContext>,
        source_platform: Option<&str>,
    ) -> Result<Uuid>;

    /// Record count per status, in `UnknownStatus::ALL` order
    async fn count_by_status(&self) -> Result<Vec<(UnknownStatus, u64)>>;
}
