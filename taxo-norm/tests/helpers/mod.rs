//! Shared test setup: the same services over in-memory or SQLite stores

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use taxo_norm::db::{
    DictionaryRepository, InMemoryDictionaryRepository, InMemoryUnknownTermRepository,
    SqliteDictionaryRepository, SqliteUnknownTermRepository, UnknownTermRepository,
};
use taxo_norm::{Category, DictionaryMapping, NormalizationService, Provenance, ReviewWorkflow};

pub struct Stores {
    pub dictionary: Arc<dyn DictionaryRepository>,
    pub unknowns: Arc<dyn UnknownTermRepository>,
    pub normalizer: Arc<NormalizationService>,
    pub workflow: ReviewWorkflow,
}

impl Stores {
    fn assemble(
        dictionary: Arc<dyn DictionaryRepository>,
        unknowns: Arc<dyn UnknownTermRepository>,
    ) -> Self {
        let normalizer = Arc::new(NormalizationService::new(Arc::clone(&dictionary), "en"));
        let workflow = ReviewWorkflow::new(
            Arc::clone(&dictionary),
            Arc::clone(&unknowns),
            Arc::clone(&normalizer),
        );
        Self {
            dictionary,
            unknowns,
            normalizer,
            workflow,
        }
    }

    pub fn memory() -> Self {
        Self::assemble(
            Arc::new(InMemoryDictionaryRepository::new()),
            Arc::new(InMemoryUnknownTermRepository::new()),
        )
    }

    pub async fn sqlite_memory() -> Self {
        let pool = taxo_common::db::init_memory_database().await.unwrap();
        Self::assemble(
            Arc::new(SqliteDictionaryRepository::new(pool.clone())),
            Arc::new(SqliteUnknownTermRepository::new(pool)),
        )
    }

    pub async fn sqlite_file(path: &Path) -> Self {
        let pool = taxo_common::db::init_database(path).await.unwrap();
        Self::assemble(
            Arc::new(SqliteDictionaryRepository::new(pool.clone())),
            Arc::new(SqliteUnknownTermRepository::new(pool)),
        )
    }

    /// Both backends, labelled for assertion messages
    pub async fn all() -> Vec<(&'static str, Self)> {
        vec![
            ("memory", Self::memory()),
            ("sqlite", Self::sqlite_memory().await),
        ]
    }
}

pub fn mapping(term: &str, category: Category, en: &str) -> DictionaryMapping {
    DictionaryMapping::new(
        term,
        "fr",
        BTreeMap::from([("en".to_string(), en.to_string())]),
        category,
        Provenance::Manual,
        1.0,
    )
    .unwrap()
}
