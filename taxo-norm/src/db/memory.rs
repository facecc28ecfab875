//! In-memory repositories
//!
//! Same contracts as the SQLite stores, held in process. Each operation runs
//! under a single lock acquisition, so upserts are atomic.

use crate::db::{DictionaryRepository, UnknownTermRepository};
use crate::models::{
    normalize_locale, normalize_term, Category, DictionaryMapping, TermContext, UnknownFilter,
    UnknownStatus, UnknownTerm,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use taxo_common::{Error, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory dictionary
#[derive(Default)]
pub struct InMemoryDictionaryRepository {
    mappings: RwLock<HashMap<Uuid, DictionaryMapping>>,
    category_loads: AtomicUsize,
}

impl InMemoryDictionaryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get_by_category` calls served so far
    pub fn category_loads(&self) -> usize {
        self.category_loads.load(Ordering::SeqCst)
    }
}

fn same_key(a: &DictionaryMapping, term: &str, locale: &str, category: Category) -> bool {
    a.source_term == term && a.source_locale == locale && a.category == category
}

#[async_trait]
impl DictionaryRepository for InMemoryDictionaryRepository {
    async fn get_by_category(
        &self,
        category: Category,
        locale: Option<&str>,
    ) -> Result<Vec<DictionaryMapping>> {
        self.category_loads.fetch_add(1, Ordering::SeqCst);
        let locale = locale.map(normalize_locale);
        let mappings = self.mappings.read().await;

        let mut found: Vec<DictionaryMapping> = mappings
            .values()
            .filter(|m| m.category == category)
            .filter(|m| locale.as_ref().map_or(true, |l| &m.source_locale == l))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.source_term.cmp(&b.source_term));
        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<DictionaryMapping>> {
        let mappings = self.mappings.read().await;
        let mut all: Vec<DictionaryMapping> = mappings.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.category, &a.source_locale, &a.source_term).cmp(&(b.category, &b.source_locale, &b.source_term))
        });
        Ok(all)
    }

    async fn find_by_term(
        &self,
        term: &str,
        locale: &str,
        category: Category,
    ) -> Result<Option<DictionaryMapping>> {
        let term = normalize_term(term);
        let locale = normalize_locale(locale);
        let mappings = self.mappings.read().await;
        Ok(mappings
            .values()
            .find(|m| same_key(m, &term, &locale, category))
            .cloned())
    }

    async fn save(&self, mapping: &DictionaryMapping) -> Result<DictionaryMapping> {
        mapping.validate()?;

        let mut incoming = mapping.clone();
        incoming.source_term = normalize_term(&incoming.source_term);
        incoming.source_locale = normalize_locale(&incoming.source_locale);

        let mut mappings = self.mappings.write().await;
        let existing = mappings
            .values()
            .find(|m| same_key(m, &incoming.source_term, &incoming.source_locale, incoming.category))
            .map(|m| (m.id, m.usage_count));

        if let Some((id, usage_count)) = existing {
            incoming.id = id;
            incoming.usage_count = usage_count;
        }

        mappings.insert(incoming.id, incoming.clone());
        Ok(incoming)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.mappings
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Dictionary mapping {}", id)))
    }

    async fn increment_usage(&self, id: Uuid) -> Result<()> {
        let mut mappings = self.mappings.write().await;
        let mapping = mappings
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Dictionary mapping {}", id)))?;
        mapping.usage_count = mapping.usage_count.saturating_add(1);
        Ok(())
    }
}

/// In-memory review queue
#[derive(Default)]
pub struct InMemoryUnknownTermRepository {
    unknowns: RwLock<HashMap<Uuid, UnknownTerm>>,
}

impl InMemoryUnknownTermRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnknownTermRepository for InMemoryUnknownTermRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<UnknownTerm>> {
        Ok(self.unknowns.read().await.get(&id).cloned())
    }

    async fn find_all(&self, filter: &UnknownFilter) -> Result<Vec<UnknownTerm>> {
        let unknowns = self.unknowns.read().await;
        let mut found: Vec<UnknownTerm> = unknowns
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.term.cmp(&b.term))
        });
        if let Some(limit) = filter.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn update(&self, unknown: &UnknownTerm) -> Result<()> {
        unknown.validate()?;
        let mut unknowns = self.unknowns.write().await;
        match unknowns.get_mut(&unknown.id) {
            Some(slot) => {
                *slot = unknown.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("Unknown term {}", unknown.id))),
        }
    }

    async fn log_or_increment(
        &self,
        term: &str,
        category: Category,
        context: Option<TermContext>,
        source_platform: Option<&str>,
    ) -> Result<Uuid> {
        let normalized = normalize_term(term);
        let mut unknowns = self.unknowns.write().await;

        if let Some(existing) = unknowns
            .values_mut()
            .find(|u| u.term == normalized && u.category == category)
        {
            existing.record_occurrence(context);
            if existing.source_platform.is_none() {
                existing.source_platform = source_platform.map(str::to_string);
            }
            return Ok(existing.id);
        }

        let unknown = UnknownTerm::new(term, category, context, source_platform.map(str::to_string))?;
        let id = unknown.id;
        unknowns.insert(id, unknown);
        Ok(id)
    }

    async fn count_by_status(&self) -> Result<Vec<(UnknownStatus, u64)>> {
        let unknowns = self.unknowns.read().await;
        Ok(UnknownStatus::ALL
            .iter()
            .map(|status| {
                let n = unknowns.values().filter(|u| u.status == *status).count() as u64;
                (*status, n)
            })
            .collect())
    }
}
