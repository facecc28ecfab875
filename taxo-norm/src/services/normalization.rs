//! Normalization Service
//!
//! Resolves (term, source locale, category) to a canonical value through an
//! in-memory memo of the dictionary. Each (category, locale) pair is loaded
//! from the repository once, on first use, then served from a hash map.
//!
//! Invalidation drops the whole memo. A generation counter keeps a load that
//! raced with an invalidation from re-inserting its (now stale) snapshot.

use crate::db::DictionaryRepository;
use crate::models::{normalize_locale, normalize_term, Category};
use std::collections::HashMap;
use std::sync::Arc;
use taxo_common::Result;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of a dictionary lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Resolved {
        canonical: String,
        mapping_id: Uuid,
        confidence: f64,
    },
    /// No mapping; the caller decides whether to queue the term
    Unknown,
}

impl Lookup {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            Lookup::Resolved { canonical, .. } => Some(canonical),
            Lookup::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Lookup::Unknown)
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    mapping_id: Uuid,
    canonical: String,
    confidence: f64,
}

type TermTable = Arc<HashMap<String, CachedEntry>>;

#[derive(Default)]
struct Cache {
    generation: u64,
    tables: HashMap<(Category, String), TermTable>,
}

/// Cached term resolver
pub struct NormalizationService {
    dictionary: Arc<dyn DictionaryRepository>,
    target_locale: String,
    cache: RwLock<Cache>,
}

impl NormalizationService {
    /// # Arguments
    /// * `dictionary` - Mapping store
    /// * `target_locale` - Locale of the canonical values returned by `lookup`
    pub fn new(dictionary: Arc<dyn DictionaryRepository>, target_locale: &str) -> Self {
        Self {
            dictionary,
            target_locale: normalize_locale(target_locale),
            cache: RwLock::new(Cache::default()),
        }
    }

    pub fn target_locale(&self) -> &str {
        &self.target_locale
    }

    /// Resolve a raw term
    ///
    /// A miss is `Lookup::Unknown`, not an error. A hit bumps the mapping's
    /// usage count.
    ///
    /// # Errors
    /// Persistence failures while loading the dictionary or counting usage.
    pub async fn lookup(&self, term: &str, locale: &str, category: Category) -> Result<Lookup> {
        let key = normalize_term(term);
        if key.is_empty() {
            return Ok(Lookup::Unknown);
        }

        let table = self.table(category, locale).await?;
        let Some(entry) = table.get(&key) else {
            debug!(term = %key, locale = %locale, category = %category, "Dictionary miss");
            return Ok(Lookup::Unknown);
        };

        match self.dictionary.increment_usage(entry.mapping_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                // Deleted since the table was loaded; the value is still the last known mapping
                warn!("Usage count skipped for removed mapping {}", entry.mapping_id);
            }
            Err(e) => return Err(e),
        }

        Ok(Lookup::Resolved {
            canonical: entry.canonical.clone(),
            mapping_id: entry.mapping_id,
            confidence: entry.confidence,
        })
    }

    /// Drop every memoized table; call after any dictionary write
    pub async fn invalidate_cache(&self) {
        let mut cache = self.cache.write().await;
        cache.generation += 1;
        let dropped = cache.tables.len();
        cache.tables.clear();
        info!("Normalization cache invalidated ({} tables dropped)", dropped);
    }

    /// Number of (category, locale) tables currently memoized
    pub async fn cached_pairs(&self) -> usize {
        self.cache.read().await.tables.len()
    }

    async fn table(&self, category: Category, locale: &str) -> Result<TermTable> {
        let key = (category, normalize_locale(locale));

        let generation = {
            let cache = self.cache.read().await;
            if let Some(table) = cache.tables.get(&key) {
                return Ok(Arc::clone(table));
            }
            cache.generation
        };

        // Loaded without holding the lock; concurrent loaders may both get here
        let mappings = self
            .dictionary
            .get_by_category(category, Some(&key.1))
            .await?;

        let table: HashMap<String, CachedEntry> = mappings
            .iter()
            .filter_map(|mapping| {
                mapping.canonical_for(&self.target_locale).map(|canonical| {
                    (
                        normalize_term(&mapping.source_term),
                        CachedEntry {
                            mapping_id: mapping.id,
                            canonical: canonical.to_string(),
                            confidence: mapping.confidence,
                        },
                    )
                })
            })
            .collect();
        let table = Arc::new(table);

        debug!(
            category = %category,
            locale = %key.1,
            terms = table.len(),
            "Loaded dictionary table into cache"
        );

        let mut cache = self.cache.write().await;
        if cache.generation == generation {
            cache.tables.insert(key, Arc::clone(&table));
        }

        Ok(table)
    }
}
