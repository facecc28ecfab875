//! Dictionary seeding from TOML
//!
//! ```toml
//! [[mappings]]
//! term = "rouge"
//! category = "color"
//! translations = { en = "red", de = "rot" }
//! # optional: locale, provenance, confidence, validated_by, notes
//! ```

use crate::db::DictionaryRepository;
use crate::models::{Category, DictionaryMapping, Provenance};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use taxo_common::{Error, Result};
use tracing::info;

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    mappings: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
struct SeedEntry {
    term: String,
    locale: Option<String>,
    category: Category,
    translations: BTreeMap<String, String>,
    provenance: Option<Provenance>,
    confidence: Option<f64>,
    validated_by: Option<String>,
    notes: Option<String>,
}

/// Parse seed mappings; entries without a locale get `default_locale`
pub fn parse_seed(content: &str, default_locale: &str) -> Result<Vec<DictionaryMapping>> {
    let file: SeedFile = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Failed to parse seed file: {}", e)))?;

    file.mappings
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let locale = entry.locale.as_deref().unwrap_or(default_locale);
            DictionaryMapping::new(
                &entry.term,
                locale,
                entry.translations,
                entry.category,
                entry.provenance.unwrap_or(Provenance::Manual),
                entry.confidence.unwrap_or(1.0),
            )
            .map(|m| m.with_validated_by(entry.validated_by).with_notes(entry.notes))
            .map_err(|e| Error::validation(format!("Seed entry {} ('{}'): {}", index + 1, entry.term, e)))
        })
        .collect()
}

pub fn load_seed_file(path: &Path, default_locale: &str) -> Result<Vec<DictionaryMapping>> {
    let content = std::fs::read_to_string(path)?;
    parse_seed(&content, default_locale)
}

/// Upsert every mapping; returns how many were written
pub async fn import_seed(
    dictionary: &dyn DictionaryRepository,
    mappings: &[DictionaryMapping],
) -> Result<usize> {
    for mapping in mappings {
        dictionary.save(mapping).await?;
    }
    info!("Imported {} seed mappings", mappings.len());
    Ok(mappings.len())
}
