//! Dictionary mapping: a source-locale term and its canonical translations

use super::{normalize_locale, normalize_term, Category, Provenance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taxo_common::{Error, Result};
use uuid::Uuid;

/// Term → canonical translation record
///
/// Unique on (source_term, source_locale, category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryMapping {
    pub id: Uuid,
    /// Always stored trimmed and lowercased
    pub source_term: String,
    pub source_locale: String,
    /// Target locale → canonical value
    pub translations: BTreeMap<String, String>,
    pub category: Category,
    pub provenance: Provenance,
    /// Trust in the mapping, 0.0 - 1.0
    pub confidence: f64,
    pub validated_at: DateTime<Utc>,
    pub validated_by: Option<String>,
    pub notes: Option<String>,
    pub usage_count: u64,
}

impl DictionaryMapping {
    /// Create a validated mapping with a fresh id and zero usage
    ///
    /// # Errors
    /// `Error::Validation` on an empty term/locale, empty or blank translations,
    /// two translation locales that differ only by case or spacing, or a
    /// confidence outside [0, 1].
    pub fn new(
        source_term: &str,
        source_locale: &str,
        translations: BTreeMap<String, String>,
        category: Category,
        provenance: Provenance,
        confidence: f64,
    ) -> Result<Self> {
        let mut normalized = BTreeMap::new();
        for (locale, value) in translations {
            let key = normalize_locale(&locale);
            if normalized.insert(key.clone(), value.trim().to_string()).is_some() {
                return Err(Error::validation(format!(
                    "Dictionary mapping '{}' has more than one translation for locale '{}'",
                    normalize_term(source_term),
                    key
                )));
            }
        }
        let translations = normalized;

        let mapping = Self {
            id: Uuid::new_v4(),
            source_term: normalize_term(source_term),
            source_locale: normalize_locale(source_locale),
            translations,
            category,
            provenance,
            confidence,
            validated_at: Utc::now(),
            validated_by: None,
            notes: None,
            usage_count: 0,
        };
        mapping.validate()?;
        Ok(mapping)
    }

    pub fn with_validated_by(mut self, validated_by: Option<String>) -> Self {
        self.validated_by = validated_by;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Check entity invariants
    pub fn validate(&self) -> Result<()> {
        if self.source_term.trim().is_empty() {
            return Err(Error::validation("Dictionary mapping requires a source term"));
        }
        if self.source_locale.trim().is_empty() {
            return Err(Error::validation(format!(
                "Dictionary mapping '{}' requires a source locale",
                self.source_term
            )));
        }
        if self.translations.is_empty() {
            return Err(Error::validation(format!(
                "Dictionary mapping '{}' requires at least one translation",
                self.source_term
            )));
        }
        if let Some((locale, _)) = self
            .translations
            .iter()
            .find(|(locale, value)| locale.trim().is_empty() || value.trim().is_empty())
        {
            return Err(Error::validation(format!(
                "Dictionary mapping '{}' has an empty translation for locale '{}'",
                self.source_term, locale
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::validation(format!(
                "Confidence must be within [0, 1], got {}",
                self.confidence
            )));
        }
        Ok(())
    }

    pub fn translation(&self, locale: &str) -> Option<&str> {
        self.translations
            .get(&normalize_locale(locale))
            .map(String::as_str)
    }

    /// Canonical value for `locale`, else the first translation in locale order
    pub fn canonical_for(&self, locale: &str) -> Option<&str> {
        self.translation(locale)
            .or_else(|| self.translations.values().next().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en(value: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("en".to_string(), value.to_string())])
    }

    #[test]
    fn test_new_normalizes_term_and_locale() {
        let mapping = DictionaryMapping::new(
            "  Laine Mérinos ",
            "FR",
            en("merino wool"),
            Category::Fiber,
            Provenance::Manual,
            0.9,
        )
        .unwrap();

        assert_eq!(mapping.source_term, "laine mérinos");
        assert_eq!(mapping.source_locale, "fr");
        assert_eq!(mapping.usage_count, 0);
        assert_eq!(mapping.translation("EN"), Some("merino wool"));
    }

    #[test]
    fn test_rejects_empty_term() {
        let result = DictionaryMapping::new("  ", "fr", en("x"), Category::Color, Provenance::Manual, 1.0);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_empty_translations() {
        let result = DictionaryMapping::new(
            "rouge",
            "fr",
            BTreeMap::new(),
            Category::Color,
            Provenance::Manual,
            1.0,
        );
        assert!(matches!(result, Err(Error::Validation(_))));

        let blank = DictionaryMapping::new("rouge", "fr", en("  "), Category::Color, Provenance::Manual, 1.0);
        assert!(matches!(blank, Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        for confidence in [-0.1, 1.01, f64::NAN] {
            let result =
                DictionaryMapping::new("rouge", "fr", en("red"), Category::Color, Provenance::Manual, confidence);
            assert!(matches!(result, Err(Error::Validation(_))), "accepted {}", confidence);
        }
    }

    #[test]
    fn test_canonical_falls_back_to_first_translation() {
        let translations = BTreeMap::from([
            ("de".to_string(), "Rot".to_string()),
            ("it".to_string(), "rosso".to_string()),
        ]);
        let mapping =
            DictionaryMapping::new("rouge", "fr", translations, Category::Color, Provenance::Manual, 1.0)
                .unwrap();

        assert_eq!(mapping.canonical_for("it"), Some("rosso"));
        assert_eq!(mapping.canonical_for("en"), Some("Rot"));
    }

    #[test]
    fn test_rejects_locales_colliding_after_normalization() {
        let translations = BTreeMap::from([
            ("EN".to_string(), "red".to_string()),
            ("en".to_string(), "crimson".to_string()),
        ]);
        let err =
            DictionaryMapping::new("rouge", "fr", translations, Category::Color, Provenance::Manual, 1.0)
                .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("'en'"));
    }
}
