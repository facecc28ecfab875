//! Domain models for term normalization

pub mod category;
pub mod dictionary_mapping;
pub mod unknown_term;

pub use category::{Category, Provenance};
pub use dictionary_mapping::DictionaryMapping;
pub use unknown_term::{append_context, TermContext, UnknownFilter, UnknownStatus, UnknownTerm, MAX_CONTEXTS};

/// Lookup key form of a raw term: trimmed, lowercased
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Locale tags are compared case-insensitively ("FR" == "fr")
pub fn normalize_locale(locale: &str) -> String {
    locale.trim().to_lowercase()
}
