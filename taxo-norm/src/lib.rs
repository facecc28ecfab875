//! taxo-norm library interface
//!
//! Resolves scraped, source-locale textile attributes (fiber, color, pattern,
//! weave) to a canonical taxonomy, queues unknown terms for human review, and
//! matches color swatches against a canonical palette.

pub mod color;
pub mod db;
pub mod models;
pub mod services;

pub use taxo_common::{Error, Result};

pub use color::{ColorMatch, ColorMatcher, Lab, Rgb};
pub use models::{
    Category, DictionaryMapping, Provenance, TermContext, UnknownFilter, UnknownStatus,
    UnknownTerm,
};
pub use services::{Approval, IngestOutcome, Ingestor, Lookup, NormalizationService, ReviewWorkflow};
