//! Services layer
//!
//! Use cases built on the repository traits: cached term resolution,
//! ingestion, the review workflow and dictionary seeding.

pub mod ingest;
pub mod normalization;
pub mod review;
pub mod seed;

pub use ingest::{IngestOutcome, Ingestor};
pub use normalization::{Lookup, NormalizationService};
pub use review::{Approval, ReviewStats, ReviewWorkflow, DEFAULT_SOURCE_LOCALE, DEFAULT_TARGET_LOCALE};
pub use seed::{import_seed, load_seed_file, parse_seed};
