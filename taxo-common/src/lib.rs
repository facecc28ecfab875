//! # Taxo Common Library
//!
//! Shared code for the taxo attribute normalization crates:
//! - Error taxonomy (validation, not-found, invalid state, persistence)
//! - Configuration loading and database path resolution
//! - SQLite initialization and schema migrations
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
