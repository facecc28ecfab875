//! Configuration loading and database path resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the database location
pub const DATABASE_ENV_VAR: &str = "TAXO_DATABASE";

/// Default maximum LAB distance used when scoring color matches
pub const DEFAULT_COLOR_MAX_DISTANCE: f64 = 100.0;

/// TOML configuration file contents
///
/// Every field is optional in the file; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// SQLite database file
    pub database_path: Option<PathBuf>,
    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,
    /// Locale assumed for scraped terms
    pub source_locale: String,
    /// Locale of canonical values
    pub target_locale: String,
    /// Distance at which color match confidence reaches zero
    pub color_max_distance: f64,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".to_string(),
            source_locale: "fr".to_string(),
            target_locale: "en".to_string(),
            color_max_distance: DEFAULT_COLOR_MAX_DISTANCE,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the platform config file
    ///
    /// A missing or unreadable file is not fatal: defaults are used and a warning logged.
    pub fn load() -> Self {
        match config_file_path() {
            Ok(path) => match Self::load_from(&path) {
                Ok(config) => {
                    debug!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                debug!("No config file ({}), using defaults", e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.color_max_distance.is_finite() && self.color_max_distance > 0.0) {
            return Err(Error::Config(format!(
                "color_max_distance must be positive, got {}",
                self.color_max_distance
            )));
        }
        if self.source_locale.trim().is_empty() || self.target_locale.trim().is_empty() {
            return Err(Error::Config("locales must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Database path resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.database_path {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}

/// Get configuration file path for the platform
fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("taxo").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/taxo/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default database path
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("taxo"))
        .unwrap_or_else(|| PathBuf::from("./taxo_data"))
        .join("taxo.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.source_locale, "fr");
        assert_eq!(config.target_locale, "en");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.color_max_distance, DEFAULT_COLOR_MAX_DISTANCE);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfig::from_toml_str("log_level = \"debug\"\n").unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.target_locale, "en");
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_rejects_non_positive_distance() {
        let result = TomlConfig::from_toml_str("color_max_distance = 0.0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_argument_wins() {
        let config = TomlConfig {
            database_path: Some(PathBuf::from("/from/config.db")),
            ..TomlConfig::default()
        };
        let resolved = resolve_database_path(Some(Path::new("/from/cli.db")), &config);
        assert_eq!(resolved, PathBuf::from("/from/cli.db"));
    }

    #[test]
    fn test_default_path_ends_with_db_file() {
        assert!(default_database_path().ends_with("taxo.db"));
    }
}
