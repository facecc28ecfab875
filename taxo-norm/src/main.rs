//! taxo-norm - Textile attribute normalization admin CLI
//!
//! Resolves scraped terms against the dictionary, manages the unknown-term
//! review queue, seeds mappings and matches color swatches. Output is JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use taxo_common::config::{resolve_database_path, TomlConfig};
use taxo_norm::color::{get_color_by_name, is_valid_hex, palette, ColorMatcher};
use taxo_norm::db::{
    DictionaryRepository, SqliteDictionaryRepository, SqliteUnknownTermRepository,
    UnknownTermRepository,
};
use taxo_norm::services::{import_seed, load_seed_file};
use taxo_norm::{
    Approval, Category, Ingestor, Lookup, NormalizationService, ReviewWorkflow, TermContext,
    UnknownFilter, UnknownStatus,
};

/// Command-line arguments for taxo-norm
#[derive(Parser, Debug)]
#[command(name = "taxo-norm")]
#[command(about = "Textile attribute normalization and review queue")]
#[command(version)]
struct Args {
    /// SQLite database file (overrides TAXO_DATABASE and the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Config file (default: platform config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a term without logging misses
    Lookup {
        term: String,
        #[arg(short = 't', long)]
        category: Category,
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Resolve a term, queueing it for review on a miss
    Log {
        term: String,
        #[arg(short = 't', long)]
        category: Category,
        #[arg(short, long)]
        locale: Option<String>,
        /// Product title, or a JSON object with text/product_id/image_url/product_url
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        platform: Option<String>,
    },
    /// List the review queue
    Unknowns {
        /// pending, reviewing, approved, rejected or skipped
        #[arg(short, long, default_value = "pending")]
        status: UnknownStatus,
        /// List every status
        #[arg(long, conflicts_with = "status")]
        all: bool,
        #[arg(short = 't', long)]
        category: Option<Category>,
        #[arg(long, default_value_t = 1)]
        min_occurrences: u64,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Approve an unknown term with its canonical value
    Approve {
        id: Uuid,
        value: String,
        #[arg(long)]
        by: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        source_locale: Option<String>,
        #[arg(long)]
        target_locale: Option<String>,
    },
    /// Reject an unknown term
    Reject {
        id: Uuid,
        #[arg(long)]
        by: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Set an unknown term aside
    Skip {
        id: Uuid,
        #[arg(long)]
        by: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark an unknown term as under review
    Review {
        id: Uuid,
        #[arg(long)]
        by: Option<String>,
    },
    /// Review queue counts per status
    Stats,
    /// Import dictionary mappings from a TOML file
    Seed {
        file: PathBuf,
        /// Source locale for entries that don't declare one
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// List dictionary mappings
    Mappings {
        #[arg(short = 't', long)]
        category: Option<Category>,
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Rank palette colors by distance to a hex swatch
    MatchColor {
        hex: String,
        /// Restrict to these palette names
        #[arg(long, value_delimiter = ',')]
        candidates: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the canonical palette
    Palette,
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TomlConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::load(),
    };

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("taxo_norm={0},taxo_common={0}", config.log_level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Color commands need no database
    match &args.command {
        Command::MatchColor {
            hex,
            candidates,
            limit,
        } => return match_color(&config, hex, candidates, *limit),
        Command::Palette => return print_json(&palette()),
        _ => {}
    }

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    debug!("Database: {}", db_path.display());

    let pool = taxo_common::db::init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let dictionary: Arc<dyn DictionaryRepository> =
        Arc::new(SqliteDictionaryRepository::new(pool.clone()));
    let unknowns: Arc<dyn UnknownTermRepository> =
        Arc::new(SqliteUnknownTermRepository::new(pool));
    let normalizer = Arc::new(NormalizationService::new(
        Arc::clone(&dictionary),
        &config.target_locale,
    ));
    let workflow = ReviewWorkflow::new(
        Arc::clone(&dictionary),
        Arc::clone(&unknowns),
        Arc::clone(&normalizer),
    );

    match args.command {
        Command::Lookup {
            term,
            category,
            locale,
        } => {
            let locale = locale.unwrap_or_else(|| config.source_locale.clone());
            let result = normalizer.lookup(&term, &locale, category).await?;
            let output = match result {
                Lookup::Resolved {
                    canonical,
                    mapping_id,
                    confidence,
                } => json!({
                    "term": term,
                    "status": "resolved",
                    "canonical": canonical,
                    "mapping_id": mapping_id,
                    "confidence": confidence,
                }),
                Lookup::Unknown => json!({ "term": term, "status": "unknown" }),
            };
            print_json(&output)?;
        }
        Command::Log {
            term,
            category,
            locale,
            context,
            platform,
        } => {
            let locale = locale.unwrap_or_else(|| config.source_locale.clone());
            let ingestor = Ingestor::new(Arc::clone(&normalizer), Arc::clone(&unknowns));
            let outcome = ingestor
                .normalize_or_log(
                    &term,
                    &locale,
                    category,
                    context.as_deref().map(TermContext::parse),
                    platform.as_deref(),
                )
                .await?;
            print_json(&outcome)?;
        }
        Command::Unknowns {
            status,
            all,
            category,
            min_occurrences,
            limit,
        } => {
            let filter = UnknownFilter {
                status: if all { None } else { Some(status) },
                category,
                min_occurrences,
                limit,
            };
            print_json(&workflow.get_unknowns(&filter).await?)?;
        }
        Command::Approve {
            id,
            value,
            by,
            notes,
            source_locale,
            target_locale,
        } => {
            let approval = Approval::new(value)
                .validated_by(by)
                .notes(notes)
                .locales(
                    source_locale.as_deref().unwrap_or(&config.source_locale),
                    target_locale.as_deref().unwrap_or(&config.target_locale),
                );
            print_json(&workflow.approve_mapping(id, approval).await?)?;
        }
        Command::Reject { id, by, notes } => {
            print_json(&workflow.reject_unknown(id, by, notes).await?)?;
        }
        Command::Skip { id, by, notes } => {
            print_json(&workflow.skip_unknown(id, by, notes).await?)?;
        }
        Command::Review { id, by } => {
            print_json(&workflow.start_review(id, by).await?)?;
        }
        Command::Stats => {
            let stats = workflow.review_stats().await?;
            let counts: serde_json::Map<String, serde_json::Value> = stats
                .by_status
                .iter()
                .map(|(status, n)| (status.to_string(), json!(n)))
                .collect();
            print_json(&counts)?;
        }
        Command::Seed { file, locale } => {
            let locale = locale.unwrap_or_else(|| config.source_locale.clone());
            let mappings = load_seed_file(&file, &locale)
                .with_context(|| format!("Failed to read seed file {}", file.display()))?;
            let imported = import_seed(dictionary.as_ref(), &mappings).await?;
            info!("Seeded {} mappings from {}", imported, file.display());
            print_json(&json!({ "imported": imported }))?;
        }
        Command::Mappings { category, locale } => {
            let mappings = match category {
                Some(category) => dictionary.get_by_category(category, locale.as_deref()).await?,
                None => {
                    let mut all = dictionary.get_all().await?;
                    if let Some(locale) = locale {
                        let locale = locale.trim().to_lowercase();
                        all.retain(|m| m.source_locale == locale);
                    }
                    all
                }
            };
            print_json(&mappings)?;
        }
        Command::MatchColor { .. } | Command::Palette => {}
    }

    Ok(())
}

fn match_color(
    config: &TomlConfig,
    hex: &str,
    candidates: &[String],
    limit: Option<usize>,
) -> Result<()> {
    if !is_valid_hex(hex) {
        anyhow::bail!("Invalid hex color '{}'", hex);
    }
    for name in candidates {
        if get_color_by_name(name).is_none() {
            anyhow::bail!("'{}' is not a palette color", name);
        }
    }

    let matcher = ColorMatcher::new(config.color_max_distance);
    let names: Vec<&str> = candidates.iter().map(String::as_str).collect();
    let filter = if names.is_empty() { None } else { Some(names.as_slice()) };

    let mut matches = matcher.find_matching_colors(hex, filter)?;
    if let Some(limit) = limit {
        matches.truncate(limit);
    }
    print_json(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_unknowns_defaults_to_pending() {
        let args = Args::try_parse_from(["taxo-norm", "unknowns"]).unwrap();
        match args.command {
            Command::Unknowns {
                status,
                all,
                min_occurrences,
                ..
            } => {
                assert_eq!(status, UnknownStatus::Pending);
                assert!(!all);
                assert_eq!(min_occurrences, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknowns_all_conflicts_with_status() {
        let args = Args::try_parse_from(["taxo-norm", "unknowns", "--all", "-t", "weave"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Unknowns {
                all: true,
                category: Some(Category::Weave),
                ..
            }
        ));

        let err = Args::try_parse_from(["taxo-norm", "unknowns", "--all", "--status", "approved"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_match_color_splits_candidates() {
        let args = Args::try_parse_from([
            "taxo-norm",
            "match-color",
            "#2b3a67",
            "--candidates",
            "navy,blue",
            "--limit",
            "1",
        ])
        .unwrap();
        match args.command {
            Command::MatchColor {
                hex,
                candidates,
                limit,
            } => {
                assert_eq!(hex, "#2b3a67");
                assert_eq!(candidates, vec!["navy".to_string(), "blue".to_string()]);
                assert_eq!(limit, Some(1));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_approve_with_global_database() {
        let id = Uuid::new_v4();
        let id_arg = id.to_string();
        let args = Args::try_parse_from([
            "taxo-norm",
            "approve",
            id_arg.as_str(),
            "sky blue",
            "--by",
            "alice",
            "--database",
            "/tmp/taxo.db",
        ])
        .unwrap();

        assert_eq!(args.database, Some(PathBuf::from("/tmp/taxo.db")));
        match args.command {
            Command::Approve { id: parsed, value, by, .. } => {
                assert_eq!(parsed, id);
                assert_eq!(value, "sky blue");
                assert_eq!(by.as_deref(), Some("alice"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(Args::try_parse_from(["taxo-norm", "lookup", "rouge", "-t", "size"]).is_err());
        assert!(Args::try_parse_from(["taxo-norm", "reject", "not-a-uuid"]).is_err());
        assert!(Args::try_parse_from(["taxo-norm", "unknowns", "--status", "archived"]).is_err());
    }
}
