//! Dictionary mapping database operations

use crate::db::DictionaryRepository;
use crate::models::{normalize_locale, normalize_term, Category, DictionaryMapping};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use taxo_common::{time, Error, Result};
use tracing::{debug, info};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, source_term, source_locale, translations, category, provenance,
           confidence, validated_at, validated_by, notes, usage_count
    FROM dictionary_mappings
"#;

/// SQLite-backed dictionary
#[derive(Clone)]
pub struct SqliteDictionaryRepository {
    pool: SqlitePool,
}

impl SqliteDictionaryRepository {
    /// Create new repository with database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_mapping(row: &SqliteRow) -> Result<DictionaryMapping> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::validation(format!("Bad mapping id '{}': {}", id, e)))?;

    let translations: String = row.get("translations");
    let translations: BTreeMap<String, String> = serde_json::from_str(&translations)?;

    let category: String = row.get("category");
    let provenance: String = row.get("provenance");
    let validated_at: String = row.get("validated_at");
    let usage_count: i64 = row.get("usage_count");

    Ok(DictionaryMapping {
        id,
        source_term: row.get("source_term"),
        source_locale: row.get("source_locale"),
        translations,
        category: category.parse()?,
        provenance: provenance.parse()?,
        confidence: row.get("confidence"),
        validated_at: time::from_db(&validated_at)?,
        validated_by: row.get("validated_by"),
        notes: row.get("notes"),
        usage_count: usage_count.max(0) as u64,
    })
}

#[async_trait]
impl DictionaryRepository for SqliteDictionaryRepository {
    async fn get_by_category(
        &self,
        category: Category,
        locale: Option<&str>,
    ) -> Result<Vec<DictionaryMapping>> {
        let rows = match locale {
            Some(locale) => {
                let sql = format!(
                    "{} WHERE category = ? AND source_locale = ? ORDER BY source_term",
                    SELECT_COLUMNS
                );
                sqlx::query(&sql)
                    .bind(category.as_str())
                    .bind(normalize_locale(locale))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} WHERE category = ? ORDER BY source_term", SELECT_COLUMNS);
                sqlx::query(&sql)
                    .bind(category.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        debug!(
            category = %category,
            locale = ?locale,
            count = rows.len(),
            "Loaded dictionary mappings"
        );

        rows.iter().map(row_to_mapping).collect()
    }

    async fn get_all(&self) -> Result<Vec<DictionaryMapping>> {
        let sql = format!("{} ORDER BY category, source_locale, source_term", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_mapping).collect()
    }

    async fn find_by_term(
        &self,
        term: &str,
        locale: &str,
        category: Category,
    ) -> Result<Option<DictionaryMapping>> {
        let sql = format!(
            "{} WHERE source_term = ? AND source_locale = ? AND category = ?",
            SELECT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(normalize_term(term))
            .bind(normalize_locale(locale))
            .bind(category.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_mapping).transpose()
    }

    async fn save(&self, mapping: &DictionaryMapping) -> Result<DictionaryMapping> {
        mapping.validate()?;

        // Prepare all data BEFORE touching the database
        let source_term = normalize_term(&mapping.source_term);
        let source_locale = normalize_locale(&mapping.source_locale);
        let translations = serde_json::to_string(&mapping.translations)?;

        sqlx::query(
            r#"
            INSERT INTO dictionary_mappings (
                id, source_term, source_locale, translations, category, provenance,
                confidence, validated_at, validated_by, notes, usage_count,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(source_term, source_locale, category) DO UPDATE SET
                translations = excluded.translations,
                provenance = excluded.provenance,
                confidence = excluded.confidence,
                validated_at = excluded.validated_at,
                validated_by = excluded.validated_by,
                notes = excluded.notes,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(mapping.id.to_string())
        .bind(&source_term)
        .bind(&source_locale)
        .bind(&translations)
        .bind(mapping.category.as_str())
        .bind(mapping.provenance.as_str())
        .bind(mapping.confidence)
        .bind(time::to_db(&mapping.validated_at))
        .bind(&mapping.validated_by)
        .bind(&mapping.notes)
        .bind(mapping.usage_count as i64)
        .execute(&self.pool)
        .await?;

        let stored = self
            .find_by_term(&source_term, &source_locale, mapping.category)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Mapping '{}' ({}, {}) vanished after save",
                    source_term, source_locale, mapping.category
                ))
            })?;

        info!(
            "Saved dictionary mapping {} ('{}' [{}] {})",
            stored.id, stored.source_term, stored.source_locale, stored.category
        );

        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM dictionary_mappings WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Dictionary mapping {}", id)));
        }

        info!("Deleted dictionary mapping {}", id);
        Ok(())
    }

    async fn increment_usage(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE dictionary_mappings SET usage_count = usage_count + 1 WHERE id = ?",
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Dictionary mapping {}", id)));
        }

        Ok(())
    }
}
