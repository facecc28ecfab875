//! Unknown term database operations

use crate::db::UnknownTermRepository;
use crate::models::{
    append_context, normalize_term, Category, TermContext, UnknownFilter, UnknownStatus,
    UnknownTerm,
};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use taxo_common::{time, Error, Result};
use tracing::{debug, info};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, term, category, occurrences, contexts, status, source_platform,
           llm_suggestion, llm_confidence, human_mapping, reviewed_by, reviewed_at,
           review_notes, first_seen_at, last_seen_at
    FROM unknown_terms
"#;

/// SQLite-backed review queue
#[derive(Clone)]
pub struct SqliteUnknownTermRepository {
    pool: SqlitePool,
}

impl SqliteUnknownTermRepository {
    /// Create new repository with database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| Error::validation(format!("Bad unknown term id '{}': {}", id, e)))
}

fn row_to_unknown(row: &SqliteRow) -> Result<UnknownTerm> {
    let id: String = row.get("id");
    let category: String = row.get("category");
    let status: String = row.get("status");
    let contexts: String = row.get("contexts");
    let occurrences: i64 = row.get("occurrences");
    let reviewed_at: Option<String> = row.get("reviewed_at");
    let first_seen_at: String = row.get("first_seen_at");
    let last_seen_at: String = row.get("last_seen_at");

    Ok(UnknownTerm {
        id: parse_id(&id)?,
        term: row.get("term"),
        category: category.parse()?,
        occurrences: occurrences.max(0) as u64,
        contexts: serde_json::from_str(&contexts)?,
        status: status.parse()?,
        source_platform: row.get("source_platform"),
        llm_suggestion: row.get("llm_suggestion"),
        llm_confidence: row.get("llm_confidence"),
        human_mapping: row.get("human_mapping"),
        reviewed_by: row.get("reviewed_by"),
        reviewed_at: reviewed_at.as_deref().map(time::from_db).transpose()?,
        review_notes: row.get("review_notes"),
        first_seen_at: time::from_db(&first_seen_at)?,
        last_seen_at: time::from_db(&last_seen_at)?,
    })
}

#[async_trait]
impl UnknownTermRepository for SqliteUnknownTermRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<UnknownTerm>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_unknown).transpose()
    }

    async fn find_all(&self, filter: &UnknownFilter) -> Result<Vec<UnknownTerm>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COLUMNS);
        query.push(" WHERE occurrences >= ");
        query.push_bind(filter.min_occurrences.min(i64::MAX as u64) as i64);

        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status.as_str());
        }
        if let Some(category) = filter.category {
            query.push(" AND category = ");
            query.push_bind(category.as_str());
        }

        query.push(" ORDER BY occurrences DESC, term ASC");

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ");
            query.push_bind(limit.min(i64::MAX as usize) as i64);
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_unknown).collect()
    }

    async fn update(&self, unknown: &UnknownTerm) -> Result<()> {
        unknown.validate()?;

        let contexts = serde_json::to_string(&unknown.contexts)?;

        let result = sqlx::query(
            r#"
            UPDATE unknown_terms SET
                term = ?, category = ?, occurrences = ?, contexts = ?, status = ?,
                source_platform = ?, llm_suggestion = ?, llm_confidence = ?,
                human_mapping = ?, reviewed_by = ?, reviewed_at = ?, review_notes = ?,
                first_seen_at = ?, last_seen_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&unknown.term)
        .bind(unknown.category.as_str())
        .bind(unknown.occurrences.min(i64::MAX as u64) as i64)
        .bind(&contexts)
        .bind(unknown.status.as_str())
        .bind(&unknown.source_platform)
        .bind(&unknown.llm_suggestion)
        .bind(unknown.llm_confidence)
        .bind(&unknown.human_mapping)
        .bind(&unknown.reviewed_by)
        .bind(unknown.reviewed_at.as_ref().map(time::to_db))
        .bind(&unknown.review_notes)
        .bind(time::to_db(&unknown.first_seen_at))
        .bind(time::to_db(&unknown.last_seen_at))
        .bind(unknown.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Unknown term {}", unknown.id)));
        }

        debug!(id = %unknown.id, status = %unknown.status, "Updated unknown term");
        Ok(())
    }

    async fn log_or_increment(
        &self,
        term: &str,
        category: Category,
        context: Option<TermContext>,
        source_platform: Option<&str>,
    ) -> Result<Uuid> {
        let term = normalize_term(term);
        if term.is_empty() {
            return Err(Error::validation("Cannot log an empty unknown term"));
        }
        let now = time::to_db(&time::now());

        let mut tx = self.pool.begin().await?;

        // The write comes first so the transaction holds the write lock for the context append
        sqlx::query(
            r#"
            INSERT INTO unknown_terms (
                id, term, category, occurrences, contexts, status, source_platform,
                first_seen_at, last_seen_at
            ) VALUES (?, ?, ?, 1, '[]', 'pending', ?, ?, ?)
            ON CONFLICT(term, category) DO UPDATE SET
                occurrences = occurrences + 1,
                last_seen_at = excluded.last_seen_at,
                source_platform = COALESCE(unknown_terms.source_platform, excluded.source_platform)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&term)
        .bind(category.as_str())
        .bind(source_platform)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            "SELECT id, contexts, occurrences FROM unknown_terms WHERE term = ? AND category = ?",
        )
        .bind(&term)
        .bind(category.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let id: String = row.get("id");
        let occurrences: i64 = row.get("occurrences");

        if let Some(context) = context {
            let stored: String = row.get("contexts");
            let mut contexts: Vec<TermContext> = serde_json::from_str(&stored)?;
            if append_context(&mut contexts, context) {
                sqlx::query("UPDATE unknown_terms SET contexts = ? WHERE id = ?")
                    .bind(serde_json::to_string(&contexts)?)
                    .bind(&id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        if occurrences == 1 {
            info!("Queued unknown {} term '{}' for review", category, term);
        } else {
            debug!(term = %term, category = %category, occurrences, "Unknown term seen again");
        }

        parse_id(&id)
    }

    async fn count_by_status(&self) -> Result<Vec<(UnknownStatus, u64)>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM unknown_terms GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut counts: Vec<(UnknownStatus, u64)> =
            UnknownStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for row in rows {
            let status: String = row.get("status");
            let n: i64 = row.get("n");
            let status: UnknownStatus = status.parse()?;
            if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == status) {
                entry.1 = n.max(0) as u64;
            }
        }
        Ok(counts)
    }
}
