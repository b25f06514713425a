//! pgvector-backed similarity index.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, info, instrument};

use sema_core::{
    check_dimension, defaults, rank_candidates, Error, IndexedRecord, Metadata, Result,
    SearchResult, SimilarityIndex,
};

use crate::identifier::validate_table_name;
use crate::pool::{create_pool, log_pool_metrics, PoolConfig};
use crate::schema::create_statements;

/// Connection settings for a [`PgVectorIndex`].
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub database_url: String,
    pub table: String,
    pub dimension: usize,
    pub pool: PoolConfig,
    /// Create the table and HNSW index at startup when missing.
    pub auto_migrate: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::DATABASE_URL.to_string(),
            table: defaults::INDEX_TABLE.to_string(),
            dimension: defaults::EMBED_DIMENSION,
            pool: PoolConfig::default(),
            auto_migrate: true,
        }
    }
}

impl IndexConfig {
    /// Read configuration from the environment.
    ///
    /// - `DATABASE_URL` (default: `postgres://localhost/sema`)
    /// - `SEMA_INDEX_TABLE` (default: `inbox_embeddings`)
    /// - `SEMA_EMBED_DIM` (default: 384)
    /// - `SEMA_AUTO_MIGRATE` (default: true)
    /// - everything read by [`PoolConfig::from_env`]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            table: std::env::var("SEMA_INDEX_TABLE").unwrap_or(defaults.table),
            dimension: std::env::var("SEMA_EMBED_DIM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.dimension),
            pool: PoolConfig::from_env(),
            auto_migrate: std::env::var("SEMA_AUTO_MIGRATE")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.auto_migrate),
        }
    }
}

/// Similarity index over one pgvector table.
///
/// Table layout: `(id TEXT PRIMARY KEY, embedding vector(N), metadata JSONB,
/// created_at TIMESTAMPTZ)`. Scores are cosine similarity,
/// `1 - (embedding <=> query)`.
#[derive(Clone)]
pub struct PgVectorIndex {
    pool: PgPool,
    table: String,
    dimension: usize,
}

impl PgVectorIndex {
    /// Wrap an existing pool. The table name is validated before it is ever
    /// interpolated into SQL.
    pub fn new(pool: PgPool, table: impl Into<String>, dimension: usize) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        if dimension == 0 {
            return Err(Error::Config(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            pool,
            table,
            dimension,
        })
    }

    /// Create a pool and wrap it, creating the collection schema first when
    /// `auto_migrate` is set.
    pub async fn connect(config: IndexConfig) -> Result<Self> {
        validate_table_name(&config.table)?;
        let pool = create_pool(&config.database_url, &config.table, &config.pool).await?;
        let index = Self::new(pool, config.table, config.dimension)?;
        if config.auto_migrate {
            index.ensure_schema().await?;
        }
        info!(
            subsystem = "database",
            component = "pgvector",
            db_table = %index.table,
            dimension = index.dimension,
            auto_migrate = config.auto_migrate,
            "Similarity index connected"
        );
        Ok(index)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the extension, table, and HNSW index if missing. Idempotent.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in create_statements(&self.table, self.dimension)? {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        info!(
            subsystem = "database",
            component = "pgvector",
            op = "ensure_schema",
            db_table = %self.table,
            dimension = self.dimension,
            "Collection schema ready"
        );
        Ok(())
    }

    /// Replace a record (delete + reinsert) in a single transaction.
    pub async fn upsert(&self, record: &IndexedRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        self.upsert_tx(&mut tx, record).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Replace a record within an existing transaction.
    pub async fn upsert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &IndexedRecord,
    ) -> Result<()> {
        check_dimension(self.dimension, record.dimension())?;

        sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(&record.id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, embedding, metadata, created_at) VALUES ($1, $2, $3, $4)",
            self.table
        ))
        .bind(&record.id)
        .bind(&record.embedding)
        .bind(Json(&record.metadata))
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Delete a record. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of records in the collection.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    fn similarity_sql(&self) -> String {
        // Ordering by raw distance lets the HNSW index serve the top-k. The
        // threshold is applied by rank_candidates in f32, same as MemoryIndex.
        format!(
            r#"
            SELECT id,
                   metadata,
                   1.0 - (embedding <=> $1::vector) AS score
            FROM {}
            ORDER BY embedding <=> $1::vector, id
            LIMIT $2
            "#,
            self.table
        )
    }
}

/// Scores are narrowed to f32 before thresholding, so a row scoring exactly
/// the threshold compares equal to it.
fn into_candidate(id: String, metadata: JsonValue, score: f64) -> SearchResult {
    SearchResult::new(id, into_metadata(metadata), score as f32)
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn into_metadata(value: JsonValue) -> Metadata {
    match value {
        JsonValue::Object(map) => map,
        JsonValue::Null => Metadata::new(),
        other => {
            let mut map = Metadata::new();
            map.insert("metadata".to_string(), other);
            map
        }
    }
}

#[async_trait]
impl SimilarityIndex for PgVectorIndex {
    #[instrument(skip(self, vector), fields(subsystem = "database", component = "pgvector", op = "query", db_table = %self.table))]
    async fn query(
        &self,
        vector: &Vector,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        check_dimension(self.dimension, vector.as_slice().len())?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        log_pool_metrics(&self.pool, &self.table);

        let rows = sqlx::query(&self.similarity_sql())
            .bind(vector)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let metadata: JsonValue = row.try_get("metadata")?;
            let score: f64 = row.try_get("score")?;
            candidates.push(into_candidate(id, metadata, score));
        }

        let candidate_count = candidates.len();
        let results = rank_candidates(candidates, min_score, limit);

        debug!(
            candidate_count,
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Similarity query complete"
        );
        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_metadata_object() {
        let meta = into_metadata(json!({"display_name": "Receipt"}));
        assert_eq!(meta["display_name"], "Receipt");
    }

    #[test]
    fn test_into_metadata_null_is_empty() {
        assert!(into_metadata(JsonValue::Null).is_empty());
    }

    #[test]
    fn test_into_metadata_scalar_is_wrapped() {
        let meta = into_metadata(json!("loose"));
        assert_eq!(meta["metadata"], "loose");
    }

    #[test]
    fn test_index_config_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.table, "inbox_embeddings");
        assert_eq!(config.dimension, 384);
        assert_eq!(config.pool.max_connections, 10);
        assert!(config.auto_migrate);
    }

    #[test]
    fn test_threshold_boundary_rows_are_kept() {
        // 0.8f32 widens to 0.800000011920929, above a database score of 0.8.
        let min_score = 0.8f32;
        assert!(0.8f64 < min_score as f64);

        let candidates = vec![
            into_candidate("at".to_string(), json!({}), 0.8),
            into_candidate("above".to_string(), json!({}), 0.95),
            into_candidate("below".to_string(), json!({}), 0.79),
        ];
        let ranked = rank_candidates(candidates, min_score, 10);
        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["above", "at"]);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(parse_flag(""));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" Off "));
        assert!(!parse_flag("0"));
    }

    #[tokio::test]
    async fn test_new_validates_table_and_dimension() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();

        assert!(PgVectorIndex::new(pool.clone(), "inbox_embeddings", 384).is_ok());
        assert!(matches!(
            PgVectorIndex::new(pool.clone(), "bad-name", 384),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PgVectorIndex::new(pool, "inbox_embeddings", 0),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_query_dimension_checked_before_database() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let index = PgVectorIndex::new(pool, "inbox_embeddings", 3).unwrap();

        let err = index
            .query(&Vector::from(vec![1.0, 0.0]), 10, 0.8)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_similarity_sql_shape() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let index = PgVectorIndex::new(pool, "inbox_embeddings", 3).unwrap();
        let sql = index.similarity_sql();
        assert!(sql.contains("1.0 - (embedding <=> $1::vector) AS score"));
        assert!(sql.contains("FROM inbox_embeddings"));
        assert!(sql.contains("LIMIT $2"));
        assert!(!sql.contains("WHERE"));
    }
}
