//! DDL for a collection table.

use crate::identifier::validate_table_name;
use sema_core::{Error, Result};

/// Statements that create the pgvector extension, the collection table, and
/// its HNSW cosine index. All are idempotent.
pub fn create_statements(table: &str, dimension: usize) -> Result<Vec<String>> {
    validate_table_name(table)?;
    if dimension == 0 {
        return Err(Error::Config(
            "embedding dimension must be positive".to_string(),
        ));
    }

    Ok(vec![
        "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                embedding vector({dimension}) NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {table}_embedding_hnsw
                ON {table} USING hnsw (embedding vector_cosine_ops)"
        ),
    ])
}
