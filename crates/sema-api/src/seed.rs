//! JSONL seed data for the memory backend.
//!
//! One record per line: `{"id": "...", "embedding": [..], "metadata": {..}}`.
//! Blank lines are skipped; `metadata` is optional.

use std::path::Path;

use serde::Deserialize;

use sema_core::{Error, IndexedRecord, Metadata, Result};

#[derive(Deserialize)]
struct SeedRecord {
    id: String,
    embedding: Vec<f32>,
    #[serde(default)]
    metadata: Metadata,
}

/// Parse JSONL text into records. Errors name the offending line.
pub fn parse_jsonl(source: &str) -> Result<Vec<IndexedRecord>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            let record: SeedRecord = serde_json::from_str(line)
                .map_err(|e| Error::Serialization(format!("line {}: {}", n + 1, e)))?;
            Ok(IndexedRecord::new(record.id, record.embedding, record.metadata))
        })
        .collect()
}

/// Read and parse a JSONL seed file.
pub async fn load_jsonl(path: &Path) -> Result<Vec<IndexedRecord>> {
    let source = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Config(format!("cannot read seed file {}: {}", path.display(), e))
    })?;
    parse_jsonl(&source)
}
