//! Assembling the query service from configuration.

use std::sync::Arc;

use tracing::info;

use sema_core::{Embedder, Result, SimilarityIndex};
use sema_db::PgVectorIndex;
use sema_inference::{OllamaEmbedder, OpenAIEmbedder};
use sema_search::{MemoryIndex, QueryService};

use crate::config::{AppConfig, EmbedProvider, IndexBackend};
use crate::seed::load_jsonl;

/// Build the configured embedder.
pub fn build_embedder(provider: &EmbedProvider) -> Result<Arc<dyn Embedder>> {
    Ok(match provider {
        EmbedProvider::Ollama(config) => Arc::new(OllamaEmbedder::new(config.clone())?),
        EmbedProvider::OpenAI(config) => Arc::new(OpenAIEmbedder::new(config.clone())?),
    })
}

/// Build the configured index, connecting or loading seed data as needed.
pub async fn build_index(backend: &IndexBackend) -> Result<Arc<dyn SimilarityIndex>> {
    match backend {
        IndexBackend::Postgres(config) => {
            // Creates the collection table first unless SEMA_AUTO_MIGRATE=false.
            let index = PgVectorIndex::connect(config.clone()).await?;
            Ok(Arc::new(index))
        }
        IndexBackend::Memory { dimension, seed } => {
            let index = MemoryIndex::new(*dimension)?;
            if let Some(path) = seed {
                let records = load_jsonl(path).await?;
                index.replace_all(records)?;
                info!(
                    subsystem = "api",
                    component = "memory_index",
                    records = index.len(),
                    seed = %path.display(),
                    "Memory index seeded"
                );
            }
            Ok(Arc::new(index))
        }
    }
}

/// Wire embedder, index, and search policy into a [`QueryService`].
pub async fn build_service(config: &AppConfig) -> Result<QueryService> {
    let embedder = build_embedder(&config.embedder)?;
    let index = build_index(&config.index).await?;
    QueryService::new(embedder, index, config.search.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_core::{Error, Vector};
    use std::io::Write;

    #[tokio::test]
    async fn test_memory_backend_without_seed_is_empty() {
        let index = build_index(&IndexBackend::Memory {
            dimension: 2,
            seed: None,
        })
        .await
        .unwrap();
        assert_eq!(index.dimension(), 2);
        let hits = index.query(&Vector::from(vec![1.0, 0.0]), 10, 0.0).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_memory_backend_loads_seed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "a", "embedding": [1.0, 0.0], "metadata": {{"n": 1}}}}"#).unwrap();
        writeln!(file, r#"{{"id": "b", "embedding": [0.0, 1.0]}}"#).unwrap();

        let index = build_index(&IndexBackend::Memory {
            dimension: 2,
            seed: Some(file.path().to_path_buf()),
        })
        .await
        .unwrap();

        let hits = index.query(&Vector::from(vec![1.0, 0.0]), 10, 0.8).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].metadata["n"], 1);
    }

    #[tokio::test]
    async fn test_seed_with_wrong_dimension_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "a", "embedding": [1.0, 0.0, 0.0]}}"#).unwrap();

        let result = build_index(&IndexBackend::Memory {
            dimension: 2,
            seed: Some(file.path().to_path_buf()),
        })
        .await;
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_build_embedder_reports_model() {
        let embedder = build_embedder(&EmbedProvider::Ollama(
            sema_inference::OllamaConfig::default().with_model("nomic-embed-text", 768),
        ))
        .unwrap();
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.dimension(), 768);
    }

    #[tokio::test]
    #[ignore]
    async fn test_postgres_backend_creates_missing_collection() {
        let _ = dotenvy::dotenv();
        let table = format!("test_app_{}", uuid::Uuid::new_v4().simple());
        let config = sema_db::IndexConfig {
            database_url: sema_db::test_fixtures::test_database_url(),
            table: table.clone(),
            dimension: 2,
            ..Default::default()
        };

        let index = build_index(&IndexBackend::Postgres(config.clone()))
            .await
            .expect("fresh table should be created on startup");
        let hits = index.query(&Vector::from(vec![1.0, 0.0]), 10, 0.8).await.unwrap();
        assert!(hits.is_empty());

        // Second startup against the existing table is a no-op.
        build_index(&IndexBackend::Postgres(config.clone())).await.unwrap();

        let pool = sqlx::PgPool::connect(&config.database_url).await.unwrap();
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_postgres_backend_without_auto_migrate_reports_missing_table() {
        let _ = dotenvy::dotenv();
        let config = sema_db::IndexConfig {
            database_url: sema_db::test_fixtures::test_database_url(),
            table: format!("test_app_{}", uuid::Uuid::new_v4().simple()),
            dimension: 2,
            auto_migrate: false,
            ..Default::default()
        };

        let index = build_index(&IndexBackend::Postgres(config)).await.unwrap();
        let err = index
            .query(&Vector::from(vec![1.0, 0.0]), 10, 0.8)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IndexUnavailable(_)));
    }
}
