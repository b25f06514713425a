//! # sema-db
//!
//! PostgreSQL + pgvector similarity index for sema.
//!
//! This crate provides:
//! - Connection pool management
//! - [`PgVectorIndex`], a [`SimilarityIndex`] over one collection table
//! - Writer helpers for the ingestion pipeline (upsert, delete, count)
//! - Idempotent collection schema creation ([`PgVectorIndex::ensure_schema`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use sema_db::{IndexConfig, PgVectorIndex, SimilarityIndex};
//!
//! #[tokio::main]
//! async fn main() -> sema_db::Result<()> {
//!     let index = PgVectorIndex::connect(IndexConfig::from_env()).await?;
//!     let hits = index.query(&query_vector, 10, 0.8).await?;
//!     println!("{} matches", hits.len());
//!     Ok(())
//! }
//! ```

pub mod identifier;
pub mod index;
pub mod pool;
pub mod schema;

// Always compiled so integration tests in tests/ can use it.
pub mod test_fixtures;

// Re-export core types
pub use sema_core::*;

pub use identifier::validate_table_name;
pub use index::{IndexConfig, PgVectorIndex};
pub use pool::{create_pool, log_pool_metrics, PoolConfig};
