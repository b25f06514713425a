//! # sema-search
//!
//! Query pipeline for sema.
//!
//! This crate provides:
//! - [`QueryService`]: validate, embed, retrieve, shape
//! - [`SearchConfig`]: threshold, limits, and stage timeouts
//! - [`MemoryIndex`]: exact in-memory cosine index
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sema_search::{MemoryIndex, QueryService, SearchConfig, SearchQuery};
//!
//! let index = Arc::new(MemoryIndex::with_records(384, records)?);
//! let service = QueryService::new(embedder, index, SearchConfig::default())?;
//!
//! let response = service.search(SearchQuery::new("acme invoice").with_limit(5)).await?;
//! for hit in response.result {
//!     println!("{} {:.3}", hit.id, hit.similarity);
//! }
//! ```

pub mod config;
pub mod memory;
pub mod service;

// Re-export core types
pub use sema_core::*;

pub use config::SearchConfig;
pub use memory::MemoryIndex;
pub use service::{QueryService, EMPTY_QUERY_MESSAGE};
