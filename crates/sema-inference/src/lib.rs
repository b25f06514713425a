//! # sema-inference
//!
//! Embedding backends for sema.
//!
//! This crate provides:
//! - Ollama implementation (default)
//! - OpenAI-compatible implementation (optional, feature `openai`)
//! - Deterministic mock embedder (feature `mock`, always on in tests)
//!
//! Every backend returns mean-pooled, unit-normalized vectors of its
//! configured dimensionality.
//!
//! # Feature Flags
//!
//! - `ollama` (default): Enable Ollama backend
//! - `openai`: Enable OpenAI-compatible backend
//! - `mock`: Expose [`mock::MockEmbedder`] to other crates' tests
//!
//! # Example
//!
//! ```rust,no_run
//! use sema_inference::OllamaEmbedder;
//! use sema_core::Embedder;
//!
//! #[tokio::main]
//! async fn main() -> sema_core::Result<()> {
//!     let embedder = OllamaEmbedder::from_env()?;
//!     let vector = embedder.embed("unpaid invoices from acme").await?;
//!     assert_eq!(vector.as_slice().len(), embedder.dimension());
//!     Ok(())
//! }
//! ```

pub mod pooling;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use sema_core::*;

pub use pooling::RawEmbedding;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaEmbedder};

#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIEmbedder};
