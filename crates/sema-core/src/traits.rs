//! Core traits for sema abstractions.
//!
//! These traits define the seams between the query service and its two
//! collaborators, so either the embedding model or the index technology can
//! be swapped without touching request handling.

use async_trait::async_trait;
use pgvector::Vector;

use crate::error::Result;
use crate::models::SearchResult;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Maps text to a fixed-length, mean-pooled, unit-normalized vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one piece of non-empty text.
    ///
    /// Fails with `EmbeddingUnavailable` if the model call fails or times out.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Dimensionality of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Model identifier, for logs and health output.
    fn model_name(&self) -> &str;

    /// Whether the model server is answering. Backends without a cheap
    /// liveness endpoint report healthy.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

// =============================================================================
// SIMILARITY INDEX
// =============================================================================

/// Read-only nearest-neighbor lookup by cosine similarity.
///
/// Implementations must return only records scoring `>= min_score`, sorted
/// by descending score with ties broken by ascending id, and at most `limit`
/// of them. An empty result is not an error.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Query the index with a vector of [`SimilarityIndex::dimension`] length.
    async fn query(
        &self,
        vector: &Vector,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Dimensionality the index was configured with.
    fn dimension(&self) -> usize;
}
