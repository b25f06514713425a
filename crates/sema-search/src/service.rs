//! The query pipeline: validate, embed, retrieve, shape.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::timeout;
use tracing::{debug, info, instrument, warn, Span};

use sema_core::{
    check_dimension, Embedder, Error, Result, SearchQuery, SearchResponse, SimilarityIndex,
};

use crate::config::SearchConfig;

/// Message returned when a query has no usable text.
pub const EMPTY_QUERY_MESSAGE: &str = "Please provide a search param!";

/// Answers free-text queries against one similarity index.
///
/// Stateless across requests; share it behind an `Arc`. Each stage is
/// terminal on failure and nothing is retried.
pub struct QueryService {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SimilarityIndex>,
    config: SearchConfig,
}

impl QueryService {
    /// Wire an embedder to an index.
    ///
    /// Fails with `Config` for an invalid config and `DimensionMismatch`
    /// when the embedder and index disagree on dimensionality.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SimilarityIndex>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        check_dimension(index.dimension(), embedder.dimension())?;

        info!(
            subsystem = "search",
            component = "query_service",
            model = embedder.model_name(),
            dimension = embedder.dimension(),
            min_score = config.min_score,
            default_limit = config.default_limit,
            max_limit = config.max_limit,
            "Query service ready"
        );

        Ok(Self {
            embedder,
            index,
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Check the embedder's health within the embedding stage budget.
    pub async fn embedder_reachable(&self) -> bool {
        match timeout(self.config.embed_timeout, self.embedder.health_check()).await {
            Ok(Ok(healthy)) => healthy,
            Ok(Err(e)) => {
                warn!(error = %e, "Embedder health check failed");
                false
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.embed_timeout.as_millis() as u64,
                    "Embedder health check timed out"
                );
                false
            }
        }
    }

    /// Run one query through the pipeline.
    #[instrument(
        skip(self, query),
        fields(
            subsystem = "search",
            component = "query_service",
            op = "search",
            limit = tracing::field::Empty,
            result_count = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    )]
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResponse> {
        let start = Instant::now();

        // Validate
        if query.text.trim().is_empty() {
            return Err(Error::InvalidQuery(EMPTY_QUERY_MESSAGE.to_string()));
        }
        let limit = self.config.resolve_limit(query.limit)?;
        Span::current().record("limit", limit);
        debug!(query = %query.text, "Embedding query");

        // Embed
        let vector = match timeout(self.config.embed_timeout, self.embedder.embed(&query.text)).await
        {
            Ok(Ok(vector)) => vector,
            Ok(Err(e)) => {
                let e = embed_failure(e);
                warn!(error_kind = e.kind(), error = %e, "Embedding stage failed");
                return Err(e);
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.embed_timeout.as_millis() as u64,
                    "Embedding stage timed out"
                );
                return Err(Error::EmbeddingUnavailable(format!(
                    "embedding timed out after {:?}",
                    self.config.embed_timeout
                )));
            }
        };
        check_dimension(self.index.dimension(), vector.as_slice().len())?;

        // Retrieve
        let results = match timeout(
            self.config.index_timeout,
            self.index.query(&vector, limit, self.config.min_score),
        )
        .await
        {
            Ok(Ok(results)) => results,
            Ok(Err(e)) => {
                let e = index_failure(e);
                warn!(error_kind = e.kind(), error = %e, "Retrieval stage failed");
                return Err(e);
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.index_timeout.as_millis() as u64,
                    "Retrieval stage timed out"
                );
                return Err(Error::IndexUnavailable(format!(
                    "index query timed out after {:?}",
                    self.config.index_timeout
                )));
            }
        };

        // Shape
        let elapsed = start.elapsed().as_millis() as u64;
        Span::current().record("result_count", results.len());
        Span::current().record("duration_ms", elapsed);
        debug!("Search complete");

        Ok(SearchResponse {
            search: query.text,
            result: results,
        })
    }
}

/// Anything an embedder reports other than a dimension problem is an
/// embedding outage.
fn embed_failure(e: Error) -> Error {
    match e {
        Error::EmbeddingUnavailable(_) | Error::DimensionMismatch { .. } => e,
        other => Error::EmbeddingUnavailable(other.to_string()),
    }
}

fn index_failure(e: Error) -> Error {
    match e {
        Error::IndexUnavailable(_) | Error::DimensionMismatch { .. } => e,
        other => Error::IndexUnavailable(other.to_string()),
    }
}
