//! Ollama embedding backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use sema_core::{defaults, Embedder, Error, Result, Vector};

use crate::pooling::RawEmbedding;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = defaults::EMBED_MODEL;

/// Default embedding dimension for gte-small.
pub const DEFAULT_DIMENSION: usize = defaults::EMBED_DIMENSION;

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = defaults::EMBED_TIMEOUT_SECS;

/// Configuration for the Ollama backend.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Embedding model to request.
    pub model: String,
    /// Expected embedding dimension.
    pub dimension: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_EMBED_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
            timeout: Duration::from_secs(EMBED_TIMEOUT_SECS),
        }
    }
}

impl OllamaConfig {
    /// Read configuration from the environment.
    ///
    /// - `OLLAMA_BASE` (default: `http://127.0.0.1:11434`)
    /// - `SEMA_EMBED_MODEL` (default: `gte-small`)
    /// - `SEMA_EMBED_DIM` (default: 384)
    /// - `SEMA_EMBED_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_BASE").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let model =
            std::env::var("SEMA_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());
        let dimension = std::env::var("SEMA_EMBED_DIM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DIMENSION);
        let timeout_secs = std::env::var("SEMA_EMBED_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(EMBED_TIMEOUT_SECS);

        Self {
            base_url,
            model,
            dimension,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.model = model.into();
        self.dimension = dimension;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Ollama embedding backend.
pub struct OllamaEmbedder {
    client: Client,
    config: OllamaConfig,
}

impl OllamaEmbedder {
    /// Create a new backend with the given configuration.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.dimension == 0 {
            return Err(Error::Config(
                "embedding dimension must be positive".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "ollama",
            "Initializing Ollama embedder: url={}, model={}, dim={}",
            config.base_url,
            config.model,
            config.dimension
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env())
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text), fields(subsystem = "inference", component = "ollama", op = "embed", model = %self.config.model))]
    async fn embed(&self, text: &str) -> Result<Vector> {
        if text.trim().is_empty() {
            return Err(Error::InvalidQuery("cannot embed empty text".to_string()));
        }

        let start = Instant::now();

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: vec![text],
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.config.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::EmbeddingUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmbeddingUnavailable(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            Error::EmbeddingUnavailable(format!("Failed to parse response: {}", e))
        })?;

        let raw = result.embeddings.into_iter().next().ok_or_else(|| {
            Error::EmbeddingUnavailable("Ollama returned no embeddings".to_string())
        })?;
        let vector = RawEmbedding::Pooled(raw).finalize(self.config.dimension)?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(duration_ms = elapsed, "Embedding complete");
        if elapsed > defaults::SLOW_EMBED_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow embedding operation");
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.config.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!(status = %resp.status(), "Ollama health check failed");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Ollama health check error");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_OLLAMA_URL, "http://127.0.0.1:11434");
        assert_eq!(DEFAULT_EMBED_MODEL, "gte-small");
        assert_eq!(DEFAULT_DIMENSION, 384);
    }

    #[test]
    fn test_config_builder() {
        let config = OllamaConfig::default()
            .with_base_url("http://gpu-box:11434")
            .with_model("nomic-embed-text", 768)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://gpu-box:11434");
        assert_eq!(config.model, "nomic-embed-text");
        assert_eq!(config.dimension, 768);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let result = OllamaEmbedder::new(OllamaConfig::default().with_model("x", 0));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_accessors() {
        let embedder = OllamaEmbedder::new(OllamaConfig::default()).unwrap();
        assert_eq!(embedder.dimension(), 384);
        assert_eq!(embedder.model_name(), "gte-small");
    }

    #[test]
    fn test_embedding_request_serialization() {
        let request = EmbeddingRequest {
            model: "gte-small",
            input: vec!["hello"],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"model": "gte-small", "input": ["hello"]}));
    }

    #[test]
    fn test_embedding_response_deserialization() {
        let raw = r#"{"model":"gte-small","embeddings":[[0.1,0.2,0.3]]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.embeddings.len(), 1);
        assert_eq!(parsed.embeddings[0].len(), 3);
    }

    #[tokio::test]
    async fn test_empty_text_rejected_without_request() {
        // Unroutable base URL: any request would fail with EmbeddingUnavailable.
        let embedder =
            OllamaEmbedder::new(OllamaConfig::default().with_base_url("http://127.0.0.1:1"))
                .unwrap();
        let err = embedder.embed("   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }
}

/// Integration tests that require a live Ollama server.
/// Run with: cargo test --package sema-inference --features integration
#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;
    use sema_core::{cosine_similarity, magnitude};

    #[tokio::test]
    async fn test_embed_is_normalized() {
        let embedder = OllamaEmbedder::from_env().expect("backend");
        let v = embedder
            .embed("Hello, this is a test sentence for embedding.")
            .await
            .expect("embedding failed");
        assert_eq!(v.as_slice().len(), embedder.dimension());
        assert!((magnitude(v.as_slice()) - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_semantic_similarity() {
        let embedder = OllamaEmbedder::from_env().expect("backend");
        let a = embedder.embed("The quick brown fox jumps over the lazy dog.").await.unwrap();
        let b = embedder.embed("A fast auburn fox leaps above a sleepy canine.").await.unwrap();
        let c = embedder.embed("Python is a popular programming language.").await.unwrap();

        let sim_similar = cosine_similarity(a.as_slice(), b.as_slice());
        let sim_different = cosine_similarity(a.as_slice(), c.as_slice());
        assert!(sim_similar > sim_different);
    }
}
