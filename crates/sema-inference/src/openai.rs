//! OpenAI-compatible embedding backend.
//!
//! Works with any server exposing `POST /embeddings` in the OpenAI format
//! (OpenAI, vLLM, LocalAI, text-embeddings-inference, Ollama's `/v1`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use sema_core::{defaults, Embedder, Error, Result, Vector};

use crate::pooling::RawEmbedding;

/// Default OpenAI API endpoint.
pub const DEFAULT_OPENAI_URL: &str = defaults::OPENAI_URL;

/// Configuration for an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for embeddings.
    pub model: String,
    /// Expected embedding dimension.
    pub dimension: usize,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: defaults::EMBED_MODEL.to_string(),
            dimension: defaults::EMBED_DIMENSION,
            timeout: Duration::from_secs(defaults::EMBED_TIMEOUT_SECS),
        }
    }
}

impl OpenAIConfig {
    /// Read configuration from the environment.
    ///
    /// - `OPENAI_BASE_URL`, `OPENAI_API_KEY`
    /// - `SEMA_EMBED_MODEL`, `SEMA_EMBED_DIM`, `SEMA_EMBED_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            model: std::env::var("SEMA_EMBED_MODEL").unwrap_or(defaults.model),
            dimension: std::env::var("SEMA_EMBED_DIM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.dimension),
            timeout: std::env::var("SEMA_EMBED_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// OpenAI-compatible embedding backend.
pub struct OpenAIEmbedder {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIEmbedder {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
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
            component = "openai",
            "Initializing OpenAI-compatible embedder: url={}, model={}, auth={}",
            config.base_url,
            config.model,
            config.api_key.is_some()
        );

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text), fields(subsystem = "inference", component = "openai", op = "embed", model = %self.config.model))]
    async fn embed(&self, text: &str) -> Result<Vector> {
        if text.trim().is_empty() {
            return Err(Error::InvalidQuery("cannot embed empty text".to_string()));
        }

        let start = Instant::now();
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: vec![text],
        };

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::EmbeddingUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmbeddingUnavailable(format!(
                "Embedding API returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            Error::EmbeddingUnavailable(format!("Failed to parse response: {}", e))
        })?;

        let raw = result
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .map(|d| d.embedding)
            .ok_or_else(|| Error::EmbeddingUnavailable("API returned no embeddings".to_string()))?;
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
        let mut builder = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .timeout(Duration::from_secs(5));
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        match builder.send().await {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!(status = %resp.status(), "Embedding API health check failed");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Embedding API health check error");
                Ok(false)
            }
        }
    }
}
