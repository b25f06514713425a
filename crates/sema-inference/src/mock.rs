//! Deterministic embedder for tests.
//!
//! Every whitespace-separated token gets a pseudo-random vector seeded from
//! its hash; the text's embedding is the normalized mean of its tokens. Texts
//! sharing words therefore land near each other, and the same text always
//! produces the same vector.
//!
//! ```rust
//! use sema_inference::mock::MockEmbedder;
//! use sema_core::Embedder;
//!
//! let embedder = MockEmbedder::new(64).with_vector("refund", vec![1.0; 64]);
//! assert_eq!(embedder.dimension(), 64);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sema_core::{Embedder, Error, Result, Vector};

use crate::pooling::RawEmbedding;

/// Mock embedder with call counting, fixed overrides, latency, and failure.
#[derive(Clone)]
pub struct MockEmbedder {
    dimension: usize,
    model: String,
    latency: Option<Duration>,
    fail: bool,
    overrides: Arc<HashMap<String, Vec<f32>>>,
    calls: Arc<AtomicUsize>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model: "mock-embedder".to_string(),
            latency: None,
            fail: false,
            overrides: Arc::new(HashMap::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sleep this long before answering each call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every call fail with `EmbeddingUnavailable`.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Return exactly this vector (normalized) for this text.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        Arc::make_mut(&mut self.overrides).insert(text.into(), vector);
        self
    }

    /// Number of `embed` calls made so far, across clones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Compute the vector `embed` would return, without counting a call.
    pub fn vector_for(&self, text: &str) -> Result<Vector> {
        if let Some(fixed) = self.overrides.get(text) {
            return RawEmbedding::Pooled(fixed.clone()).finalize(self.dimension);
        }
        let tokens: Vec<Vec<f32>> = text
            .split_whitespace()
            .map(|token| token_vector(&token.to_lowercase(), self.dimension))
            .collect();
        RawEmbedding::Tokens(tokens).finalize(self.dimension)
    }
}

/// FNV-1a, stable across platforms and toolchains.
fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn token_vector(token: &str, dimension: usize) -> Vec<f32> {
    let mut state = fnv1a(token);
    (0..dimension)
        .map(|_| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            (((state >> 33) % 1000) as f32) / 1000.0 - 0.5
        })
        .collect()
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail {
            return Err(Error::EmbeddingUnavailable(
                "simulated embedder failure".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(Error::InvalidQuery("cannot embed empty text".to_string()));
        }
        self.vector_for(text)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail)
    }
}
