//! Centralized default constants for sema.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers; environment variables override them at startup.

// =============================================================================
// SEARCH POLICY
// =============================================================================

/// Minimum cosine similarity a record needs to be returned.
pub const MATCH_THRESHOLD: f32 = 0.8;

/// Result limit applied when a request does not specify one.
pub const SEARCH_LIMIT: usize = 10;

/// Upper bound on the per-request limit; larger values are clamped.
pub const MAX_SEARCH_LIMIT: usize = 100;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name.
pub const EMBED_MODEL: &str = "gte-small";

/// Default embedding vector dimension for gte-small.
pub const EMBED_DIMENSION: usize = 384;

/// Timeout for a single embedding call (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Embedding calls slower than this are logged as slow (milliseconds).
pub const SLOW_EMBED_MS: u64 = 5_000;

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default OpenAI-compatible endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

// =============================================================================
// INDEX
// =============================================================================

/// Timeout for a single similarity query (seconds).
pub const INDEX_TIMEOUT_SECS: u64 = 10;

/// Default collection table.
pub const INDEX_TABLE: &str = "inbox_embeddings";

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/sema";

/// Default maximum pool connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP port.
pub const SERVER_PORT: u16 = 3000;

/// Maximum accepted request body (bytes). Search bodies are tiny.
pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024;
