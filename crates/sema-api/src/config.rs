//! Server configuration from the environment.

use std::path::PathBuf;

use sema_core::{defaults, Error, Result};
use sema_db::IndexConfig;
use sema_inference::{OllamaConfig, OpenAIConfig};
use sema_search::SearchConfig;

/// Default CORS origin when `ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Where the similarity index lives.
#[derive(Debug, Clone)]
pub enum IndexBackend {
    /// pgvector table in PostgreSQL.
    Postgres(IndexConfig),
    /// Exact in-process index, optionally seeded from a JSONL file.
    Memory {
        dimension: usize,
        seed: Option<PathBuf>,
    },
}

/// Which model server produces query embeddings.
#[derive(Debug, Clone)]
pub enum EmbedProvider {
    Ollama(OllamaConfig),
    OpenAI(OpenAIConfig),
}

/// Everything `sema-api` needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: String,
    pub index: IndexBackend,
    pub embedder: EmbedProvider,
    pub search: SearchConfig,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// - `HOST`, `PORT`, `ALLOWED_ORIGINS`
    /// - `SEMA_INDEX_BACKEND` (`postgres` | `memory`), `SEMA_MEMORY_SEED`
    /// - `SEMA_EMBED_PROVIDER` (`ollama` | `openai`)
    /// - everything read by [`IndexConfig::from_env`], [`OllamaConfig::from_env`],
    ///   [`OpenAIConfig::from_env`] and [`SearchConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| defaults::SERVER_HOST.to_string());
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{}'", raw)))?,
            Err(_) => defaults::SERVER_PORT,
        };
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string());

        let embedder = match env_choice("SEMA_EMBED_PROVIDER", "ollama").as_str() {
            "ollama" => EmbedProvider::Ollama(OllamaConfig::from_env()),
            "openai" => EmbedProvider::OpenAI(OpenAIConfig::from_env()),
            other => {
                return Err(Error::Config(format!(
                    "SEMA_EMBED_PROVIDER must be 'ollama' or 'openai', got '{}'",
                    other
                )))
            }
        };

        let index = match env_choice("SEMA_INDEX_BACKEND", "postgres").as_str() {
            "postgres" => IndexBackend::Postgres(IndexConfig::from_env()),
            "memory" => IndexBackend::Memory {
                dimension: embedder.dimension(),
                seed: std::env::var("SEMA_MEMORY_SEED")
                    .ok()
                    .filter(|p| !p.trim().is_empty())
                    .map(PathBuf::from),
            },
            other => {
                return Err(Error::Config(format!(
                    "SEMA_INDEX_BACKEND must be 'postgres' or 'memory', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            host,
            port,
            allowed_origins,
            index,
            embedder,
            search: SearchConfig::from_env()?,
        })
    }
}

impl EmbedProvider {
    pub fn dimension(&self) -> usize {
        match self {
            EmbedProvider::Ollama(c) => c.dimension,
            EmbedProvider::OpenAI(c) => c.dimension,
        }
    }
}

fn env_choice(key: &str, default: &str) -> String {
    std::env::var(key)
        .map(|v| v.trim().to_lowercase())
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_provider_dimension() {
        let ollama = EmbedProvider::Ollama(OllamaConfig::default().with_model("m", 768));
        assert_eq!(ollama.dimension(), 768);

        let openai = EmbedProvider::OpenAI(OpenAIConfig {
            dimension: 1536,
            ..Default::default()
        });
        assert_eq!(openai.dimension(), 1536);
    }

    #[test]
    fn test_env_choice_default_when_unset() {
        assert_eq!(env_choice("SEMA_TEST_UNSET_CHOICE_KEY", "postgres"), "postgres");
    }
}
