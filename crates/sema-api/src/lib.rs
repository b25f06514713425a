//! # sema-api
//!
//! HTTP front end for sema semantic search.
//!
//! - `POST /search` with `{"search": "...", "limit": 10}` returns
//!   `{"search": "...", "result": [...]}`
//! - `GET /health` reports the embedding model, dimension, and whether the
//!   embedder is reachable
//!
//! The binary in `main.rs` reads [`config::AppConfig`] from the environment,
//! builds the service with [`app::build_service`], and serves
//! [`routes::router`].

pub mod app;
pub mod config;
pub mod error;
pub mod request_id;
pub mod routes;
pub mod seed;
pub mod telemetry;

pub use app::build_service;
pub use config::AppConfig;
pub use error::ApiError;
pub use routes::{router, AppState};
