//! # sema-core
//!
//! Core types, traits, and abstractions for the sema semantic search core.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the index, inference, search, and API crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod ranking;
pub mod traits;
pub mod vector;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use pgvector::Vector;
pub use ranking::rank_candidates;
pub use traits::*;
pub use vector::{check_dimension, cosine_similarity, magnitude, mean_pool, normalize};
