//! Data model for queries, indexed records, and search results.

use pgvector::Vector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Opaque key identifying an indexed record.
pub type RecordId = String;

/// Arbitrary payload stored alongside a record and echoed back in results.
pub type Metadata = Map<String, JsonValue>;

// =============================================================================
// QUERY
// =============================================================================

/// A free-text search request.
///
/// `limit` is optional here; the query service substitutes its configured
/// default when it is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Create a query with no explicit limit.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: None,
        }
    }

    /// Set the maximum number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// =============================================================================
// INDEXED RECORD
// =============================================================================

/// A persisted (identifier, vector, payload) tuple.
///
/// Written by the ingestion pipeline; the search core only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    pub id: RecordId,
    pub embedding: Vector,
    pub metadata: Metadata,
}

impl IndexedRecord {
    pub fn new(id: impl Into<RecordId>, embedding: impl Into<Vector>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            embedding: embedding.into(),
            metadata,
        }
    }

    /// Dimensionality of the stored embedding.
    pub fn dimension(&self) -> usize {
        self.embedding.as_slice().len()
    }
}

// =============================================================================
// SEARCH RESULT
// =============================================================================

/// A single ranked match.
///
/// Serializes flat: `{ "id": ..., <metadata fields>, "similarity": ... }`, so
/// callers see the record's own fields next to its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: RecordId,
    #[serde(flatten)]
    pub metadata: Metadata,
    pub similarity: f32,
}

impl SearchResult {
    pub fn new(id: impl Into<RecordId>, metadata: Metadata, similarity: f32) -> Self {
        Self {
            id: id.into(),
            metadata,
            similarity,
        }
    }
}

/// Results wrapped with the original query text for traceability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub search: String,
    pub result: Vec<SearchResult>,
}
