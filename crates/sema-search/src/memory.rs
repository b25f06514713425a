//! Exact in-memory similarity index.
//!
//! Records live in an immutable snapshot behind `RwLock<Arc<..>>`. A query
//! holds the read lock only long enough to clone the `Arc`, then scores
//! without any lock. Writers are serialized on a separate mutex, build the
//! next snapshot outside the `RwLock`, and take the write lock only for the
//! swap, so readers see either the old or the new collection, never a
//! partial one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument};

use sema_core::{
    check_dimension, cosine_similarity, rank_candidates, Error, IndexedRecord, Result,
    SearchResult, SimilarityIndex, Vector,
};

type Snapshot = Arc<Vec<IndexedRecord>>;

/// Full-scan cosine index over records held in memory.
pub struct MemoryIndex {
    dimension: usize,
    snapshot: RwLock<Snapshot>,
    writer: Mutex<()>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Config(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            writer: Mutex::new(()),
        })
    }

    /// Create an index pre-populated with `records`.
    pub fn with_records(dimension: usize, records: Vec<IndexedRecord>) -> Result<Self> {
        let index = Self::new(dimension)?;
        index.replace_all(records)?;
        Ok(index)
    }

    fn current(&self) -> Snapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, next: Vec<IndexedRecord>) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
    }

    /// Insert a record, replacing any record with the same id.
    pub fn upsert(&self, record: IndexedRecord) -> Result<()> {
        check_dimension(self.dimension, record.dimension())?;

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next: Vec<IndexedRecord> = self.current().as_ref().clone();
        match next.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => next.push(record),
        }
        self.swap(next);
        Ok(())
    }

    /// Remove a record by id. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current();
        if !current.iter().any(|r| r.id == id) {
            return false;
        }
        let next: Vec<IndexedRecord> = current.iter().filter(|r| r.id != id).cloned().collect();
        self.swap(next);
        true
    }

    /// Replace the whole collection. Later duplicates of an id win.
    ///
    /// Fails without modifying the index if any record has the wrong
    /// dimensionality.
    pub fn replace_all(&self, records: Vec<IndexedRecord>) -> Result<()> {
        for record in &records {
            check_dimension(self.dimension, record.dimension())?;
        }

        let mut positions: HashMap<String, usize> = HashMap::with_capacity(records.len());
        let mut next: Vec<IndexedRecord> = Vec::with_capacity(records.len());
        for record in records {
            match positions.get(&record.id) {
                Some(&pos) => next[pos] = record,
                None => {
                    positions.insert(record.id.clone(), next.len());
                    next.push(record);
                }
            }
        }

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(next);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }
}

#[async_trait]
impl SimilarityIndex for MemoryIndex {
    #[instrument(skip(self, vector), fields(subsystem = "search", component = "memory_index", op = "query"))]
    async fn query(
        &self,
        vector: &Vector,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let query = vector.as_slice();
        check_dimension(self.dimension, query.len())?;

        let start = Instant::now();
        let snapshot = self.current();

        let candidates: Vec<SearchResult> = snapshot
            .iter()
            .filter_map(|record| {
                let score = cosine_similarity(query, record.embedding.as_slice());
                (score >= min_score)
                    .then(|| SearchResult::new(record.id.clone(), record.metadata.clone(), score))
            })
            .collect();

        let candidate_count = candidates.len();
        let results = rank_candidates(candidates, min_score, limit);

        debug!(
            scanned = snapshot.len(),
            candidate_count,
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Memory index scan complete"
        );
        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
