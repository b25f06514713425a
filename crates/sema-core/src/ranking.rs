//! Thresholding, ordering, and truncation of scored candidates.
//!
//! Every [`SimilarityIndex`](crate::SimilarityIndex) funnels its output through
//! [`rank_candidates`], so the result contract holds whatever produced the
//! scores (exact scan, pgvector, approximate index).

use crate::models::SearchResult;

/// Keep candidates scoring `>= min_score`, order them by descending
/// similarity with ties broken by ascending id, and truncate to `limit`.
///
/// NaN scores never pass the threshold.
pub fn rank_candidates(
    candidates: Vec<SearchResult>,
    min_score: f32,
    limit: usize,
) -> Vec<SearchResult> {
    let mut kept: Vec<SearchResult> = candidates
        .into_iter()
        .filter(|c| c.similarity >= min_score)
        .collect();

    kept.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.id.cmp(&b.id))
    });
    kept.truncate(limit);
    kept
}
