//! Ordering and projection of scored hits.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::scoring::Hit;

/// Smallest and largest accepted result limits.
pub const MIN_RESULTS: usize = 1;
pub const MAX_RESULTS: usize = 50;

/// Externally visible projection of a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub file: String,
    pub excerpt: String,
    pub match_index: usize,
    pub occurrences: usize,
    pub token_matches: usize,
    /// Rounded to three decimal places
    pub score: f64,
}

impl From<Hit> for SearchResult {
    fn from(hit: Hit) -> Self {
        Self {
            file: hit.file,
            excerpt: hit.excerpt,
            match_index: hit.first_index,
            occurrences: hit.occurrences,
            token_matches: hit.token_matches,
            score: round_score(hit.score),
        }
    }
}

/// Score descending, then earliest match ascending, then file name ascending.
pub fn compare_hits(a: &Hit, b: &Hit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.first_index.cmp(&b.first_index))
        .then_with(|| a.file.cmp(&b.file))
}

/// Sort, keep the first `limit` hits and project them to results.
pub fn rank(mut hits: Vec<Hit>, limit: usize) -> Vec<SearchResult> {
    hits.sort_by(compare_hits);
    hits.truncate(limit.clamp(MIN_RESULTS, MAX_RESULTS));
    hits.into_iter().map(SearchResult::from).collect()
}

pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
