//! Relevance scoring of a single document against a token set.
//!
//! ## Score
//!
//! ```text
//! coverage = token_matches / tokens.len()
//! early    = earliest match ? 1 - earliest / max(doc_len, 1) : 0.2
//! score    = coverage * 60 + occurrences * 6 + early * 10 + filename_bonus
//! ```
//!
//! Covering more tokens outweighs repeating one token, which outweighs an
//! early first match. Each token found in the file name adds a flat bonus, so
//! a document can be a hit on its name alone.
//!
//! Offsets are character offsets into the document.

use serde::Serialize;

pub const COVERAGE_WEIGHT: f64 = 60.0;
pub const OCCURRENCE_WEIGHT: f64 = 6.0;
pub const EARLY_WEIGHT: f64 = 10.0;
pub const FILENAME_BONUS: f64 = 5.0;
/// Early-position factor used when only the file name matched.
pub const NO_CONTENT_EARLY: f64 = 0.2;
/// Characters kept on each side of the first match in an excerpt.
pub const EXCERPT_WINDOW: usize = 180;

/// A scored document. Lives only for the duration of one search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub file: String,
    pub score: f64,
    /// Character offset of the earliest content match, 0 for filename-only hits
    pub first_index: usize,
    pub token_matches: usize,
    pub occurrences: usize,
    pub excerpt: String,
}

/// Occurrence count and first match position of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Occurrences {
    pub count: usize,
    /// Byte offset of the first match
    pub first: Option<usize>,
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
///
/// After each match the search resumes `max(needle.len(), 1)` bytes later,
/// rounded up to the next character boundary, so an empty needle terminates.
pub fn count_occurrences(haystack: &str, needle: &str) -> Occurrences {
    let mut occurrences = Occurrences::default();
    let mut pos = 0;

    while let Some(rel) = haystack.get(pos..).and_then(|rest| rest.find(needle)) {
        let at = pos + rel;
        occurrences.first.get_or_insert(at);
        occurrences.count += 1;

        pos = at + needle.len().max(1);
        while pos < haystack.len() && !haystack.is_char_boundary(pos) {
            pos += 1;
        }
        if pos > haystack.len() {
            break;
        }
    }

    occurrences
}

/// Score one document. Returns `None` when neither content nor file name match.
pub fn score_document(tokens: &[String], text: &str, file_name: &str) -> Option<Hit> {
    let lower = text.to_lowercase();

    let mut token_matches = 0usize;
    let mut occurrences = 0usize;
    let mut earliest_byte: Option<usize> = None;

    for token in tokens {
        let found = count_occurrences(&lower, token);
        if found.count > 0 {
            token_matches += 1;
            occurrences += found.count;
            if let Some(first) = found.first {
                earliest_byte = Some(earliest_byte.map_or(first, |e| e.min(first)));
            }
        }
    }

    let lower_name = file_name.to_lowercase();
    let filename_bonus = tokens
        .iter()
        .filter(|token| lower_name.contains(token.as_str()))
        .count() as f64
        * FILENAME_BONUS;

    if token_matches == 0 && filename_bonus == 0.0 {
        return None;
    }

    let earliest = earliest_byte.map(|byte| lower[..byte].chars().count());
    let doc_len = text.chars().count();

    let coverage = if tokens.is_empty() {
        0.0
    } else {
        token_matches as f64 / tokens.len() as f64
    };
    let early = match earliest {
        Some(offset) => 1.0 - offset as f64 / doc_len.max(1) as f64,
        None => NO_CONTENT_EARLY,
    };
    let score = coverage * COVERAGE_WEIGHT
        + occurrences as f64 * OCCURRENCE_WEIGHT
        + early * EARLY_WEIGHT
        + filename_bonus;

    let first_index = earliest.unwrap_or(0);

    Some(Hit {
        file: file_name.to_string(),
        score,
        first_index,
        token_matches,
        occurrences,
        excerpt: excerpt_around(text, first_index, EXCERPT_WINDOW),
    })
}

/// Characters `[center - window, center + window)` of `text`, whitespace collapsed.
pub fn excerpt_around(text: &str, center: usize, window: usize) -> String {
    let start = center.saturating_sub(window);
    let end = center.saturating_add(window);
    let slice: String = text.chars().skip(start).take(end - start).collect();
    collapse_whitespace(&slice)
}

/// Replace runs of whitespace with a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
