//! Query tokenization: quoted phrases first, then significant words.
//!
//! ```
//! use patient_faq_retriever::retrieval::tokenizer::extract_tokens;
//!
//! let tokens = extract_tokens(r#""heart attack" fever the a"#);
//! assert_eq!(tokens.phrases, vec!["heart attack"]);
//! assert_eq!(tokens.words, vec!["fever"]);
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Words too common to carry relevance.
pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "by", "with", "at", "as", "is",
    "are", "was", "were", "be", "being", "been", "from", "that", "this", "these", "those", "it",
    "its", "into", "about", "over", "under", "up", "down",
];

const MIN_TOKEN_CHARS: usize = 2;

static QUOTED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]{2,})""#).expect("quoted span pattern is valid"));

/// A query split into searchable terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTokens {
    /// Lowercased contents of double-quoted spans, in order of appearance
    pub phrases: Vec<String>,
    /// Lowercased significant words outside quoted spans, duplicates retained
    pub words: Vec<String>,
}

impl QueryTokens {
    /// Phrases followed by words. Not deduplicated.
    pub fn tokens(&self) -> Vec<String> {
        self.phrases
            .iter()
            .chain(self.words.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.words.is_empty()
    }
}

/// Split a query into quoted phrases and stop-word-filtered words.
///
/// A query made only of stop-words and punctuation yields empty token lists;
/// callers treat that as "no searchable terms", not an error.
pub fn extract_tokens(query: &str) -> QueryTokens {
    let phrases = QUOTED_SPAN
        .captures_iter(query)
        .filter_map(|caps| caps.get(1))
        .map(|inner| inner.as_str().to_lowercase().trim().to_string())
        .filter(|phrase| phrase.chars().count() >= MIN_TOKEN_CHARS)
        .collect();

    let rest = QUOTED_SPAN.replace_all(query, " ").to_lowercase();
    let cleaned: String = rest
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let words = cleaned
        .split_whitespace()
        .filter(|word| word.len() >= MIN_TOKEN_CHARS && !is_stopword(word))
        .map(str::to_string)
        .collect();

    QueryTokens { phrases, words }
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_is_consumed_and_stopwords_dropped() {
        let tokens = extract_tokens(r#""heart attack" fever the a"#);
        assert_eq!(tokens.phrases, vec!["heart attack"]);
        assert_eq!(tokens.words, vec!["fever"]);
        assert_eq!(tokens.tokens(), vec!["heart attack", "fever"]);
    }

    #[test]
    fn stopwords_and_punctuation_only_yield_nothing() {
        for query in ["the a an", "is it?! ...", "of, to; in: on", "  ", "\"\""] {
            let tokens = extract_tokens(query);
            assert!(tokens.is_empty(), "query {query:?} produced {tokens:?}");
        }
    }

    #[test]
    fn multiple_phrases_keep_order_and_duplicates() {
        let tokens = extract_tokens(r#""Blood Pressure" and "flu shot" "blood pressure""#);
        assert_eq!(
            tokens.phrases,
            vec!["blood pressure", "flu shot", "blood pressure"]
        );
        assert!(tokens.words.is_empty());
    }

    #[test]
    fn words_keep_hyphens_digits_and_duplicates() {
        let tokens = extract_tokens("COVID-19 booster, booster dose for 65+ adults");
        assert_eq!(
            tokens.words,
            vec!["covid-19", "booster", "booster", "dose", "65", "adults"]
        );
    }

    #[test]
    fn single_character_words_are_dropped() {
        let tokens = extract_tokens("x y vitamin d");
        assert_eq!(tokens.words, vec!["vitamin"]);
    }

    #[test]
    fn short_quoted_span_is_not_a_phrase() {
        // One character between quotes does not match, so the text stays in `rest`.
        let tokens = extract_tokens(r#""a" insulin"#);
        assert!(tokens.phrases.is_empty());
        assert_eq!(tokens.words, vec!["insulin"]);
    }

    #[test]
    fn phrase_shorter_than_two_chars_after_trim_is_dropped() {
        let tokens = extract_tokens(r#""  x " asthma"#);
        assert!(tokens.phrases.is_empty());
        assert_eq!(tokens.words, vec!["asthma"]);
    }

    #[test]
    fn non_ascii_letters_split_words() {
        let tokens = extract_tokens("café naïve");
        assert_eq!(tokens.words, vec!["caf", "na", "ve"]);
    }
}
