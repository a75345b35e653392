//! File names for ingested documents and classification of raw sources.

use std::sync::LazyLock;

use regex::Regex;

pub const MAX_SLUG_CHARS: usize = 160;
/// Hex characters of the content hash used in inline document names.
pub const INLINE_HASH_CHARS: usize = 16;

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("url scheme pattern is valid"));
static SCHEME_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://").expect("scheme pattern is valid"));
static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));
static FILE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.[a-z0-9]{2,5}$").expect("extension pattern is valid"));

pub fn is_url(source: &str) -> bool {
    URL_SCHEME.is_match(source)
}

/// Whether unresolved text was probably meant as a path rather than prose.
pub fn looks_like_path(source: &str) -> bool {
    source.contains('/') || source.contains('\\') || FILE_EXTENSION.is_match(source)
}

/// Lowercase, drop URL schemes, replace non-alphanumeric runs with `-`,
/// trim dashes and cap the length.
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    let without_scheme = SCHEME_ANYWHERE.replace_all(&lower, "");
    let dashed = NON_SLUG.replace_all(&without_scheme, "-");
    dashed.trim_matches('-').chars().take(MAX_SLUG_CHARS).collect()
}

pub fn document_file_name(input: &str) -> String {
    format!("{}.md", slugify(input))
}

/// `medical-text-<hash>.md`, stable for identical text.
pub fn inline_file_name(text: &str) -> String {
    let hash = blake3::hash(text.as_bytes()).to_hex();
    format!("medical-text-{}.md", &hash[..INLINE_HASH_CHARS])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_urls() {
        assert_eq!(
            slugify("https://www.CDC.gov/flu/prevent/index.html"),
            "www-cdc-gov-flu-prevent-index-html"
        );
        assert_eq!(
            document_file_name("HTTP://example.org/Guide.PDF?x=1"),
            "example-org-guide-pdf-x-1.md"
        );
    }

    #[test]
    fn slug_is_capped_after_trimming() {
        let long = format!("--{}--", "ab".repeat(200));
        let slug = slugify(&long);
        assert_eq!(slug.len(), MAX_SLUG_CHARS);
        assert!(slug.starts_with("abab"));
    }

    #[test]
    fn slug_keeps_only_ascii_alphanumerics() {
        assert_eq!(slugify("Fièvre & Toux.txt"), "fi-vre-toux-txt");
    }

    #[test]
    fn classifies_sources() {
        assert!(is_url("HTTPS://example.org"));
        assert!(!is_url("ftp://example.org"));

        assert!(looks_like_path("docs/flu.pdf"));
        assert!(looks_like_path("C:\\docs\\flu"));
        assert!(looks_like_path("flu.html"));
        assert!(!looks_like_path("Wash your hands often"));
        assert!(!looks_like_path("Take 2 pills daily."));
        assert!(!looks_like_path("version.abcdef"));
    }

    #[test]
    fn inline_names_are_stable_per_text() {
        let a = inline_file_name("Drink water.");
        assert_eq!(a, inline_file_name("Drink water."));
        assert_ne!(a, inline_file_name("Drink more water."));
        assert!(a.starts_with("medical-text-"));
        assert_eq!(a.len(), "medical-text-".len() + INLINE_HASH_CHARS + ".md".len());
    }
}
