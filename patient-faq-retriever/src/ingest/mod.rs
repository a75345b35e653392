//! Ingestion of URLs, local files and inline text into a namespace.
//!
//! Each source is normalized to a Markdown document and written as
//! `<knowledge_root>/<namespace>/<name>.md`. A batch never aborts because
//! one source failed: failures are reported as entries whose `file` starts
//! with `ERROR:`.
//!
//! ```text
//! sources ─┬─ http(s) URL ──→ SourceFetcher ─→ HTML / PDF normalizer ─┐
//!          ├─ local path ───→ local_path::resolve ─→ by extension ────┤
//!          └─ other text ───→ inline document ────────────────────────┼─→ write
//! files ──────────────────→ local_path::resolve ─→ by extension ──────┘
//! ```

pub mod fetcher;
pub mod local_path;
pub mod naming;
pub mod normalize;
pub mod pipeline;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use fetcher::{FetchedBody, HttpFetcher, MockFetcher, SourceFetcher};
pub use pipeline::IngestPipeline;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    /// URLs, local paths or inline text
    #[serde(default)]
    pub sources: Vec<String>,
    /// Local paths
    #[serde(default)]
    pub files: Vec<String>,
    /// Defaults to the configured namespace when absent
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default, alias = "allowInsecureTLS")]
    pub allow_insecure_tls: bool,
}

impl IngestRequest {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.files.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Url,
    Text,
    File,
}

/// One processed source: a written document or an `ERROR:` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenEntry {
    pub file: String,
    pub bytes: usize,
    pub kind: SourceKind,
    pub source: String,
}

impl WrittenEntry {
    pub fn failure(
        error: &SourceError,
        location: &str,
        kind: SourceKind,
        source: impl Into<String>,
    ) -> Self {
        let mut file = format!("ERROR: {} @ {}", error.code(), location);
        if let Some(detail) = error.detail() {
            file.push_str(&format!(" | {detail}"));
        }
        if let SourceError::FileNotFound { tried } = error {
            if !tried.is_empty() {
                let tried: Vec<String> = tried.iter().map(|p| p.display().to_string()).collect();
                file.push_str(&format!(" | tried={}", tried.join(",")));
            }
        }
        Self {
            file,
            bytes: 0,
            kind,
            source: source.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.file.starts_with("ERROR:")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Entries in submission order, sources before files
    pub written: Vec<WrittenEntry>,
}

/// A recoverable failure of a single source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request timed out")]
    Timeout,

    #[error("response exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    /// Final response status outside 2xx/3xx
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("network error: {message}")]
    Network { message: String },

    /// No candidate path exists
    #[error("file not found")]
    FileNotFound { tried: Vec<PathBuf> },

    #[error("failed to read file: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse PDF: {message}")]
    PdfParse { message: String },

    #[error("failed to write document: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Stable code reported in `ERROR:` entries.
    pub fn code(&self) -> String {
        match self {
            Self::Timeout => "TIMEOUT".to_string(),
            Self::TooLarge { .. } => "RESPONSE_TOO_LARGE".to_string(),
            Self::HttpStatus { status } => format!("HTTP {status}"),
            Self::Network { .. } => "NETWORK_ERROR".to_string(),
            Self::FileNotFound { .. } => "FILE_NOT_FOUND".to_string(),
            Self::Read { .. } => "READ_FAIL".to_string(),
            Self::PdfParse { .. } => "PDF_PARSE_FAILED".to_string(),
            Self::Write { .. } => "WRITE_FAIL".to_string(),
        }
    }

    /// Diagnostic text on one line, when it says more than the code.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Timeout | Self::HttpStatus { .. } | Self::FileNotFound { .. } => None,
            _ => Some(self.to_string().split_whitespace().collect::<Vec<_>>().join(" ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_gateway_field_names() {
        let request: IngestRequest = serde_json::from_str(
            r#"{"sources":["https://example.org"],"allowInsecureTLS":true}"#,
        )
        .unwrap();
        assert!(request.allow_insecure_tls);
        assert!(request.files.is_empty());
        assert!(!request.is_empty());
        assert!(IngestRequest::default().is_empty());
    }

    #[test]
    fn failure_entry_names_code_and_location() {
        let entry = WrittenEntry::failure(
            &SourceError::HttpStatus { status: 404 },
            "https://example.org/missing",
            SourceKind::Url,
            "https://example.org/missing",
        );
        assert_eq!(entry.file, "ERROR: HTTP 404 @ https://example.org/missing");
        assert_eq!(entry.bytes, 0);
        assert!(entry.is_error());
    }

    #[test]
    fn not_found_entry_lists_tried_paths() {
        let error = SourceError::FileNotFound {
            tried: vec![PathBuf::from("/a/x.pdf"), PathBuf::from("/b/x.pdf")],
        };
        let entry = WrittenEntry::failure(&error, "x.pdf", SourceKind::File, "x.pdf");
        assert_eq!(
            entry.file,
            "ERROR: FILE_NOT_FOUND @ x.pdf | tried=/a/x.pdf,/b/x.pdf"
        );
    }

    #[test]
    fn failure_entry_carries_diagnostic_detail() {
        let error = SourceError::Network {
            message: "dns error: failed to lookup address".to_string(),
        };
        let entry =
            WrittenEntry::failure(&error, "https://nx.test", SourceKind::Url, "https://nx.test");
        assert_eq!(
            entry.file,
            "ERROR: NETWORK_ERROR @ https://nx.test | network error: dns error: failed to lookup address"
        );

        let error = SourceError::Read {
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let entry = WrittenEntry::failure(&error, "/srv/a.md", SourceKind::File, "/srv/a.md");
        assert_eq!(
            entry.file,
            "ERROR: READ_FAIL @ /srv/a.md | failed to read file: permission denied"
        );

        let error = SourceError::PdfParse {
            message: "invalid header\nat offset 0".to_string(),
        };
        assert_eq!(
            error.detail().as_deref(),
            Some("failed to parse PDF: invalid header at offset 0")
        );
        assert_eq!(SourceError::Timeout.detail(), None);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&SourceKind::Text).unwrap();
        assert_eq!(json, "\"text\"");
    }
}
