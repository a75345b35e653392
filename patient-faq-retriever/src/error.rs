//! Error types for the retrieval and ingestion system

use std::path::PathBuf;

use crate::retrieval::namespace::NAMESPACE_PATTERN;

/// Result type for retriever operations.
///
/// This is a convenience type alias that uses [`RetrieverError`] as the error type.
pub type Result<T> = std::result::Result<T, RetrieverError>;

/// Request-level errors for search and ingestion.
///
/// Per-document and per-source failures never surface through this type: the
/// search engine drops unreadable documents and the ingestion pipeline turns
/// failed sources into inline `ERROR:` entries (see [`crate::ingest::SourceError`]).
/// What remains here falls into three categories:
///
/// - **Validation**: bad or missing request fields, rejected before any I/O
/// - **Not found**: the namespace directory or its documents are absent
/// - **Infrastructure**: configuration and filesystem failures
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    /// A required request field was absent or blank
    #[error("Missing required '{field}'.")]
    MissingField { field: &'static str },

    /// Namespace does not match [`NAMESPACE_PATTERN`]
    #[error("Invalid namespace '{namespace}'. Allowed pattern: {}", NAMESPACE_PATTERN)]
    InvalidNamespace { namespace: String },

    /// Ingestion request named neither sources nor files
    #[error("Provide at least one entry in `sources` or `files`.")]
    NoSources,

    /// The resolved namespace directory does not exist
    #[error("Knowledge namespace '{namespace}' not found at {}.", path.display())]
    NamespaceNotFound { namespace: String, path: PathBuf },

    /// The namespace directory exists but could not be listed
    #[error("Failed to read knowledge directory: {source}")]
    ReadDirectory {
        #[source]
        source: std::io::Error,
    },

    /// The namespace directory holds no eligible documents
    #[error("No FAQ files found in '{namespace}' namespace.")]
    NoDocuments { namespace: String },

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    /// The HTTP client for source fetches could not be built
    #[error("Failed to build HTTP client: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },

    /// IO errors outside the per-document and per-source loops
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl RetrieverError {
    /// Create an invalid configuration error with a custom message.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether the error is a rejected request rather than a runtime failure.
    ///
    /// Surfaces map validation errors to client errors (HTTP 400) and
    /// everything else to server errors.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidNamespace { .. } | Self::NoSources
        )
    }

    /// Stable machine-readable code for logs and JSON payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::InvalidNamespace { .. } => "INVALID_NAMESPACE",
            Self::NoSources => "NO_SOURCES",
            Self::NamespaceNotFound { .. } => "NAMESPACE_NOT_FOUND",
            Self::ReadDirectory { .. } => "READ_DIRECTORY_FAILED",
            Self::NoDocuments { .. } => "NO_DOCUMENTS",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::ConfigParse { .. } => "CONFIG_PARSE_FAILED",
            Self::HttpClient { .. } => "HTTP_CLIENT_FAILED",
            Self::Io { .. } => "IO_ERROR",
        }
    }
}
