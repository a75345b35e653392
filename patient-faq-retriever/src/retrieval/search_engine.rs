//! One search call end to end: validate, resolve, score concurrently, rank.
//!
//! Failures before scoring come back as a response with an `error` message
//! instead of an `Err`, so every surface can hand the response to its caller
//! as-is. Per-document failures are logged and treated as non-hits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::namespace::{Namespace, NamespaceResolver, dir_exists};
use super::ranking::{MAX_RESULTS, MIN_RESULTS, SearchResult, rank};
use super::scoring::{Hit, score_document};
use super::tokenizer::extract_tokens;
use crate::config::RetrieverConfig;
use crate::error::{Result, RetrieverError};

pub const DEFAULT_MAX_RESULTS: usize = 6;

/// Extensions, lowercase, of files that count as documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "mdx", "txt"];

pub const NO_SEARCHABLE_TERMS: &str = "No searchable terms in query.";
pub const NO_MATCHES: &str = "No matching information found.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    /// Defaults to the configured namespace when absent
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Requested result count clamped to `1..=50`.
    pub fn limit(&self) -> usize {
        self.max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(MIN_RESULTS, MAX_RESULTS)
    }
}

/// Outcome of a search. Exactly one of `error`, `info` or a non-empty
/// `results` describes what happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl SearchResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            sources: Some(Vec::new()),
            info: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn found(results: Vec<SearchResult>, query: &str, namespace: &Namespace) -> Self {
        let sources = results.iter().map(|r| r.file.clone()).collect();
        Self {
            results,
            sources: Some(sources),
            query: Some(query.to_string()),
            namespace: Some(namespace.to_string()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// What happened to one document inside a scoring task.
enum DocumentOutcome {
    Scored(Option<Hit>),
    Oversized(u64),
    NotAFile,
    Failed(std::io::Error),
}

#[derive(Debug, Clone)]
pub struct SearchEngine {
    config: Arc<RetrieverConfig>,
    resolver: NamespaceResolver,
}

impl SearchEngine {
    pub fn new(config: RetrieverConfig) -> Self {
        let resolver = config.resolver();
        Self {
            config: Arc::new(config),
            resolver,
        }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Run a search. Never fails; problems are reported in the response.
    pub async fn search(&self, request: SearchRequest) -> SearchResponse {
        match self.try_search(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Search failed: {}", e);
                SearchResponse::error(e.to_string())
            }
        }
    }

    /// Search the requested namespace and, when it yields no results, the
    /// configured fallback namespace.
    ///
    /// Validation errors are returned without retrying. When the fallback
    /// finds nothing either, the primary response is returned.
    pub async fn search_with_fallback(&self, request: SearchRequest) -> SearchResponse {
        let primary = match self.try_search(&request).await {
            Ok(response) if !response.results.is_empty() => return response,
            Ok(response) => response,
            Err(e) => {
                let response = SearchResponse::error(e.to_string());
                if e.is_validation() {
                    return response;
                }
                response
            }
        };

        let requested = request
            .namespace
            .as_deref()
            .unwrap_or(&self.config.default_namespace)
            .trim();
        let Some(fallback) = self
            .config
            .fallback_namespace
            .as_deref()
            .filter(|fallback| *fallback != requested)
        else {
            return primary;
        };

        debug!(
            "No results in namespace '{}', retrying in '{}'",
            requested, fallback
        );
        match self.try_search(&request.clone().with_namespace(fallback)).await {
            Ok(response) if !response.results.is_empty() => response,
            _ => primary,
        }
    }

    /// Run a search, returning validation and not-found conditions as errors.
    pub async fn try_search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(RetrieverError::MissingField { field: "query" });
        }
        let namespace = Namespace::parse(
            request
                .namespace
                .as_deref()
                .unwrap_or(&self.config.default_namespace),
        )?;

        let dir = self.resolver.resolve(&namespace).await;
        if !dir_exists(&dir).await {
            return Err(RetrieverError::NamespaceNotFound {
                namespace: namespace.to_string(),
                path: dir,
            });
        }

        let documents = list_documents(&dir).await?;
        if documents.is_empty() {
            return Err(RetrieverError::NoDocuments {
                namespace: namespace.to_string(),
            });
        }

        let tokens = extract_tokens(query);
        if tokens.is_empty() {
            debug!("Query {:?} has no searchable terms", query);
            return Ok(SearchResponse::info(NO_SEARCHABLE_TERMS));
        }

        let hits = self.score_documents(documents, tokens.tokens()).await;
        info!(
            "Search in '{}' for {:?}: {} matching documents",
            namespace,
            query,
            hits.len()
        );
        if hits.is_empty() {
            return Ok(SearchResponse::info(NO_MATCHES));
        }

        let results = rank(hits, request.limit());
        Ok(SearchResponse::found(results, query, &namespace))
    }

    /// Score every document on its own task and collect the hits.
    async fn score_documents(&self, documents: Vec<PathBuf>, tokens: Vec<String>) -> Vec<Hit> {
        let tokens: Arc<[String]> = tokens.into();
        let max_file_size = self.config.max_file_size;
        let mut tasks = JoinSet::new();

        for path in documents {
            let tokens = Arc::clone(&tokens);
            tasks.spawn(async move {
                let outcome = score_file(&path, &tokens, max_file_size).await;
                (path, outcome)
            });
        }

        let mut hits = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, DocumentOutcome::Scored(Some(hit)))) => hits.push(hit),
                Ok((path, DocumentOutcome::Scored(None))) => {
                    debug!("No match in {}", path.display());
                }
                Ok((path, DocumentOutcome::Oversized(size))) => {
                    warn!(
                        "Skipping {}: {} bytes exceeds limit of {} bytes",
                        path.display(),
                        size,
                        max_file_size
                    );
                }
                Ok((path, DocumentOutcome::NotAFile)) => {
                    debug!("Skipping {}: not a regular file", path.display());
                }
                Ok((path, DocumentOutcome::Failed(e))) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                }
                Err(e) => warn!("Scoring task failed: {}", e),
            }
        }
        hits
    }
}

async fn score_file(path: &Path, tokens: &[String], max_file_size: u64) -> DocumentOutcome {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) => return DocumentOutcome::Failed(e),
    };
    if !metadata.is_file() {
        return DocumentOutcome::NotAFile;
    }
    if metadata.len() > max_file_size {
        return DocumentOutcome::Oversized(metadata.len());
    }

    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => return DocumentOutcome::Failed(e),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    DocumentOutcome::Scored(score_document(tokens, &text, &file_name))
}

/// Whether a file name carries a document extension, ignoring case.
pub fn is_document_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Entries directly inside `dir` whose names carry a document extension,
/// sorted by path.
pub async fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|source| RetrieverError::ReadDirectory { source })?;

    let mut documents = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| RetrieverError::ReadDirectory { source })?
    {
        if is_document_name(&entry.file_name().to_string_lossy()) {
            documents.push(entry.path());
        }
    }
    documents.sort();
    Ok(documents)
}
