//! Namespace validation and resolution to a directory on disk.
//!
//! A namespace is a flat directory of documents under one of the configured
//! search roots. Resolution never fails: when no candidate exists the
//! highest-priority candidate is returned so the caller's existence check
//! reports a predictable path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, RetrieverError};

/// Allowed shape of a namespace identifier.
pub const NAMESPACE_PATTERN: &str = "^[a-zA-Z0-9._-]+$";

static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NAMESPACE_PATTERN).expect("namespace pattern is valid"));

/// A validated namespace name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Validate a raw namespace. Surrounding whitespace is ignored.
    ///
    /// `.` and `..` match the pattern but would escape the knowledge root, so
    /// they are rejected too.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RetrieverError::MissingField { field: "namespace" });
        }
        if !NAMESPACE_RE.is_match(trimmed) || trimmed == "." || trimmed == ".." {
            return Err(RetrieverError::InvalidNamespace {
                namespace: trimmed.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for Namespace {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// Maps namespaces onto the first existing directory among ordered search roots.
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    search_roots: Vec<PathBuf>,
}

impl NamespaceResolver {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        Self { search_roots }
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    /// All candidate directories for a namespace, highest priority first.
    pub fn candidates(&self, namespace: &Namespace) -> Vec<PathBuf> {
        self.search_roots
            .iter()
            .map(|root| root.join(namespace))
            .collect()
    }

    /// First existing candidate directory, or the first candidate when none exist.
    pub async fn resolve(&self, namespace: &Namespace) -> PathBuf {
        let candidates = self.candidates(namespace);
        for candidate in &candidates {
            if dir_exists(candidate).await {
                tracing::debug!(
                    "Resolved namespace '{}' to {}",
                    namespace,
                    candidate.display()
                );
                return candidate.clone();
            }
        }

        candidates
            .into_iter()
            .next()
            .unwrap_or_else(|| PathBuf::from("knowledge").join(namespace))
    }
}

pub(crate) async fn dir_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
