use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Overview of every configured knowledge root and the namespaces they hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStatus {
    /// Search roots in priority order
    pub search_roots: Vec<RootStatus>,
    /// Root that ingestion writes under
    pub knowledge_root: PathBuf,
    pub default_namespace: String,
    pub fallback_namespace: Option<String>,
    /// Size limit above which documents are skipped
    pub max_file_size: u64,
    /// Namespaces as search resolves them, sorted by name
    pub namespaces: Vec<NamespaceStatus>,
    /// When the report was generated (Unix timestamp)
    pub generated_at: i64,
}

impl CorpusStatus {
    pub fn total_documents(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.documents).sum()
    }

    pub fn namespace(&self, name: &str) -> Option<&NamespaceStatus> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootStatus {
    pub path: PathBuf,
    pub exists: bool,
}

/// Document statistics of one namespace directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceStatus {
    pub name: String,
    /// Directory the namespace resolves to
    pub path: PathBuf,
    /// Searchable documents within the size limit
    pub documents: usize,
    /// Documents skipped by search for exceeding the size limit
    pub oversized_documents: usize,
    /// Bytes across searchable documents
    pub total_bytes: u64,
    /// Most recent document modification (Unix timestamp)
    pub last_modified: Option<i64>,
}
