//! Runtime configuration for search, ingestion and network fetches.
//!
//! Every field has a default, so an empty TOML file is a valid configuration:
//!
//! ```toml
//! search_roots = ["/srv/knowledge", "./knowledge"]
//! knowledge_root = "/srv/knowledge"
//! default_namespace = "medical"
//! fallback_namespace = "default"
//! max_file_size = 2097152
//!
//! [fetch]
//! timeout_secs = 45
//! max_response_bytes = 209715200
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrieverError};
use crate::retrieval::namespace::{Namespace, NamespaceResolver};

/// Environment variable naming a knowledge root that takes priority.
pub const KNOWLEDGE_ROOT_ENV: &str = "PATIENT_FAQ_KNOWLEDGE_ROOT";

pub const DEFAULT_NAMESPACE: &str = "medical";
pub const DEFAULT_FALLBACK_NAMESPACE: &str = "default";
/// 2 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 45;
/// 200 MiB
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 200 * 1024 * 1024;

/// Settings for the HTTP source fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_response_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: concat!("patient-faq-agent/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration shared by the search engine, the ingestion pipeline and
/// the status API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Ordered namespace search roots, highest priority first
    pub search_roots: Vec<PathBuf>,
    /// Directory that ingested documents are written under
    pub knowledge_root: PathBuf,
    pub default_namespace: String,
    /// Namespace retried when the requested one yields nothing
    pub fallback_namespace: Option<String>,
    /// Documents larger than this many bytes are skipped
    pub max_file_size: u64,
    /// Bases that relative local file paths are resolved against.
    /// Empty means [`RetrieverConfig::default_local_path_bases`].
    pub local_path_bases: Vec<PathBuf>,
    pub fetch: FetchConfig,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            search_roots: default_search_roots(),
            knowledge_root: PathBuf::from("knowledge"),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            fallback_namespace: Some(DEFAULT_FALLBACK_NAMESPACE.to_string()),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            local_path_bases: Vec::new(),
            fetch: FetchConfig::default(),
        }
    }
}

impl RetrieverConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides_from(|key| std::env::var(key).ok());
        config
    }

    /// Load a TOML file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw)?;
        config.apply_env_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// A configuration that searches and writes only under `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            search_roots: vec![root.clone()],
            knowledge_root: root,
            ..Self::default()
        }
    }

    /// Apply overrides read through `lookup`.
    ///
    /// A non-blank [`KNOWLEDGE_ROOT_ENV`] is prepended to the search roots
    /// and becomes the ingestion root.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(KNOWLEDGE_ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            let root = PathBuf::from(root.trim());
            self.search_roots.retain(|existing| existing != &root);
            self.search_roots.insert(0, root.clone());
            self.knowledge_root = root;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search_roots.is_empty() {
            return Err(RetrieverError::invalid_config(
                "search_roots must name at least one directory",
            ));
        }
        if self.max_file_size == 0 {
            return Err(RetrieverError::invalid_config(
                "max_file_size must be greater than zero",
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(RetrieverError::invalid_config(
                "fetch.timeout_secs must be greater than zero",
            ));
        }
        if self.fetch.max_response_bytes == 0 {
            return Err(RetrieverError::invalid_config(
                "fetch.max_response_bytes must be greater than zero",
            ));
        }
        Namespace::parse(&self.default_namespace)?;
        if let Some(fallback) = &self.fallback_namespace {
            Namespace::parse(fallback)?;
        }
        Ok(())
    }

    pub fn resolver(&self) -> NamespaceResolver {
        NamespaceResolver::new(self.search_roots.clone())
    }

    /// Configured local path bases, or the defaults when none are set.
    pub fn local_path_bases(&self) -> Vec<PathBuf> {
        if self.local_path_bases.is_empty() {
            self.default_local_path_bases()
        } else {
            self.local_path_bases.clone()
        }
    }

    /// The knowledge root's parent, the working directory and up to three
    /// of its ancestors.
    pub fn default_local_path_bases(&self) -> Vec<PathBuf> {
        let mut bases = Vec::new();
        if let Some(parent) = self.knowledge_root.parent() {
            let parent = if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            };
            bases.push(parent);
        }
        for base in [".", "..", "../..", "../../.."] {
            let base = PathBuf::from(base);
            if !bases.contains(&base) {
                bases.push(base);
            }
        }
        bases
    }
}

/// `<exe dir>/knowledge`, `<exe dir>/../knowledge`, `./knowledge`, `../knowledge`.
pub fn default_search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir.join("knowledge"));
        roots.push(exe_dir.join("..").join("knowledge"));
    }
    roots.push(PathBuf::from("knowledge"));
    roots.push(PathBuf::from("..").join("knowledge"));
    roots
}
