use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};

use super::types::*;
use crate::config::RetrieverConfig;
use crate::error::Result;
use crate::retrieval::namespace::{Namespace, dir_exists};
use crate::retrieval::search_engine::list_documents;

/// Read-only diagnostics over the knowledge roots
pub struct StatusApi;

impl StatusApi {
    /// Report every search root and every namespace found under them.
    ///
    /// A namespace present under several roots is reported once, for the
    /// directory search would use.
    pub async fn corpus_status(config: &RetrieverConfig) -> Result<CorpusStatus> {
        let mut search_roots = Vec::with_capacity(config.search_roots.len());
        for root in &config.search_roots {
            search_roots.push(RootStatus {
                path: root.clone(),
                exists: dir_exists(root).await,
            });
        }

        let resolver = config.resolver();
        let mut namespaces = Vec::new();
        for name in Self::list_namespaces(config).await? {
            let Ok(namespace) = Namespace::parse(&name) else {
                continue;
            };
            let dir = resolver.resolve(&namespace).await;
            match Self::namespace_status(&namespace, &dir, config.max_file_size).await {
                Ok(status) => namespaces.push(status),
                Err(e) => warn!("Skipping namespace {}: {}", namespace, e),
            }
        }

        Ok(CorpusStatus {
            search_roots,
            knowledge_root: config.knowledge_root.clone(),
            default_namespace: config.default_namespace.clone(),
            fallback_namespace: config.fallback_namespace.clone(),
            max_file_size: config.max_file_size,
            namespaces,
            generated_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Names of valid namespace directories across all search roots, sorted
    /// and deduplicated. Missing or unreadable roots and entries are skipped.
    pub async fn list_namespaces(config: &RetrieverConfig) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();
        for root in &config.search_roots {
            let mut entries = match tokio::fs::read_dir(root).await {
                Ok(entries) => entries,
                Err(e) => {
                    debug!("Skipping search root {}: {}", root.display(), e);
                    continue;
                }
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Stopped listing {}: {}", root.display(), e);
                        break;
                    }
                };
                let name = entry.file_name().to_string_lossy().into_owned();
                if Namespace::parse(&name).is_err() {
                    continue;
                }
                if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                    names.insert(name);
                }
            }
        }
        Ok(names.into_iter().collect())
    }

    /// Document statistics for one namespace directory.
    pub async fn namespace_status(
        namespace: &Namespace,
        dir: &Path,
        max_file_size: u64,
    ) -> Result<NamespaceStatus> {
        let mut status = NamespaceStatus {
            name: namespace.to_string(),
            path: dir.to_path_buf(),
            documents: 0,
            oversized_documents: 0,
            total_bytes: 0,
            last_modified: None,
        };

        for path in list_documents(dir).await? {
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Failed to get metadata for {}: {}", path.display(), e);
                    continue;
                }
            };

            if metadata.len() > max_file_size {
                status.oversized_documents += 1;
                continue;
            }
            status.documents += 1;
            status.total_bytes += metadata.len();

            if let Ok(modified) = metadata.modified() {
                let timestamp = chrono::DateTime::<chrono::Utc>::from(modified).timestamp();
                status.last_modified = Some(status.last_modified.map_or(timestamp, |t| t.max(timestamp)));
            }
        }

        Ok(status)
    }
}
