use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::fetcher::{ACCEPT_HTML, ACCEPT_PDF, HttpFetcher, SourceFetcher};
use super::naming::{document_file_name, inline_file_name, is_url, looks_like_path};
use super::normalize::{
    inline_text_document, local_html_document, other_file_document, pdf_document,
    pdf_text_blocking, web_page_document,
};
use super::{IngestRequest, IngestResponse, SourceError, SourceKind, WrittenEntry, local_path};
use crate::config::RetrieverConfig;
use crate::error::{Result, RetrieverError};
use crate::retrieval::namespace::Namespace;

/// Per-request settings shared by every source of one batch.
struct Batch<'a> {
    target: &'a Path,
    bases: &'a [PathBuf],
    allow_insecure_tls: bool,
}

/// Fetches, normalizes and writes sources into a namespace directory.
#[derive(Clone)]
pub struct IngestPipeline {
    config: Arc<RetrieverConfig>,
    fetcher: Arc<dyn SourceFetcher>,
}

impl IngestPipeline {
    /// Pipeline that fetches URLs over the network.
    pub fn new(config: RetrieverConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: RetrieverConfig, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Ingest every source and file of `request` concurrently.
    ///
    /// Only request validation and creating the namespace directory can
    /// fail; each source's own failure becomes an `ERROR:` entry.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestResponse> {
        if request.is_empty() {
            return Err(RetrieverError::NoSources);
        }
        let namespace = Namespace::parse(
            request
                .namespace
                .as_deref()
                .unwrap_or(&self.config.default_namespace),
        )?;

        let target = self.config.knowledge_root.join(&namespace);
        tokio::fs::create_dir_all(&target).await?;

        info!(
            "Ingesting {} sources and {} files into {}",
            request.sources.len(),
            request.files.len(),
            target.display()
        );

        let bases = self.config.local_path_bases();
        let batch = Batch {
            target: &target,
            bases: &bases,
            allow_insecure_tls: request.allow_insecure_tls,
        };

        let (mut written, files) = futures::join!(
            join_all(request.sources.iter().map(|s| self.ingest_source(s, &batch))),
            join_all(request.files.iter().map(|f| self.ingest_file_entry(f, &batch))),
        );
        written.extend(files);

        let failed = written.iter().filter(|entry| entry.is_error()).count();
        for entry in written.iter().filter(|entry| entry.is_error()) {
            warn!("Ingestion of {} failed: {}", entry.source, entry.file);
        }
        info!(
            "Ingested {} of {} entries into '{}'",
            written.len() - failed,
            written.len(),
            namespace
        );

        Ok(IngestResponse { written })
    }

    /// A `sources` entry: URL, resolvable local path or inline text.
    async fn ingest_source(&self, source: &str, batch: &Batch<'_>) -> WrittenEntry {
        if is_url(source) {
            return match self.ingest_url(source, batch).await {
                Ok(entry) => entry,
                Err(e) => WrittenEntry::failure(&e, source, SourceKind::Url, source),
            };
        }

        match local_path::resolve(source, batch.bases).await {
            Ok(path) => self.ingest_resolved(&path, source, batch).await,
            Err(e) if looks_like_path(source) => {
                WrittenEntry::failure(&e, source, SourceKind::File, source)
            }
            Err(_) => match write_inline(source, batch.target).await {
                Ok(entry) => entry,
                Err(e) => WrittenEntry::failure(&e, "inline", SourceKind::File, source),
            },
        }
    }

    /// A `files` entry: always a local path.
    async fn ingest_file_entry(&self, file: &str, batch: &Batch<'_>) -> WrittenEntry {
        match local_path::resolve(file, batch.bases).await {
            Ok(path) => self.ingest_resolved(&path, file, batch).await,
            Err(e) => WrittenEntry::failure(&e, file, SourceKind::File, file),
        }
    }

    async fn ingest_resolved(&self, path: &Path, raw: &str, batch: &Batch<'_>) -> WrittenEntry {
        match ingest_local_file(path, batch.target).await {
            Ok(entry) => entry,
            Err(e) => WrittenEntry::failure(&e, &path.display().to_string(), SourceKind::File, raw),
        }
    }

    async fn ingest_url(
        &self,
        url: &str,
        batch: &Batch<'_>,
    ) -> std::result::Result<WrittenEntry, SourceError> {
        let content = if url.to_lowercase().contains(".pdf") {
            let body = self
                .fetcher
                .fetch(url, ACCEPT_PDF, batch.allow_insecure_tls)
                .await?;
            let text = pdf_text_blocking(body.bytes).await?;
            pdf_document(&text, &body.final_url)
        } else {
            let body = self
                .fetcher
                .fetch(url, ACCEPT_HTML, batch.allow_insecure_tls)
                .await?;
            web_page_document(&String::from_utf8_lossy(&body.bytes), &body.final_url)
        };

        let (file, bytes) = write_document(batch.target, &document_file_name(url), &content).await?;
        Ok(WrittenEntry {
            file,
            bytes,
            kind: SourceKind::Url,
            source: url.to_string(),
        })
    }
}

async fn ingest_local_file(
    path: &Path,
    target: &Path,
) -> std::result::Result<WrittenEntry, SourceError> {
    let label = path.display().to_string();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| SourceError::Read { source })?;
    debug!("Read {} bytes from {}", raw.len(), label);

    let content = match extension.as_str() {
        "pdf" => pdf_document(&pdf_text_blocking(raw).await?, &label),
        "html" | "htm" => local_html_document(&String::from_utf8_lossy(&raw), &label),
        "md" | "mdx" | "txt" => String::from_utf8_lossy(&raw).into_owned(),
        _ => other_file_document(&raw, &label),
    };

    let base_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| label.clone());
    let (file, bytes) = write_document(target, &document_file_name(&base_name), &content).await?;

    Ok(WrittenEntry {
        file,
        bytes,
        kind: SourceKind::File,
        source: label,
    })
}

async fn write_inline(text: &str, target: &Path) -> std::result::Result<WrittenEntry, SourceError> {
    let content = inline_text_document(text);
    let (file, bytes) = write_document(target, &inline_file_name(text), &content).await?;
    Ok(WrittenEntry {
        file,
        bytes,
        kind: SourceKind::Text,
        source: "inline".to_string(),
    })
}

/// Write `content` to `target/name`, replacing any previous version.
///
/// Returns the written path, relative to the working directory when it lies
/// beneath it, and the content's byte length.
async fn write_document(
    target: &Path,
    name: &str,
    content: &str,
) -> std::result::Result<(String, usize), SourceError> {
    let path = target.join(name);
    tokio::fs::write(&path, content)
        .await
        .map_err(|source| SourceError::Write { source })?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());

    let shown = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(&cwd).ok().map(Path::to_path_buf))
        .unwrap_or(path);
    Ok((shown.display().to_string(), content.len()))
}
