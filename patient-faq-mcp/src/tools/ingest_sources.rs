use patient_faq_retriever::ingest::{IngestPipeline, IngestRequest};
use rmcp::schemars;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngestSourcesRequest {
    #[schemars(description = "URLs, local file paths or inline text to add to the knowledge base")]
    pub sources: Option<Vec<String>>,
    #[schemars(description = "Local file paths (PDF, HTML, Markdown, text) to add")]
    pub files: Option<Vec<String>>,
    #[schemars(description = "Target knowledge namespace (default: medical)")]
    pub namespace: Option<String>,
    #[schemars(description = "Skip TLS certificate verification when fetching URLs")]
    pub allow_insecure_tls: Option<bool>,
}

impl From<IngestSourcesRequest> for IngestRequest {
    fn from(request: IngestSourcesRequest) -> Self {
        Self {
            sources: request.sources.unwrap_or_default(),
            files: request.files.unwrap_or_default(),
            namespace: request.namespace,
            allow_insecure_tls: request.allow_insecure_tls.unwrap_or(false),
        }
    }
}

/// Ingest sources and return the `{"written": [...]}` report as JSON.
pub async fn ingest_sources(
    pipeline: &IngestPipeline,
    request: IngestSourcesRequest,
) -> Result<String, String> {
    let request = IngestRequest::from(request);
    info!(
        "Processing ingest_sources: {} sources, {} files, namespace={:?}",
        request.sources.len(),
        request.files.len(),
        request.namespace
    );

    match pipeline.ingest(request).await {
        Ok(response) => serde_json::to_string_pretty(&response)
            .map_err(|e| format!("Failed to encode ingest response: {e}")),
        Err(e) => {
            warn!("ingest_sources failed: {}", e);
            Err(e.to_string())
        }
    }
}
