use patient_faq_retriever::retrieval::search_engine::{SearchEngine, SearchRequest};
use rmcp::schemars;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchDocsRequest {
    #[schemars(description = "Patient question or keywords; wrap exact phrases in double quotes")]
    pub query: String,
    #[schemars(description = "Knowledge namespace to search (default: medical)")]
    pub namespace: Option<String>,
    #[schemars(description = "Maximum number of excerpts to return, 1 to 50 (default: 6)")]
    pub max_results: Option<usize>,
}

/// Search a namespace, retrying in the fallback namespace when nothing matches.
///
/// Validation and not-found conditions are part of the JSON response, so the
/// tool only fails when the response cannot be encoded.
pub async fn search_docs(engine: &SearchEngine, request: SearchDocsRequest) -> Result<String, String> {
    info!(
        "Processing search_docs: query='{}', namespace={:?}, max_results={:?}",
        request.query, request.namespace, request.max_results
    );

    let response = engine
        .search_with_fallback(SearchRequest {
            query: request.query,
            namespace: request.namespace,
            max_results: request.max_results,
        })
        .await;

    serde_json::to_string_pretty(&response)
        .map_err(|e| format!("Failed to encode search response: {e}"))
}
