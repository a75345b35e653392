use patient_faq_retriever::config::RetrieverConfig;
use patient_faq_retriever::status::StatusApi;
use tracing::info;

/// Corpus status as JSON: search roots, namespaces and document counts.
pub async fn status(config: &RetrieverConfig) -> Result<String, String> {
    info!("Processing status request");

    let status = StatusApi::corpus_status(config)
        .await
        .map_err(|e| format!("Failed to collect corpus status: {e}"))?;

    serde_json::to_string_pretty(&status).map_err(|e| format!("Failed to encode status: {e}"))
}
