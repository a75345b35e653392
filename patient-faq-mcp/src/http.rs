//! HTTP gateway exposing search and ingestion as JSON endpoints.
//!
//! Handlers run the retriever work on a spawned task so that a panic turns
//! into a `500` response instead of taking the connection down.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use patient_faq_retriever::{
    RetrieverError,
    ingest::{IngestPipeline, IngestRequest},
    retrieval::search_engine::{SearchEngine, SearchRequest},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

pub const HEALTH_TEXT: &str = "Patient FAQ Agent - OK";
pub const UNEXPECTED_ERROR: &str = "unexpected error";
const MAX_ERROR_CHARS: usize = 200;

/// Shared state for the gateway.
#[derive(Clone)]
pub struct AppState {
    pub engine: SearchEngine,
    pub pipeline: IngestPipeline,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocsBody {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Build the router with all routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/tools/searchDocs", post(search_docs))
        .route("/api/tools/ingestSources", post(ingest_sources))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

async fn search_docs(State(state): State<Arc<AppState>>, Json(body): Json<SearchDocsBody>) -> Response {
    let Some(query) = body.query.filter(|q| !q.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "query is required");
    };

    let engine = state.engine.clone();
    let request = SearchRequest {
        query,
        namespace: body.namespace,
        max_results: body.max_results,
    };
    match tokio::spawn(async move { engine.search(request).await }).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("searchDocs task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR)
        }
    }
}

async fn ingest_sources(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestRequest>,
) -> Response {
    if request.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, &RetrieverError::NoSources.to_string());
    }

    let pipeline = state.pipeline.clone();
    match tokio::spawn(async move { pipeline.ingest(request).await }).await {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(e)) if e.is_validation() => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        Ok(Err(e)) => {
            error!("ingestSources failed [{}]: {}", e.code(), e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &sanitize_error_message(&e.to_string()),
            )
        }
        Err(e) => {
            error!("ingestSources task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// First line of `message`, trimmed and capped in length.
pub fn sanitize_error_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default().trim();
    if first_line.is_empty() {
        return UNEXPECTED_ERROR.to_string();
    }
    first_line.chars().take(MAX_ERROR_CHARS).collect()
}
