//! # patient-faq-mcp
//!
//! A Model Context Protocol (MCP) server that lets an AI client ground its
//! answers to patient questions in a local, namespaced knowledge base. It
//! wraps `patient-faq-retriever` and exposes the same operations over an
//! HTTP gateway.
//!
//! ## MCP Tools
//!
//! ### `search_docs`
//! Ranked excerpts for a question from one namespace, falling back to the
//! `default` namespace when nothing matches.
//!
//! ### `ingest_sources`
//! Fetch web pages and PDFs, copy local files or store inline text into a
//! namespace.
//!
//! ### `status`
//! Search roots, namespaces and document counts.
//!
//! ## HTTP Gateway
//!
//! `patient-faq-mcp --http 127.0.0.1:8080` serves:
//! - `GET /` health text
//! - `POST /api/tools/searchDocs` with `{query, namespace?, maxResults?}`
//! - `POST /api/tools/ingestSources` with `{sources?, files?, namespace?, allowInsecureTLS?}`
//!
//! ## Integration with Claude Desktop
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "patient-faq": {
//!       "command": "patient-faq-mcp",
//!       "args": ["--root", "/path/to/knowledge"]
//!     }
//!   }
//! }
//! ```

pub mod http;
mod server;
pub mod tools;

pub use server::PatientFaqServer;

use anyhow::Result;
use patient_faq_retriever::{
    config::RetrieverConfig, ingest::IngestPipeline, retrieval::search_engine::SearchEngine,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

/// Configuration for the patient FAQ MCP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Search, ingestion and fetch settings
    pub retriever: RetrieverConfig,
}

impl ServerConfig {
    pub fn new(retriever: RetrieverConfig) -> Self {
        Self { retriever }
    }

    /// Search and ingest only under `root_dir`.
    pub fn for_root(root_dir: PathBuf) -> Self {
        Self::new(RetrieverConfig::for_root(root_dir))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(RetrieverConfig::from_env())
    }
}

/// Run the MCP server over stdio until the client disconnects.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    config.retriever.validate()?;
    info!("Starting patient FAQ MCP server");

    let server = PatientFaqServer::new(config)?;
    server.serve_stdio().await
}

/// Run the HTTP gateway on `addr` until the process is stopped.
pub async fn run_http(config: ServerConfig, addr: SocketAddr) -> Result<()> {
    config.retriever.validate()?;

    let state = http::AppState {
        engine: SearchEngine::new(config.retriever.clone()),
        pipeline: IngestPipeline::new(config.retriever)?,
    };
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, http::router(state)).await?;
    Ok(())
}
