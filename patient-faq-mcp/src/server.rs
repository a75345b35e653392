use crate::ServerConfig;
use crate::tools::{
    self, ingest_sources::IngestSourcesRequest, search_docs::SearchDocsRequest,
};
use anyhow::Result;
use patient_faq_retriever::{ingest::IngestPipeline, retrieval::search_engine::SearchEngine};
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use tracing::info;

/// MCP server exposing corpus search, ingestion and status tools
#[derive(Clone)]
pub struct PatientFaqServer {
    config: ServerConfig,
    engine: SearchEngine,
    pipeline: IngestPipeline,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PatientFaqServer {
    /// Create a server over the given configuration
    pub fn new(config: ServerConfig) -> Result<Self> {
        info!(
            "Initializing patient FAQ MCP server with search roots: {:?}",
            config.retriever.search_roots
        );

        let engine = SearchEngine::new(config.retriever.clone());
        let pipeline = IngestPipeline::new(config.retriever.clone())?;
        Ok(Self {
            config,
            engine,
            pipeline,
            tool_router: Self::tool_router(),
        })
    }

    /// Search tool - ranked excerpts from one knowledge namespace
    #[tool(
        description = "Search the patient FAQ knowledge base. Returns JSON with ranked excerpts (file, excerpt, matchIndex, occurrences, tokenMatches, score) and the source file names, or an error/info message."
    )]
    async fn search_docs(
        &self,
        Parameters(request): Parameters<SearchDocsRequest>,
    ) -> Result<String, String> {
        tools::search_docs::search_docs(&self.engine, request).await
    }

    /// Ingestion tool - add URLs, files and inline text to a namespace
    #[tool(
        description = "Download and normalize medical sources (URLs, local files, or raw text) into the knowledge base for patient FAQ use."
    )]
    async fn ingest_sources(
        &self,
        Parameters(request): Parameters<IngestSourcesRequest>,
    ) -> Result<String, String> {
        tools::ingest_sources::ingest_sources(&self.pipeline, request).await
    }

    /// Status tool - knowledge roots and namespace statistics
    #[tool(
        description = "Show knowledge base status: search roots, namespaces, document counts and sizes."
    )]
    async fn status(&self) -> Result<String, String> {
        tools::status::status(&self.config.retriever).await
    }
}

impl PatientFaqServer {
    /// Serve the MCP server using stdio transport
    pub async fn serve_stdio(self) -> Result<()> {
        info!("Starting MCP server with stdio transport");

        let server = self.serve(stdio()).await?;
        let quit_reason = server.waiting().await?;

        info!("MCP server quit: {:?}", quit_reason);
        Ok(())
    }
}

#[tool_handler]
impl ServerHandler for PatientFaqServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Patient FAQ MCP Server - searches and maintains a namespaced knowledge base of patient-facing medical documents".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
