//! Tool implementations for the patient FAQ MCP server
//!
//! Each tool is a plain async function over the retriever types so it can be
//! exercised without an MCP transport.

pub mod ingest_sources;
pub mod search_docs;
pub mod status;
