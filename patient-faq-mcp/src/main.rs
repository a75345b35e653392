use anyhow::Result;
use clap::{Arg, Command};
use patient_faq_mcp::{ServerConfig, run_http, run_server};
use patient_faq_retriever::config::RetrieverConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("patient-faq-mcp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Patient FAQ Model Context Protocol server")
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("Knowledge root to search and ingest into")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("http")
                .long("http")
                .value_name("ADDR")
                .help("Serve the HTTP gateway on ADDR instead of MCP over stdio")
                .value_parser(clap::value_parser!(SocketAddr)),
        )
        .get_matches();

    let mut retriever = match matches.get_one::<PathBuf>("config") {
        Some(path) => RetrieverConfig::load(path)?,
        None => RetrieverConfig::from_env(),
    };
    if let Some(root_dir) = matches.get_one::<PathBuf>("root") {
        retriever.search_roots = vec![root_dir.clone()];
        retriever.knowledge_root = root_dir.clone();
    }
    let config = ServerConfig::new(retriever);

    match matches.get_one::<SocketAddr>("http") {
        Some(addr) => run_http(config, *addr).await,
        None => run_server(config).await,
    }
}
