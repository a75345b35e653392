use clap::{Parser, Subcommand};
use patient_faq_retriever::{
    config::RetrieverConfig,
    ingest::{IngestPipeline, IngestRequest, IngestResponse},
    retrieval::search_engine::{SearchEngine, SearchRequest, SearchResponse},
    status::{CorpusStatus, StatusApi},
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Search and maintain the patient FAQ knowledge corpus.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use this directory as the only search root and as the ingestion root
    #[arg(short, long, global = true)]
    knowledge_root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "summary")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search one namespace for documents relevant to a question
    Search {
        /// Question or keywords; wrap phrases in double quotes
        query: String,
        /// Namespace to search (defaults to the configured namespace)
        #[arg(short, long)]
        namespace: Option<String>,
        /// Maximum number of results (1-50)
        #[arg(short, long)]
        max_results: Option<usize>,
        /// Retry in the fallback namespace when nothing matches
        #[arg(long)]
        fallback: bool,
    },
    /// Fetch, normalize and store sources in a namespace
    Ingest {
        /// URL, local path or inline text (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<String>,
        /// Local file path (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,
        /// Target namespace (defaults to the configured namespace)
        #[arg(short, long)]
        namespace: Option<String>,
        /// Skip TLS certificate verification for URL sources
        #[arg(long)]
        allow_insecure_tls: bool,
    },
    /// Show knowledge roots and namespace statistics
    Status,
    /// List namespaces found under the search roots
    Namespaces,
}

#[derive(Debug, Clone, PartialEq)]
enum OutputFormat {
    Summary,
    Full,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "full" => Ok(OutputFormat::Full),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {s}")),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    match args.command {
        Commands::Search {
            query,
            namespace,
            max_results,
            fallback,
        } => {
            let engine = SearchEngine::new(config);
            let request = SearchRequest {
                query,
                namespace,
                max_results,
            };
            let response = if fallback {
                engine.search_with_fallback(request).await
            } else {
                engine.search(request).await
            };
            print_search(&response, &args.format)
        }
        Commands::Ingest {
            sources,
            files,
            namespace,
            allow_insecure_tls,
        } => {
            let pipeline = IngestPipeline::new(config)?;
            let response = pipeline
                .ingest(IngestRequest {
                    sources,
                    files,
                    namespace,
                    allow_insecure_tls,
                })
                .await?;
            print_ingest(&response, &args.format)
        }
        Commands::Status => {
            let status = StatusApi::corpus_status(&config).await?;
            print_status(&status, &args.format)
        }
        Commands::Namespaces => {
            let names = StatusApi::list_namespaces(&config).await?;
            if args.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in names {
                    println!("{name}");
                }
            }
            Ok(())
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<RetrieverConfig> {
    let mut config = match &args.config {
        Some(path) => RetrieverConfig::load(path)?,
        None => RetrieverConfig::from_env(),
    };
    if let Some(root) = &args.knowledge_root {
        config.search_roots = vec![root.clone()];
        config.knowledge_root = root.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_search(response: &SearchResponse, format: &OutputFormat) -> anyhow::Result<()> {
    if *format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }
    if let Some(error) = &response.error {
        return Err(anyhow::anyhow!("{error}"));
    }
    if let Some(info) = &response.info {
        println!("{info}");
        return Ok(());
    }

    println!(
        "Found {} results in '{}':",
        response.results.len(),
        response.namespace.as_deref().unwrap_or_default()
    );
    for (rank, result) in response.results.iter().enumerate() {
        match format {
            OutputFormat::Full => {
                println!("#{} {}", rank + 1, result.file);
                println!("Score: {}", result.score);
                println!("Match Index: {}", result.match_index);
                println!(
                    "Token Matches: {} | Occurrences: {}",
                    result.token_matches, result.occurrences
                );
                println!("Excerpt:\n{}", result.excerpt);
                println!("---");
            }
            _ => {
                println!(
                    "  {}. {} | score {} | {}",
                    rank + 1,
                    result.file,
                    result.score,
                    result.excerpt.chars().take(100).collect::<String>()
                );
            }
        }
    }
    Ok(())
}

fn print_ingest(response: &IngestResponse, format: &OutputFormat) -> anyhow::Result<()> {
    if *format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    let failed = response.written.iter().filter(|e| e.is_error()).count();
    println!(
        "Processed {} entries ({} failed):",
        response.written.len(),
        failed
    );
    for entry in &response.written {
        if entry.is_error() {
            println!("  ✗ {} ({})", entry.file, entry.source);
        } else {
            println!(
                "  ✓ {} | {} bytes | {:?} | {}",
                entry.file, entry.bytes, entry.kind, entry.source
            );
        }
    }
    Ok(())
}

fn print_status(status: &CorpusStatus, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(status)?);
        }
        OutputFormat::Summary | OutputFormat::Full => {
            println!("Search roots:");
            for root in &status.search_roots {
                println!(
                    "  {} {}",
                    if root.exists { "✓" } else { "✗" },
                    root.path.display()
                );
            }
            println!("Knowledge root: {}", status.knowledge_root.display());
            println!("Default namespace: {}", status.default_namespace);
            if let Some(fallback) = &status.fallback_namespace {
                println!("Fallback namespace: {fallback}");
            }
            println!("Namespaces: {}", status.namespaces.len());
            for ns in &status.namespaces {
                println!(
                    "  {} | {} documents | {} bytes",
                    ns.name, ns.documents, ns.total_bytes
                );
                if *format == OutputFormat::Full {
                    println!("    Path: {}", ns.path.display());
                    println!("    Oversized: {}", ns.oversized_documents);
                    if let Some(modified) = ns.last_modified {
                        println!("    Last modified: {modified}");
                    }
                }
            }
        }
    }
    Ok(())
}
