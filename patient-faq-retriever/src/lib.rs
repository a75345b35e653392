//! patient-faq-retriever: namespaced relevance search over a local FAQ corpus
//!
//! This crate grounds a patient question-answering agent in a small corpus of
//! Markdown and text documents. Documents live in flat namespace directories
//! under one or more knowledge roots; a search scores every document in one
//! namespace against the query's phrases and words and returns the best
//! excerpts. The ingestion pipeline fills namespaces from web pages, PDFs,
//! local files and inline text.
//!
//! ## Key Modules
//!
//! - **[`retrieval`]**: tokenizer, namespace resolver, scorer, ranker and search engine
//! - **[`ingest`]**: fetching and normalizing sources into namespace directories
//! - **[`status`]**: read-only diagnostics over the knowledge roots
//! - **[`config`]**: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use patient_faq_retriever::config::RetrieverConfig;
//! use patient_faq_retriever::retrieval::search_engine::{SearchEngine, SearchRequest};
//!
//! # async fn example() {
//! let engine = SearchEngine::new(RetrieverConfig::for_root("./knowledge"));
//! let response = engine
//!     .search(SearchRequest::new(r#""flu shot" side effects"#).with_namespace("medical"))
//!     .await;
//! for result in response.results {
//!     println!("{} ({}): {}", result.file, result.score, result.excerpt);
//! }
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! query ─→ Tokenizer ─→ tokens ─────────────┐
//!                                           ↓
//! namespace ─→ Resolver ─→ directory ─→ Scorer (task per document) ─→ Ranker ─→ results
//!                              ↑
//! sources ─→ IngestPipeline ───┘
//! ```

pub mod config;
pub mod error;
pub mod ingest;
pub mod retrieval;
pub mod status;

pub use config::RetrieverConfig;
pub use error::{Result, RetrieverError};
