//! Integration tests for namespaced search over on-disk corpora
//!
//! These tests verify:
//! - End-to-end ranking over a small medical corpus
//! - Deterministic tie-breaking and result truncation
//! - Filename-only matches
//! - Namespace validation, resolution and fallback
//! - Tolerance of unreadable documents

use anyhow::Result;
use patient_faq_retriever::config::RetrieverConfig;
use patient_faq_retriever::retrieval::search_engine::{
    NO_MATCHES, NO_SEARCHABLE_TERMS, SearchEngine, SearchRequest,
};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Helper to create a namespace directory with the given documents
fn write_namespace(root: &Path, namespace: &str, docs: &[(&str, &[u8])]) -> Result<PathBuf> {
    let dir = root.join(namespace);
    std::fs::create_dir_all(&dir)?;
    for (name, content) in docs {
        std::fs::write(dir.join(name), content)?;
    }
    Ok(dir)
}

fn files(response: &patient_faq_retriever::retrieval::search_engine::SearchResponse) -> Vec<&str> {
    response.results.iter().map(|r| r.file.as_str()).collect()
}

/// Test the canonical flu/diabetes scenario
#[tokio::test]
async fn test_single_term_query_finds_one_document() -> Result<()> {
    let temp_dir = tempdir()?;
    write_namespace(
        temp_dir.path(),
        "medical",
        &[
            ("flu.md", b"Flu symptoms include fever and cough"),
            ("diabetes.md", b"Diabetes management requires monitoring glucose"),
        ],
    )?;

    let engine = SearchEngine::new(RetrieverConfig::for_root(temp_dir.path()));
    let response = engine
        .search(SearchRequest::new("fever").with_namespace("medical"))
        .await;

    assert_eq!(response.error, None);
    assert_eq!(response.results.len(), 1);
    let result = &response.results[0];
    assert_eq!(result.file, "flu.md");
    assert_eq!(result.occurrences, 1);
    assert_eq!(result.token_matches, 1);
    assert_eq!(result.match_index, 21);
    assert_eq!(result.excerpt, "Flu symptoms include fever and cough");
    assert_eq!(response.sources, Some(vec!["flu.md".to_string()]));
    assert_eq!(response.query.as_deref(), Some("fever"));
    assert_eq!(response.namespace.as_deref(), Some("medical"));

    Ok(())
}

/// Test that identical documents rank by file name
#[tokio::test]
async fn test_equal_scores_rank_by_file_name() -> Result<()> {
    let temp_dir = tempdir()?;
    let content: &[u8] = b"Wash hands before meals.";
    write_namespace(
        temp_dir.path(),
        "medical",
        &[("b.md", content), ("a.md", content), ("c.txt", content)],
    )?;

    let engine = SearchEngine::new(RetrieverConfig::for_root(temp_dir.path()));
    for _ in 0..3 {
        let response = engine.search(SearchRequest::new("wash hands")).await;
        assert_eq!(files(&response), vec!["a.md", "b.md", "c.txt"]);
    }

    Ok(())
}

/// Test that coverage outweighs repetition in the ranking
#[tokio::test]
async fn test_covering_more_tokens_ranks_higher() -> Result<()> {
    let temp_dir = tempdir()?;
    write_namespace(
        temp_dir.path(),
        "medical",
        &[
            ("both.md", b"Asthma inhaler technique matters."),
            ("one.md", b"Asthma asthma asthma."),
        ],
    )?;

    let engine = SearchEngine::new(RetrieverConfig::for_root(temp_dir.path()));
    let response = engine.search(SearchRequest::new("asthma inhaler")).await;

    assert_eq!(files(&response), vec!["both.md", "one.md"]);
    assert_eq!(response.results[0].token_matches, 2);
    assert_eq!(response.results[1].occurrences, 3);

    Ok(())
}

/// Test a match on the file name alone
#[tokio::test]
async fn test_filename_only_match_is_returned() -> Result<()> {
    let temp_dir = tempdir()?;
    write_namespace(
        temp_dir.path(),
        "medical",
        &[("vaccines.md", b"Schedules for children and adults.")],
    )?;

    let engine = SearchEngine::new(RetrieverConfig::for_root(temp_dir.path()));
    let response = engine.search(SearchRequest::new("vaccines")).await;

    assert_eq!(response.results.len(), 1);
    let result = &response.results[0];
    assert_eq!(result.token_matches, 0);
    assert_eq!(result.occurrences, 0);
    assert_eq!(result.match_index, 0);
    assert!(result.score > 0.0);

    Ok(())
}

/// Test result truncation
#[tokio::test]
async fn test_max_results_truncates() -> Result<()> {
    let temp_dir = tempdir()?;
    let docs: Vec<(String, Vec<u8>)> = (0..10)
        .map(|i| (format!("doc{i}.md"), format!("fever note {i}").into_bytes()))
        .collect();
    let docs: Vec<(&str, &[u8])> = docs
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_slice()))
        .collect();
    write_namespace(temp_dir.path(), "medical", &docs)?;

    let engine = SearchEngine::new(RetrieverConfig::for_root(temp_dir.path()));

    let response = engine
        .search(SearchRequest::new("fever").with_max_results(3))
        .await;
    assert_eq!(response.results.len(), 3);

    let response = engine.search(SearchRequest::new("fever")).await;
    assert_eq!(response.results.len(), 6);

    Ok(())
}

/// Test namespace validation before any filesystem access
#[tokio::test]
async fn test_invalid_namespace_is_rejected() -> Result<()> {
    let engine = SearchEngine::new(RetrieverConfig::for_root("/nonexistent/knowledge"));

    let response = engine
        .search(SearchRequest::new("fever").with_namespace("med/ical"))
        .await;
    assert_eq!(
        response.error.as_deref(),
        Some("Invalid namespace 'med/ical'. Allowed pattern: ^[a-zA-Z0-9._-]+$")
    );
    assert!(response.results.is_empty());

    let response = engine
        .search(SearchRequest::new("fever").with_namespace(""))
        .await;
    assert_eq!(
        response.error.as_deref(),
        Some("Missing required 'namespace'.")
    );

    Ok(())
}

/// Test not-found and empty-namespace responses
#[tokio::test]
async fn test_missing_and_empty_namespaces() -> Result<()> {
    let temp_dir = tempdir()?;
    write_namespace(temp_dir.path(), "empty", &[("scan.pdf", b"%PDF")])?;
    let engine = SearchEngine::new(RetrieverConfig::for_root(temp_dir.path()));

    let response = engine
        .search(SearchRequest::new("fever").with_namespace("oncology"))
        .await;
    let expected = format!(
        "Knowledge namespace 'oncology' not found at {}.",
        temp_dir.path().join("oncology").display()
    );
    assert_eq!(response.error, Some(expected));

    let response = engine
        .search(SearchRequest::new("fever").with_namespace("empty"))
        .await;
    assert_eq!(
        response.error.as_deref(),
        Some("No FAQ files found in 'empty' namespace.")
    );

    Ok(())
}

/// Test informational responses
#[tokio::test]
async fn test_info_responses() -> Result<()> {
    let temp_dir = tempdir()?;
    write_namespace(temp_dir.path(), "medical", &[("flu.md", b"fever")])?;
    let engine = SearchEngine::new(RetrieverConfig::for_root(temp_dir.path()));

    let response = engine.search(SearchRequest::new("the of and")).await;
    assert_eq!(response.info.as_deref(), Some(NO_SEARCHABLE_TERMS));
    assert_eq!(response.sources, Some(vec![]));

    let response = engine.search(SearchRequest::new("glucose")).await;
    assert_eq!(response.info.as_deref(), Some(NO_MATCHES));
    assert!(response.results.is_empty());

    Ok(())
}

/// Test that a corrupted document does not fail the search
#[tokio::test]
async fn test_corrupted_document_is_omitted() -> Result<()> {
    let temp_dir = tempdir()?;
    write_namespace(
        temp_dir.path(),
        "medical",
        &[
            ("cold.md", b"Rest helps a cold and fever."),
            ("corrupt.md", b"fever \xc3\x28 \xa0\xa1"),
            ("flu.md", b"Fever is common with flu."),
        ],
    )?;

    let engine = SearchEngine::new(RetrieverConfig::for_root(temp_dir.path()));
    let response = engine.search(SearchRequest::new("fever")).await;

    let mut found = files(&response);
    found.sort();
    assert_eq!(found, vec!["cold.md", "flu.md"]);

    Ok(())
}

/// Test root priority and namespace fallback
#[tokio::test]
async fn test_resolution_priority_and_fallback() -> Result<()> {
    let primary = tempdir()?;
    let secondary = tempdir()?;
    write_namespace(primary.path(), "medical", &[("primary.md", b"fever guide")])?;
    write_namespace(secondary.path(), "medical", &[("secondary.md", b"fever guide")])?;
    write_namespace(secondary.path(), "default", &[("general.md", b"insulin storage")])?;

    let mut config = RetrieverConfig::for_root(primary.path());
    config.search_roots = vec![primary.path().to_path_buf(), secondary.path().to_path_buf()];
    let engine = SearchEngine::new(config);

    let response = engine.search(SearchRequest::new("fever")).await;
    assert_eq!(files(&response), vec!["primary.md"]);

    let response = engine.search(SearchRequest::new("insulin")).await;
    assert!(response.results.is_empty());

    let response = engine
        .search_with_fallback(SearchRequest::new("insulin"))
        .await;
    assert_eq!(files(&response), vec!["general.md"]);
    assert_eq!(response.namespace.as_deref(), Some("default"));

    let response = engine
        .search_with_fallback(SearchRequest::new("insulin").with_namespace("bad/ns"))
        .await;
    let error = response.error.as_deref().unwrap_or_default();
    assert!(error.starts_with("Invalid namespace 'bad/ns'"), "{error}");
    assert!(response.results.is_empty());

    // A missing namespace is not a validation error, so the fallback still runs
    let response = engine
        .search_with_fallback(SearchRequest::new("insulin").with_namespace("oncology"))
        .await;
    assert!(response.error.is_none());
    assert_eq!(files(&response), vec!["general.md"]);

    Ok(())
}
