//! Resolution of user-supplied local paths against ordered bases.

use std::path::{Path, PathBuf};

use super::SourceError;

/// Find the first existing regular file for `raw`.
///
/// Absolute paths are checked as given. Relative paths are joined onto each
/// base in order. The error lists every candidate that was tried.
pub async fn resolve(raw: &str, bases: &[PathBuf]) -> Result<PathBuf, SourceError> {
    let raw = Path::new(raw.trim());
    let candidates: Vec<PathBuf> = if raw.is_absolute() {
        vec![raw.to_path_buf()]
    } else {
        bases.iter().map(|base| absolutize(&base.join(raw))).collect()
    };

    for candidate in &candidates {
        if is_file(candidate).await {
            return Ok(candidate.clone());
        }
    }
    Err(SourceError::FileNotFound { tried: candidates })
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
