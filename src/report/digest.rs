use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fetch::FetchResult;

/// Digest could not be written to disk.
#[derive(Debug, Error)]
#[error("Failed to write digest to '{path}': {source}")]
pub struct WriteError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

impl WriteError {
    pub(crate) fn new(path: &Path, source: std::io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Renders fetch results into the digest text, in feed order.
///
/// Results are sorted by position here regardless of how the caller ordered
/// them, so the rendered digest is a pure function of the result set. Each
/// page becomes one block; failed pages get the link as their title and the
/// error message as their body. No results renders to an empty string.
pub fn render(results: &[FetchResult]) -> String {
    let mut ordered: Vec<&FetchResult> = results.iter().collect();
    ordered.sort_unstable_by_key(|r| r.position);

    let mut out = String::new();
    for result in ordered {
        match &result.outcome {
            Ok(article) => {
                out.push_str(&format!(
                    "===== {}\nURL: {}\n\n{}\n\n\n",
                    article.title, result.link, article.body
                ));
            }
            Err(e) => {
                out.push_str(&format!(
                    "===== {}\nURL: {}\n\n[ERROR fetching: {}]\n\n\n",
                    result.link, result.link, e
                ));
            }
        }
    }
    out
}

/// Writes the digest to `path` atomically.
///
/// The content goes to a randomized temporary file in the same directory,
/// is synced to disk, then renamed over the destination. The destination is
/// never left in a partial state; reruns replace it wholesale.
pub fn write_digest(content: &str, path: &Path) -> Result<(), WriteError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    // Randomized temp filename to prevent TOCTOU race conditions
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| WriteError::new(&temp_path, e))?;

    if let Err(e) = file.write_all(content.as_bytes()) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(WriteError::new(&temp_path, e));
    }

    if let Err(e) = file.sync_all() {
        let _ = std::fs::remove_file(&temp_path);
        return Err(WriteError::new(&temp_path, e));
    }

    drop(file);

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(WriteError::new(path, e));
    }

    Ok(())
}
