//! End-to-end run: read the feed, fetch every page, write the digest.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::feed::{self, FeedSource, ReadError};
use crate::fetch::{build_client, Fetcher};
use crate::report::{self, WriteError};

/// Failures that abort a run.
///
/// Per-page fetch failures are not here; those are carried into the digest
/// as error blocks. Only the feed source, the HTTP client, and the final
/// write can end the run early.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl PipelineError {
    /// Process exit code for this failure.
    ///
    /// 2 means the feed source could not be read or downloaded, 3 means the
    /// document was not parseable RSS/Atom, 4 means the digest could not be
    /// written (or the client could not be built). Success is 0, including
    /// runs where every individual page fetch failed.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Read(ReadError::Io(_)) | PipelineError::Read(ReadError::Download(_)) => {
                2
            }
            PipelineError::Read(ReadError::Malformed(_)) => 3,
            PipelineError::Client(_) | PipelineError::Write(_) => 4,
        }
    }
}

/// What a completed run did, for the final status line.
#[derive(Debug)]
pub struct RunSummary {
    /// Unique links found in the feed
    pub total: usize,
    /// Links whose page fetch failed (still present in the digest)
    pub failed: usize,
    pub elapsed: Duration,
    pub out_path: PathBuf,
}

/// Runs the whole pipeline against one feed source.
///
/// An empty feed is not an error: the run logs a warning, writes an empty
/// digest, and reports zero links. `progress_tx` receives a `(0, total)`
/// tuple once the feed is loaded, then one `(done, total)` tuple per
/// completed page fetch.
pub async fn run(
    config: &Config,
    source: &FeedSource,
    progress_tx: mpsc::Sender<(usize, usize)>,
) -> Result<RunSummary, PipelineError> {
    let started = Instant::now();

    let client = build_client(config)?;
    let timeout = Duration::from_secs(config.timeout_secs);

    tracing::info!(source = %source, "Loading feed");
    let entries = feed::load(source, &client, timeout).await?;

    if entries.is_empty() {
        tracing::warn!(source = %source, "Feed contains no usable links");
    } else {
        tracing::info!(links = entries.len(), "Feed loaded");
    }

    let total = entries.len();
    // Kickoff event carries the link count before any fetch completes.
    if let Err(e) = progress_tx.send((0, total)).await {
        tracing::warn!(error = %e, "Progress channel send failed (receiver dropped)");
    }
    let fetcher = Fetcher::new(client, config);
    let results = fetcher.fetch_all(entries, progress_tx).await;
    let failed = results.iter().filter(|r| r.outcome.is_err()).count();

    let digest = report::render(&results);
    report::write_digest(&digest, &config.output)?;

    tracing::info!(
        total = total,
        failed = failed,
        out = %config.output.display(),
        "Digest written"
    );

    Ok(RunSummary {
        total,
        failed,
        elapsed: started.elapsed(),
        out_path: config.output.clone(),
    })
}
