use crate::config::Config;
use crate::feed::FeedEntry;
use crate::fetch::extract::{extract_article, Article};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Largest page body accepted from an article URL (5MB).
const MAX_PAGE_SIZE: usize = 5 * 1024 * 1024;

/// Errors that can occur while fetching a single page.
///
/// These never abort the run: a failed page is carried through to the digest
/// as an error block while the remaining pages keep fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 5MB size limit
    #[error("Response too large")]
    BodyTooLarge,
}

/// Outcome of fetching one feed link.
///
/// `position` is the link's index in feed order; the digest sorts on it so
/// output never depends on completion order.
#[derive(Debug)]
pub struct FetchResult {
    pub position: usize,
    pub link: String,
    pub outcome: Result<Article, FetchError>,
}

/// Builds the HTTP client shared by the feed reader and the page fetcher.
///
/// The configured user agent is applied here so every request in the run
/// carries it.
pub fn build_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .build()
}

/// Fetches pages concurrently over a bounded worker pool.
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
    workers: usize,
}

impl Fetcher {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            workers: config.workers.max(1),
        }
    }

    /// Fetches every entry's page, at most `workers` in flight at once.
    ///
    /// Each completed fetch (success or failure) sends one `(done, total)`
    /// tuple on `progress_tx`; a dropped receiver is logged and ignored.
    /// Results are returned sorted by feed position regardless of the order
    /// fetches finished in.
    pub async fn fetch_all(
        &self,
        entries: Vec<FeedEntry>,
        progress_tx: mpsc::Sender<(usize, usize)>,
    ) -> Vec<FetchResult> {
        if entries.is_empty() {
            return Vec::new();
        }

        let total = entries.len();
        let completed = Arc::new(AtomicUsize::new(0));

        let mut results: Vec<FetchResult> = stream::iter(entries.into_iter())
            .map(|entry| {
                let client = self.client.clone();
                let progress_tx = progress_tx.clone();
                let completed = completed.clone();
                let timeout = self.timeout;

                async move {
                    let outcome = fetch_page(&client, &entry.link, timeout).await;
                    if let Err(e) = &outcome {
                        tracing::warn!(link = %entry.link, error = %e, "Page fetch failed");
                    }

                    let done = completed.fetch_add(1, Ordering::Relaxed).saturating_add(1);
                    if let Err(e) = progress_tx.send((done, total)).await {
                        tracing::warn!(error = %e, done = done, total = total, "Progress channel send failed (receiver dropped)");
                    }

                    FetchResult {
                        position: entry.position,
                        link: entry.link,
                        outcome,
                    }
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        results.sort_unstable_by_key(|r| r.position);
        results
    }
}

async fn fetch_page(
    client: &reqwest::Client,
    link: &str,
    timeout: Duration,
) -> Result<Article, FetchError> {
    // The timeout covers the body read as well; a server that sends headers
    // and then stalls mid-body fails the entry instead of parking its worker.
    let bytes = tokio::time::timeout(timeout, async {
        let response = client.get(link).send().await.map_err(FetchError::Network)?;
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }
        read_limited_bytes(response, MAX_PAGE_SIZE).await
    })
    .await
    .map_err(|_| FetchError::Timeout)??;

    // Pages with broken encodings still produce a digest block.
    let html = String::from_utf8_lossy(&bytes);
    Ok(extract_article(&html, link))
}

pub(crate) async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::BodyTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::BodyTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
