use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::util::parse_http_url;

/// Largest feed document accepted from a URL source (10MB).
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024;

/// Errors that abort the run before any fetching starts.
///
/// A feed that cannot be loaded or parsed is fatal. A feed that loads and
/// parses but contains no links is not an error; `load` returns an empty
/// sequence and the pipeline produces an empty digest.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Feed file missing or unreadable.
    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),
    /// Feed URL could not be downloaded.
    #[error("Failed to download feed: {0}")]
    Download(String),
    /// Document is not parseable RSS/Atom.
    #[error("Invalid feed document: {0}")]
    Malformed(String),
}

/// Where the feed document comes from.
///
/// The CLI takes a single argument for this; anything that parses as an
/// http(s) URL is downloaded, everything else is treated as a local path.
#[derive(Debug, Clone)]
pub enum FeedSource {
    Path(PathBuf),
    Url(url::Url),
}

impl FeedSource {
    /// Classifies a command-line argument as a URL or a local path.
    pub fn parse(arg: &str) -> Self {
        match parse_http_url(arg) {
            Some(url) => FeedSource::Url(url),
            None => FeedSource::Path(PathBuf::from(arg)),
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Path(path) => write!(f, "{}", path.display()),
            FeedSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// One link extracted from the feed, tagged with its index in feed order.
///
/// Positions are contiguous `0..N` over the entries `load` returns; every
/// fetch result carries its entry's position so the digest can be ordered
/// deterministically no matter when each fetch completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub position: usize,
    pub link: String,
}

/// Loads the feed document and parses it into ordered link entries.
///
/// Local paths are read from disk; URL sources are downloaded with `client`
/// under `timeout` and a size cap. The document itself failing to load or
/// parse is fatal ([`ReadError`]); a well-formed feed with no usable links
/// yields `Ok(vec![])`.
pub async fn load(
    source: &FeedSource,
    client: &reqwest::Client,
    timeout: Duration,
) -> Result<Vec<FeedEntry>, ReadError> {
    let bytes = match source {
        FeedSource::Path(path) => tokio::fs::read(path).await?,
        FeedSource::Url(url) => download(url, client, timeout).await?,
    };
    parse_entries(&bytes)
}

async fn download(
    url: &url::Url,
    client: &reqwest::Client,
    timeout: Duration,
) -> Result<Vec<u8>, ReadError> {
    // The timeout covers the body read as well, so a feed server that sends
    // headers and then stalls cannot hang the run.
    tokio::time::timeout(timeout, async {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ReadError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReadError::Download(format!(
                "{} returned HTTP {}",
                url,
                response.status().as_u16()
            )));
        }

        crate::fetch::read_limited_bytes(response, MAX_FEED_SIZE)
            .await
            .map_err(|e| ReadError::Download(e.to_string()))
    })
    .await
    .map_err(|_| ReadError::Download(format!("request to {} timed out", url)))?
}

/// Parses feed XML into deduplicated, position-tagged entries.
///
/// Takes the first link of each entry, in document order. Entries without a
/// link, links that are not http(s), and repeats of an already-seen link are
/// skipped with a log line; positions stay contiguous over the survivors.
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<FeedEntry>, ReadError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| ReadError::Malformed(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut entries: Vec<FeedEntry> = Vec::new();
    for entry in feed.entries {
        let link = match entry.links.first() {
            Some(l) => l.href.trim().to_string(),
            None => {
                tracing::warn!(id = %entry.id, "Feed entry has no link, skipping");
                continue;
            }
        };
        if parse_http_url(&link).is_none() {
            tracing::warn!(link = %link, "Feed link is not an http(s) URL, skipping");
            continue;
        }
        if !seen.insert(link.clone()) {
            tracing::debug!(link = %link, "Duplicate feed link, skipping");
            continue;
        }
        entries.push(FeedEntry {
            position: entries.len(),
            link,
        });
    }

    Ok(entries)
}
