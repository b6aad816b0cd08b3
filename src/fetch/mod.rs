//! Concurrent page fetching and text extraction.
//!
//! [`Fetcher::fetch_all`] drives every feed link through a bounded worker
//! pool: at most `workers` requests are in flight at once, each page gets a
//! single GET attempt under the configured timeout, and every completion is
//! reported on a progress channel. Failures are values, not aborts; each
//! link produces a [`FetchResult`] either way, and the batch comes back
//! sorted by feed position.

mod extract;
mod fetcher;

pub use extract::{extract_article, Article, NO_TEXT_PLACEHOLDER};
pub use fetcher::{build_client, FetchError, FetchResult, Fetcher};

pub(crate) use fetcher::read_limited_bytes;
