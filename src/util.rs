//! Small shared helpers: URL classification and whitespace normalization.

use url::Url;

/// Parses a string as an `http`/`https` URL.
///
/// Returns `None` for anything else, including strings that technically parse
/// as URLs under another scheme. This matters for Windows-style paths:
/// `D:\feeds\news.xml` parses as a URL with scheme `d`, and must still be
/// treated as a filesystem path.
///
/// # Examples
///
/// ```
/// use sheaf::util::parse_http_url;
///
/// assert!(parse_http_url("https://example.com/feed.xml").is_some());
/// assert!(parse_http_url("http://example.com/feed").is_some());
///
/// // Not fetchable links
/// assert!(parse_http_url("ftp://example.com/feed").is_none());
/// assert!(parse_http_url("mailto:news@example.com").is_none());
/// assert!(parse_http_url(r"D:\feeds\news.xml").is_none());
/// assert!(parse_http_url("feeds/news.xml").is_none());
/// ```
pub fn parse_http_url(s: &str) -> Option<Url> {
    let url = Url::parse(s).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

/// Collapses runs of whitespace (including newlines) into single spaces and
/// trims the ends.
///
/// Extracted page text arrives with the source document's indentation and
/// line breaks intact; one paragraph should render as one line.
///
/// # Examples
///
/// ```
/// use sheaf::util::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  hello \n\t world  "), "hello world");
/// assert_eq!(collapse_whitespace(""), "");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
