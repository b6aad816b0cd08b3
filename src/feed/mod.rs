//! Feed reading: turning an RSS/Atom document into an ordered list of links.
//!
//! The feed document may live on disk or behind an http(s) URL; [`FeedSource`]
//! makes that distinction and [`load`] resolves it. Parsing keeps the first
//! link of every entry, drops duplicates and non-http links, and tags each
//! survivor with its position in feed order so downstream stages can restore
//! that order after concurrent fetching scrambles completion times.

mod reader;

pub use reader::{load, parse_entries, FeedEntry, FeedSource, ReadError};
