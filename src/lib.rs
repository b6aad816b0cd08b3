//! sheaf: fetch every page behind an RSS/Atom feed into one text digest.
//!
//! The pipeline has three stages. [`feed`] loads the feed document (local
//! file or URL) and extracts a deduplicated, position-tagged link list.
//! [`fetch`] downloads the pages behind those links over a bounded worker
//! pool, extracting title and paragraph text from each. [`report`] renders
//! the results into one block per page, in feed order, and writes the
//! digest atomically. [`pipeline::run`] wires the stages together.

pub mod config;
pub mod feed;
pub mod fetch;
pub mod pipeline;
pub mod report;
pub mod util;
