//! Digest rendering and atomic output.
//!
//! Fetch results become one text block per page, ordered by feed position,
//! and the whole digest is written to disk with a write-to-temp-then-rename
//! so a crash or full disk never leaves a half-written file behind.

mod digest;

pub use digest::{render, write_digest, WriteError};
