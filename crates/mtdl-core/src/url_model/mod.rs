//! Remote identifier handling.
//!
//! Resolves path-like remote identifiers against a source base URL and
//! derives the local filename a downloaded file is saved under.

mod path;
mod sanitize;

use std::collections::BTreeMap;

pub use path::{base_url, directory_url, remote_url, last_segment};
pub use sanitize::sanitize_filename;

/// Filename used when an identifier yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Local filename for a remote identifier: its sanitized last path segment.
///
/// - `local_filename("train/images/0001.jpg")` → `"0001.jpg"`
/// - `local_filename("/")` → `"download.bin"`
pub fn local_filename(item: &str) -> String {
    let sanitized = last_segment(item)
        .map(sanitize_filename)
        .unwrap_or_default();
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Local filenames that more than one identifier maps to, with how many do.
/// Those files end up overwriting each other in the save directory.
pub fn colliding_names<S: AsRef<str>>(items: &[S]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(local_filename(item.as_ref())).or_default() += 1;
    }
    counts.into_iter().filter(|(_, n)| *n > 1).collect()
}
