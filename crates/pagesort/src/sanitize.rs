//! Helpers for keeping scan locations out of tracing span attributes.
//!
//! Page images usually live under a user's document folders, so spans carry
//! only file names, page numbers or a path hash.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::document::extract_page_number;

/// Returns only the filename component of a path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Summarizes page image paths as their page numbers, e.g. `3,4,5`.
pub fn redact_pages<S: AsRef<str>>(pages_paths: &[S]) -> String {
    pages_paths
        .iter()
        .map(|p| extract_page_number(p.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Short deterministic hash of a path, for correlating log lines about the
/// same scan directory.
pub fn hash_path(path: &Path) -> String {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
