//! `@username` handles in comment bodies.
//!
//! Handles resolve case-insensitively against registered usernames, so they are
//! lowercased here and the user store does the rest. An `@` preceded by a word
//! character (`bob@campus.edu`) is part of an address, not a handle.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// The regex crate has no lookbehind; the leading group stands in for one.
static HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w])@([a-zA-Z0-9_]+)").expect("handle pattern is valid")
});

/// Handles mentioned in `content`, lowercased, first occurrence wins.
pub fn extract_mentions(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut handles = Vec::new();
    for caps in HANDLE.captures_iter(content) {
        let handle = caps[1].to_lowercase();
        if seen.insert(handle.clone()) {
            handles.push(handle);
        }
    }
    handles
}
