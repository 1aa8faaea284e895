//! In-memory URL table.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Answer for URLs not present in the table.
pub const SAFE: &str = "SAFE";

/// Table of blacklisted URLs and their classification labels.
///
/// Populated at startup and read-only while serving, so handlers share it
/// behind a plain `Arc`.
#[derive(Debug)]
pub struct UrlStore {
    /// URI prefix of the lookup namespace (e.g., "/urlinfo/1/").
    prefix: String,
    entries: HashMap<String, String>,
}

impl UrlStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn insert(&mut self, url: impl Into<String>, label: impl Into<String>) {
        self.entries.insert(url.into(), label.into());
    }

    pub fn remove(&mut self, url: &str) {
        self.entries.remove(url);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify a URL: its stored label, or [`SAFE`] when unlisted.
    pub fn classify(&self, url: &str) -> &str {
        self.entries.get(url).map(String::as_str).unwrap_or(SAFE)
    }

    /// Load blacklisted URLs from a text file of `<url> <label>` lines.
    /// Lines with fewer than two whitespace-separated tokens are skipped.
    /// Returns the number of entries added.
    pub fn load_blacklist(&mut self, path: &Path) -> io::Result<usize> {
        let file = File::open(path)?;
        let mut added = 0;
        for line in BufReader::new(file).lines() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            if let (Some(url), Some(label)) = (tokens.next(), tokens.next()) {
                tracing::debug!(url, label, "Adding blacklisted URL");
                self.insert(url, label);
                added += 1;
            }
        }
        Ok(added)
    }
}
