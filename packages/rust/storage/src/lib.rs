//! Persistence for crawl output: the URL store and the guide store.
//!
//! Both stores are deliberately simple files. The URL store is
//! newline-delimited absolute URLs with append-of-new-only writes. The
//! guide store is one JSON array of cleaned documents rewritten whole on
//! every merge; a crash mid-write can corrupt it, and there is no journal
//! or atomic rename. Load paths always degrade to an empty store with a
//! warning so a damaged file never takes the whole system down.

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use repairkb_shared::{CleanDocument, RepairKbError, Result};

// ---------------------------------------------------------------------------
// UrlStore
// ---------------------------------------------------------------------------

/// Newline-delimited store of discovered savable URLs.
pub struct UrlStore {
    path: PathBuf,
}

impl UrlStore {
    /// Create a handle for the store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load all stored URLs in file order. Blank lines and lines that are
    /// not absolute http(s) URLs are skipped. A missing file is an empty
    /// store.
    pub fn load(&self) -> Vec<String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "URL store not found, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read URL store, starting empty");
                return Vec::new();
            }
        };

        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && line.starts_with("http"))
            .map(str::to_string)
            .collect()
    }

    /// Append only the URLs not already present, sorted, and return how
    /// many were added. Existing file contents are left untouched.
    pub fn append_new(&self, urls: &[String]) -> Result<usize> {
        let existing: HashSet<String> = self.load().into_iter().collect();

        let mut new_urls: Vec<&String> =
            urls.iter().filter(|url| !existing.contains(*url)).collect();
        new_urls.sort();
        new_urls.dedup();

        if new_urls.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RepairKbError::io(parent, e))?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                RepairKbError::Persistence(format!(
                    "cannot open URL store {}: {e}",
                    self.path.display()
                ))
            })?;

        for url in &new_urls {
            writeln!(file, "{url}").map_err(|e| {
                RepairKbError::Persistence(format!(
                    "cannot write URL store {}: {e}",
                    self.path.display()
                ))
            })?;
        }

        Ok(new_urls.len())
    }
}

// ---------------------------------------------------------------------------
// GuideStore
// ---------------------------------------------------------------------------

/// JSON-array store of cleaned guide documents, keyed by URL.
pub struct GuideStore {
    path: PathBuf,
}

impl GuideStore {
    /// Create a handle for the store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the whole store. A missing or malformed file degrades to an
    /// empty store with a warning instead of failing the caller.
    pub fn load(&self) -> Vec<CleanDocument> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "guide store not found, starting empty; run a crawl first");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read guide store, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(docs) => docs,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed guide store, starting empty");
                Vec::new()
            }
        }
    }

    /// Merge `incoming` into the store, skipping documents whose URL is
    /// already present, and rewrite the whole file. Returns the number of
    /// documents actually added. Write failures are fatal to the merge.
    pub fn merge_and_save(&self, incoming: Vec<CleanDocument>) -> Result<usize> {
        let mut documents = self.load();
        let added = merge_documents(&mut documents, incoming);

        if added == 0 {
            debug!(path = %self.path.display(), "no new documents to merge");
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RepairKbError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&documents)
            .map_err(|e| RepairKbError::Persistence(format!("cannot serialize guide store: {e}")))?;

        fs::write(&self.path, json).map_err(|e| {
            RepairKbError::Persistence(format!(
                "cannot write guide store {}: {e}",
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), added, total = documents.len(), "guide store saved");
        Ok(added)
    }
}

/// Append to `existing` the incoming documents whose URL is not already
/// present, preserving incoming order. Idempotent: merging the same batch
/// twice equals merging it once. Returns the number appended.
pub fn merge_documents(existing: &mut Vec<CleanDocument>, incoming: Vec<CleanDocument>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|doc| doc.url.clone()).collect();

    let mut added = 0;
    for doc in incoming {
        if seen.insert(doc.url.clone()) {
            existing.push(doc);
            added += 1;
        }
    }
    added
}
