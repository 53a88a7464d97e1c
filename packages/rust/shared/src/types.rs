//! Core domain types for the repair-guide knowledge base.

use serde::{Deserialize, Serialize};

/// Maximum number of repair steps kept per document.
pub const MAX_STEPS: usize = 10;

/// Maximum number of warnings kept per document.
pub const MAX_WARNINGS: usize = 5;

/// Summary length in characters before truncation.
pub const SUMMARY_CHARS: usize = 300;

// ---------------------------------------------------------------------------
// CleanDocument
// ---------------------------------------------------------------------------

/// A fetched and cleaned page, as persisted in the guide store.
///
/// `content` holds the newline-joined non-noise lines extracted from the
/// page's main content area. This is the raw-crawl form; structuring into
/// steps/tools/warnings happens when the knowledge base is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanDocument {
    /// Absolute source URL. Documents are keyed by URL for deduplication.
    pub url: String,
    /// Page title; empty string when no title element was found.
    pub title: String,
    /// Cleaned main-content text, one extracted line per `\n`.
    pub content: String,
}

// ---------------------------------------------------------------------------
// StructuredDocument
// ---------------------------------------------------------------------------

/// The normalized record derived from one cleaned page.
///
/// Length bounds (`steps` ≤ [`MAX_STEPS`], `warnings` ≤ [`MAX_WARNINGS`],
/// summary truncation at [`SUMMARY_CHARS`]) are enforced at construction
/// time and never revisited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Absolute source URL.
    pub url: String,
    /// Page title.
    pub title: String,
    /// The full cleaned content the record was derived from.
    pub raw_content: String,
    /// Ordered repair steps, each beginning with its step label.
    pub steps: Vec<String>,
    /// Tools mentioned in the content (deduplicated, vocabulary order).
    pub tools: Vec<String>,
    /// Labeled caution sentences, in pattern-chain order.
    pub warnings: Vec<String>,
    /// Device parts mentioned in the content.
    pub parts: Vec<String>,
    /// Repair-action keywords mentioned in the content.
    pub keywords: Vec<String>,
    /// Leading excerpt of the content, `...`-terminated when truncated.
    pub summary: String,
}
