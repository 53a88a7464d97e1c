//! Site crawling for repairkb.
//!
//! This crate provides:
//! - [`fetch`] — HTTP retrieval with a fixed browser identity and request
//!   pacing ([`Fetcher`], [`Pacer`])
//! - [`engine`] — the depth-first link frontier ([`Crawler`],
//!   [`LinkClassifier`])
//! - [`extract`] — title and main-content extraction ([`extract_page`])

pub mod engine;
pub mod extract;
pub mod fetch;

pub use engine::{CrawlOutcome, Crawler, LinkClass, LinkClassifier};
pub use extract::{ExtractedPage, extract_page};
pub use fetch::{Fetcher, Pacer, USER_AGENT};
