//! Shared types, error model, and configuration for repairkb.
//!
//! This crate is the foundation depended on by all other repairkb crates.
//! It provides:
//! - [`RepairKbError`] — the unified error type
//! - Domain types ([`CleanDocument`], [`StructuredDocument`])
//! - Configuration ([`AppConfig`], [`CrawlPolicy`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CleaningSection, CrawlPolicy, CrawlSection, FetchConfig, FetchSection,
    RetrievalSection, StorageSection, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{RepairKbError, Result};
pub use types::{CleanDocument, MAX_STEPS, MAX_WARNINGS, SUMMARY_CHARS, StructuredDocument};
