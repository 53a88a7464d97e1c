//! Pipeline orchestration, structured parsing, and retrieval for repairkb.

pub mod parser;
pub mod pipeline;
pub mod retrieval;

pub use parser::structure_document;
pub use pipeline::{
    DiscoverResult, IngestOptions, IngestResult, ProgressReporter, SilentProgress, discover,
    ingest, load_knowledge_base,
};
pub use retrieval::{RetrievalResult, search};
