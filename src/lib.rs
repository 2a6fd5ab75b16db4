//! # cityfaq - Tiered FAQ answering for a city guide
//!
//! Questions escalate through three tiers, cheapest first:
//! - exact (case-insensitive) lookup in a SQLite FAQ table
//! - semantic nearest-neighbour match over stored question embeddings
//! - generative fallback through an LLM with a city-scoped prompt
//!
//! The [`Pipeline`] always returns a finished [`AnswerRecord`], whatever
//! fails along the way.

pub mod config;
pub mod embedding;
pub mod llm;
pub mod pipeline;
pub mod provision;
pub mod record;
pub mod resolver;
pub mod server;
pub mod storage;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use pipeline::{Pipeline, PipelineOptions};
pub use record::{AnswerRecord, AnswerRequest, Method};
pub use storage::SqliteStore;

/// Result type alias for cityfaq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cityfaq operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Store access failed: {0}")]
    StoreAccess(String),

    #[error("Index access failed: {0}")]
    IndexAccess(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Generation failed: {0}")]
    Generative(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pipeline failure: {0}")]
    Pipeline(String),
}

impl Error {
    /// Message without the variant prefix, for errors that callers already
    /// label themselves (e.g. "SQL lookup failed: ...").
    pub fn detail(&self) -> String {
        match self {
            Error::StoreAccess(msg) | Error::IndexAccess(msg) | Error::Generative(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_strips_variant_prefix() {
        assert_eq!(Error::Generative("boom".to_string()).detail(), "boom");
        assert_eq!(Error::StoreAccess("database is locked".to_string()).detail(), "database is locked");
        assert_eq!(
            Error::DimensionMismatch { expected: 256, actual: 64 }.detail(),
            "Dimension mismatch: index has 256, got 64"
        );
    }
}
