use thiserror::Error;

/// Core error type shared across Shelfgen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Store-side failure (adapter, write path, pipeline execution).
    #[error("store error: {0}")]
    Store(String),
    /// A document did not have the expected shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    /// Serialization round-trip failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by Shelfgen crates.
pub type Result<T> = std::result::Result<T, Error>;
