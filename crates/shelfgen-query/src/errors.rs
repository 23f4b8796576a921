use thiserror::Error;

/// Errors emitted by the query layer.
///
/// Empty result sets are valid answers, not errors.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Store-level failure, propagated unmodified.
    #[error(transparent)]
    Store(#[from] shelfgen_core::Error),
    /// A pipeline result row did not have the expected shape.
    #[error("unexpected result shape: {0}")]
    ResultShape(String),
}
