use thiserror::Error;

/// Errors emitted by the seeding engine.
///
/// The first failed insert aborts the run; collections committed before it
/// remain as committed by the store.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] shelfgen_core::Error),
}
