use tracing::debug;

use shelfgen_core::{DocumentStore, Result};

/// Ensure a collection exists and holds zero records.
///
/// Destructive by contract: prior contents are dropped. Safe to call any
/// number of times; store failures surface unmodified.
pub async fn reset_collection<S: DocumentStore>(store: &S, name: &str) -> Result<()> {
    store.create_collection(name).await?;
    store.delete_all(name).await?;
    debug!(collection = name, "collection reset");
    Ok(())
}
