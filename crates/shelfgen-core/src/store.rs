use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;
use crate::error::Result;
use crate::id::DocumentId;
use crate::pipeline::Stage;

/// One record returned by a bulk insert.
///
/// Carries the full stored body, not only the identifier, so callers can read
/// generated fields back (the seeding engine needs `availableToBorrow` of
/// each inserted item to decide its shelf location).
#[derive(Debug, Clone)]
pub struct InsertedDocument {
    pub id: DocumentId,
    pub document: Document,
}

impl InsertedDocument {
    /// Read a boolean field of the stored body.
    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.document.get(field).and_then(Value::as_bool)
    }
}

/// Boundary to a document-oriented collection store.
///
/// Bulk inserts and pipeline executions are the only suspension points; each
/// is a single round-trip with no partial-batch retry. A failed insert leaves
/// previously committed collections as committed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ensure the collection exists. Idempotent.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Remove every document of the collection. Missing collections are a
    /// no-op, not an error.
    async fn delete_all(&self, name: &str) -> Result<()>;

    /// Insert a batch of documents, returning the store-assigned identifier
    /// and the stored body of each, in input order. Atomic per batch.
    async fn insert_many(
        &self,
        name: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<InsertedDocument>>;

    /// Execute an ordered pipeline over the collection. An unknown
    /// collection yields an empty result set, which is a valid answer.
    async fn aggregate(&self, name: &str, pipeline: &[Stage]) -> Result<Vec<Document>>;
}
