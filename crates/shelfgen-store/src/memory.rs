use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use shelfgen_core::{
    Document, DocumentId, DocumentStore, Error, ID_FIELD, InsertedDocument, Result, Stage,
};

use crate::exec::execute_pipeline;

type Collections = BTreeMap<String, Vec<Document>>;

/// In-memory [`DocumentStore`].
///
/// Collections are vectors of JSON object documents behind one mutex; a
/// batch insert stamps `_id` on every document before any of them becomes
/// visible, so batches are atomic. Insert auto-creates its collection, the
/// document-store convention.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection's documents, in insertion order. Empty for
    /// unknown collections.
    pub fn documents(&self, name: &str) -> Result<Vec<Document>> {
        let collections = self.lock()?;
        Ok(collections.get(name).cloned().unwrap_or_default())
    }

    /// Number of documents currently held by a collection.
    pub fn count(&self, name: &str) -> Result<usize> {
        let collections = self.lock()?;
        Ok(collections.get(name).map(Vec::len).unwrap_or(0))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Collections>> {
        self.collections
            .lock()
            .map_err(|_| Error::Store("collection lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.lock()?;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn delete_all(&self, name: &str) -> Result<()> {
        let mut collections = self.lock()?;
        if let Some(documents) = collections.get_mut(name) {
            documents.clear();
        }
        Ok(())
    }

    async fn insert_many(
        &self,
        name: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<InsertedDocument>> {
        let mut inserted = Vec::with_capacity(documents.len());
        for mut document in documents {
            let id = DocumentId::generate();
            document.insert(ID_FIELD.to_string(), serde_json::to_value(id)?);
            inserted.push(InsertedDocument { id, document });
        }

        let mut collections = self.lock()?;
        let collection = collections.entry(name.to_string()).or_default();
        collection.extend(inserted.iter().map(|record| record.document.clone()));
        debug!(collection = name, inserted = inserted.len(), "batch stored");
        Ok(inserted)
    }

    async fn aggregate(&self, name: &str, pipeline: &[Stage]) -> Result<Vec<Document>> {
        let collections = self.lock()?;
        let results = execute_pipeline(&collections, name, pipeline)?;
        debug!(
            collection = name,
            stages = pipeline.len(),
            results = results.len(),
            "pipeline executed"
        );
        Ok(results)
    }
}
