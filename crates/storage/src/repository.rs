use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use crate::document::{Document, merge_patch};
use crate::quiz_store::QuizStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Path-addressed document database.
///
/// `collection` is a slash-separated path such as `quizzes` or
/// `quizzes/{id}/questions`; `id` names one document inside it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures. A missing document is `Ok(None)`.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StorageError>;

    /// List every document of a collection, ordered by document id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_documents(&self, collection: &str)
    -> Result<Vec<(String, Document)>, StorageError>;

    /// Merge `patch` into the document, creating it when absent.
    ///
    /// Only the keys present in `patch` are overwritten (see
    /// [`merge_patch`](crate::document::merge_patch)).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<(), StorageError>;

    /// Append a new document under a store-assigned id and return that id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn add_document(&self, collection: &str, document: Document)
    -> Result<String, StorageError>;
}

/// Simple in-memory document store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<HashMap<String, BTreeMap<String, Document>>>>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StorageError> {
        let guard = self
            .collections
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn list_documents(
        &self,
        collection: &str,
    ) -> Result<Vec<(String, Document)>, StorageError> {
        let guard = self
            .collections
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .collections
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let existing = guard
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        merge_patch(existing, patch);
        Ok(())
    }

    async fn add_document(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        let mut guard = self
            .collections
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StorageError::Conflict);
        }
        docs.insert(id.clone(), document);
        Ok(id)
    }
}

/// Aggregates the document backend behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub documents: Arc<dyn DocumentStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let documents: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        Self { documents }
    }

    /// Typed quiz access over the same backend.
    #[must_use]
    pub fn quizzes(&self) -> QuizStore {
        QuizStore::new(Arc::clone(&self.documents))
    }
}
