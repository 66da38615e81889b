use async_trait::async_trait;

use crate::document::{Collection, Document};
use crate::error::StorageError;
use crate::query::{Filter, FindOptions};

/// The storage trait for ScrumPilot persistence backends.
///
/// A `DocumentStore` keeps schemaless documents in named collections. Every
/// document carries an `id` field; the store never assigns or rewrites it.
///
/// ## Atomicity
///
/// Each call is atomic per document. No ordering or isolation guarantees are
/// made across calls, and callers must not rely on read-modify-write
/// sequences being serialized.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Append a document to a collection.
    async fn insert(&self, collection: Collection, document: Document)
        -> Result<(), StorageError>;

    /// Return the documents matching `filter`, sorted and limited by `options`.
    ///
    /// Without a sort order, documents come back in insertion order.
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StorageError>;

    /// Count the documents matching `filter`.
    async fn count_matching(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StorageError>;

    /// Replace the document whose id is `id`, or insert it if absent.
    async fn replace_or_insert(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<(), StorageError>;

    /// Overwrite the given fields of the document whose id is `id` and
    /// return the updated document.
    ///
    /// The `id` field itself is never overwritten. Returns
    /// `Err(StorageError::NotFound)` if no such document exists.
    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<Document, StorageError>;

    /// Return the first document matching `filter`, if any.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StorageError> {
        let mut found = self.find(collection, filter, &FindOptions::limit(1)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }
}
