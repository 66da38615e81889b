//! In-process `DocumentStore` backed by a `tokio::sync::RwLock`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Collection, Document, ID_FIELD};
use crate::error::StorageError;
use crate::query::{sort_documents, Filter, FindOptions};
use crate::traits::DocumentStore;

/// Volatile document store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(|v| v.as_str())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<(), StorageError> {
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(document);
        Ok(())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StorageError> {
        let collections = self.collections.read().await;
        let mut matched: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        drop(collections);

        if let Some(order) = &options.sort {
            sort_documents(&mut matched, order);
        }
        if options.limit > 0 {
            matched.truncate(options.limit);
        }
        Ok(matched)
    }

    async fn count_matching(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StorageError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn replace_or_insert(
        &self,
        collection: Collection,
        id: &str,
        mut document: Document,
    ) -> Result<(), StorageError> {
        document.insert(ID_FIELD.to_string(), serde_json::Value::from(id));
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        match docs.iter_mut().find(|d| document_id(d) == Some(id)) {
            Some(existing) => *existing = document,
            None => docs.push(document),
        }
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<Document, StorageError> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| document_id(d) == Some(id)))
            .ok_or_else(|| StorageError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (key, value) in fields {
            if key == ID_FIELD {
                continue;
            }
            existing.insert(key, value);
        }
        tracing::debug!(%collection, id, "document fields updated");
        Ok(existing.clone())
    }
}
