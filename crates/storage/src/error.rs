/// All errors that can be returned by a DocumentStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No document with the given id exists in the collection.
    #[error("{collection} document not found: {id}")]
    NotFound { collection: String, id: String },

    /// A record could not be converted to or from a document.
    #[error("document serialization failed: {0}")]
    Serialization(String),

    /// A backend-specific storage error (connection, I/O, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
