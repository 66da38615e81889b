//! Persistence collaborator for ScrumPilot.
//!
//! Artifacts are stored as schemaless JSON documents grouped into
//! [`Collection`]s and keyed by their `id` field. The core crate never talks
//! to a concrete backend; it only sees the [`DocumentStore`] trait.

pub mod conformance;
mod document;
mod error;
mod memory;
mod query;
mod traits;

pub use document::{from_document, to_document, Collection, Document, ID_FIELD};
pub use error::StorageError;
pub use memory::MemoryStore;
pub use query::{compare_values, Condition, Filter, FindOptions, SortDirection, SortOrder};
pub use traits::DocumentStore;
