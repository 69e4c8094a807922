use async_trait::async_trait;

use crate::document::{Document, Record};
use crate::error::StoreResult;
use crate::id::DocumentId;

/// Read/write access to a single collection of documents.
///
/// Writes run the document schema first: a write that fails validation returns
/// [`StoreError::Validation`](crate::StoreError::Validation) and leaves the
/// collection untouched.
#[async_trait]
pub trait Collection<T: Document>: Send + Sync {
    /// All records matching `filter`, in insertion order
    async fn find(
        &self,
        filter: &(dyn for<'a> Fn(&'a T) -> bool + Sync),
    ) -> StoreResult<Vec<Record<T>>>;

    async fn find_by_id(&self, id: &DocumentId) -> StoreResult<Option<Record<T>>>;

    /// Persist a new document, assigning its id and timestamps
    async fn insert(&self, doc: T) -> StoreResult<Record<T>>;

    /// Persist several documents; either all are stored or none are
    async fn insert_many(&self, docs: Vec<T>) -> StoreResult<Vec<Record<T>>>;

    /// Replace the stored document with the same id.
    ///
    /// `created_at` is kept from the stored record and `updated_at` is
    /// refreshed. Fails with `NotFound` when the id is no longer present.
    async fn save(&self, record: Record<T>) -> StoreResult<Record<T>>;

    /// Remove a record, returning it when it existed
    async fn delete(&self, id: &DocumentId) -> StoreResult<Option<Record<T>>>;

    /// Remove every record, returning how many were removed
    async fn clear(&self) -> StoreResult<usize>;

    /// Flush pending state and release the collection
    async fn close(&self) -> StoreResult<()>;
}
