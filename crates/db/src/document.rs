use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{StoreError, StoreResult};
use crate::id::DocumentId;

/// Schema contract for anything stored in a [`Collection`](crate::Collection).
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, also used as the snapshot file stem
    const COLLECTION: &'static str;

    /// Canonicalize field values before validation (e.g. trimming)
    fn normalize(&mut self) {}

    /// Return one human-readable message per violated constraint
    fn validate(&self) -> Vec<String>;
}

/// A persisted document together with its store-managed metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: DocumentId,
    #[serde(flatten)]
    pub doc: T,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl<T: Document> Record<T> {
    pub(crate) fn new(doc: T) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: DocumentId::generate(),
            doc,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Normalize and validate a document, collecting every violation.
pub(crate) fn prepare<T: Document>(mut doc: T) -> StoreResult<T> {
    doc.normalize();
    let violations = doc.validate();
    if violations.is_empty() {
        Ok(doc)
    } else {
        Err(StoreError::Validation(violations))
    }
}
