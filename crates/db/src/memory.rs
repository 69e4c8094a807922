//! In-memory collection with optional JSON snapshot persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use library_kernel::settings::StoreSettings;

use crate::collection::Collection;
use crate::document::{prepare, Document, Record};
use crate::error::{StoreError, StoreResult};
use crate::id::DocumentId;

/// Insertion-ordered collection guarded by an async `RwLock`.
///
/// When opened with a snapshot directory, every successful write rewrites
/// `<dir>/<collection>.json` before the new state becomes visible.
pub struct MemoryCollection<T: Document> {
    records: RwLock<Vec<Record<T>>>,
    snapshot: Option<PathBuf>,
}

impl<T: Document> MemoryCollection<T> {
    /// Create an empty, memory-only collection
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            snapshot: None,
        }
    }

    /// Open the collection described by `settings`, loading its snapshot if one exists
    pub async fn open(settings: &StoreSettings) -> StoreResult<Self> {
        let Some(dir) = &settings.snapshot_dir else {
            tracing::info!(
                collection = T::COLLECTION,
                "no snapshot directory configured; collection is memory-only"
            );
            return Ok(Self::new());
        };

        let path = dir.join(format!("{}.json", T::COLLECTION));
        let records: Vec<Record<T>> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(snapshot_error(&path, source)),
        };

        tracing::info!(
            collection = T::COLLECTION,
            path = %path.display(),
            records = records.len(),
            "collection opened"
        );

        Ok(Self {
            records: RwLock::new(records),
            snapshot: Some(path),
        })
    }

    /// Location of the snapshot file, if persistence is enabled
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Apply `mutate` to a copy of the records, persist it, then publish it.
    ///
    /// Holding the write lock across the snapshot write keeps the file in the
    /// same order as the in-memory state.
    async fn commit<R>(
        &self,
        mutate: impl FnOnce(&mut Vec<Record<T>>) -> StoreResult<R> + Send,
    ) -> StoreResult<R> {
        let mut guard = self.records.write().await;
        let mut next = guard.clone();
        let outcome = mutate(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(outcome)
    }

    async fn persist(&self, records: &[Record<T>]) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| snapshot_error(parent, source))?;
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|source| snapshot_error(&staging, source))?;
        tokio::fs::rename(&staging, path)
            .await
            .map_err(|source| snapshot_error(path, source))?;

        tracing::debug!(
            collection = T::COLLECTION,
            records = records.len(),
            "snapshot written"
        );
        Ok(())
    }
}

impl<T: Document> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Snapshot {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl<T: Document> Collection<T> for MemoryCollection<T> {
    async fn find(
        &self,
        filter: &(dyn for<'a> Fn(&'a T) -> bool + Sync),
    ) -> StoreResult<Vec<Record<T>>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| filter(&record.doc))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &DocumentId) -> StoreResult<Option<Record<T>>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == *id).cloned())
    }

    async fn insert(&self, doc: T) -> StoreResult<Record<T>> {
        let record = Record::new(prepare(doc)?);
        self.commit(|records| {
            records.push(record.clone());
            Ok(record)
        })
        .await
    }

    async fn insert_many(&self, docs: Vec<T>) -> StoreResult<Vec<Record<T>>> {
        let inserted = docs
            .into_iter()
            .map(|doc| prepare(doc).map(Record::new))
            .collect::<StoreResult<Vec<_>>>()?;

        self.commit(|records| {
            records.extend(inserted.iter().cloned());
            Ok(inserted)
        })
        .await
    }

    async fn save(&self, record: Record<T>) -> StoreResult<Record<T>> {
        let Record { id, doc, .. } = record;
        let doc = prepare(doc)?;

        self.commit(move |records| {
            let stored = records
                .iter_mut()
                .find(|stored| stored.id == id)
                .ok_or(StoreError::NotFound(id))?;
            stored.doc = doc;
            stored.updated_at = OffsetDateTime::now_utc();
            Ok(stored.clone())
        })
        .await
    }

    async fn delete(&self, id: &DocumentId) -> StoreResult<Option<Record<T>>> {
        let id = *id;
        self.commit(move |records| {
            Ok(records
                .iter()
                .position(|record| record.id == id)
                .map(|index| records.remove(index)))
        })
        .await
    }

    async fn clear(&self) -> StoreResult<usize> {
        self.commit(|records| {
            let removed = records.len();
            records.clear();
            Ok(removed)
        })
        .await
    }

    async fn close(&self) -> StoreResult<()> {
        let records = self.records.read().await;
        self.persist(&records).await?;
        tracing::info!(collection = T::COLLECTION, "collection closed");
        Ok(())
    }
}
