//! `ISourceStore` trait: read-only access to input records.

use std::sync::Arc;

use crate::errors::StorageError;
use crate::types::record::{Record, RecordFilter};

/// Input records keyed by `id`. Read-only while a pipeline runs.
pub trait ISourceStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<Record>, StorageError>;

    fn exists(&self, id: &str) -> Result<bool, StorageError>;

    fn count(&self) -> Result<usize, StorageError>;

    /// All records in id order.
    fn iter_all(&self) -> Result<Vec<Record>, StorageError>;

    /// Records matching every condition of `filter`, in id order.
    fn iter_by_filter(&self, filter: &RecordFilter) -> Result<Vec<Record>, StorageError> {
        Ok(self
            .iter_all()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }
}

// ─── Arc blanket impl ───────────────────────────────────────────────

impl<T: ISourceStore + ?Sized> ISourceStore for Arc<T> {
    fn get(&self, id: &str) -> Result<Option<Record>, StorageError> {
        (**self).get(id)
    }
    fn exists(&self, id: &str) -> Result<bool, StorageError> {
        (**self).exists(id)
    }
    fn count(&self) -> Result<usize, StorageError> {
        (**self).count()
    }
    fn iter_all(&self) -> Result<Vec<Record>, StorageError> {
        (**self).iter_all()
    }
    fn iter_by_filter(&self, filter: &RecordFilter) -> Result<Vec<Record>, StorageError> {
        (**self).iter_by_filter(filter)
    }
}
