//! Record persistence
//!
//! The provider only ever creates records and deletes them by identity, so
//! that is all a store has to offer.

use crate::error::ProvisionError;
use crate::model::{Record, RecordKind};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Storage backend for mock records
///
/// Implementations must be thread-safe; the provider may be shared.
pub trait Store: Send + Sync {
    /// Insert a new record
    fn create(&self, record: Record) -> Result<(), ProvisionError>;

    /// Delete the record of `kind` with `uuid`
    fn delete(&self, kind: RecordKind, uuid: &str) -> Result<(), ProvisionError>;

    /// Number of stored records of `kind`
    fn count(&self, kind: RecordKind) -> usize;

    /// Total number of stored records
    fn len(&self) -> usize {
        RecordKind::TEARDOWN_ORDER
            .iter()
            .map(|kind| self.count(*kind))
            .sum()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store for tests and dry runs
pub struct MemoryStore {
    records: RwLock<HashMap<(RecordKind, String), Record>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a record by identity
    pub fn get(&self, kind: RecordKind, uuid: &str) -> Option<Record> {
        self.records.read().get(&(kind, uuid.to_string())).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn create(&self, record: Record) -> Result<(), ProvisionError> {
        let key = (record.kind(), record.uuid().to_string());
        let mut records = self.records.write();
        if records.contains_key(&key) {
            return Err(ProvisionError::Duplicate {
                kind: key.0,
                uuid: key.1,
            });
        }
        records.insert(key, record);
        Ok(())
    }

    fn delete(&self, kind: RecordKind, uuid: &str) -> Result<(), ProvisionError> {
        self.records
            .write()
            .remove(&(kind, uuid.to_string()))
            .map(|_| ())
            .ok_or_else(|| ProvisionError::NotFound {
                kind,
                uuid: uuid.to_string(),
            })
    }

    fn count(&self, kind: RecordKind) -> usize {
        self.records.read().keys().filter(|(k, _)| *k == kind).count()
    }
}
