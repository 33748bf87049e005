//! In-memory storage implementation.

use super::{PageStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageStore for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        records.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(records.keys().cloned().collect())
    }
}
