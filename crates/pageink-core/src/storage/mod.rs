//! Key-value storage for per-page annotation records.
//!
//! Keys are opaque strings; backends neither evict nor version records.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use std::fmt;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Identity of one page of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub document: String,
    pub page: u32,
}

impl PageKey {
    pub fn new(document: impl Into<String>, page: u32) -> Self {
        Self {
            document: document.into(),
            page,
        }
    }

    /// Key of the page's stroke record.
    pub fn ink_key(&self) -> String {
        format!("{}/{}/ink", self.document, self.page)
    }

    /// Key of the page's text-box record.
    pub fn text_key(&self) -> String {
        format!("{}/{}/text", self.document, self.page)
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document, self.page)
    }
}

/// Trait for record storage backends.
///
/// Calls are synchronous and short: the editor runs them inline between
/// input events, which is what makes flush-before-load ordering hold.
pub trait PageStore: Send + Sync {
    /// Read a record. Absence is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write (or overwrite) a record.
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a record. Deleting an absent record succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// List all keys.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Check if a record exists.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_keys() {
        let key = PageKey::new("note-42", 3);
        assert_eq!(key.ink_key(), "note-42/3/ink");
        assert_eq!(key.text_key(), "note-42/3/text");
        assert_eq!(key.to_string(), "note-42#3");
    }
}
