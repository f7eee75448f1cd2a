//! Record store abstraction
//!
//! A store maps `(book, key)` to one [`Record`]. Implementations must make
//! `put` all-or-nothing: a concurrent or later `get` sees the previous record
//! or the new one, never a mix.

use quire_core::{BookName, Record, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// When a write is considered complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    /// fsync the record file and its directory before returning
    #[default]
    Always,
    /// Leave flushing to the OS; writes stay atomic but may be lost on power failure
    Cache,
}

impl Durability {
    /// True if writes are fsynced
    pub fn is_synced(&self) -> bool {
        matches!(self, Durability::Always)
    }
}

/// Persistence backend for records
pub trait RecordStore: Send + Sync {
    /// Atomically replace the record stored under `record.key`
    fn put(&self, book: &BookName, record: &Record) -> Result<()>;

    /// Fetch the record stored under `key`
    ///
    /// # Errors
    /// `NotFound` if the key was never written or was deleted.
    fn get(&self, book: &BookName, key: &str) -> Result<Record>;

    /// True if a record exists under `key`
    fn contains(&self, book: &BookName, key: &str) -> Result<bool>;

    /// Remove the record under `key`; absent keys are a no-op
    fn delete(&self, book: &BookName, key: &str) -> Result<()>;

    /// Every key stored in `book`, in no particular order
    fn keys(&self, book: &BookName) -> Result<Vec<String>>;

    /// Time of the last write of `key`, `None` when absent
    fn last_modified(&self, book: &BookName, key: &str) -> Result<Option<SystemTime>>;

    /// Remove every record in `book`
    fn delete_all(&self, book: &BookName) -> Result<()>;

    /// Directory holding `book`, if the store is on disk
    fn book_path(&self, _book: &BookName) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    /// File holding `key`, if the store is on disk
    fn record_path(&self, _book: &BookName, _key: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
