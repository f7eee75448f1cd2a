//! In-memory record store
//!
//! Keeps the same encoded bytes a [`FileStore`](crate::FileStore) would
//! write, so values are copied on every put and get, and the record format
//! is exercised exactly as on disk. Nothing survives the process.

use crate::codec::IdentityCodec;
use crate::format::{decode_record, encode_record};
use crate::locker::KeyLocker;
use crate::store::RecordStore;
use dashmap::DashMap;
use quire_core::{BookName, Error, Record, Result};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

struct StoredBytes {
    bytes: Vec<u8>,
    modified: SystemTime,
}

type BookMap = Arc<DashMap<String, StoredBytes>>;

/// Record store held in process memory
#[derive(Default)]
pub struct MemoryStore {
    books: DashMap<BookName, BookMap>,
    locker: KeyLocker,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("books", &self.books.len())
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn book(&self, book: &BookName) -> Option<BookMap> {
        self.books.get(book).map(|entry| Arc::clone(entry.value()))
    }

    fn book_or_create(&self, book: &BookName) -> BookMap {
        Arc::clone(self.books.entry(book.clone()).or_default().value())
    }
}

impl RecordStore for MemoryStore {
    fn put(&self, book: &BookName, record: &Record) -> Result<()> {
        let bytes = encode_record(record, &IdentityCodec)?;
        let _guard = self.locker.lock_key(book, &record.key);
        let len = bytes.len();
        self.book_or_create(book).insert(
            record.key.clone(),
            StoredBytes {
                bytes,
                modified: SystemTime::now(),
            },
        );
        debug!(target: "quire::storage", book = %book, key = %record.key, bytes = len, "Record written");
        Ok(())
    }

    fn get(&self, book: &BookName, key: &str) -> Result<Record> {
        let bytes = {
            let _guard = self.locker.lock_shared(book);
            let map = self.book(book);
            map.as_ref()
                .and_then(|map| map.get(key).map(|stored| stored.bytes.clone()))
        };
        match bytes {
            Some(bytes) => decode_record(key, &bytes),
            None => Err(Error::not_found(book.as_str(), key)),
        }
    }

    fn contains(&self, book: &BookName, key: &str) -> Result<bool> {
        let _guard = self.locker.lock_shared(book);
        Ok(self.book(book).map_or(false, |map| map.contains_key(key)))
    }

    fn delete(&self, book: &BookName, key: &str) -> Result<()> {
        let _guard = self.locker.lock_key(book, key);
        if let Some(map) = self.book(book) {
            map.remove(key);
        }
        Ok(())
    }

    fn keys(&self, book: &BookName) -> Result<Vec<String>> {
        let _guard = self.locker.lock_shared(book);
        let map = self.book(book);
        Ok(map
            .as_ref()
            .map(|map| map.iter().map(|entry| entry.key().clone()).collect())
            .unwrap_or_default())
    }

    fn last_modified(&self, book: &BookName, key: &str) -> Result<Option<SystemTime>> {
        let _guard = self.locker.lock_shared(book);
        let map = self.book(book);
        Ok(map
            .as_ref()
            .and_then(|map| map.get(key).map(|stored| stored.modified)))
    }

    fn delete_all(&self, book: &BookName) -> Result<()> {
        let _guard = self.locker.lock_book(book);
        self.books.remove(book);
        debug!(target: "quire::storage", book = %book, "Book deleted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
