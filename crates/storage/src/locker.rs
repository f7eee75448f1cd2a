//! Per-key and per-book locking
//!
//! Each book has a gate (`RwLock<()>`) and a table of key mutexes.
//!
//! - Key writes take the gate shared, then the key mutex. Writers of
//!   different keys run in parallel; writers of one key run in order.
//! - Reads take the gate shared only. Atomic replace makes them safe
//!   against concurrent writes of the same key.
//! - `delete_all` takes the gate exclusively, so it waits for in-flight
//!   operations on that book and blocks new ones until it returns.
//!
//! Books never contend with each other.

use dashmap::DashMap;
use parking_lot::{
    ArcMutexGuard, ArcRwLockReadGuard, ArcRwLockWriteGuard, Mutex, RawMutex, RawRwLock, RwLock,
};
use quire_core::BookName;
use std::sync::Arc;

#[derive(Default)]
struct BookLocks {
    gate: Arc<RwLock<()>>,
    keys: DashMap<String, Arc<Mutex<()>>>,
}

/// Held while one key is written or deleted
pub struct KeyGuard {
    // Fields drop in order: key first, then the gate.
    _key: ArcMutexGuard<RawMutex, ()>,
    _gate: ArcRwLockReadGuard<RawRwLock, ()>,
}

/// Held while a book is read
pub struct SharedGuard {
    _gate: ArcRwLockReadGuard<RawRwLock, ()>,
}

/// Held while a whole book is replaced or removed
pub struct BookGuard {
    _gate: ArcRwLockWriteGuard<RawRwLock, ()>,
}

/// Lock table for every book of one store
#[derive(Default)]
pub struct KeyLocker {
    books: DashMap<BookName, Arc<BookLocks>>,
}

impl KeyLocker {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    fn book(&self, book: &BookName) -> Arc<BookLocks> {
        if let Some(locks) = self.books.get(book) {
            return Arc::clone(locks.value());
        }
        Arc::clone(self.books.entry(book.clone()).or_default().value())
    }

    /// Exclusive access to `key` within `book`
    pub fn lock_key(&self, book: &BookName, key: &str) -> KeyGuard {
        let locks = self.book(book);
        let gate = locks.gate.read_arc();
        // Clone the mutex out so the map shard is not held while blocking.
        let mutex = Arc::clone(
            locks
                .keys
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        KeyGuard {
            _key: mutex.lock_arc(),
            _gate: gate,
        }
    }

    /// Shared access to `book`, excluding only `lock_book`
    pub fn lock_shared(&self, book: &BookName) -> SharedGuard {
        SharedGuard {
            _gate: self.book(book).gate.read_arc(),
        }
    }

    /// Exclusive access to all of `book`
    ///
    /// Key mutexes of the book are dropped: no key guard can be alive while
    /// the gate is held exclusively, and new ones are created on demand.
    pub fn lock_book(&self, book: &BookName) -> BookGuard {
        let locks = self.book(book);
        let gate = locks.gate.write_arc();
        locks.keys.clear();
        BookGuard { _gate: gate }
    }

    /// Number of key mutexes currently tracked for `book`
    pub fn tracked_keys(&self, book: &BookName) -> usize {
        self.books.get(book).map(|locks| locks.keys.len()).unwrap_or(0)
    }
}
