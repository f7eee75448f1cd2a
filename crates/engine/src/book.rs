//! Book handles
//!
//! A [`Book`] is one namespace of a store: an independent key space with its
//! own `destroy`. Handles are cheap to clone and safe to share across
//! threads; all clones of a book's handle operate on the same records and
//! locks.

use quire_codec::{Codec, Drift, Persist, Registry, Serializer};
use quire_core::{BookName, Key, Limits, Result};
use quire_storage::RecordStore;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

struct BookInner {
    name: BookName,
    store: Arc<dyn RecordStore>,
    registry: &'static Registry,
    limits: Limits,
}

/// Handle to one book
#[derive(Clone)]
pub struct Book {
    inner: Arc<BookInner>,
}

impl fmt::Debug for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Book")
            .field("name", &self.inner.name)
            .field("store", &self.inner.store.name())
            .finish()
    }
}

impl Book {
    pub(crate) fn new(
        name: BookName,
        store: Arc<dyn RecordStore>,
        registry: &'static Registry,
        limits: Limits,
    ) -> Self {
        Book {
            inner: Arc::new(BookInner {
                name,
                store,
                registry,
                limits,
            }),
        }
    }

    /// Book name (`"default"` for the default book)
    pub fn name(&self) -> &str {
        self.inner.name.as_str()
    }

    /// True if both handles refer to the same cached book
    pub fn ptr_eq(&self, other: &Book) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn serializer(&self) -> Serializer<'static> {
        Serializer::new(self.inner.registry).with_max_depth(self.inner.limits.max_nesting_depth)
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// The concrete type of `value` is recorded, so a later `read` or
    /// `read_dyn` rebuilds exactly that type.
    ///
    /// # Errors
    /// - `InvalidKey` if the key is empty, contains NUL, or is too long
    /// - `Serialization` if the value nests too deep (cyclic graphs included)
    ///   or is an empty dynamic slot
    /// - `Io` if the record cannot be written
    ///
    /// # Example
    ///
    /// ```
    /// use quire_engine::Quire;
    ///
    /// let book = Quire::ephemeral().book("cities")?;
    /// book.write("capital", &String::from("Tallinn"))?;
    /// assert_eq!(book.read::<String>("capital")?, "Tallinn");
    /// # Ok::<(), quire_core::Error>(())
    /// ```
    pub fn write(&self, key: &str, value: &dyn Persist) -> Result<()> {
        let key = Key::new(key)?;
        let record = self.serializer().serialize(key.as_str(), value)?;
        self.inner.store.put(&self.inner.name, &record)?;
        debug!(
            target: "quire::engine",
            book = %self.inner.name,
            key = %key,
            tag = %record.tag,
            "Wrote value"
        );
        Ok(())
    }

    /// Read the value under `key` as a `T`
    ///
    /// # Errors
    /// - `NotFound` if the key was never written in this book
    /// - `TypeMismatch` if the stored type cannot become a `T`
    /// - `UnknownType` if the stored type is not known to this process
    /// - `CorruptRecord` if the stored bytes fail validation
    pub fn read<T: Codec>(&self, key: &str) -> Result<T> {
        self.read_with_drift(key).map(|(value, _)| value)
    }

    /// Like [`Book::read`], also returning the schema drift seen while
    /// decoding (fields left at their defaults, stored fields ignored)
    pub fn read_with_drift<T: Codec>(&self, key: &str) -> Result<(T, Vec<Drift>)> {
        let key = Key::new(key)?;
        let record = self.inner.store.get(&self.inner.name, key.as_str())?;
        debug!(
            target: "quire::engine",
            book = %self.inner.name,
            key = %key,
            tag = %record.tag,
            "Read value"
        );
        self.serializer().deserialize_with_drift(&record)
    }

    /// Read the value under `key`, or return `default` if it was never written
    ///
    /// Every other error still propagates.
    pub fn read_or<T: Codec>(&self, key: &str, default: T) -> Result<T> {
        match self.read(key) {
            Ok(value) => Ok(value),
            Err(e) if e.is_not_found() => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// Read the value under `key` as its stored concrete type
    ///
    /// The type must be known to this process: written earlier, or
    /// registered with `Quire::register`.
    ///
    /// # Errors
    /// `NotFound`, `UnknownType`, or `CorruptRecord` as for [`Book::read`].
    pub fn read_dyn(&self, key: &str) -> Result<Box<dyn Persist>> {
        let key = Key::new(key)?;
        let record = self.inner.store.get(&self.inner.name, key.as_str())?;
        self.serializer().deserialize_dyn(&record)
    }

    /// True if a value is stored under `key`
    pub fn contains(&self, key: &str) -> Result<bool> {
        let key = Key::new(key)?;
        self.inner.store.contains(&self.inner.name, key.as_str())
    }

    /// Remove the value under `key`; absent keys are a no-op
    pub fn delete(&self, key: &str) -> Result<()> {
        let key = Key::new(key)?;
        self.inner.store.delete(&self.inner.name, key.as_str())
    }

    /// Every key in this book, in no particular order
    pub fn keys(&self) -> Result<Vec<String>> {
        self.inner.store.keys(&self.inner.name)
    }

    /// Time of the last write of `key`, `None` if absent
    pub fn last_modified(&self, key: &str) -> Result<Option<SystemTime>> {
        let key = Key::new(key)?;
        self.inner.store.last_modified(&self.inner.name, key.as_str())
    }

    /// Remove every key in this book
    ///
    /// Other books are untouched. Destroying an empty or already destroyed
    /// book is a no-op. The handle stays usable; new writes recreate the book.
    pub fn destroy(&self) -> Result<()> {
        self.inner.store.delete_all(&self.inner.name)?;
        debug!(target: "quire::engine", book = %self.inner.name, "Destroyed book");
        Ok(())
    }

    /// Directory holding this book, `None` for an ephemeral store
    pub fn path(&self) -> Result<Option<PathBuf>> {
        self.inner.store.book_path(&self.inner.name)
    }

    /// File holding `key`, `None` for an ephemeral store
    ///
    /// The file need not exist yet.
    pub fn path_for(&self, key: &str) -> Result<Option<PathBuf>> {
        let key = Key::new(key)?;
        self.inner.store.record_path(&self.inner.name, key.as_str())
    }
}
