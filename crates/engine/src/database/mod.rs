//! Store handle and open/close logic
//!
//! A [`Quire`] binds a storage root (or process memory) to the type
//! registry and hands out [`Book`]s. It owns:
//! - the record store (file or memory)
//! - the configuration loaded from `quire.toml`
//! - the `.lock` file keeping other processes out of the root
//! - the `books/` directory holding one directory per book
//! - the cache of book handles

pub mod config;
mod registry;

pub use config::{QuireConfig, CONFIG_FILE_NAME};
pub use registry::OPEN_STORES;

use crate::book::Book;
use dashmap::DashMap;
use quire_codec::{Codec, Registry};
use quire_core::{BookName, Error, Result};
use quire_storage::{FileStore, MemoryStore, RecordStore};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the advisory lock file in the storage root
pub const LOCK_FILE_NAME: &str = ".lock";

/// Directory under the storage root that holds one directory per book
pub const BOOKS_DIR_NAME: &str = "books";

/// Where the configuration passed to `open_inner` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSource {
    /// Read from `quire.toml`
    File,
    /// Supplied by the caller, written to `quire.toml` on open
    Explicit,
}

/// Open object store
pub struct Quire {
    /// Canonical storage root, `None` for an ephemeral store
    root: Option<PathBuf>,
    store: Arc<dyn RecordStore>,
    registry: &'static Registry,
    config: QuireConfig,
    books: DashMap<BookName, Book>,
    /// Exclusive lock held for the lifetime of the store. `None` for ephemeral stores.
    _lock_file: Option<File>,
}

impl std::fmt::Debug for Quire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quire")
            .field("root", &self.root)
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Quire {
    /// Open the store rooted at `root`, creating it if needed
    ///
    /// Reads `quire.toml` from the root, writing a default one first if it
    /// is missing. Opening a root that is already open in this process
    /// returns the existing instance.
    ///
    /// # Errors
    /// - `Config` if `quire.toml` is unreadable or invalid
    /// - `Io` if the root cannot be created, or another process holds it
    ///
    /// # Example
    ///
    /// ```no_run
    /// use quire_engine::Quire;
    ///
    /// let quire = Quire::open("/var/lib/app/quire")?;
    /// quire.default_book().write("greeting", &String::from("hello"))?;
    /// # Ok::<(), quire_core::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Arc<Self>> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;

        let config_path = root.join(CONFIG_FILE_NAME);
        QuireConfig::write_default_if_missing(&config_path)?;
        let config = QuireConfig::from_file(&config_path)?;

        Self::open_inner(root, config, ConfigSource::File)
    }

    /// Open the store rooted at `root` with an explicit configuration
    ///
    /// The configuration is written to `quire.toml` so that later
    /// [`Quire::open`] calls pick up the same settings.
    ///
    /// If the root is already open in this process, the existing instance
    /// is returned when its configuration equals `config`. Otherwise the
    /// call fails and `quire.toml` is left untouched.
    ///
    /// # Errors
    /// - `Config` if `config` is invalid, or the root is already open with
    ///   a different configuration
    /// - `Io` if the root cannot be created, or another process holds it
    pub fn open_with_config<P: AsRef<Path>>(root: P, config: QuireConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;

        Self::open_inner(root, config, ConfigSource::Explicit)
    }

    fn open_inner(root: &Path, config: QuireConfig, source: ConfigSource) -> Result<Arc<Self>> {
        let canonical_root = root.canonicalize()?;

        // Held across the lookup and the insert so one root opens once.
        let mut open_stores = OPEN_STORES.lock();
        if let Some(existing) = open_stores.get(&canonical_root).and_then(|weak| weak.upgrade()) {
            if source == ConfigSource::Explicit && existing.config != config {
                return Err(Error::Config(format!(
                    "store at '{}' is already open with a different configuration",
                    canonical_root.display()
                )));
            }
            debug!(target: "quire::engine", root = %canonical_root.display(), "Returning open store");
            return Ok(existing);
        }

        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(canonical_root.join(LOCK_FILE_NAME))?;
        fs2::FileExt::try_lock_exclusive(&lock_file).map_err(|_| {
            Error::Io(io::Error::new(
                io::ErrorKind::WouldBlock,
                format!(
                    "store at '{}' is already in use by another process",
                    canonical_root.display()
                ),
            ))
        })?;

        if source == ConfigSource::Explicit {
            config.write_to_file(&canonical_root.join(CONFIG_FILE_NAME))?;
        }

        let store = FileStore::open(
            canonical_root.join(BOOKS_DIR_NAME),
            config.storage_codec()?,
            config.durability_mode()?,
        )?;

        let quire = Arc::new(Quire {
            root: Some(canonical_root.clone()),
            store: Arc::new(store),
            registry: Registry::global(),
            config,
            books: DashMap::new(),
            _lock_file: Some(lock_file),
        });
        open_stores.insert(canonical_root.clone(), Arc::downgrade(&quire));

        info!(
            target: "quire::engine",
            root = %canonical_root.display(),
            durability = %quire.config.durability,
            codec = %quire.config.codec,
            "Opened store"
        );
        Ok(quire)
    }

    /// Create a store held in process memory
    ///
    /// Same semantics as a file-backed store, but nothing is written to disk
    /// and every call returns an independent instance.
    pub fn ephemeral() -> Arc<Self> {
        Self::ephemeral_with_config(QuireConfig::default())
    }

    /// Ephemeral store with custom limits
    ///
    /// Durability and codec settings do not apply to memory.
    pub fn ephemeral_with_config(config: QuireConfig) -> Arc<Self> {
        Arc::new(Quire {
            root: None,
            store: Arc::new(MemoryStore::new()),
            registry: Registry::global(),
            config,
            books: DashMap::new(),
            _lock_file: None,
        })
    }

    /// Register `T` so records of type `T` can be read back dynamically
    ///
    /// Types are registered implicitly when written. Register them at
    /// startup when a fresh process must `read_dyn` records written earlier.
    ///
    /// # Errors
    /// `TagConflict` if another type already holds `T`'s tag.
    pub fn register<T: Codec>(&self) -> Result<()> {
        self.registry.register::<T>()
    }

    /// Handle to the book named `name`
    ///
    /// # Errors
    /// `InvalidBookName` for an invalid name or the reserved default name;
    /// use [`Quire::default_book`] for the default book.
    pub fn book(&self, name: &str) -> Result<Book> {
        let name = BookName::new(name)?;
        Ok(self.book_handle(name))
    }

    /// Handle to the default book
    pub fn default_book(&self) -> Book {
        self.book_handle(BookName::default_book())
    }

    fn book_handle(&self, name: BookName) -> Book {
        if let Some(book) = self.books.get(&name) {
            return book.value().clone();
        }
        self.books
            .entry(name.clone())
            .or_insert_with(|| {
                Book::new(
                    name,
                    Arc::clone(&self.store),
                    self.registry,
                    self.config.limits(),
                )
            })
            .value()
            .clone()
    }

    /// Canonical storage root, `None` for an ephemeral store
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// True if nothing is written to disk
    pub fn is_ephemeral(&self) -> bool {
        self.root.is_none()
    }

    /// Active configuration
    pub fn config(&self) -> &QuireConfig {
        &self.config
    }

    /// Type registry used by this store
    pub fn registry(&self) -> &'static Registry {
        self.registry
    }
}

impl Drop for Quire {
    fn drop(&mut self) {
        if let Some(root) = &self.root {
            let mut open_stores = OPEN_STORES.lock();
            // A newer instance may already own the slot.
            let stale = open_stores
                .get(root)
                .map_or(false, |weak| weak.upgrade().is_none());
            if stale {
                open_stores.remove(root);
            }
            debug!(target: "quire::engine", root = %root.display(), "Closed store");
        }
    }
}
