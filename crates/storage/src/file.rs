//! File-backed record store
//!
//! Layout: `<root>/<escaped-book>/<escaped-key>.qr`, one file per key.
//!
//! Writes go to `<file>.tmp`, are fsynced, and renamed over the target, so a
//! crash leaves either the previous file or the new one. With
//! [`Durability::Always`] the book directory is fsynced after the rename.

use crate::codec::StorageCodec;
use crate::escape::{book_dir_name, key_from_file_name, record_file_name, TEMP_SUFFIX};
use crate::format::{decode_record, encode_record};
use crate::locker::KeyLocker;
use crate::store::{Durability, RecordStore};
use quire_core::{BookName, Error, Record, Result};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Record store on the local file system
pub struct FileStore {
    root: PathBuf,
    codec: Box<dyn StorageCodec>,
    durability: Durability,
    locker: KeyLocker,
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("root", &self.root)
            .field("codec", &self.codec.codec_id())
            .field("durability", &self.durability)
            .finish()
    }
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(
        root: impl Into<PathBuf>,
        codec: Box<dyn StorageCodec>,
        durability: Durability,
    ) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(
            target: "quire::storage",
            root = %root.display(),
            codec = codec.codec_id(),
            ?durability,
            "Opened file store"
        );
        Ok(FileStore {
            root,
            codec,
            durability,
            locker: KeyLocker::new(),
        })
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured durability
    pub fn durability(&self) -> Durability {
        self.durability
    }

    /// Name of the codec used for new writes
    pub fn codec_id(&self) -> &str {
        self.codec.codec_id()
    }

    fn book_dir(&self, book: &BookName) -> Result<PathBuf> {
        Ok(self.root.join(book_dir_name(book.as_str())?))
    }

    fn record_file(&self, book: &BookName, key: &str) -> Result<PathBuf> {
        Ok(self.book_dir(book)?.join(record_file_name(key)?))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let temp_path = temp_path_for(path);

        // Left behind by a crash during an earlier write of this key
        if temp_path.exists() {
            warn!(target: "quire::storage", path = %temp_path.display(), "Removing stale temp file");
            if let Err(e) = fs::remove_file(&temp_path) {
                warn!(
                    target: "quire::storage",
                    path = %temp_path.display(),
                    error = %e,
                    "Failed to remove stale temp file"
                );
            }
        }

        let synced = self.durability.is_synced();
        let result = write_file(&temp_path, bytes, synced).and_then(|()| fs::rename(&temp_path, path));

        match result {
            Ok(()) => {
                if synced {
                    sync_dir(path)?;
                }
                Ok(())
            }
            Err(e) => {
                warn!(
                    target: "quire::storage",
                    temp_path = %temp_path.display(),
                    error = %e,
                    "Write failed, cleaning up temp file"
                );
                let _ = fs::remove_file(&temp_path);
                Err(e.into())
            }
        }
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn write_file(path: &Path, bytes: &[u8], synced: bool) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(bytes)?;
    if synced {
        file.sync_all()?;
    }
    Ok(())
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn not_found_as<T>(result: io::Result<T>, absent: T) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(absent),
        Err(e) => Err(e.into()),
    }
}

impl RecordStore for FileStore {
    fn put(&self, book: &BookName, record: &Record) -> Result<()> {
        let path = self.record_file(book, &record.key)?;
        let bytes = encode_record(record, self.codec.as_ref())?;

        let _guard = self.locker.lock_key(book, &record.key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        self.write_atomic(&path, &bytes)?;

        debug!(
            target: "quire::storage",
            book = %book,
            key = %record.key,
            bytes = bytes.len(),
            "Record written"
        );
        Ok(())
    }

    fn get(&self, book: &BookName, key: &str) -> Result<Record> {
        let path = self.record_file(book, key)?;
        let bytes = {
            let _guard = self.locker.lock_shared(book);
            match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(Error::not_found(book.as_str(), key))
                }
                Err(e) => return Err(e.into()),
            }
        };
        decode_record(key, &bytes)
    }

    fn contains(&self, book: &BookName, key: &str) -> Result<bool> {
        let path = self.record_file(book, key)?;
        let _guard = self.locker.lock_shared(book);
        not_found_as(fs::metadata(&path).map(|m| m.is_file()), false)
    }

    fn delete(&self, book: &BookName, key: &str) -> Result<()> {
        let path = self.record_file(book, key)?;
        let _guard = self.locker.lock_key(book, key);
        not_found_as(fs::remove_file(&path), ())?;
        debug!(target: "quire::storage", book = %book, key, "Record deleted");
        Ok(())
    }

    fn keys(&self, book: &BookName) -> Result<Vec<String>> {
        let dir = self.book_dir(book)?;
        let _guard = self.locker.lock_shared(book);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(key) = key_from_file_name(name) {
                keys.push(key);
            } else if !name.ends_with(TEMP_SUFFIX) {
                debug!(target: "quire::storage", book = %book, file = name, "Skipping foreign file");
            }
        }
        Ok(keys)
    }

    fn last_modified(&self, book: &BookName, key: &str) -> Result<Option<SystemTime>> {
        let path = self.record_file(book, key)?;
        let _guard = self.locker.lock_shared(book);
        match fs::metadata(&path) {
            Ok(meta) => Ok(Some(meta.modified()?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_all(&self, book: &BookName) -> Result<()> {
        let dir = self.book_dir(book)?;
        let _guard = self.locker.lock_book(book);
        not_found_as(fs::remove_dir_all(&dir), ())?;
        if self.durability.is_synced() {
            not_found_as(sync_dir(&dir), ())?;
        }
        debug!(target: "quire::storage", book = %book, "Book deleted");
        Ok(())
    }

    fn book_path(&self, book: &BookName) -> Result<Option<PathBuf>> {
        self.book_dir(book).map(Some)
    }

    fn record_path(&self, book: &BookName, key: &str) -> Result<Option<PathBuf>> {
        self.record_file(book, key).map(Some)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
