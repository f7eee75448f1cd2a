//! Process-wide store
//!
//! Applications that use a single storage root bind it once with [`init`]
//! and then reach books from anywhere:
//!
//! ```no_run
//! quire_engine::init("/var/lib/app/quire")?;
//! quire_engine::book("cities")?.write("capital", &String::from("Tallinn"))?;
//! let capital: String = quire_engine::default_book()?.read_or("capital", String::new())?;
//! # Ok::<(), quire_core::Error>(())
//! ```

use crate::book::Book;
use crate::database::Quire;
use once_cell::sync::OnceCell;
use quire_codec::{Codec, Registry};
use quire_core::{Error, Result};
use std::path::Path;
use std::sync::Arc;

static GLOBAL: OnceCell<Arc<Quire>> = OnceCell::new();

/// Bind the process-wide store to `root`
///
/// Calling `init` again with the same root returns the same store.
///
/// # Errors
/// - `AlreadyInitialized` if a different root was bound earlier
/// - any error of [`Quire::open`]
pub fn init<P: AsRef<Path>>(root: P) -> Result<Arc<Quire>> {
    let root = root.as_ref();
    std::fs::create_dir_all(root)?;
    let requested = root.canonicalize()?;

    let quire = GLOBAL.get_or_try_init(|| Quire::open(&requested))?;
    match quire.root() {
        Some(current) if current == requested => Ok(Arc::clone(quire)),
        current => Err(Error::AlreadyInitialized {
            current: current
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            requested: requested.display().to_string(),
        }),
    }
}

/// The process-wide store
///
/// # Errors
/// `NotInitialized` before [`init`] succeeds.
pub fn instance() -> Result<Arc<Quire>> {
    GLOBAL.get().cloned().ok_or(Error::NotInitialized)
}

/// Book `name` of the process-wide store
///
/// # Errors
/// `NotInitialized` before [`init`], `InvalidBookName` for a bad name.
pub fn book(name: &str) -> Result<Book> {
    instance()?.book(name)
}

/// Default book of the process-wide store
///
/// # Errors
/// `NotInitialized` before [`init`].
pub fn default_book() -> Result<Book> {
    Ok(instance()?.default_book())
}

/// Register `T` for dynamic reads; works before [`init`]
pub fn register<T: Codec>() -> Result<()> {
    Registry::global().register::<T>()
}
