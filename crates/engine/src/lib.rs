//! Book manager and store handle for Quire
//!
//! This crate ties the lower layers together:
//! - Quire: store handle with open/ephemeral, one instance per root
//! - Book: namespace handle with write/read/destroy
//! - QuireConfig: `quire.toml` settings
//! - global: process-wide `init`/`book`/`default_book`/`register`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod book;
pub mod database;
pub mod global;

pub use book::Book;
pub use database::{Quire, QuireConfig, BOOKS_DIR_NAME, CONFIG_FILE_NAME, OPEN_STORES};
pub use global::{book, default_book, init, instance, register};
