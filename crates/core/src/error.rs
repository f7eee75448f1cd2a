//! Error types for Quire
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::key::KeyError;
use crate::types::TypeTag;
use std::io;
use thiserror::Error;

/// Result type alias for Quire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Quire object store
#[derive(Debug, Error)]
pub enum Error {
    /// Key was never written in this book (or the book was destroyed)
    #[error("Key not found: '{key}' in book '{book}'")]
    NotFound {
        /// Book that was searched
        book: String,
        /// Key that was requested
        key: String,
    },

    /// Stored value cannot be produced as the requested type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type the caller (or the field) asked for
        expected: String,
        /// Type or node kind actually stored
        found: String,
    },

    /// Value graph cannot be encoded (e.g. nesting too deep, which is how cycles surface)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored type tag has no registered type in this process
    #[error("Unknown type: {0} is not registered in this process")]
    UnknownType(TypeTag),

    /// Stored enum variant does not exist on the current type
    #[error("Unknown variant '{variant}' for type {tag}")]
    UnknownVariant {
        /// Enum type tag
        tag: TypeTag,
        /// Variant name found in the record
        variant: String,
    },

    /// Record bytes failed structural validation
    #[error("Corrupt record for key '{key}': {reason}")]
    CorruptRecord {
        /// Key of the damaged record
        key: String,
        /// What failed validation
        reason: String,
    },

    /// Two different Rust types claimed the same type tag
    #[error("Type tag {tag} is already bound to {existing}, cannot bind {incoming}")]
    TagConflict {
        /// Contested tag
        tag: TypeTag,
        /// Rust type already holding the tag
        existing: &'static str,
        /// Rust type that attempted to take it
        incoming: &'static str,
    },

    /// Key failed validation
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// Book name failed validation or is reserved
    #[error("Invalid book name '{name}': {reason}")]
    InvalidBookName {
        /// Rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Process-wide store accessed before `init`
    #[error("Quire is not initialized; call quire::init(root) first")]
    NotInitialized,

    /// Process-wide store initialized twice with different roots
    #[error("Quire is already initialized at {current}, cannot re-initialize at {requested}")]
    AlreadyInitialized {
        /// Root bound by the first `init`
        current: String,
        /// Root passed to the rejected call
        requested: String,
    },

    /// Configuration file is unreadable or holds invalid values
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a `NotFound` error
    pub fn not_found(book: impl Into<String>, key: impl Into<String>) -> Self {
        Error::NotFound {
            book: book.into(),
            key: key.into(),
        }
    }

    /// Build a `TypeMismatch` error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Build a `CorruptRecord` error
    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::CorruptRecord {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// True if the key was never written
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True if the stored type does not fit the requested one
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    /// True if the record failed structural validation
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Error::CorruptRecord { .. })
    }
}
