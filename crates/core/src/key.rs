//! Key and book name validation
//!
//! Keys are arbitrary UTF-8 strings with a few constraints:
//! - Keys must not be empty
//! - Keys must not contain NUL bytes (\0)
//! - Keys must not exceed `max_key_bytes` (default: 200)
//!
//! Path-hostile characters such as `/` are allowed; the persistence layer
//! escapes them when it maps a key to a file name.
//!
//! Book names follow the same rules and additionally must not be the
//! reserved default book name.

use crate::limits::Limits;
use thiserror::Error;

/// Name of the default book. Reserved: `book(DEFAULT_BOOK)` is rejected.
pub const DEFAULT_BOOK: &str = "default";

/// Validate a key using default limits
///
/// # Examples
///
/// ```
/// use quire_core::key::validate_key;
///
/// assert!(validate_key("persons").is_ok());
/// assert!(validate_key("city/ads").is_ok());
///
/// assert!(validate_key("").is_err());
/// assert!(validate_key("a\x00b").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    validate_key_with_limits(key, &Limits::default())
}

/// Validate a key with custom limits
pub fn validate_key_with_limits(key: &str, limits: &Limits) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    if key.contains('\x00') {
        return Err(KeyError::ContainsNul);
    }

    let len = key.len();
    if len > limits.max_key_bytes {
        return Err(KeyError::TooLong {
            actual: len,
            max: limits.max_key_bytes,
        });
    }

    Ok(())
}

/// Key validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Key is empty (length 0)
    #[error("Key cannot be empty")]
    Empty,

    /// Key contains NUL byte (\0)
    #[error("Key cannot contain NUL bytes")]
    ContainsNul,

    /// Key exceeds maximum length
    #[error("Key too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual key length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Key is valid text but does not fit in a file name once escaped
    #[error("Key too long once escaped: {escaped} bytes exceeds maximum {max}")]
    EscapedTooLong {
        /// Escaped length in bytes
        escaped: usize,
        /// Maximum file name length
        max: usize,
    },
}

impl KeyError {
    /// Short machine-readable reason
    pub fn reason_code(&self) -> &'static str {
        match self {
            KeyError::Empty => "empty_key",
            KeyError::ContainsNul => "contains_nul",
            KeyError::TooLong { .. } => "key_too_long",
            KeyError::EscapedTooLong { .. } => "escaped_key_too_long",
        }
    }
}
