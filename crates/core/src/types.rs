//! Core types for Quire
//!
//! This module defines the foundational identifiers:
//! - BookName: Validated namespace name
//! - Key: Validated key within a book
//! - TypeTag: Persisted identity of a concrete Rust type
//! - FieldDescriptor: One serializable field of a type layout

use crate::error::{Error, Result};
use crate::key::{validate_key, DEFAULT_BOOK};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of a book (namespace)
///
/// Every book owns an independent key space. Names follow the key rules
/// (non-empty, no NUL, bounded length). The name `"default"` is reserved for
/// the default book and can only be obtained through [`BookName::default_book`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookName(String);

impl BookName {
    /// Validate and create a book name
    ///
    /// # Errors
    /// `InvalidBookName` if the name is empty, contains NUL, is too long, or
    /// is the reserved default name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name == DEFAULT_BOOK {
            return Err(Error::InvalidBookName {
                name,
                reason: "name is reserved for the default book".to_string(),
            });
        }
        if let Err(e) = validate_key(&name) {
            return Err(Error::InvalidBookName {
                reason: e.to_string(),
                name,
            });
        }
        Ok(BookName(name))
    }

    /// The default book
    pub fn default_book() -> Self {
        BookName(DEFAULT_BOOK.to_string())
    }

    /// True for the default book
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_BOOK
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BookName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Key of a record within a book
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key(String);

impl Key {
    /// Validate and create a key
    ///
    /// # Errors
    /// `InvalidKey` if the key is empty, contains NUL, or is too long.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Key(key))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key and return the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Persisted identity of a concrete type
///
/// Defaults to the fully qualified Rust type name (`std::any::type_name`),
/// which already distinguishes types declared inside function bodies. The
/// compiler does not promise that name stays the same across toolchains, so
/// types whose records must outlive a compiler upgrade or a rename should pin
/// a tag with `#[quire(tag = "...")]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    /// Create a tag from any string
    pub fn new(tag: impl Into<String>) -> Self {
        TypeTag(tag.into())
    }

    /// Default tag of `T`
    pub fn of<T: ?Sized>() -> Self {
        TypeTag(std::any::type_name::<T>().to_string())
    }

    /// Get the tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(s: &str) -> Self {
        TypeTag::new(s)
    }
}

impl PartialEq<str> for TypeTag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One serializable field of a type layout
///
/// `declared_type` is the field's static type as written in source; the
/// concrete type of a polymorphic value is recorded separately in the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Stored field name (after any rename)
    pub name: &'static str,
    /// Declared field type
    pub declared_type: &'static str,
}

impl FieldDescriptor {
    /// Create a field descriptor
    pub const fn new(name: &'static str, declared_type: &'static str) -> Self {
        FieldDescriptor {
            name,
            declared_type,
        }
    }
}
