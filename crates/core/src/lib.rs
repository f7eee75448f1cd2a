//! Core types for Quire
//!
//! This crate defines the foundational types used throughout the system:
//! - BookName, Key: validated namespace and key names
//! - TypeTag: persisted identity of a concrete type
//! - FieldDescriptor: one field of a type layout
//! - Node, Field: encoded field values
//! - Record: the durable unit per (book, key)
//! - Error: error type hierarchy
//! - Limits: key length and nesting depth limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod key;
pub mod limits;
pub mod node;
pub mod record;
pub mod types;

pub use error::{Error, Result};
pub use key::{validate_key, validate_key_with_limits, KeyError, DEFAULT_BOOK};
pub use limits::{Limits, DEFAULT_MAX_KEY_BYTES, DEFAULT_MAX_NESTING_DEPTH, MAX_NESTING_DEPTH};
pub use node::{Field, Node};
pub use record::Record;
pub use types::{BookName, FieldDescriptor, Key, TypeTag};
