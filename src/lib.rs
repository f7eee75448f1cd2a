//! Quire - embedded object store
//!
//! Write any typed value under a key and read it back as the same type.
//! Values live in books: independent key spaces inside one storage root.
//!
//! # Quick Start
//!
//! ```
//! use quire::{Object, Quire};
//!
//! #[derive(Debug, PartialEq, Object)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let quire = Quire::ephemeral();
//! let people = quire.book("people")?;
//!
//! people.write("julia", &Person { name: "Julia".into(), age: 42 })?;
//! let julia: Person = people.read("julia")?;
//! assert_eq!(julia.age, 42);
//!
//! people.destroy()?;
//! assert!(people.read::<Person>("julia").unwrap_err().is_not_found());
//! # Ok::<(), quire::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `quire-core`: shared types and the error enum
//! - `quire-codec`: type registry, field codec and object serializer
//! - `quire-derive`: `#[derive(Object)]`
//! - `quire-storage`: record files, atomic writes, key locking
//! - `quire-engine`: [`Quire`] store handle, [`Book`]s and the process-wide store
//!
//! Decoding never runs a constructor: a derived type is allocated with
//! placeholder field values and every stored field is assigned over them.

pub use quire_codec::{
    decode_object, decode_tagged, encode_object, encode_tagged, layout_fingerprint, polymorphic,
    unexpected, variant_parts, Codec, DecodeContext, Drift, DriftKind, EncodeContext, FieldReader,
    FieldWriter, Object, Persist, Registry, Serializer, TypeDescriptor, Vacant,
};
pub use quire_core::{
    BookName, Error, Field, FieldDescriptor, Key, KeyError, Limits, Node, Record, Result,
    TypeTag, DEFAULT_BOOK,
};
pub use quire_derive::Object;
pub use quire_engine::{
    book, default_book, init, instance, register, Book, Quire, QuireConfig, BOOKS_DIR_NAME,
    CONFIG_FILE_NAME,
};
pub use quire_storage::Durability;
