//! Type descriptors, field codec and object graph serializer for Quire
//!
//! This crate turns typed values into [`Record`]s and back:
//! - Registry: type descriptor resolver (tag ↔ Rust type)
//! - Codec: per-type field encoding, implemented for the supported shapes
//! - Object: derived field access for skeleton allocation and assignment
//! - Persist: object-safe view used for polymorphic values
//! - Serializer: root value ↔ record
//!
//! Derived code refers to this crate through the paths re-exported here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod fields;
pub mod impls;
pub mod polymorphic;
pub mod registry;
pub mod serializer;
pub mod traits;

pub use context::{DecodeContext, Drift, DriftKind, EncodeContext};
pub use fields::{FieldReader, FieldWriter};
pub use impls::{decode_tagged, encode_tagged, unexpected};
pub use registry::{layout_fingerprint, Registry, TypeDescriptor};
pub use serializer::{decode_object, encode_object, variant_parts, Serializer};
pub use traits::{Codec, Object, Persist, Vacant};

pub use quire_core::{Error, Field, FieldDescriptor, Node, Record, Result, TypeTag};
