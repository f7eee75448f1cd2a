//! Object graph serializer
//!
//! `serialize` turns one root value into a [`Record`] tagged with the
//! value's concrete type. `deserialize` rebuilds it:
//!
//! 1. If the caller's type owns the stored tag, decode statically
//! 2. Otherwise register the types the caller's type knows about, resolve
//!    the tag through the registry, decode the concrete type, then convert
//!    it into the caller's type
//!
//! Derived structs decode by allocating a skeleton and assigning each stored
//! field into it, so no constructor, `Default` impl or builder runs.

use crate::context::{DecodeContext, Drift, EncodeContext};
use crate::fields::{FieldReader, FieldWriter};
use crate::impls::unexpected;
use crate::registry::{layout_fingerprint, Registry};
use crate::traits::{Codec, Object, Persist};
use quire_core::{Error, Field, Node, Record, Result, TypeTag, DEFAULT_MAX_NESTING_DEPTH};
use tracing::warn;

/// Encode a derived struct as an object node
pub fn encode_object<T: Object>(value: &T, ctx: &mut EncodeContext<'_>) -> Result<Node> {
    ctx.nested(|ctx| {
        let mut out = FieldWriter::new(ctx);
        value.write_fields(&mut out)?;
        Ok(Node::Object {
            tag: T::type_tag(),
            fields: out.finish(),
        })
    })
}

/// Decode a derived struct from an object node
///
/// Allocates the skeleton, then overwrites every stored field.
pub fn decode_object<T: Object>(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<T> {
    let tag = T::type_tag();
    match node {
        Node::Object {
            tag: stored,
            fields,
        } => {
            if *stored != tag {
                return Err(Error::type_mismatch(tag.to_string(), stored.to_string()));
            }
            ctx.nested(|ctx| {
                let mut value = T::allocate();
                let mut input = FieldReader::new(ctx, &tag, fields);
                value.read_fields(&mut input)?;
                input.finish();
                Ok(value)
            })
        }
        other => Err(unexpected::<T>(other)),
    }
}

/// Split a variant node of enum `tag` into its variant name and fields
pub fn variant_parts<'n>(node: &'n Node, tag: &TypeTag) -> Result<(&'n str, &'n [Field])> {
    match node {
        Node::Variant {
            tag: stored,
            variant,
            fields,
        } => {
            if stored != tag {
                return Err(Error::type_mismatch(tag.to_string(), stored.to_string()));
            }
            Ok((variant.as_str(), fields.as_slice()))
        }
        other => Err(Error::type_mismatch(tag.to_string(), other.describe())),
    }
}

/// Turns root values into records and back
#[derive(Clone, Copy)]
pub struct Serializer<'r> {
    registry: &'r Registry,
    max_depth: usize,
}

impl<'r> Serializer<'r> {
    /// Serializer over `registry` with the default depth limit
    pub fn new(registry: &'r Registry) -> Self {
        Serializer {
            registry,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Override the nesting depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Registry used by this serializer
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Encode `value` as the record stored under `key`
    ///
    /// # Errors
    /// - `Serialization` if the graph nests too deep or the root is an empty
    ///   dynamic slot
    /// - `TagConflict` if the value's type shares a tag with another type
    pub fn serialize(&self, key: &str, value: &dyn Persist) -> Result<Record> {
        let value = value.concrete();
        let descriptor = value.descriptor(self.registry)?;
        if descriptor.is_vacant() {
            return Err(Error::Serialization(
                "cannot write an empty dynamic value".to_string(),
            ));
        }

        let mut ctx = EncodeContext::new(self.registry).with_max_depth(self.max_depth);
        let body = value.encode_value(&mut ctx)?;
        Ok(Record::new(
            key,
            descriptor.tag.clone(),
            descriptor.fingerprint,
            body,
        ))
    }

    /// Rebuild the value stored in `record` as a `T`
    ///
    /// # Errors
    /// - `TypeMismatch` if the stored concrete type cannot become a `T`
    /// - `UnknownType` if the stored type is not registered in this process
    /// - `CorruptRecord` if the record nests deeper than allowed
    pub fn deserialize<T: Codec>(&self, record: &Record) -> Result<T> {
        let mut ctx = self.decode_context(record);
        self.deserialize_in(record, &mut ctx)
    }

    /// Like [`Serializer::deserialize`], also returning the schema drift seen
    pub fn deserialize_with_drift<T: Codec>(&self, record: &Record) -> Result<(T, Vec<Drift>)> {
        let mut ctx = self.decode_context(record);
        let value = self.deserialize_in(record, &mut ctx)?;
        Ok((value, ctx.drift().to_vec()))
    }

    /// Rebuild the value stored in `record` as its concrete type
    ///
    /// # Errors
    /// `UnknownType` if the stored type is not registered in this process.
    pub fn deserialize_dyn(&self, record: &Record) -> Result<Box<dyn Persist>> {
        let mut ctx = self.decode_context(record);
        self.deserialize_dyn_in(record, &mut ctx)
    }

    fn decode_context(&self, record: &Record) -> DecodeContext<'r> {
        DecodeContext::new(self.registry)
            .with_max_depth(self.max_depth)
            .for_key(record.key.as_str())
    }

    fn deserialize_in<T: Codec>(&self, record: &Record, ctx: &mut DecodeContext<'r>) -> Result<T> {
        let expected = T::type_tag();
        if expected == record.tag {
            check_fingerprint(record, layout_fingerprint(T::layout()));
            return T::decode(&record.body, ctx);
        }

        T::register_known(self.registry)?;
        let value = self.deserialize_dyn_in(record, ctx)?;
        T::from_persist(value)
            .map_err(|value| Error::type_mismatch(expected.to_string(), value.persist_tag().to_string()))
    }

    fn deserialize_dyn_in(
        &self,
        record: &Record,
        ctx: &mut DecodeContext<'r>,
    ) -> Result<Box<dyn Persist>> {
        let descriptor = self.registry.resolve_by_tag(&record.tag)?;
        check_fingerprint(record, descriptor.fingerprint);
        descriptor.decode_node(&record.body, ctx)
    }
}

fn check_fingerprint(record: &Record, current: u64) {
    if record.fingerprint != current {
        warn!(
            target: "quire::codec",
            key = %record.key,
            tag = %record.tag,
            stored = record.fingerprint,
            current,
            "Field layout changed since record was written"
        );
    }
}
