//! Codec, Object and Persist traits
//!
//! - `Codec`: static encode/decode of one type, implemented for the
//!   supported field shapes and derived for user structs and enums
//! - `Object`: derived field-level access used to rebuild a struct without
//!   running any of its constructors
//! - `Persist`: object-safe view of any `Codec`, used for polymorphic roots
//!   and fields (`Box<dyn Persist>`)

use crate::context::{DecodeContext, EncodeContext};
use crate::fields::{FieldReader, FieldWriter};
use crate::registry::{Registry, TypeDescriptor};
use quire_core::{FieldDescriptor, Node, Result, TypeTag};
use std::any::Any;
use std::sync::Arc;

/// Static encoding of one type
///
/// Implemented for primitives, text, collections, `Option`, smart pointers,
/// tuples, `Uuid` and `DateTime<Utc>`. User types get it from
/// `#[derive(Object)]` or implement it by hand to take over their own
/// encoding.
pub trait Codec: Sized + Send + Sync + 'static {
    /// Encode the current value
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node>;

    /// Rebuild a value from its node
    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self>;

    /// Value a field holds right after allocation, before decode assigns it
    ///
    /// Also the value a field keeps when a stored record predates it.
    fn placeholder() -> Self;

    /// Persisted type identity
    fn type_tag() -> TypeTag {
        TypeTag::of::<Self>()
    }

    /// Serializable fields, for types that have them
    fn layout() -> Option<&'static [FieldDescriptor]> {
        None
    }

    /// Concrete value behind a dynamic container
    #[doc(hidden)]
    fn as_dyn(&self) -> Option<&dyn Persist> {
        None
    }

    /// Owned concrete value behind a dynamic container
    #[doc(hidden)]
    fn into_dyn(self) -> std::result::Result<Box<dyn Persist>, Self> {
        Err(self)
    }

    /// Convert a dynamically decoded value into this type
    ///
    /// Returns the value unchanged when it is not of this type.
    fn from_persist(value: Box<dyn Persist>) -> std::result::Result<Self, Box<dyn Persist>> {
        value.downcast::<Self>().map(|boxed| *boxed)
    }

    /// Register the concrete types a value of this type may hold
    ///
    /// Called before a record of another type is resolved into `Self`.
    /// Trait-object containers list their implementors here so a fresh
    /// registry can still find them.
    fn register_known(_registry: &Registry) -> Result<()> {
        Ok(())
    }
}

/// Field-level access to a derived struct
pub trait Object: Codec {
    /// Skeleton whose serialized fields hold placeholders and whose skipped
    /// fields hold `Default::default()`. No user constructor runs.
    fn allocate() -> Self;

    /// Serializable fields in declaration order
    fn fields() -> &'static [FieldDescriptor];

    /// Encode every serializable field
    fn write_fields(&self, out: &mut FieldWriter<'_, '_>) -> Result<()>;

    /// Assign every serializable field from the stored record
    fn read_fields(&mut self, input: &mut FieldReader<'_, '_>) -> Result<()>;
}

/// Object-safe view of a `Codec` value
///
/// Every `Codec` type is `Persist`. Calls made through a dynamic container
/// (`Box<dyn Persist>`, a `polymorphic!` trait object) reach the concrete
/// value inside it.
pub trait Persist: Any + Send + Sync {
    /// Tag of the concrete type
    fn persist_tag(&self) -> TypeTag;

    /// Rust name of the concrete type
    fn persist_type_name(&self) -> &'static str;

    /// Encode the concrete value
    fn encode_value(&self, ctx: &mut EncodeContext<'_>) -> Result<Node>;

    /// Resolve (and register) the descriptor of the concrete type
    fn descriptor(&self, registry: &Registry) -> Result<Arc<TypeDescriptor>>;

    /// The concrete value, unwrapping dynamic containers
    fn concrete(&self) -> &dyn Persist;

    /// The owned concrete value, unwrapping dynamic containers
    fn into_concrete(self: Box<Self>) -> Box<dyn Persist>;

    /// Concrete value as `Any`
    fn as_any(&self) -> &dyn Any;

    /// Owned concrete value as `Any`
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Codec> Persist for T {
    fn persist_tag(&self) -> TypeTag {
        match T::as_dyn(self) {
            Some(inner) => inner.persist_tag(),
            None => T::type_tag(),
        }
    }

    fn persist_type_name(&self) -> &'static str {
        match T::as_dyn(self) {
            Some(inner) => inner.persist_type_name(),
            None => std::any::type_name::<T>(),
        }
    }

    fn encode_value(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        match T::as_dyn(self) {
            Some(inner) => inner.encode_value(ctx),
            None => self.encode(ctx),
        }
    }

    fn descriptor(&self, registry: &Registry) -> Result<Arc<TypeDescriptor>> {
        match T::as_dyn(self) {
            Some(inner) => inner.descriptor(registry),
            None => registry.resolve::<T>(),
        }
    }

    fn concrete(&self) -> &dyn Persist {
        match T::as_dyn(self) {
            Some(inner) => inner,
            None => self,
        }
    }

    fn into_concrete(self: Box<Self>) -> Box<dyn Persist> {
        match T::into_dyn(*self) {
            Ok(inner) => inner,
            Err(this) => Box::new(this),
        }
    }

    fn as_any(&self) -> &dyn Any {
        match T::as_dyn(self) {
            Some(inner) => inner.as_any(),
            None => self,
        }
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        match T::into_dyn(*self) {
            Ok(inner) => inner.into_any(),
            Err(this) => Box::new(this),
        }
    }
}

impl dyn Persist {
    /// True if the concrete value is a `T`
    pub fn is<T: Persist>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the concrete value as a `T`
    pub fn downcast_ref<T: Persist>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Take the concrete value as a `T`, or get the value back unchanged
    pub fn downcast<T: Persist>(self: Box<Self>) -> std::result::Result<Box<T>, Box<dyn Persist>> {
        let value = self.into_concrete();
        if !(*value).is::<T>() {
            return Err(value);
        }
        match value.into_any().downcast::<T>() {
            Ok(boxed) => Ok(boxed),
            Err(_) => unreachable!("type checked by is::<T>()"),
        }
    }
}

impl std::fmt::Debug for dyn Persist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persist")
            .field("tag", &self.persist_tag())
            .finish_non_exhaustive()
    }
}

/// Value held by a dynamic slot that was never assigned
///
/// `Box<dyn Persist>` has no natural placeholder, so an allocated skeleton
/// holds a `Vacant` until decode overwrites it. A `Vacant` cannot be written
/// as a root value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vacant;

impl Codec for Vacant {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Unit)
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Unit => Ok(Vacant),
            other => Err(crate::impls::unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        Vacant
    }

    fn type_tag() -> TypeTag {
        TypeTag::new("quire::Vacant")
    }
}
