//! Type descriptor registry
//!
//! Maps concrete Rust types to their persisted identity and back:
//!
//! - `resolve::<T>()`: descriptor of `T`, built on first use and cached for
//!   the life of the process
//! - `resolve_by_tag(tag)`: descriptor of whatever type owns a stored tag,
//!   used to decode values whose concrete type the caller did not name
//!
//! ## Usage
//!
//! ```
//! use quire_codec::Registry;
//!
//! let registry = Registry::new();
//! let descriptor = registry.resolve::<String>().unwrap();
//! assert!(registry.resolve_by_tag(&descriptor.tag).is_ok());
//! ```
//!
//! A tag is bound to exactly one Rust type. A second type claiming the same
//! tag is rejected with `TagConflict` rather than silently shadowing the
//! first.

use crate::context::DecodeContext;
use crate::traits::{Codec, Persist, Vacant};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use quire_core::{Error, FieldDescriptor, Node, Result, TypeTag};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use xxhash_rust::xxh3::xxh3_64;

type DecodeFn = fn(&Node, &mut DecodeContext<'_>) -> Result<Box<dyn Persist>>;

fn decode_boxed<T: Codec>(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Box<dyn Persist>> {
    Ok(Box::new(T::decode(node, ctx)?))
}

/// Fingerprint of a field layout
///
/// Hashes field names and declared types in order. Types without a layout
/// fingerprint as 0.
pub fn layout_fingerprint(fields: Option<&[FieldDescriptor]>) -> u64 {
    match fields {
        None => 0,
        Some(fields) => {
            let mut text = String::new();
            for field in fields {
                text.push_str(field.name);
                text.push(':');
                text.push_str(field.declared_type);
                text.push(';');
            }
            xxh3_64(text.as_bytes())
        }
    }
}

/// Everything needed to persist and rebuild one concrete type
pub struct TypeDescriptor {
    /// Persisted identity
    pub tag: TypeTag,
    /// Rust type identity
    pub type_id: TypeId,
    /// Rust type name
    pub type_name: &'static str,
    /// Serializable fields, for types that have them
    pub fields: Option<&'static [FieldDescriptor]>,
    /// Layout fingerprint
    pub fingerprint: u64,
    decode: DecodeFn,
}

impl TypeDescriptor {
    /// Build the descriptor of `T`
    pub fn of<T: Codec>() -> Self {
        let fields = T::layout();
        TypeDescriptor {
            tag: T::type_tag(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            fields,
            fingerprint: layout_fingerprint(fields),
            decode: decode_boxed::<T>,
        }
    }

    /// Decode a node of this type into a dynamic value
    pub fn decode_node(&self, node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Box<dyn Persist>> {
        (self.decode)(node, ctx)
    }

    /// True for the placeholder of an unassigned dynamic slot
    pub fn is_vacant(&self) -> bool {
        self.type_id == TypeId::of::<Vacant>()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Process-wide type registry
///
/// Read-mostly: each type is built once on first resolution, concurrent
/// first users of the same type wait on the map entry and reuse the result.
pub struct Registry {
    by_type: DashMap<TypeId, Arc<TypeDescriptor>>,
    by_tag: DashMap<TypeTag, Arc<TypeDescriptor>>,
}

impl Registry {
    /// Create a registry holding the built-in types
    pub fn new() -> Self {
        let registry = Registry {
            by_type: DashMap::new(),
            by_tag: DashMap::new(),
        };
        registry.insert_builtin::<()>();
        registry.insert_builtin::<bool>();
        registry.insert_builtin::<i8>();
        registry.insert_builtin::<i16>();
        registry.insert_builtin::<i32>();
        registry.insert_builtin::<i64>();
        registry.insert_builtin::<isize>();
        registry.insert_builtin::<u8>();
        registry.insert_builtin::<u16>();
        registry.insert_builtin::<u32>();
        registry.insert_builtin::<u64>();
        registry.insert_builtin::<usize>();
        registry.insert_builtin::<f32>();
        registry.insert_builtin::<f64>();
        registry.insert_builtin::<char>();
        registry.insert_builtin::<String>();
        registry.insert_builtin::<Uuid>();
        registry.insert_builtin::<DateTime<Utc>>();
        registry.insert_builtin::<Vacant>();
        registry
    }

    /// The registry shared by every store in this process
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    // Built-in tags are distinct by construction.
    fn insert_builtin<T: Codec>(&self) {
        let descriptor = Arc::new(TypeDescriptor::of::<T>());
        self.by_tag
            .insert(descriptor.tag.clone(), Arc::clone(&descriptor));
        self.by_type.insert(descriptor.type_id, descriptor);
    }

    /// Descriptor of `T`, building and caching it on first use
    ///
    /// # Errors
    /// `TagConflict` if another type already owns `T`'s tag.
    pub fn resolve<T: Codec>(&self) -> Result<Arc<TypeDescriptor>> {
        let type_id = TypeId::of::<T>();
        if let Some(existing) = self.by_type.get(&type_id) {
            return Ok(Arc::clone(existing.value()));
        }

        match self.by_type.entry(type_id) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let descriptor = Arc::new(TypeDescriptor::of::<T>());
                self.bind_tag(&descriptor)?;
                entry.insert(Arc::clone(&descriptor));
                debug!(
                    target: "quire::codec",
                    tag = %descriptor.tag,
                    type_name = descriptor.type_name,
                    fingerprint = descriptor.fingerprint,
                    "Registered type"
                );
                Ok(descriptor)
            }
        }
    }

    /// Register `T` eagerly so records of it can be read dynamically
    pub fn register<T: Codec>(&self) -> Result<()> {
        self.resolve::<T>().map(|_| ())
    }

    /// Descriptor of the type owning `tag`
    ///
    /// # Errors
    /// `UnknownType` if no type in this process owns the tag.
    pub fn resolve_by_tag(&self, tag: &TypeTag) -> Result<Arc<TypeDescriptor>> {
        self.by_tag
            .get(tag)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::UnknownType(tag.clone()))
    }

    /// True if some type owns `tag`
    pub fn contains_tag(&self, tag: &TypeTag) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// All registered tags, sorted
    pub fn tags(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = self.by_tag.iter().map(|e| e.key().clone()).collect();
        tags.sort();
        tags
    }

    fn bind_tag(&self, descriptor: &Arc<TypeDescriptor>) -> Result<()> {
        match self.by_tag.entry(descriptor.tag.clone()) {
            Entry::Occupied(entry) => {
                let existing = entry.get();
                if existing.type_id == descriptor.type_id {
                    Ok(())
                } else {
                    Err(Error::TagConflict {
                        tag: descriptor.tag.clone(),
                        existing: existing.type_name,
                        incoming: descriptor.type_name,
                    })
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(descriptor));
                Ok(())
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
