//! Encode and decode contexts
//!
//! A context lives for one `serialize` or `deserialize` call. It carries the
//! type registry, guards nesting depth, and on the decode side collects the
//! schema drift observed while reading the record.

use crate::registry::Registry;
use quire_core::{Error, Result, TypeTag, DEFAULT_MAX_NESTING_DEPTH};

/// State threaded through encoding
pub struct EncodeContext<'r> {
    registry: &'r Registry,
    depth: usize,
    max_depth: usize,
}

impl<'r> EncodeContext<'r> {
    /// Create a context with the default depth limit
    pub fn new(registry: &'r Registry) -> Self {
        EncodeContext {
            registry,
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Override the nesting depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Registry used to tag concrete types
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `f` one nesting level deeper
    ///
    /// # Errors
    /// `Serialization` once the depth limit is exceeded. A graph that loops
    /// back on itself always ends up here.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(Error::Serialization(format!(
                "value graph nests deeper than {} levels; cyclic graphs are not supported",
                self.max_depth
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

/// What kind of schema drift was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    /// Current type has a field the record lacks; the field keeps its
    /// allocation-time placeholder
    Missing,
    /// Record has a field the current type lacks; the stored node is ignored
    Ignored,
}

/// One schema drift observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    /// Type whose layout drifted
    pub tag: TypeTag,
    /// Field name
    pub field: String,
    /// Direction of the drift
    pub kind: DriftKind,
}

/// State threaded through decoding
pub struct DecodeContext<'r> {
    registry: &'r Registry,
    key: String,
    depth: usize,
    max_depth: usize,
    drift: Vec<Drift>,
}

impl<'r> DecodeContext<'r> {
    /// Create a context with the default depth limit
    pub fn new(registry: &'r Registry) -> Self {
        DecodeContext {
            registry,
            key: String::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
            drift: Vec::new(),
        }
    }

    /// Override the nesting depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Name the key being decoded, for error messages
    pub fn for_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Registry used to resolve stored tags
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Key being decoded (empty when decoding outside a record)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Run `f` one nesting level deeper
    ///
    /// # Errors
    /// `CorruptRecord` once the depth limit is exceeded; a well-formed
    /// record never nests deeper than its writer allowed.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(Error::corrupt(
                self.key.clone(),
                format!("record nests deeper than {} levels", self.max_depth),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Schema drift observed so far
    pub fn drift(&self) -> &[Drift] {
        &self.drift
    }

    pub(crate) fn record_drift(&mut self, tag: &TypeTag, field: &str, kind: DriftKind) {
        self.drift.push(Drift {
            tag: tag.clone(),
            field: field.to_string(),
            kind,
        });
    }
}
