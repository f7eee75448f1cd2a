//! Durable unit stored per (book, key)

use crate::node::Node;
use crate::types::TypeTag;
use serde::{Deserialize, Serialize};

/// One stored value
///
/// `tag` is the concrete type of the value most recently written under
/// `key`. `fingerprint` identifies the field layout the writer used, so a
/// reader with a different layout can report schema drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Key the record was written under
    pub key: String,
    /// Concrete type of the root value
    pub tag: TypeTag,
    /// Layout fingerprint of the writing type (0 for types without a layout)
    pub fingerprint: u64,
    /// Encoded root value
    pub body: Node,
}

impl Record {
    /// Create a record
    pub fn new(key: impl Into<String>, tag: TypeTag, fingerprint: u64, body: Node) -> Self {
        Record {
            key: key.into(),
            tag,
            fingerprint,
            body,
        }
    }
}
