//! Field value nodes
//!
//! A `Node` is the encoded form of one value: a primitive, a collection, a
//! derived object, or a polymorphic reference carrying its concrete tag.
//!
//! ## Encoding rules
//!
//! - Absence is explicit: `Option::None` is `Null`, never an omitted field
//! - Signed integers are `Int`, unsigned integers are `UInt`
//! - Ordered and unordered collections are both `Seq`; only ordered ones
//!   promise element order
//! - A polymorphic reference is `Tagged`, so the concrete type survives even
//!   when the field is declared as a trait object

use crate::types::TypeTag;
use serde::{Deserialize, Serialize};

/// Encoded value of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// `()` and unit structs
    Unit,
    /// `Option::None`
    Null,
    /// `Option::Some`
    Some(Box<Node>),
    /// Boolean
    Bool(bool),
    /// Signed integer (widened to 64 bits)
    Int(i64),
    /// Unsigned integer (widened to 64 bits)
    UInt(u64),
    /// Floating point (widened to 64 bits)
    Float(f64),
    /// Single character
    Char(char),
    /// UTF-8 text
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Collection elements
    Seq(Vec<Node>),
    /// Map entries in iteration order
    Map(Vec<(Node, Node)>),
    /// Derived struct
    Object {
        /// Concrete type of the struct
        tag: TypeTag,
        /// Fields in declaration order
        fields: Vec<Field>,
    },
    /// Derived enum
    Variant {
        /// Concrete type of the enum
        tag: TypeTag,
        /// Variant name
        variant: String,
        /// Variant payload, empty for unit variants
        fields: Vec<Field>,
    },
    /// Polymorphic reference
    Tagged {
        /// Concrete type of the referenced value
        tag: TypeTag,
        /// Encoded referenced value
        value: Box<Node>,
    },
}

/// Named field inside an object or variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Stored field name
    pub name: String,
    /// Encoded value
    pub node: Node,
}

impl Field {
    /// Create a field
    pub fn new(name: impl Into<String>, node: Node) -> Self {
        Field {
            name: name.into(),
            node,
        }
    }
}

impl Node {
    /// Name of the node kind, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Unit => "Unit",
            Node::Null => "Null",
            Node::Some(_) => "Some",
            Node::Bool(_) => "Bool",
            Node::Int(_) => "Int",
            Node::UInt(_) => "UInt",
            Node::Float(_) => "Float",
            Node::Char(_) => "Char",
            Node::Str(_) => "Str",
            Node::Bytes(_) => "Bytes",
            Node::Seq(_) => "Seq",
            Node::Map(_) => "Map",
            Node::Object { .. } => "Object",
            Node::Variant { .. } => "Variant",
            Node::Tagged { .. } => "Tagged",
        }
    }

    /// Description of what this node holds: the tag for typed nodes, the
    /// kind otherwise
    pub fn describe(&self) -> String {
        match self {
            Node::Object { tag, .. } | Node::Variant { tag, .. } | Node::Tagged { tag, .. } => {
                tag.to_string()
            }
            other => other.kind_name().to_string(),
        }
    }

    /// Type tag of an object, variant or tagged node
    pub fn tag(&self) -> Option<&TypeTag> {
        match self {
            Node::Object { tag, .. } | Node::Variant { tag, .. } | Node::Tagged { tag, .. } => {
                Some(tag)
            }
            _ => None,
        }
    }

    /// Check if this is an explicit absence
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Look up a field of an object or variant by name
    pub fn field(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Object { fields, .. } | Node::Variant { fields, .. } => fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| &f.node),
            _ => None,
        }
    }

    /// Maximum nesting depth below this node (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        let children = match self {
            Node::Some(inner) => inner.depth(),
            Node::Tagged { value, .. } => value.depth(),
            Node::Seq(items) => items.iter().map(Node::depth).max().unwrap_or(0),
            Node::Map(entries) => entries
                .iter()
                .map(|(k, v)| k.depth().max(v.depth()))
                .max()
                .unwrap_or(0),
            Node::Object { fields, .. } | Node::Variant { fields, .. } => {
                fields.iter().map(|f| f.node.depth()).max().unwrap_or(0)
            }
            _ => 0,
        };
        children + 1
    }
}
