//! Built-in `Codec` implementations

mod collections;
mod dynamic;
mod external;
mod primitives;

pub use dynamic::{decode_tagged, encode_tagged};

use crate::traits::Codec;
use quire_core::{Error, Node};

/// `TypeMismatch` for a node that does not fit `T`
pub fn unexpected<T: Codec>(node: &Node) -> Error {
    Error::type_mismatch(T::type_tag().to_string(), node.describe())
}
