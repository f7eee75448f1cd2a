//! Polymorphic reference sites
//!
//! A field declared as `Box<dyn Persist>` (or a `polymorphic!` trait object)
//! records the concrete type of the value it holds, so reading it back yields
//! the original variant rather than the declared abstraction.

use super::unexpected;
use crate::context::{DecodeContext, EncodeContext};
use crate::traits::{Codec, Persist, Vacant};
use quire_core::{Node, Result, TypeTag};

/// Encode `value` with its concrete tag
///
/// Resolves the concrete type so the tag can be decoded later in this
/// process.
pub fn encode_tagged(value: &dyn Persist, ctx: &mut EncodeContext<'_>) -> Result<Node> {
    let value = value.concrete();
    let descriptor = value.descriptor(ctx.registry())?;
    ctx.nested(|ctx| {
        Ok(Node::Tagged {
            tag: descriptor.tag.clone(),
            value: Box::new(value.encode_value(ctx)?),
        })
    })
}

/// Decode a tagged node into its concrete type
///
/// # Errors
/// `UnknownType` if the stored tag has no registered type in this process.
pub fn decode_tagged(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Box<dyn Persist>> {
    match node {
        Node::Tagged { tag, value } => {
            let descriptor = ctx.registry().resolve_by_tag(tag)?;
            ctx.nested(|ctx| descriptor.decode_node(value, ctx))
        }
        other => Err(unexpected::<Box<dyn Persist>>(other)),
    }
}

impl Codec for Box<dyn Persist> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        encode_tagged(&**self, ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        decode_tagged(node, ctx)
    }

    fn placeholder() -> Self {
        Box::new(Vacant)
    }

    fn type_tag() -> TypeTag {
        TypeTag::new("dyn quire::Persist")
    }

    fn as_dyn(&self) -> Option<&dyn Persist> {
        Some((**self).concrete())
    }

    fn into_dyn(self) -> std::result::Result<Box<dyn Persist>, Self> {
        Ok(self.into_concrete())
    }

    fn from_persist(value: Box<dyn Persist>) -> std::result::Result<Self, Box<dyn Persist>> {
        Ok(value)
    }
}
