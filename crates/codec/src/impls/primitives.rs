//! Primitives and text

use super::unexpected;
use crate::context::{DecodeContext, EncodeContext};
use crate::traits::Codec;
use quire_core::{Error, Node, Result};

fn out_of_range<T: Codec>(value: impl std::fmt::Display) -> Error {
    Error::type_mismatch(T::type_tag().to_string(), format!("out of range integer {value}"))
}

// Signed and unsigned nodes convert into each other when the value fits, so
// changing a field between `i32` and `u32` keeps old records readable.
macro_rules! int_codec {
    ($($t:ty => $variant:ident as $wide:ty),* $(,)?) => {
        $(
            impl Codec for $t {
                fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
                    Ok(Node::$variant(*self as $wide))
                }

                fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
                    match node {
                        Node::Int(v) => <$t>::try_from(*v).map_err(|_| out_of_range::<Self>(v)),
                        Node::UInt(v) => <$t>::try_from(*v).map_err(|_| out_of_range::<Self>(v)),
                        other => Err(unexpected::<Self>(other)),
                    }
                }

                fn placeholder() -> Self {
                    0
                }
            }
        )*
    };
}

int_codec! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    isize => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    usize => UInt as u64,
}

impl Codec for f64 {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Float(*self))
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Float(v) => Ok(*v),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        0.0
    }
}

impl Codec for f32 {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Float(f64::from(*self)))
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Float(v) => Ok(*v as f32),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        0.0
    }
}

impl Codec for bool {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Bool(*self))
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Bool(v) => Ok(*v),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        false
    }
}

impl Codec for char {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Char(*self))
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Char(v) => Ok(*v),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        '\0'
    }
}

impl Codec for String {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Str(self.clone()))
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Str(v) => Ok(v.clone()),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        String::new()
    }
}

impl Codec for () {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Unit)
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Unit => Ok(()),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {}
}
