//! Option, smart pointers, collections and tuples

use super::unexpected;
use crate::context::{DecodeContext, EncodeContext};
use crate::registry::Registry;
use crate::traits::{Codec, Persist};
use quire_core::{Node, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

impl<T: Codec> Codec for Option<T> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        match self {
            None => Ok(Node::Null),
            Some(value) => ctx.nested(|ctx| Ok(Node::Some(Box::new(value.encode(ctx)?)))),
        }
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Null => Ok(None),
            Node::Some(inner) => ctx.nested(|ctx| T::decode(inner, ctx).map(Some)),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        None
    }

    fn from_persist(value: Box<dyn Persist>) -> std::result::Result<Self, Box<dyn Persist>> {
        match value.downcast::<Self>() {
            Ok(option) => Ok(*option),
            Err(value) => T::from_persist(value).map(Some),
        }
    }

    fn register_known(registry: &Registry) -> Result<()> {
        T::register_known(registry)
    }
}

impl<T: Codec> Codec for Box<T> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        (**self).encode(ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        T::decode(node, ctx).map(Box::new)
    }

    fn placeholder() -> Self {
        Box::new(T::placeholder())
    }

    fn from_persist(value: Box<dyn Persist>) -> std::result::Result<Self, Box<dyn Persist>> {
        match value.downcast::<Self>() {
            Ok(boxed) => Ok(*boxed),
            Err(value) => value.downcast::<T>(),
        }
    }
}

impl<T: Codec> Codec for Arc<T> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        (**self).encode(ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        T::decode(node, ctx).map(Arc::new)
    }

    fn placeholder() -> Self {
        Arc::new(T::placeholder())
    }

    fn from_persist(value: Box<dyn Persist>) -> std::result::Result<Self, Box<dyn Persist>> {
        match value.downcast::<Self>() {
            Ok(shared) => Ok(*shared),
            Err(value) => value.downcast::<T>().map(|boxed| Arc::new(*boxed)),
        }
    }
}

fn encode_seq<'v, T: Codec + 'v>(
    items: impl IntoIterator<Item = &'v T>,
    ctx: &mut EncodeContext<'_>,
) -> Result<Node> {
    ctx.nested(|ctx| {
        let nodes = items
            .into_iter()
            .map(|item| item.encode(ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(Node::Seq(nodes))
    })
}

fn decode_seq<T: Codec, C: FromIterator<T>>(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<C>
where
    C: Codec,
{
    match node {
        Node::Seq(items) => ctx.nested(|ctx| items.iter().map(|item| T::decode(item, ctx)).collect()),
        other => Err(unexpected::<C>(other)),
    }
}

fn encode_map<'v, K: Codec + 'v, V: Codec + 'v>(
    entries: impl IntoIterator<Item = (&'v K, &'v V)>,
    ctx: &mut EncodeContext<'_>,
) -> Result<Node> {
    ctx.nested(|ctx| {
        let nodes = entries
            .into_iter()
            .map(|(k, v)| Ok((k.encode(ctx)?, v.encode(ctx)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Node::Map(nodes))
    })
}

fn decode_map<K: Codec, V: Codec, C: FromIterator<(K, V)>>(
    node: &Node,
    ctx: &mut DecodeContext<'_>,
) -> Result<C>
where
    C: Codec,
{
    match node {
        Node::Map(entries) => ctx.nested(|ctx| {
            entries
                .iter()
                .map(|(k, v)| Ok((K::decode(k, ctx)?, V::decode(v, ctx)?)))
                .collect()
        }),
        other => Err(unexpected::<C>(other)),
    }
}

impl<T: Codec> Codec for Vec<T> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        encode_seq(self, ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        decode_seq::<T, Self>(node, ctx)
    }

    fn placeholder() -> Self {
        Vec::new()
    }
}

impl<T: Codec> Codec for VecDeque<T> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        encode_seq(self, ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        decode_seq::<T, Self>(node, ctx)
    }

    fn placeholder() -> Self {
        VecDeque::new()
    }
}

impl<T: Codec + Ord> Codec for BTreeSet<T> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        encode_seq(self, ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        decode_seq::<T, Self>(node, ctx)
    }

    fn placeholder() -> Self {
        BTreeSet::new()
    }
}

impl<T: Codec + Eq + Hash> Codec for HashSet<T> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        encode_seq(self, ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        decode_seq::<T, Self>(node, ctx)
    }

    fn placeholder() -> Self {
        HashSet::new()
    }
}

impl<K: Codec + Ord, V: Codec> Codec for BTreeMap<K, V> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        encode_map(self, ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        decode_map::<K, V, Self>(node, ctx)
    }

    fn placeholder() -> Self {
        BTreeMap::new()
    }
}

impl<K: Codec + Eq + Hash, V: Codec> Codec for HashMap<K, V> {
    fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
        encode_map(self, ctx)
    }

    fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        decode_map::<K, V, Self>(node, ctx)
    }

    fn placeholder() -> Self {
        HashMap::new()
    }
}

macro_rules! tuple_codec {
    ($len:expr => $($name:ident : $idx:tt),+) => {
        impl<$($name: Codec),+> Codec for ($($name,)+) {
            fn encode(&self, ctx: &mut EncodeContext<'_>) -> Result<Node> {
                ctx.nested(|ctx| Ok(Node::Seq(vec![$(self.$idx.encode(ctx)?),+])))
            }

            fn decode(node: &Node, ctx: &mut DecodeContext<'_>) -> Result<Self> {
                match node {
                    Node::Seq(items) if items.len() == $len => {
                        ctx.nested(|ctx| Ok(($($name::decode(&items[$idx], ctx)?,)+)))
                    }
                    other => Err(unexpected::<Self>(other)),
                }
            }

            fn placeholder() -> Self {
                ($($name::placeholder(),)+)
            }
        }
    };
}

tuple_codec!(1 => A: 0);
tuple_codec!(2 => A: 0, B: 1);
tuple_codec!(3 => A: 0, B: 1, C: 2);
tuple_codec!(4 => A: 0, B: 1, C: 2, D: 3);
