//! Uuid and chrono timestamps

use super::unexpected;
use crate::context::{DecodeContext, EncodeContext};
use crate::traits::Codec;
use chrono::{DateTime, SecondsFormat, Utc};
use quire_core::{Error, Node, Result};
use uuid::Uuid;

impl Codec for Uuid {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Bytes(self.as_bytes().to_vec()))
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Bytes(bytes) => Uuid::from_slice(bytes).map_err(|e| {
                Error::type_mismatch(Self::type_tag().to_string(), format!("Bytes ({e})"))
            }),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        Uuid::nil()
    }
}

// RFC 3339 with nanoseconds keeps the stored form readable and exact.
impl Codec for DateTime<Utc> {
    fn encode(&self, _ctx: &mut EncodeContext<'_>) -> Result<Node> {
        Ok(Node::Str(self.to_rfc3339_opts(SecondsFormat::Nanos, true)))
    }

    fn decode(node: &Node, _ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match node {
            Node::Str(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    Error::type_mismatch(Self::type_tag().to_string(), format!("Str ({e})"))
                }),
            other => Err(unexpected::<Self>(other)),
        }
    }

    fn placeholder() -> Self {
        DateTime::<Utc>::from(std::time::UNIX_EPOCH)
    }
}
