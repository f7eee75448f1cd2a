//! Field writer and reader used by derived code

use crate::context::{DecodeContext, DriftKind, EncodeContext};
use crate::traits::Codec;
use quire_core::{Field, Result, TypeTag};
use tracing::warn;

/// Collects encoded fields of one object or variant
pub struct FieldWriter<'a, 'r> {
    ctx: &'a mut EncodeContext<'r>,
    fields: Vec<Field>,
}

impl<'a, 'r> FieldWriter<'a, 'r> {
    /// Start an empty field list
    pub fn new(ctx: &'a mut EncodeContext<'r>) -> Self {
        FieldWriter {
            ctx,
            fields: Vec::new(),
        }
    }

    /// Encode the current value of one field
    pub fn write<T: Codec>(&mut self, name: &str, value: &T) -> Result<()> {
        let node = value.encode(self.ctx)?;
        self.fields.push(Field::new(name, node));
        Ok(())
    }

    /// Encoded fields in write order
    pub fn finish(self) -> Vec<Field> {
        self.fields
    }
}

/// Assigns stored fields into an allocated skeleton
///
/// Fields the record lacks keep their placeholder; stored fields nobody
/// asked for are reported by [`FieldReader::finish`]. Both are logged as
/// schema drift, neither is an error.
pub struct FieldReader<'a, 'r> {
    ctx: &'a mut DecodeContext<'r>,
    tag: &'a TypeTag,
    fields: &'a [Field],
    used: Vec<bool>,
    cursor: usize,
}

impl<'a, 'r> FieldReader<'a, 'r> {
    /// Read from the stored fields of a node tagged `tag`
    pub fn new(ctx: &'a mut DecodeContext<'r>, tag: &'a TypeTag, fields: &'a [Field]) -> Self {
        FieldReader {
            ctx,
            tag,
            fields,
            used: vec![false; fields.len()],
            cursor: 0,
        }
    }

    /// Decode the stored field `name` into `slot`
    pub fn assign<T: Codec>(&mut self, name: &str, slot: &mut T) -> Result<()> {
        match self.position(name) {
            Some(index) => {
                self.used[index] = true;
                self.cursor = index + 1;
                *slot = T::decode(&self.fields[index].node, self.ctx)?;
            }
            None => {
                warn!(
                    target: "quire::codec",
                    key = %self.ctx.key(),
                    tag = %self.tag,
                    field = name,
                    "Stored record lacks field, keeping placeholder"
                );
                self.ctx.record_drift(self.tag, name, DriftKind::Missing);
            }
        }
        Ok(())
    }

    /// Report stored fields that were never assigned
    pub fn finish(self) {
        for (field, used) in self.fields.iter().zip(&self.used) {
            if !used {
                warn!(
                    target: "quire::codec",
                    key = %self.ctx.key(),
                    tag = %self.tag,
                    field = %field.name,
                    "Ignoring stored field unknown to current type"
                );
                self.ctx
                    .record_drift(self.tag, &field.name, DriftKind::Ignored);
            }
        }
    }

    // Fields are usually stored in declaration order, so try the next slot first.
    fn position(&self, name: &str) -> Option<usize> {
        match self.fields.get(self.cursor) {
            Some(field) if field.name == name && !self.used[self.cursor] => Some(self.cursor),
            _ => (0..self.fields.len()).find(|&i| self.fields[i].name == name && !self.used[i]),
        }
    }
}
