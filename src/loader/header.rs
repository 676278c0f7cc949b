use container::{NAME_LEN, RecordReader, RecordWriter};
use std::io::BufRead;

use crate::{Result, arch::layers::LayerKind};

/// Size in bytes of a layer header: the name field and the type tag.
pub const HEADER_SIZE: usize = NAME_LEN + size_of::<i32>();

/// The record preceding every layer payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerHeader {
    pub name: String,
    /// The raw type tag, kept as read so unknown tags can be reported.
    pub tag: i32,
}

impl LayerHeader {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            tag: kind.tag(),
        }
    }

    pub fn read<R: BufRead>(reader: &mut RecordReader<R>) -> Result<Self> {
        let name = reader.read_name()?;
        let tag = reader.read_i32("layer type")?;
        Ok(Self { name, tag })
    }

    pub fn write(&self, writer: &mut RecordWriter) {
        writer.write_name(&self.name);
        writer.write_i32(self.tag);
    }

    /// Returns the kind this header announces, `None` if the tag is unknown.
    pub fn kind(&self) -> Option<LayerKind> {
        LayerKind::from_tag(self.tag)
    }
}
