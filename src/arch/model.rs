use container::{ElementWidth, RecordReader, RecordWriter};
use log::{info, warn};
use std::{fs::File, io::BufRead, io::BufReader, path::Path};

use super::layers::Layer;
use crate::{
    Result, WaveErr,
    loader::{self, Dispatched, LayerHeader, LoadOptions, UnknownLayer},
};

/// A layer together with the name its header gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedLayer {
    pub name: String,
    pub layer: Layer,
}

impl NamedLayer {
    pub fn new(name: impl Into<String>, layer: impl Into<Layer>) -> Self {
        Self {
            name: name.into(),
            layer: layer.into(),
        }
    }
}

/// The ordered layers of a network, as stored in its container.
///
/// Parameters are read-only once loaded, so a `Model` can be shared between threads running
/// independent sequences as long as each one keeps its own hidden state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    layers: Vec<NamedLayer>,
}

impl Model {
    /// Creates a new `Model`.
    ///
    /// # Arguments
    /// * `layers` - The layers in container order.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = NamedLayer>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Loads layers until the stream ends.
    ///
    /// # Arguments
    /// * `reader` - A reader positioned at the first layer header.
    /// * `options` - What to do on unknown layers and how many layers to read at most.
    ///
    /// # Returns
    /// The model, or the first error any layer load produced.
    pub fn load<R: BufRead>(reader: &mut RecordReader<R>, options: &LoadOptions) -> Result<Self> {
        let mut layers = Vec::new();

        while !reader.is_at_end()? {
            if options.max_layers.is_some_and(|max| layers.len() >= max) {
                info!("stopping after {} layers", layers.len());
                break;
            }

            match loader::dispatch(reader)? {
                Dispatched::Loaded(named) => layers.push(named),
                Dispatched::Unknown(LayerHeader { name, tag }) => match options.on_unknown {
                    UnknownLayer::Stop => {
                        warn!(tag = tag; "stopping at layer {name:?} of unknown type");
                        break;
                    }
                    UnknownLayer::Fail => return Err(WaveErr::UnknownLayerType { name, tag }),
                },
            }
        }

        info!("loaded {} layers", layers.len());
        Ok(Self { layers })
    }

    pub fn from_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        Self::load(&mut RecordReader::new(bytes), options)
    }

    /// Loads the container stored at `path`.
    pub fn open<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::load(&mut RecordReader::new(BufReader::new(file)), options)
    }

    /// Writes every layer, header included, storing floats at `width`.
    ///
    /// Layers are appended whole: on error `writer` holds the layers before the failing one
    /// and nothing of it.
    pub fn write(&self, writer: &mut RecordWriter, width: ElementWidth) -> Result<()> {
        for NamedLayer { name, layer } in &self.layers {
            let mut record = RecordWriter::new();
            LayerHeader::new(name.as_str(), layer.kind()).write(&mut record);
            layer.write(&mut record, width)?;
            writer.append(record);
        }

        Ok(())
    }

    pub fn to_bytes(&self, width: ElementWidth) -> Result<Vec<u8>> {
        let mut writer = RecordWriter::new();
        self.write(&mut writer, width)?;
        Ok(writer.into_bytes())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedLayer> {
        self.layers.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx).map(|named| &named.layer)
    }

    /// Returns the first layer called `name`.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.layer)
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = &'a NamedLayer;
    type IntoIter = std::slice::Iter<'a, NamedLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
