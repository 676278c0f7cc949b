//! Reconstructs layers one at a time from a weight container.

mod header;
mod options;

use container::RecordReader;
use log::{debug, info};
use std::io::BufRead;

use crate::{
    Result,
    arch::{NamedLayer, layers::Layer},
};

pub use header::{HEADER_SIZE, LayerHeader};
pub use options::{LoadOptions, UnknownLayer};

/// The outcome of reading one layer header.
pub(crate) enum Dispatched {
    Loaded(NamedLayer),
    Unknown(LayerHeader),
}

pub(crate) fn dispatch<R: BufRead>(reader: &mut RecordReader<R>) -> Result<Dispatched> {
    let position = reader.position();
    let header = LayerHeader::read(reader)?;

    let Some(kind) = header.kind() else {
        debug!(position = position, tag = header.tag; "unknown layer type for {:?}", header.name);
        return Ok(Dispatched::Unknown(header));
    };

    info!(position = position, name = header.name.as_str(), kind:% = kind; "loading layer");
    let layer = Layer::load(kind, reader)?;

    Ok(Dispatched::Loaded(NamedLayer {
        name: header.name,
        layer,
    }))
}

/// Loads the next layer from `reader`.
///
/// Consumes one header and, when its tag is known, the whole payload of that layer, leaving
/// the reader at the next header.
///
/// # Returns
/// The layer, `None` if the header carries an unknown type tag (the payload is left unread),
/// or the error that aborted the load. No partially loaded layer is ever returned.
pub fn load_next<R: BufRead>(reader: &mut RecordReader<R>) -> Result<Option<Layer>> {
    Ok(load_named(reader)?.map(|named| named.layer))
}

/// Same as [`load_next`] but keeps the name from the header.
pub fn load_named<R: BufRead>(reader: &mut RecordReader<R>) -> Result<Option<NamedLayer>> {
    match dispatch(reader)? {
        Dispatched::Loaded(named) => Ok(Some(named)),
        Dispatched::Unknown(_) => Ok(None),
    }
}
