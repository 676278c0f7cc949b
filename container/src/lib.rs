//! Fixed-layout records of a WaveRNN weight container.
//!
//! A container is a flat little-endian byte stream: `i32` counts, NUL-padded
//! names and float payloads stored either as `f32` or `f16`. [`RecordReader`]
//! consumes it sequentially and always hands out `f32` values, [`RecordWriter`]
//! produces it.

mod error;
mod reader;
mod width;
mod writer;

pub use error::{ContainerErr, Result};
pub use reader::RecordReader;
pub use width::ElementWidth;
pub use writer::RecordWriter;

/// Length in bytes of a layer name field.
pub const NAME_LEN: usize = 64;

type DimType = i32;
const DIM_TYPE_SIZE: usize = size_of::<DimType>();
