//! Inference engine for pretrained WaveRNN vocoders.
//!
//! A model is a container of layers (see the `container` crate for the record layout), loaded
//! one at a time with [`load_next`] or all at once with [`Model::load`]. Each layer then
//! exposes its forward pass as an `apply` method; driving the autoregressive loop is left to
//! the caller.

pub mod arch;
pub mod error;
pub mod loader;

pub use arch::{
    CompressedMatrix, Model, NamedLayer, Weights,
    layers::{BatchNorm1d, Conv1d, Conv2d, Gru, GruParams, Layer, LayerKind, Linear},
};
pub use container::{ContainerErr, ElementWidth, RecordReader, RecordWriter};
pub use error::{Result, WaveErr};
pub use loader::{LoadOptions, UnknownLayer, load_named, load_next};
