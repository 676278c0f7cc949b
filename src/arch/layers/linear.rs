use container::{ElementWidth, RecordReader, RecordWriter};
use log::debug;
use ndarray::{Array1, ArrayView1};
use std::io::BufRead;

use crate::{
    Result, WaveErr,
    arch::{CompressedMatrix, Weights, activations::sigmoid_vec},
};

/// A fully connected layer followed by a sigmoid.
///
/// The bias is loaded and kept but `apply` computes `sigmoid(W · x)` without it, the exported
/// models are evaluated that way.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    weights: Weights,
    bias: Array1<f32>,
}

impl Linear {
    /// Creates a new `Linear` layer.
    ///
    /// # Arguments
    /// * `weights` - A `rows x cols` matrix, dense or compressed.
    /// * `bias` - A vector of `rows` values.
    ///
    /// # Returns
    /// The layer, or `DimensionMismatch` if the bias length doesn't match the rows.
    pub fn new(weights: impl Into<Weights>, bias: Array1<f32>) -> Result<Self> {
        let weights = weights.into();

        if bias.len() != weights.rows() {
            return Err(WaveErr::DimensionMismatch {
                what: "linear bias",
                got: bias.len(),
                expected: weights.rows(),
            });
        }

        Ok(Self { weights, bias })
    }

    /// Loads the layer payload that follows its header: `{el_size, rows, cols}`, a compressed
    /// weight matrix and the bias.
    pub fn load<R: BufRead>(reader: &mut RecordReader<R>) -> Result<Self> {
        let width = reader.read_width()?;
        let rows = reader.read_dim("linear rows")?;
        let cols = reader.read_dim("linear cols")?;
        debug!("linear {rows}x{cols} at {width:?}");

        let weights = CompressedMatrix::read(reader, width, rows, cols)?;
        let bias = reader.read_floats("linear bias", width, rows)?;

        Self::new(weights, Array1::from(bias))
    }

    pub fn write(&self, writer: &mut RecordWriter, width: ElementWidth) -> Result<()> {
        writer.write_width(width);
        writer.write_dim("linear rows", self.rows())?;
        writer.write_dim("linear cols", self.cols())?;
        self.weights.write(writer, width)?;
        writer.write_floats(width, &self.bias.to_vec());
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.weights.rows()
    }

    pub fn cols(&self) -> usize {
        self.weights.cols()
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }

    /// Computes `sigmoid(W · x)`.
    ///
    /// # Arguments
    /// * `x` - An input of `self.cols()` components.
    ///
    /// # Returns
    /// The `self.rows()` activations or `DimensionMismatch` on a wrong input length.
    pub fn apply(&self, x: ArrayView1<f32>) -> Result<Array1<f32>> {
        if x.len() != self.cols() {
            return Err(WaveErr::DimensionMismatch {
                what: "linear input",
                got: x.len(),
                expected: self.cols(),
            });
        }

        Ok(sigmoid_vec(self.weights.dot(x)?))
    }
}
