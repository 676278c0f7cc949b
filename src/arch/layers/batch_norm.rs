use container::RecordReader;
use ndarray::{Array1, ArrayView1};
use std::io::BufRead;

use crate::{Result, WaveErr};

/// A 1-D batch normalization. Declared by the container format only, every call fails with
/// `NotImplemented`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchNorm1d;

impl BatchNorm1d {
    pub fn load<R: BufRead>(_reader: &mut RecordReader<R>) -> Result<Self> {
        Err(WaveErr::NotImplemented("BatchNorm1d layer loading"))
    }

    pub fn apply(&self, _x: ArrayView1<f32>) -> Result<Array1<f32>> {
        Err(WaveErr::NotImplemented("BatchNorm1d forward pass"))
    }
}
