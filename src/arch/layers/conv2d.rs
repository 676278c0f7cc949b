use container::RecordReader;
use ndarray::{Array2, ArrayView2};
use std::io::BufRead;

use crate::{Result, WaveErr};

/// A 2-D convolution. Containers may declare it but it has no loader or kernel, every call
/// fails with `NotImplemented`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conv2d;

impl Conv2d {
    pub fn load<R: BufRead>(_reader: &mut RecordReader<R>) -> Result<Self> {
        Err(WaveErr::NotImplemented("Conv2d layer loading"))
    }

    pub fn apply(&self, _x: ArrayView2<f32>) -> Result<Array2<f32>> {
        Err(WaveErr::NotImplemented("Conv2d forward pass"))
    }
}
