use container::{ElementWidth, RecordWriter};
use ndarray::{Array1, Array2, ArrayView1};
use std::borrow::Cow;

use super::CompressedMatrix;
use crate::{Result, WaveErr};

/// A layer's weight matrix, either kept dense or in the block-sparse format.
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    Dense(Array2<f32>),
    Compressed(CompressedMatrix),
}

impl Weights {
    /// Returns the `(rows, cols)` shape of the matrix.
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Weights::Dense(w) => w.dim(),
            Weights::Compressed(w) => (w.rows(), w.cols()),
        }
    }

    pub fn rows(&self) -> usize {
        self.dim().0
    }

    pub fn cols(&self) -> usize {
        self.dim().1
    }

    /// Multiplies this matrix by `x`.
    ///
    /// # Errors
    /// `DimensionMismatch` if `x` doesn't have `self.cols()` components.
    pub fn dot(&self, x: ArrayView1<f32>) -> Result<Array1<f32>> {
        match self {
            Weights::Dense(w) => {
                if x.len() != w.ncols() {
                    return Err(WaveErr::DimensionMismatch {
                        what: "dense matrix input",
                        got: x.len(),
                        expected: w.ncols(),
                    });
                }

                Ok(w.dot(&x))
            }
            Weights::Compressed(w) => w.dot(x),
        }
    }

    /// Checks that this matrix is `rows x cols`.
    pub(crate) fn check_dim(
        &self,
        what: (&'static str, &'static str),
        rows: usize,
        cols: usize,
    ) -> Result<()> {
        let (got_rows, got_cols) = self.dim();

        if got_rows != rows {
            return Err(WaveErr::DimensionMismatch {
                what: what.0,
                got: got_rows,
                expected: rows,
            });
        }

        if got_cols != cols {
            return Err(WaveErr::DimensionMismatch {
                what: what.1,
                got: got_cols,
                expected: cols,
            });
        }

        Ok(())
    }

    /// Gives the compressed form of this matrix, encoding it if it's dense.
    pub fn compressed(&self) -> Result<Cow<'_, CompressedMatrix>> {
        match self {
            Weights::Dense(w) => CompressedMatrix::from_dense(w.view()).map(Cow::Owned),
            Weights::Compressed(w) => Ok(Cow::Borrowed(w)),
        }
    }

    /// Writes this matrix as a compressed payload, the only matrix layout containers hold.
    pub(crate) fn write(&self, writer: &mut RecordWriter, width: ElementWidth) -> Result<()> {
        self.compressed()?.write(writer, width)
    }
}

impl From<Array2<f32>> for Weights {
    fn from(w: Array2<f32>) -> Self {
        Self::Dense(w)
    }
}

impl From<CompressedMatrix> for Weights {
    fn from(w: CompressedMatrix) -> Self {
        Self::Compressed(w)
    }
}
