use container::{ElementWidth, RecordReader, RecordWriter};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};
use std::io::BufRead;

use crate::{Result, WaveErr};

/// Amount of consecutive columns stored per block.
pub const SPARSE_GROUP_SIZE: usize = 4;

/// Index entry closing the current output row.
pub const ROW_END_MARKER: i16 = -1;

/// A block-sparse matrix.
///
/// Every row is stored as the blocks of `SPARSE_GROUP_SIZE` columns that survived pruning.
/// The index stream holds, in row order, one block identifier `b` per stored block (covering
/// columns `[b * SPARSE_GROUP_SIZE, (b + 1) * SPARSE_GROUP_SIZE)`) followed by a
/// `ROW_END_MARKER` per row. `weights` holds the values of the blocks in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedMatrix {
    rows: usize,
    cols: usize,
    weights: Vec<f32>,
    index: Vec<i16>,
}

fn violation<T>(msg: String) -> Result<T> {
    Err(WaveErr::SparseFormatViolation(msg))
}

impl CompressedMatrix {
    /// Creates a new `CompressedMatrix`, checking the index stream against the declared shape.
    ///
    /// # Errors
    /// `SparseFormatViolation` if the stream doesn't close exactly `rows` rows, has entries
    /// after the last row, references columns outside `[0, cols)`, holds a negative entry
    /// other than the marker, or doesn't consume `weights` exactly.
    pub fn new(rows: usize, cols: usize, weights: Vec<f32>, index: Vec<i16>) -> Result<Self> {
        let mut closed = 0;
        let mut blocks = 0;

        for (pos, &entry) in index.iter().enumerate() {
            if closed == rows {
                return violation(format!(
                    "index entry {pos} follows the end of the last of {rows} rows"
                ));
            }

            if entry == ROW_END_MARKER {
                closed += 1;
                continue;
            }

            let Ok(block) = usize::try_from(entry) else {
                return violation(format!("invalid index entry {entry} at position {pos}"));
            };

            let end = (block + 1) * SPARSE_GROUP_SIZE;
            if end > cols {
                return violation(format!(
                    "block {block} spans up to column {end} of a {cols} column matrix"
                ));
            }

            blocks += 1;
        }

        if closed != rows {
            return violation(format!("the index stream closes {closed} of {rows} rows"));
        }

        if blocks * SPARSE_GROUP_SIZE != weights.len() {
            return violation(format!(
                "{blocks} blocks need {} weights, got {}",
                blocks * SPARSE_GROUP_SIZE,
                weights.len()
            ));
        }

        Ok(Self {
            rows,
            cols,
            weights,
            index,
        })
    }

    /// Encodes a dense matrix, dropping every block whose values are all zero.
    ///
    /// # Errors
    /// `SparseFormatViolation` if the columns don't split into whole blocks or there are more
    /// blocks per row than an index entry can name.
    pub fn from_dense(dense: ArrayView2<f32>) -> Result<Self> {
        let (rows, cols) = dense.dim();

        if cols % SPARSE_GROUP_SIZE != 0 {
            return violation(format!(
                "{cols} columns is not a multiple of the group size {SPARSE_GROUP_SIZE}"
            ));
        }

        let nblocks = cols / SPARSE_GROUP_SIZE;
        if nblocks > i16::MAX as usize + 1 {
            return violation(format!("{nblocks} blocks per row can't be indexed"));
        }

        let mut weights = Vec::new();
        let mut index = Vec::new();

        for row in dense.outer_iter() {
            for (block, values) in row.exact_chunks(SPARSE_GROUP_SIZE).into_iter().enumerate() {
                if values.iter().all(|&w| w == 0.) {
                    continue;
                }

                weights.extend(values.iter().copied());
                index.push(block as i16);
            }
            index.push(ROW_END_MARKER);
        }

        Self::new(rows, cols, weights, index)
    }

    /// Reads a compressed matrix payload: the weight and index counts, the weights at `width`
    /// and then the index stream.
    pub fn read<R: BufRead>(
        reader: &mut RecordReader<R>,
        width: ElementWidth,
        rows: usize,
        cols: usize,
    ) -> Result<Self> {
        let nweights = reader.read_dim("compressed weight count")?;
        let nindex = reader.read_dim("compressed index count")?;

        let weights = reader.read_floats("compressed weights", width, nweights)?;
        let index = reader.read_indices("compressed index", nindex)?;

        Self::new(rows, cols, weights, index)
    }

    pub fn write(&self, writer: &mut RecordWriter, width: ElementWidth) -> Result<()> {
        writer.write_dim("compressed weight count", self.weights.len())?;
        writer.write_dim("compressed index count", self.index.len())?;
        writer.write_floats(width, &self.weights);
        writer.write_indices(&self.index);
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn index(&self) -> &[i16] {
        &self.index
    }

    /// Returns the amount of stored blocks.
    pub fn nblocks(&self) -> usize {
        self.weights.len() / SPARSE_GROUP_SIZE
    }

    /// Multiplies this matrix by `x`.
    ///
    /// Each row accumulates its blocks in stream order and is written out when its marker is
    /// reached, so the summation order is the one the weights were exported with.
    pub fn dot(&self, x: ArrayView1<f32>) -> Result<Array1<f32>> {
        if x.len() != self.cols {
            return Err(WaveErr::DimensionMismatch {
                what: "compressed matrix input",
                got: x.len(),
                expected: self.cols,
            });
        }

        let mut y = Array1::zeros(self.rows);
        let mut blocks = self.weights.chunks_exact(SPARSE_GROUP_SIZE);
        let mut row = 0;
        let mut sum = 0.;

        for &entry in &self.index {
            if entry == ROW_END_MARKER {
                y[row] = sum;
                sum = 0.;
                row += 1;
                continue;
            }

            let Some(block) = blocks.next() else {
                return violation("the weight stream ended before the index stream".into());
            };

            let col = SPARSE_GROUP_SIZE * entry as usize;
            let xs = x.slice(s![col..col + SPARSE_GROUP_SIZE]);
            for (w, xi) in block.iter().zip(xs) {
                sum += w * xi;
            }
        }

        Ok(y)
    }

    /// Expands this matrix back to its dense form.
    pub fn to_dense(&self) -> Array2<f32> {
        let mut dense = Array2::zeros((self.rows, self.cols));
        let mut blocks = self.weights.chunks_exact(SPARSE_GROUP_SIZE);
        let mut row = 0;

        for &entry in &self.index {
            if entry == ROW_END_MARKER {
                row += 1;
                continue;
            }

            if let Some(block) = blocks.next() {
                let col = SPARSE_GROUP_SIZE * entry as usize;
                dense
                    .slice_mut(s![row, col..col + SPARSE_GROUP_SIZE])
                    .assign(&ArrayView1::from(block));
            }
        }

        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn multiply_walks_blocks_and_markers() {
        // Row 0 keeps block 1, row 1 keeps blocks 0 and 1, row 2 is empty.
        let m = CompressedMatrix::new(
            3,
            8,
            vec![
                1., 2., 3., 4., //
                1., 0., 0., 0., //
                0., 0., 0., 2.,
            ],
            vec![1, -1, 0, 1, -1, -1],
        )
        .unwrap();

        let x = array![1., 1., 1., 1., 1., 2., 3., 4.];
        let y = m.dot(x.view()).unwrap();

        assert_eq!(y, array![1. + 4. + 9. + 16., 1. + 8., 0.]);
    }

    #[test]
    fn decodes_to_the_dense_matrix_it_encodes() {
        let dense = array![
            [0., 0., 0., 0., 1., 2., 0., 0.],
            [0., 0., 0., 0., 0., 0., 0., 0.],
            [5., 0., 0., 0., 0., 0., 0., -1.],
        ];

        let m = CompressedMatrix::from_dense(dense.view()).unwrap();
        assert_eq!(m.nblocks(), 3);
        assert_eq!(m.index(), &[1, -1, -1, 0, 1, -1]);
        assert_eq!(m.to_dense(), dense);
    }

    #[test]
    fn wrong_input_length_is_a_dimension_mismatch() {
        let m = CompressedMatrix::new(1, 4, vec![1.; 4], vec![0, -1]).unwrap();

        assert!(matches!(
            m.dot(array![1., 2.].view()),
            Err(WaveErr::DimensionMismatch {
                got: 2,
                expected: 4,
                ..
            })
        ));
    }

    #[test]
    fn block_past_the_last_column_is_rejected() {
        let res = CompressedMatrix::new(1, 8, vec![1.; 4], vec![2, -1]);
        assert!(matches!(res, Err(WaveErr::SparseFormatViolation(_))));
    }

    #[test]
    fn row_count_must_match_the_markers() {
        let too_few = CompressedMatrix::new(2, 4, vec![1.; 4], vec![0, -1]);
        assert!(matches!(too_few, Err(WaveErr::SparseFormatViolation(_))));

        let too_many = CompressedMatrix::new(1, 4, vec![1.; 4], vec![0, -1, -1]);
        assert!(matches!(too_many, Err(WaveErr::SparseFormatViolation(_))));
    }

    #[test]
    fn weights_must_be_consumed_exactly() {
        let short = CompressedMatrix::new(1, 8, vec![1.; 4], vec![0, 1, -1]);
        assert!(matches!(short, Err(WaveErr::SparseFormatViolation(_))));

        let long = CompressedMatrix::new(1, 8, vec![1.; 12], vec![0, 1, -1]);
        assert!(matches!(long, Err(WaveErr::SparseFormatViolation(_))));
    }

    #[test]
    fn negative_entries_other_than_the_marker_are_rejected() {
        let res = CompressedMatrix::new(1, 8, vec![1.; 4], vec![-2, -1]);
        assert!(matches!(res, Err(WaveErr::SparseFormatViolation(_))));
    }

    #[test]
    fn dense_columns_must_split_into_blocks() {
        let res = CompressedMatrix::from_dense(Array2::zeros((2, 6)).view());
        assert!(matches!(res, Err(WaveErr::SparseFormatViolation(_))));
    }

    #[test]
    fn block_ids_past_a_byte_are_addressable() {
        // 1024 columns give block ids up to 255.
        let mut dense = Array2::<f32>::zeros((2, 1024));
        dense[[0, 4 * 200 + 1]] = 3.;
        dense[[1, 1023]] = -1.;

        let m = CompressedMatrix::from_dense(dense.view()).unwrap();
        assert_eq!(m.index(), &[200, -1, 255, -1]);

        let x = Array1::<f32>::ones(1024);
        assert_eq!(m.dot(x.view()).unwrap(), array![3., -1.]);
    }

    #[test]
    fn empty_matrix_multiplies_to_nothing() {
        let m = CompressedMatrix::new(0, 4, vec![], vec![]).unwrap();
        assert_eq!(m.dot(array![1., 2., 3., 4.].view()).unwrap().len(), 0);
    }
}
