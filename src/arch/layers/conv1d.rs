use container::{ContainerErr, ElementWidth, RecordReader, RecordWriter};
use log::debug;
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, s};
use std::io::BufRead;

use crate::{Result, WaveErr};

/// A 1-D convolution over a multi-channel sequence: stride 1, no padding, no dilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Conv1d {
    in_channels: usize,
    kernel_size: usize,
    /// One `in_channels x kernel_size` block per output channel.
    kernels: Vec<Array2<f32>>,
    bias: Option<Array1<f32>>,
}

impl Conv1d {
    /// Creates a new `Conv1d`.
    ///
    /// # Arguments
    /// * `in_channels` - The amount of input rows the layer expects, at least 1.
    /// * `kernel_size` - The window width, at least 1.
    /// * `kernels` - One `in_channels x kernel_size` kernel per output channel.
    /// * `bias` - An optional value per output channel.
    pub fn new(
        in_channels: usize,
        kernel_size: usize,
        kernels: Vec<Array2<f32>>,
        bias: Option<Array1<f32>>,
    ) -> Result<Self> {
        check_extent(in_channels, kernel_size)?;

        for kernel in &kernels {
            let (rows, cols) = kernel.dim();

            if rows != in_channels {
                return Err(WaveErr::DimensionMismatch {
                    what: "conv1d kernel rows",
                    got: rows,
                    expected: in_channels,
                });
            }

            if cols != kernel_size {
                return Err(WaveErr::DimensionMismatch {
                    what: "conv1d kernel cols",
                    got: cols,
                    expected: kernel_size,
                });
            }
        }

        if let Some(bias) = &bias {
            if bias.len() != kernels.len() {
                return Err(WaveErr::DimensionMismatch {
                    what: "conv1d bias",
                    got: bias.len(),
                    expected: kernels.len(),
                });
            }
        }

        Ok(Self {
            in_channels,
            kernel_size,
            kernels,
            bias,
        })
    }

    /// Loads the layer payload that follows its header:
    /// `{el_size, use_bias, in_channels, out_channels, kernel_size}`, the row-major kernel of
    /// every output channel and, if `use_bias` is set, the bias.
    pub fn load<R: BufRead>(reader: &mut RecordReader<R>) -> Result<Self> {
        let width = reader.read_width()?;
        let use_bias = reader.read_i32("conv1d use bias")? != 0;
        let in_channels = reader.read_dim("conv1d in channels")?;
        let out_channels = reader.read_dim("conv1d out channels")?;
        let kernel_size = reader.read_dim("conv1d kernel size")?;
        debug!(
            "conv1d in={in_channels} out={out_channels} kernel={kernel_size} bias={use_bias} at {width:?}"
        );

        // Kernels hold at least one value each, so `out_channels` is bounded by the payload.
        check_extent(in_channels, kernel_size)?;

        let count = out_channels
            .checked_mul(in_channels)
            .and_then(|n| n.checked_mul(kernel_size))
            .ok_or(ContainerErr::TruncatedInput {
                what: "conv1d kernels",
                needed: usize::MAX,
                got: 0,
            })?;

        let values = reader.read_floats("conv1d kernels", width, count)?;
        let kernels = Array3::from_shape_vec((out_channels, in_channels, kernel_size), values)?
            .outer_iter()
            .map(|kernel| kernel.to_owned())
            .collect();

        let bias = if use_bias {
            Some(reader.read_floats("conv1d bias", width, out_channels)?.into())
        } else {
            None
        };

        Self::new(in_channels, kernel_size, kernels, bias)
    }

    pub fn write(&self, writer: &mut RecordWriter, width: ElementWidth) -> Result<()> {
        writer.write_width(width);
        writer.write_i32(self.bias.is_some() as i32);
        writer.write_dim("conv1d in channels", self.in_channels)?;
        writer.write_dim("conv1d out channels", self.out_channels())?;
        writer.write_dim("conv1d kernel size", self.kernel_size)?;

        for kernel in &self.kernels {
            writer.write_floats(width, &kernel.iter().copied().collect::<Vec<_>>());
        }

        if let Some(bias) = &self.bias {
            writer.write_floats(width, &bias.to_vec());
        }

        Ok(())
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn out_channels(&self) -> usize {
        self.kernels.len()
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub fn kernels(&self) -> &[Array2<f32>] {
        &self.kernels
    }

    pub fn bias(&self) -> Option<&Array1<f32>> {
        self.bias.as_ref()
    }

    /// Cross-correlates `x` with every kernel.
    ///
    /// # Arguments
    /// * `x` - An `in_channels x width` sequence.
    ///
    /// # Returns
    /// An `out_channels x (width - kernel_size + 1)` matrix, `InvalidKernelSize` if the
    /// kernel is wider than the sequence.
    pub fn apply(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (rows, width) = x.dim();

        if rows != self.in_channels {
            return Err(WaveErr::DimensionMismatch {
                what: "conv1d input channels",
                got: rows,
                expected: self.in_channels,
            });
        }

        if self.kernel_size > width {
            return Err(WaveErr::InvalidKernelSize {
                kernel: self.kernel_size,
                width: Some(width),
            });
        }

        let out_width = width - self.kernel_size + 1;
        let mut y = Array2::<f32>::zeros((self.out_channels(), out_width));

        for (mut row, kernel) in y.outer_iter_mut().zip(&self.kernels) {
            for (t, out) in row.iter_mut().enumerate() {
                let window = x.slice(s![.., t..t + self.kernel_size]);
                *out = (&window * kernel).sum();
            }
        }

        if let Some(bias) = &self.bias {
            y += &bias.view().insert_axis(Axis(1));
        }

        Ok(y)
    }
}

fn check_extent(in_channels: usize, kernel_size: usize) -> Result<()> {
    if kernel_size == 0 {
        return Err(WaveErr::InvalidKernelSize {
            kernel: kernel_size,
            width: None,
        });
    }

    if in_channels == 0 {
        return Err(WaveErr::DimensionMismatch {
            what: "conv1d in channels",
            got: 0,
            expected: 1,
        });
    }

    Ok(())
}
