use container::{ElementWidth, RecordReader, RecordWriter};
use log::debug;
use ndarray::{Array1, ArrayView1, Zip};
use std::io::BufRead;

use crate::{
    Result, WaveErr,
    arch::{
        CompressedMatrix, Weights,
        activations::{sigmoid_vec, tanh_vec},
    },
};

/// The parameters of a [`Gru`] cell, named after the gate they feed.
///
/// `w_i*` map the input (`hidden x input`), `w_h*` map the previous hidden state
/// (`hidden x hidden`), every bias has `hidden` values.
#[derive(Debug, Clone, PartialEq)]
pub struct GruParams {
    pub w_ir: Weights,
    pub w_iz: Weights,
    pub w_in: Weights,
    pub w_hr: Weights,
    pub w_hz: Weights,
    pub w_hn: Weights,
    pub b_ir: Array1<f32>,
    pub b_iz: Array1<f32>,
    pub b_in: Array1<f32>,
    pub b_hr: Array1<f32>,
    pub b_hz: Array1<f32>,
    pub b_hn: Array1<f32>,
}

/// A gated recurrent unit cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Gru {
    hidden: usize,
    input: usize,
    params: GruParams,
}

impl Gru {
    /// Creates a new `Gru`, the shape being taken from `w_ir`.
    ///
    /// # Returns
    /// The cell, or `DimensionMismatch` naming the first parameter that disagrees with it.
    pub fn new(params: GruParams) -> Result<Self> {
        let (hidden, input) = params.w_ir.dim();

        params.w_iz.check_dim(("W_iz rows", "W_iz cols"), hidden, input)?;
        params.w_in.check_dim(("W_in rows", "W_in cols"), hidden, input)?;
        params.w_hr.check_dim(("W_hr rows", "W_hr cols"), hidden, hidden)?;
        params.w_hz.check_dim(("W_hz rows", "W_hz cols"), hidden, hidden)?;
        params.w_hn.check_dim(("W_hn rows", "W_hn cols"), hidden, hidden)?;

        let biases = [
            ("b_ir", &params.b_ir),
            ("b_iz", &params.b_iz),
            ("b_in", &params.b_in),
            ("b_hr", &params.b_hr),
            ("b_hz", &params.b_hz),
            ("b_hn", &params.b_hn),
        ];

        for (what, bias) in biases {
            if bias.len() != hidden {
                return Err(WaveErr::DimensionMismatch {
                    what,
                    got: bias.len(),
                    expected: hidden,
                });
            }
        }

        Ok(Self {
            hidden,
            input,
            params,
        })
    }

    /// Loads the layer payload that follows its header: `{el_size, hidden, input}`, the six
    /// compressed matrices and then the six biases.
    pub fn load<R: BufRead>(reader: &mut RecordReader<R>) -> Result<Self> {
        let width = reader.read_width()?;
        let hidden = reader.read_dim("gru hidden size")?;
        let input = reader.read_dim("gru input size")?;
        debug!("gru hidden={hidden} input={input} at {width:?}");

        let mut read_matrix = |cols: usize| -> Result<Weights> {
            Ok(CompressedMatrix::read(reader, width, hidden, cols)?.into())
        };

        let w_ir = read_matrix(input)?;
        let w_iz = read_matrix(input)?;
        let w_in = read_matrix(input)?;
        let w_hr = read_matrix(hidden)?;
        let w_hz = read_matrix(hidden)?;
        let w_hn = read_matrix(hidden)?;

        let mut read_bias = |what: &'static str| -> Result<Array1<f32>> {
            Ok(reader.read_floats(what, width, hidden)?.into())
        };

        let b_ir = read_bias("gru b_ir")?;
        let b_iz = read_bias("gru b_iz")?;
        let b_in = read_bias("gru b_in")?;
        let b_hr = read_bias("gru b_hr")?;
        let b_hz = read_bias("gru b_hz")?;
        let b_hn = read_bias("gru b_hn")?;

        Self::new(GruParams {
            w_ir,
            w_iz,
            w_in,
            w_hr,
            w_hz,
            w_hn,
            b_ir,
            b_iz,
            b_in,
            b_hr,
            b_hz,
            b_hn,
        })
    }

    pub fn write(&self, writer: &mut RecordWriter, width: ElementWidth) -> Result<()> {
        let p = &self.params;

        writer.write_width(width);
        writer.write_dim("gru hidden size", self.hidden)?;
        writer.write_dim("gru input size", self.input)?;

        for w in [&p.w_ir, &p.w_iz, &p.w_in, &p.w_hr, &p.w_hz, &p.w_hn] {
            w.write(writer, width)?;
        }

        for b in [&p.b_ir, &p.b_iz, &p.b_in, &p.b_hr, &p.b_hz, &p.b_hn] {
            writer.write_floats(width, &b.to_vec());
        }

        Ok(())
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden
    }

    pub fn input_size(&self) -> usize {
        self.input
    }

    pub fn params(&self) -> &GruParams {
        &self.params
    }

    /// Advances the cell by one step.
    ///
    /// ```text
    /// r = sigmoid(W_ir·x + b_ir + W_hr·hx + b_hr)
    /// z = sigmoid(W_iz·x + b_iz + W_hz·hx + b_hz)
    /// n = tanh(W_in·x + b_in + r ⊙ (W_hn·hx + b_hn))
    /// h = (1 - z) ⊙ n + z ⊙ hx
    /// ```
    ///
    /// # Arguments
    /// * `x` - The input, `self.input_size()` components.
    /// * `hx` - The previous hidden state, `self.hidden_size()` components.
    ///
    /// # Returns
    /// The next hidden state, to be fed back as `hx` on the following step.
    pub fn apply(&self, x: ArrayView1<f32>, hx: ArrayView1<f32>) -> Result<Array1<f32>> {
        if x.len() != self.input {
            return Err(WaveErr::DimensionMismatch {
                what: "gru input",
                got: x.len(),
                expected: self.input,
            });
        }

        if hx.len() != self.hidden {
            return Err(WaveErr::DimensionMismatch {
                what: "gru hidden state",
                got: hx.len(),
                expected: self.hidden,
            });
        }

        let p = &self.params;

        let r = sigmoid_vec(p.w_ir.dot(x)? + &p.b_ir + &p.w_hr.dot(hx)? + &p.b_hr);
        let z = sigmoid_vec(p.w_iz.dot(x)? + &p.b_iz + &p.w_hz.dot(hx)? + &p.b_hz);
        let hn = p.w_hn.dot(hx)? + &p.b_hn;
        let n = tanh_vec(p.w_in.dot(x)? + &p.b_in + &(r * &hn));

        Ok(Zip::from(&z)
            .and(&n)
            .and(hx)
            .map_collect(|&z, &n, &h| (1. - z) * n + z * h))
    }
}
