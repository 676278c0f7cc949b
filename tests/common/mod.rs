#![allow(dead_code)]

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use wavernn::{
    CompressedMatrix, Conv1d, ElementWidth, Gru, GruParams, Layer, LayerKind, Linear, Model,
    NamedLayer, RecordWriter, Weights, arch::SPARSE_GROUP_SIZE, loader::LayerHeader,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn random_vec(rng: &mut impl Rng, len: usize, amp: f32) -> Array1<f32> {
    Array1::from_shape_fn(len, |_| (rng.random::<f32>() - 0.5) * 2. * amp)
}

/// A dense matrix where each block of `SPARSE_GROUP_SIZE` columns survives with probability
/// `keep`, the rest being zero.
pub fn random_pruned(rng: &mut impl Rng, rows: usize, cols: usize, keep: f64) -> Array2<f32> {
    let mut m = Array2::zeros((rows, cols));

    for mut row in m.outer_iter_mut() {
        for mut block in row.exact_chunks_mut(SPARSE_GROUP_SIZE) {
            if rng.random_bool(keep) {
                block.mapv_inplace(|_| rng.random::<f32>() - 0.5);
            }
        }
    }

    m
}

pub fn compressed(dense: &Array2<f32>) -> Weights {
    Weights::from(CompressedMatrix::from_dense(dense.view()).unwrap())
}

pub fn random_linear(rng: &mut impl Rng, rows: usize, cols: usize) -> Linear {
    let w = random_pruned(rng, rows, cols, 0.6);
    Linear::new(compressed(&w), random_vec(rng, rows, 1.)).unwrap()
}

pub fn random_gru(rng: &mut impl Rng, hidden: usize, input: usize) -> Gru {
    let mut w = |cols: usize| compressed(&random_pruned(&mut *rng, hidden, cols, 0.7));
    let w_ir = w(input);
    let w_iz = w(input);
    let w_in = w(input);
    let w_hr = w(hidden);
    let w_hz = w(hidden);
    let w_hn = w(hidden);

    let mut b = || random_vec(&mut *rng, hidden, 0.5);
    Gru::new(GruParams {
        w_ir,
        w_iz,
        w_in,
        w_hr,
        w_hz,
        w_hn,
        b_ir: b(),
        b_iz: b(),
        b_in: b(),
        b_hr: b(),
        b_hz: b(),
        b_hn: b(),
    })
    .unwrap()
}

pub fn random_conv1d(
    rng: &mut impl Rng,
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    bias: bool,
) -> Conv1d {
    let kernels = (0..out_channels)
        .map(|_| Array2::from_shape_fn((in_channels, kernel_size), |_| rng.random::<f32>() - 0.5))
        .collect();
    let bias = bias.then(|| random_vec(&mut *rng, out_channels, 1.));

    Conv1d::new(in_channels, kernel_size, kernels, bias).unwrap()
}

/// A small network shaped like a WaveRNN upsampling front end followed by its recurrent core.
pub fn small_model(seed: u64) -> Model {
    let mut rng = rng(seed);

    Model::new([
        NamedLayer::new("upsample.conv_in", random_conv1d(&mut rng, 3, 4, 3, true)),
        NamedLayer::new("rnn1", random_gru(&mut rng, 8, 4)),
        NamedLayer::new("fc1", random_linear(&mut rng, 12, 8)),
    ])
}

/// Writes a layer header followed by the layer payload.
pub fn write_layer(writer: &mut RecordWriter, name: &str, layer: &Layer, width: ElementWidth) {
    LayerHeader::new(name, layer.kind()).write(writer);
    layer.write(writer, width).unwrap();
}

/// Writes a header with an arbitrary type tag and no payload.
pub fn write_raw_header(writer: &mut RecordWriter, name: &str, tag: i32) {
    writer.write_name(name);
    writer.write_i32(tag);
}

/// The container of a `rows x 4` linear layer whose weights are the first rows of the identity.
pub fn identity_linear_bytes(rows: usize, width: ElementWidth) -> Vec<u8> {
    let mut w = RecordWriter::new();
    write_raw_header(&mut w, "fc", LayerKind::Linear.tag());

    w.write_width(width);
    w.write_i32(rows as i32);
    w.write_i32(4);

    // One block per row, holding the row's diagonal entry.
    w.write_i32((rows * SPARSE_GROUP_SIZE) as i32);
    w.write_i32((rows * 2) as i32);
    for row in 0..rows {
        let mut block = [0.; SPARSE_GROUP_SIZE];
        block[row] = 1.;
        w.write_floats(width, &block);
    }
    w.write_indices(&[0, -1].repeat(rows));

    w.write_floats(width, &vec![0.25; rows]);
    w.into_bytes()
}
