mod batch_norm;
mod conv1d;
mod conv2d;
mod gru;
mod layer;
mod linear;

pub use batch_norm::BatchNorm1d;
pub use conv1d::Conv1d;
pub use conv2d::Conv2d;
pub use gru::{Gru, GruParams};
pub use layer::{Layer, LayerKind};
pub use linear::Linear;
