pub mod activations;
pub mod layers;
mod model;
mod sparse;
mod weights;

pub use model::{Model, NamedLayer};
pub use sparse::{CompressedMatrix, ROW_END_MARKER, SPARSE_GROUP_SIZE};
pub use weights::Weights;
