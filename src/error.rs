use container::ContainerErr;
use ndarray::ShapeError;
use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire inference engine.
pub type Result<T> = std::result::Result<T, WaveErr>;

/// The inference engine's error type.
#[derive(Debug)]
pub enum WaveErr {
    /// The container could not be read, see [`ContainerErr`].
    Container(ContainerErr),
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    SparseFormatViolation(String),
    /// `width` is `None` when the kernel size is rejected before any input is seen.
    InvalidKernelSize {
        kernel: usize,
        width: Option<usize>,
    },
    NotImplemented(&'static str),
    UnknownLayerType {
        name: String,
        tag: i32,
    },
    Shape(ShapeError),
    Config(serde_json::Error),
}

impl Display for WaveErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveErr::Container(e) => write!(f, "{e}"),
            WaveErr::DimensionMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a dimension mismatch for {what}, got {got} and expected {expected}"
            ),
            WaveErr::SparseFormatViolation(msg) => {
                write!(f, "The compressed matrix is malformed: {msg}")
            }
            WaveErr::InvalidKernelSize {
                kernel,
                width: Some(width),
            } => write!(f, "The kernel size {kernel} exceeds the input width {width}"),
            WaveErr::InvalidKernelSize {
                kernel,
                width: None,
            } => write!(f, "The kernel size {kernel} is invalid"),
            WaveErr::NotImplemented(what) => write!(f, "{what} is not implemented"),
            WaveErr::UnknownLayerType { name, tag } => {
                write!(f, "The layer {name:?} has an unknown type tag {tag}")
            }
            WaveErr::Shape(e) => write!(f, "{e}"),
            WaveErr::Config(e) => write!(f, "Invalid load options: {e}"),
        }
    }
}

impl Error for WaveErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WaveErr::Container(e) => Some(e),
            WaveErr::Shape(e) => Some(e),
            WaveErr::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ContainerErr> for WaveErr {
    fn from(e: ContainerErr) -> Self {
        Self::Container(e)
    }
}

impl From<ShapeError> for WaveErr {
    fn from(e: ShapeError) -> Self {
        Self::Shape(e)
    }
}

impl From<serde_json::Error> for WaveErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e)
    }
}

impl From<std::io::Error> for WaveErr {
    fn from(e: std::io::Error) -> Self {
        Self::Container(ContainerErr::Io(e))
    }
}
