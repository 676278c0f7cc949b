use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used by the container readers and writers.
pub type Result<T> = std::result::Result<T, ContainerErr>;

/// The container module's error type.
#[derive(Debug)]
pub enum ContainerErr {
    /// The stream ended before `what` could be read in full.
    TruncatedInput {
        what: &'static str,
        needed: usize,
        got: usize,
    },
    /// An element width other than 2 or 4 bytes was declared.
    UnsupportedElementWidth(i32),
    /// A count field held a negative value.
    NegativeDimension { what: &'static str, got: i32 },
    /// A count does not fit in the on-disk `i32` field.
    DimensionOverflow { what: &'static str, got: usize },
    Io(io::Error),
}

impl Display for ContainerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerErr::TruncatedInput { what, needed, got } => write!(
                f,
                "Truncated input while reading {what}, needed {needed} bytes and got {got}"
            ),
            ContainerErr::UnsupportedElementWidth(width) => {
                write!(f, "Unsupported element width {width}, must be 2 or 4 bytes")
            }
            ContainerErr::NegativeDimension { what, got } => {
                write!(f, "The {what} field holds a negative value {got}")
            }
            ContainerErr::DimensionOverflow { what, got } => {
                write!(f, "The {what} value {got} does not fit in a container field")
            }
            ContainerErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for ContainerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ContainerErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ContainerErr {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
