use container::{ElementWidth, RecordReader, RecordWriter};
use std::{
    fmt::{self, Display},
    io::BufRead,
};

use super::{BatchNorm1d, Conv1d, Conv2d, Gru, Linear};
use crate::{Result, WaveErr};

/// The type tag stored in every layer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Conv1d,
    Conv2d,
    BatchNorm1d,
    Linear,
    Gru,
}

impl LayerKind {
    /// Maps a header tag to its kind, `None` for tags this engine doesn't know.
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            1 => Some(LayerKind::Conv1d),
            2 => Some(LayerKind::Conv2d),
            3 => Some(LayerKind::BatchNorm1d),
            4 => Some(LayerKind::Linear),
            5 => Some(LayerKind::Gru),
            _ => None,
        }
    }

    pub fn tag(self) -> i32 {
        match self {
            LayerKind::Conv1d => 1,
            LayerKind::Conv2d => 2,
            LayerKind::BatchNorm1d => 3,
            LayerKind::Linear => 4,
            LayerKind::Gru => 5,
        }
    }
}

impl Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayerKind::Conv1d => "Conv1d",
            LayerKind::Conv2d => "Conv2d",
            LayerKind::BatchNorm1d => "BatchNorm1d",
            LayerKind::Linear => "Linear",
            LayerKind::Gru => "GRU",
        };

        f.write_str(s)
    }
}

/// A loaded layer of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Linear(Linear),
    Gru(Gru),
    Conv1d(Conv1d),
    Conv2d(Conv2d),
    BatchNorm1d(BatchNorm1d),
}

impl Layer {
    /// Builds the layer of the given kind from the payload at the reader's position.
    pub fn load<R: BufRead>(kind: LayerKind, reader: &mut RecordReader<R>) -> Result<Self> {
        let layer = match kind {
            LayerKind::Linear => Self::Linear(Linear::load(reader)?),
            LayerKind::Gru => Self::Gru(Gru::load(reader)?),
            LayerKind::Conv1d => Self::Conv1d(Conv1d::load(reader)?),
            LayerKind::Conv2d => Self::Conv2d(Conv2d::load(reader)?),
            LayerKind::BatchNorm1d => Self::BatchNorm1d(BatchNorm1d::load(reader)?),
        };

        Ok(layer)
    }

    /// Writes the layer payload, the header excluded.
    pub fn write(&self, writer: &mut RecordWriter, width: ElementWidth) -> Result<()> {
        match self {
            Self::Linear(l) => l.write(writer, width),
            Self::Gru(l) => l.write(writer, width),
            Self::Conv1d(l) => l.write(writer, width),
            Self::Conv2d(_) => Err(WaveErr::NotImplemented("Conv2d layer writing")),
            Self::BatchNorm1d(_) => Err(WaveErr::NotImplemented("BatchNorm1d layer writing")),
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Linear(_) => LayerKind::Linear,
            Self::Gru(_) => LayerKind::Gru,
            Self::Conv1d(_) => LayerKind::Conv1d,
            Self::Conv2d(_) => LayerKind::Conv2d,
            Self::BatchNorm1d(_) => LayerKind::BatchNorm1d,
        }
    }

    pub fn as_linear(&self) -> Option<&Linear> {
        match self {
            Self::Linear(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_gru(&self) -> Option<&Gru> {
        match self {
            Self::Gru(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_conv1d(&self) -> Option<&Conv1d> {
        match self {
            Self::Conv1d(l) => Some(l),
            _ => None,
        }
    }
}

impl From<Linear> for Layer {
    fn from(l: Linear) -> Self {
        Self::Linear(l)
    }
}

impl From<Gru> for Layer {
    fn from(l: Gru) -> Self {
        Self::Gru(l)
    }
}

impl From<Conv1d> for Layer {
    fn from(l: Conv1d) -> Self {
        Self::Conv1d(l)
    }
}
