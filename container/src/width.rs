use half::{f16, slice::HalfFloatSliceExt};

use crate::{ContainerErr, Result};

/// The on-disk byte width of every float in a layer payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementWidth {
    /// IEEE binary16, widened to `f32` on load.
    F16,
    /// IEEE binary32, stored as-is.
    F32,
}

impl ElementWidth {
    /// Returns the amount of bytes a single element takes on disk.
    pub fn size(self) -> usize {
        match self {
            ElementWidth::F16 => size_of::<f16>(),
            ElementWidth::F32 => size_of::<f32>(),
        }
    }

    /// Widens a little-endian payload of this width into `f32` values.
    ///
    /// # Arguments
    /// * `bytes` - The raw payload, its length must be a multiple of `self.size()`.
    ///
    /// # Returns
    /// One `f32` per stored element.
    pub fn decode(self, bytes: &[u8]) -> Vec<f32> {
        match self {
            ElementWidth::F16 => {
                let mut halves: Vec<f16> = bytemuck::pod_collect_to_vec(bytes);
                if cfg!(target_endian = "big") {
                    halves
                        .iter_mut()
                        .for_each(|h| *h = f16::from_bits(h.to_bits().swap_bytes()));
                }
                halves.to_f32_vec()
            }
            ElementWidth::F32 => {
                let mut floats: Vec<f32> = bytemuck::pod_collect_to_vec(bytes);
                if cfg!(target_endian = "big") {
                    floats
                        .iter_mut()
                        .for_each(|x| *x = f32::from_bits(x.to_bits().swap_bytes()));
                }
                floats
            }
        }
    }

    /// Appends `values` to `buf` in this width, narrowing to `f16` when needed.
    pub fn encode(self, values: &[f32], buf: &mut Vec<u8>) {
        buf.reserve(values.len() * self.size());

        match self {
            ElementWidth::F16 => values
                .iter()
                .for_each(|&x| buf.extend_from_slice(&f16::from_f32(x).to_le_bytes())),
            ElementWidth::F32 => values
                .iter()
                .for_each(|x| buf.extend_from_slice(&x.to_le_bytes())),
        }
    }
}

impl TryFrom<i32> for ElementWidth {
    type Error = ContainerErr;

    fn try_from(width: i32) -> Result<Self> {
        match width {
            2 => Ok(ElementWidth::F16),
            4 => Ok(ElementWidth::F32),
            other => Err(ContainerErr::UnsupportedElementWidth(other)),
        }
    }
}

impl From<ElementWidth> for i32 {
    fn from(width: ElementWidth) -> Self {
        width.size() as i32
    }
}
