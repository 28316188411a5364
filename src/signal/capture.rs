use crate::types::Intensity;
use super::SignalSample;

/// The bit layout of one packed capture byte. Two designated bits carry the
/// sync flags; the pixel sample occupies the remaining bit positions of the
/// byte in ascending order, so intensity values are dense integers no matter
/// where the sync bits sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub vsync_mask: u8,
    pub hsync_mask: u8,
}

impl Default for CaptureFormat {
    /// The logic-analyzer wiring of the reference capture: vsync on bit 4,
    /// hsync on bit 3.
    fn default() -> Self {
        Self {
            vsync_mask: 0x10,
            hsync_mask: 0x08,
        }
    }
}

impl CaptureFormat {
    /// The vertical sync level of a capture byte.
    pub fn vsync(&self, byte: u8) -> bool {
        byte & self.vsync_mask != 0
    }

    /// The horizontal sync level of a capture byte.
    pub fn hsync(&self, byte: u8) -> bool {
        byte & self.hsync_mask != 0
    }

    /// The pixel sample of a capture byte, compacted out of the non-sync bit
    /// positions.
    pub fn intensity(&self, byte: u8) -> Intensity {
        compact(byte, self.pixel_mask())
    }

    /// The largest intensity value the pixel bit positions can hold.
    pub fn max_intensity(&self) -> Intensity {
        ((1u16 << self.pixel_mask().count_ones()) - 1) as u8
    }

    /// Pack one timeline sample into a capture byte.
    pub fn pack(&self, sample: SignalSample) -> u8 {
        let mut byte = spread(sample.level, self.pixel_mask());
        if sample.hsync {
            byte |= self.hsync_mask;
        }
        if sample.vsync {
            byte |= self.vsync_mask;
        }
        byte
    }

    /// Serialize a whole timeline into the packed capture representation.
    pub fn pack_samples(&self, samples: &[SignalSample]) -> Vec<u8> {
        samples.iter().map(|&s| self.pack(s)).collect()
    }

    fn pixel_mask(&self) -> u8 {
        !(self.vsync_mask | self.hsync_mask)
    }
}

/// Gather the bits of `byte` selected by `mask` into a dense low-order value.
fn compact(byte: u8, mask: u8) -> u8 {
    let mut out = 0;
    let mut bit = 0;
    for i in 0..8 {
        if mask & (1 << i) != 0 {
            if byte & (1 << i) != 0 {
                out |= 1 << bit;
            }
            bit += 1;
        }
    }
    out
}

/// Scatter the low-order bits of `value` into the bit positions of `mask`.
/// Inverse of `compact` for values that fit the mask.
fn spread(value: u8, mask: u8) -> u8 {
    let mut out = 0;
    let mut bit = 0;
    for i in 0..8 {
        if mask & (1 << i) != 0 {
            if value & (1 << bit) != 0 {
                out |= 1 << i;
            }
            bit += 1;
        }
    }
    out
}
