/// The type for a decoded pixel intensity sample. How many of the 8 bits are
/// meaningful depends on the capture format: the sample occupies whatever bit
/// positions the two sync flags leave free, compacted down to a dense value,
/// so for the reference format intensities span 0..=63.
pub type Intensity = u8;

/// A byte offset into a raw capture buffer.
pub type SampleOffset = usize;
