use std::io::{self, Write};

use super::SignalSample;

/// Serialize a timeline in the test-bench stimulus format: one text line per
/// sample, `<hex pixel nibble> <hsync> <vsync>`.
pub fn write_stimulus<W: Write>(w: &mut W, samples: &[SignalSample]) -> io::Result<()> {
    for s in samples {
        writeln!(w, "{:01X} {} {}", s.level, s.hsync as u8, s.vsync as u8)?;
    }
    Ok(())
}
