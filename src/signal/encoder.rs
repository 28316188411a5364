use std::iter;

use super::SignalSample;

/// The shape of one scanline, in sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTiming {
    /// Width of the hsync pulse.
    pub sync: usize,
    /// Blanking between the pulse and the visible region.
    pub back_porch: usize,
    /// Width of the visible region. Should be a multiple of the nibble hold
    /// count; any remainder is emitted blank.
    pub visible: usize,
    /// Blanking after the visible region, up to the next line's pulse.
    pub front_porch: usize,
}

impl LineTiming {
    pub fn total(&self) -> usize {
        self.sync + self.back_porch + self.visible + self.front_porch
    }
}

/// The shape of one frame: whole-line counts for the vertical blanking
/// interval around the vsync pulse, plus the visible line count and the
/// pixel-clock-to-sample-clock ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub line: LineTiming,
    /// Blank lines before the vsync pulse. At least one is needed for the
    /// vsync rising edge to exist at the start of the stream.
    pub vsync_front_lines: usize,
    /// Lines with the vsync level asserted throughout.
    pub vsync_lines: usize,
    /// Blank lines after the vsync pulse.
    pub vsync_back_lines: usize,
    /// Lines carrying payload in their visible region.
    pub active_lines: usize,
    /// Frames to synthesize.
    pub frames: usize,
    /// How many samples each pixel nibble is held for.
    pub samples_per_nibble: usize,
}

impl Default for FrameTiming {
    /// The reference test-bench timing: 16 samples per pixel slot, a 4-slot
    /// hsync pulse, 12-slot back porch, 40-slot visible region and 8-slot
    /// front porch, with 256 active lines and one sample per nibble (so 320
    /// payload bytes per line).
    fn default() -> Self {
        Self {
            line: LineTiming {
                sync: 64,
                back_porch: 192,
                visible: 640,
                front_porch: 128,
            },
            vsync_front_lines: 2,
            vsync_lines: 2,
            vsync_back_lines: 2,
            active_lines: 256,
            frames: 1,
            samples_per_nibble: 1,
        }
    }
}

impl FrameTiming {
    pub fn lines_per_frame(&self) -> usize {
        self.vsync_front_lines + self.vsync_lines + self.vsync_back_lines + self.active_lines
    }

    pub fn samples_per_frame(&self) -> usize {
        self.lines_per_frame() * self.line.total()
    }

    /// Nibbles shown per visible region.
    pub fn nibbles_per_line(&self) -> usize {
        self.line.visible / self.samples_per_nibble
    }

    /// Payload bytes consumed by a full synthesis pass.
    pub fn payload_len(&self) -> usize {
        self.frames * self.active_lines * self.nibbles_per_line() / 2
    }
}

/// Generates the abstract sync/pixel timeline for a test stimulus. The
/// output is serialized elsewhere: as packed capture bytes for feeding the
/// decoder, or as text for the hardware test bench.
pub struct SignalSynthesizer {
    timing: FrameTiming,
}

impl SignalSynthesizer {
    pub fn new(timing: FrameTiming) -> Self {
        Self { timing }
    }

    /// Produce the timeline for `timing.frames` frames, preceded by a
    /// front-porch-sized blank lead-in. Payload bytes fill the visible
    /// regions low nibble first; a payload shorter than
    /// `timing.payload_len()` is zero-extended.
    pub fn synthesize(&self, payload: &[u8]) -> Vec<SignalSample> {
        let mut nibbles = payload
            .iter()
            .flat_map(|&byte| [byte & 0x0F, byte >> 4])
            .chain(iter::repeat(0));

        let t = &self.timing;
        let mut out = Vec::with_capacity(t.line.front_porch + t.frames * t.samples_per_frame());
        // Lead-in standing for the previous line's front porch. Without it
        // the first line's hsync edge has no blank predecessor and the
        // locator's backward scan cannot recognize frame 0.
        push_run(&mut out, t.line.front_porch, 0, false, false);
        for _ in 0..t.frames {
            for _ in 0..t.vsync_front_lines {
                self.blank_line(&mut out, false);
            }
            for _ in 0..t.vsync_lines {
                self.blank_line(&mut out, true);
            }
            for _ in 0..t.vsync_back_lines {
                self.blank_line(&mut out, false);
            }
            for _ in 0..t.active_lines {
                self.active_line(&mut out, &mut nibbles);
            }
        }
        out
    }

    /// A line with no payload. The hsync pulse still fires; `vsync` is held
    /// for the whole line.
    fn blank_line(&self, out: &mut Vec<SignalSample>, vsync: bool) {
        let line = &self.timing.line;
        push_run(out, line.sync, 0, true, vsync);
        push_run(
            out,
            line.back_porch + line.visible + line.front_porch,
            0,
            false,
            vsync,
        );
    }

    fn active_line(&self, out: &mut Vec<SignalSample>, nibbles: &mut impl Iterator<Item = u8>) {
        let line = &self.timing.line;
        let hold = self.timing.samples_per_nibble;
        push_run(out, line.sync, 0, true, false);
        push_run(out, line.back_porch, 0, false, false);
        for _ in 0..self.timing.nibbles_per_line() {
            let level = nibbles.next().unwrap_or(0);
            push_run(out, hold, level, false, false);
        }
        push_run(out, line.visible % hold, 0, false, false);
        push_run(out, line.front_porch, 0, false, false);
    }
}

fn push_run(out: &mut Vec<SignalSample>, len: usize, level: u8, hsync: bool, vsync: bool) {
    out.extend(iter::repeat(SignalSample { level, hsync, vsync }).take(len));
}
