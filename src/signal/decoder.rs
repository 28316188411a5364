use log::{debug, info};

use crate::types::{Intensity, SampleOffset};
use super::{CaptureFormat, DecodeError, FrameGeometry, BLANK_LEVEL};

/// Receives decoded pixels. The decoder has no idea where they end up; the
/// driver in this crate collects them into bitmaps, but anything that wants
/// `(frame, x, y, intensity)` events can implement this (closures included).
pub trait PixelSink {
    fn pixel(&mut self, frame: usize, x: usize, y: usize, value: Intensity);
}

impl<F> PixelSink for F
where
    F: FnMut(usize, usize, usize, Intensity),
{
    fn pixel(&mut self, frame: usize, x: usize, y: usize, value: Intensity) {
        self(frame, x, y, value)
    }
}

/// Decodes frames out of a raw capture buffer, pushing every pixel into a
/// sink. The buffer is borrowed for the duration of one decode pass and
/// never copied.
#[derive(Debug)]
pub struct FrameDecoder<'a> {
    capture: &'a [u8],
    format: CaptureFormat,
    geometry: FrameGeometry,
    pos: SampleOffset,
}

impl<'a> FrameDecoder<'a> {
    /// Create a decoder over `capture`. Refuses a buffer too short to hold
    /// the configured number of frames.
    pub fn new(
        capture: &'a [u8],
        format: CaptureFormat,
        geometry: FrameGeometry,
    ) -> Result<Self, DecodeError> {
        let expected = geometry.min_capture_len();
        if capture.len() < expected {
            return Err(DecodeError::ShortRead {
                expected,
                actual: capture.len(),
            });
        }
        Ok(Self {
            capture,
            format,
            geometry,
            pos: 0,
        })
    }

    /// Decode the configured number of frames, locating each one from
    /// wherever the previous frame's decode left the cursor.
    pub fn decode(&mut self, sink: &mut impl PixelSink) -> Result<(), DecodeError> {
        for frame in 0..self.geometry.frames {
            self.pos = self.locate_frame(self.pos)?;
            info!("found frame {} at byte {}", frame, self.pos);
            for line in 0..self.geometry.height {
                self.decode_line(frame, line, sink)?;
            }
        }
        Ok(())
    }

    /// Two-phase sync search: scan forward for a vsync rising edge between
    /// adjacent samples, then back up to the nearest hsync rising edge,
    /// which is the true start of frame. Both scans stop at the buffer
    /// bounds instead of walking off them.
    pub fn locate_frame(&self, start: SampleOffset) -> Result<SampleOffset, DecodeError> {
        let capture = self.capture;
        let mut pos = start;
        loop {
            if pos + 1 >= capture.len() {
                return Err(DecodeError::SyncNotFound { start });
            }
            if !self.format.vsync(capture[pos]) && self.format.vsync(capture[pos + 1]) {
                break;
            }
            pos += 1;
        }
        loop {
            if pos == 0 {
                return Err(DecodeError::SyncNotFound { start });
            }
            if self.format.hsync(capture[pos]) && !self.format.hsync(capture[pos - 1]) {
                return Ok(pos);
            }
            pos -= 1;
        }
    }

    /// Decode one scanline: emit a pixel per sample until the hsync 0->1
    /// terminator shows up between the current sample and the next, then pad
    /// the rest of the line with the blanking sentinel. A terminator on the
    /// pair that completes pixel `width` is still a terminator; only a line
    /// with no terminator in `width` samples is too long.
    fn decode_line(
        &mut self,
        frame: usize,
        line: usize,
        sink: &mut impl PixelSink,
    ) -> Result<(), DecodeError> {
        let width = self.geometry.width;
        let mut x = 0;
        loop {
            if self.pos + 1 >= self.capture.len() {
                return Err(DecodeError::SyncNotFound { start: self.pos });
            }
            let cur = self.capture[self.pos];
            let next = self.capture[self.pos + 1];
            sink.pixel(frame, x, line, self.format.intensity(cur));
            x += 1;
            self.pos += 1;
            if !self.format.hsync(cur) && self.format.hsync(next) {
                break;
            }
            if x == width {
                return Err(DecodeError::LineTooLong { frame, line, width });
            }
        }
        debug!(
            "frame {} line {}: {} active samples, next line at byte {}",
            frame, line, x, self.pos
        );
        while x < width {
            sink.pixel(frame, x, line, BLANK_LEVEL);
            x += 1;
        }
        Ok(())
    }
}
