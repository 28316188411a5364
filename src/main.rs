mod signal;
mod types;

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Write};

use image::GrayImage;
use rand::RngCore;

use crate::signal::*;
use crate::types::Intensity;

/// Collects decoded pixels into one grayscale image per frame, rescaling the
/// capture's intensity range up to 8 bits.
struct BitmapSink {
    frames: Vec<GrayImage>,
    max_intensity: Intensity,
}

impl BitmapSink {
    fn new(geometry: FrameGeometry, max_intensity: Intensity) -> Self {
        let frames = (0..geometry.frames)
            .map(|_| GrayImage::new(geometry.width as u32, geometry.height as u32))
            .collect();
        Self {
            frames,
            // A format whose sync masks cover every bit reports a max of 0;
            // keep the rescale divisor nonzero.
            max_intensity: max_intensity.max(1),
        }
    }
}

impl PixelSink for BitmapSink {
    fn pixel(&mut self, frame: usize, x: usize, y: usize, value: Intensity) {
        let gray = (value as u16 * 255 / self.max_intensity as u16) as u8;
        self.frames[frame].put_pixel(x as u32, y as u32, image::Luma([gray]));
    }
}

/// Decode a raw capture file into one BMP per frame (f0000.bmp, f0001.bmp).
fn decode_capture(path: &str) -> Result<(), Box<dyn Error>> {
    let data = fs::read(path)?;
    if data.len() < CAPTURE_LEN {
        return Err(DecodeError::ShortRead {
            expected: CAPTURE_LEN,
            actual: data.len(),
        }
        .into());
    }

    let format = CaptureFormat::default();
    let geometry = FrameGeometry::default();
    let mut sink = BitmapSink::new(geometry, format.max_intensity());
    FrameDecoder::new(&data, format, geometry)?.decode(&mut sink)?;

    for (i, img) in sink.frames.iter().enumerate() {
        let name = format!("f{i:04}.bmp");
        img.save(&name)?;
        println!("wrote {name}");
    }
    Ok(())
}

/// Emit the reference test-bench stimulus with a random payload to stdout.
fn synthesize_stimulus() -> Result<(), Box<dyn Error>> {
    let timing = FrameTiming::default();
    let mut payload = vec![0u8; timing.payload_len()];
    rand::thread_rng().fill_bytes(&mut payload);

    let samples = SignalSynthesizer::new(timing).synthesize(&payload);
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    write_stimulus(&mut out, &samples)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging.
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("decode") => {
            let path = args
                .get(2)
                .ok_or("usage: vidcap-test decode <capture.dat>")?;
            decode_capture(path)
        }
        Some("stim") => synthesize_stimulus(),
        _ => Err("usage: vidcap-test decode <capture.dat> | vidcap-test stim".into()),
    }
}
