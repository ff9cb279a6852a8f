mod png;

pub use png::PngSink;

use crate::frame::PixelBuffer;
use anyhow::Result;

/// Trait for output destinations
pub trait OutputSink {
    /// Write a frame to the output
    fn write_frame(&mut self, frame: &PixelBuffer) -> Result<()>;

    /// Number of frames written so far
    fn frames_written(&self) -> u64;
}
