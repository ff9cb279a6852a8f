mod still;

pub use still::StillSource;

use crate::frame::{Facing, PixelBuffer};
use anyhow::Result;

/// A frame together with the analyzer output computed for it
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: PixelBuffer,
    /// Raw one-byte-per-pixel labels; `None` when the analyzer missed the frame
    pub mask: Option<Vec<u8>>,
    pub facing: Facing,
}

/// Trait for sources of frames and their segmentation masks
pub trait FrameSource {
    /// Produce the next frame
    fn next_frame(&mut self) -> Result<CapturedFrame>;

    /// Get the resolution of produced frames
    fn resolution(&self) -> (u32, u32);
}
