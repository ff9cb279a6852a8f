use super::{CapturedFrame, FrameSource};
use crate::frame::{Facing, PixelBuffer};
use anyhow::{Context, Result};
use std::path::Path;

/// Replays one stored frame and its mask dump on every call
pub struct StillSource {
    frame: PixelBuffer,
    mask: Option<Vec<u8>>,
    facing: Facing,
}

impl StillSource {
    pub fn new(frame: PixelBuffer, mask: Option<Vec<u8>>, facing: Facing) -> Self {
        Self {
            frame,
            mask,
            facing,
        }
    }

    /// Load a frame image and, optionally, a raw label dump from disk
    pub fn open<P: AsRef<Path>, M: AsRef<Path>>(
        frame_path: P,
        mask_path: Option<M>,
        facing: Facing,
    ) -> Result<Self> {
        let frame_path = frame_path.as_ref();
        tracing::info!("Loading frame from {}", frame_path.display());

        let frame = image::open(frame_path)
            .with_context(|| format!("Failed to load frame from {}", frame_path.display()))?
            .to_rgba8();

        let mask = match mask_path {
            Some(path) => {
                let path = path.as_ref();
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read mask from {}", path.display()))?;
                tracing::info!("Loaded {} mask bytes from {}", bytes.len(), path.display());
                Some(bytes)
            }
            None => {
                tracing::info!("No mask supplied, frames will pass through");
                None
            }
        };

        Ok(Self::new(frame, mask, facing))
    }
}

impl FrameSource for StillSource {
    fn next_frame(&mut self) -> Result<CapturedFrame> {
        Ok(CapturedFrame {
            image: self.frame.clone(),
            mask: self.mask.clone(),
            facing: self.facing,
        })
    }

    fn resolution(&self) -> (u32, u32) {
        self.frame.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_replays_same_frame() {
        let frame = PixelBuffer::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        let mut source = StillSource::new(frame.clone(), Some(vec![1; 6]), Facing::Front);

        assert_eq!(source.resolution(), (3, 2));
        for _ in 0..3 {
            let captured = source.next_frame().unwrap();
            assert_eq!(captured.image, frame);
            assert_eq!(captured.mask.as_deref(), Some(&[1u8; 6][..]));
            assert_eq!(captured.facing, Facing::Front);
        }
    }

    #[test]
    fn test_open_reads_frame_and_mask() {
        let dir = tempfile::tempdir().unwrap();
        let frame_path = dir.path().join("frame.png");
        let mask_path = dir.path().join("mask.bin");

        PixelBuffer::from_pixel(2, 2, Rgba([9, 8, 7, 255]))
            .save(&frame_path)
            .unwrap();
        std::fs::write(&mask_path, [1u8, 0, 0, 1]).unwrap();

        let mut source = StillSource::open(&frame_path, Some(&mask_path), Facing::Back).unwrap();
        let captured = source.next_frame().unwrap();

        assert_eq!(captured.image.dimensions(), (2, 2));
        assert_eq!(*captured.image.get_pixel(1, 1), Rgba([9, 8, 7, 255]));
        assert_eq!(captured.mask, Some(vec![1, 0, 0, 1]));
    }

    #[test]
    fn test_open_missing_frame_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = StillSource::open(dir.path().join("absent.png"), None::<&Path>, Facing::Back);

        assert!(result.is_err());
    }
}
