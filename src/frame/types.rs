use image::RgbaImage;

/// Packed RGBA pixels with explicit width and height.
///
/// Stages never write into a buffer they were handed; every transform
/// allocates its own output.
pub type PixelBuffer = RgbaImage;

/// Which physical camera captured a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Front,
    #[default]
    Back,
}

impl Facing {
    /// Front-camera frames are mirrored around the compositing step
    pub fn is_mirrored(self) -> bool {
        matches!(self, Facing::Front)
    }
}

/// Per-frame description supplied by the caller alongside the pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetadata {
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
}

impl FrameMetadata {
    pub fn new(facing: Facing, width: u32, height: u32) -> Self {
        Self {
            facing,
            width,
            height,
        }
    }

    /// Metadata describing `frame` as captured by `facing`
    pub fn for_frame(frame: &PixelBuffer, facing: Facing) -> Self {
        let (width, height) = frame.dimensions();
        Self::new(facing, width, height)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_frame() {
        let frame = PixelBuffer::new(7, 3);
        let meta = FrameMetadata::for_frame(&frame, Facing::Front);

        assert_eq!(meta.dimensions(), (7, 3));
        assert!(meta.facing.is_mirrored());
    }

    #[test]
    fn test_back_camera_is_default_and_unmirrored() {
        assert_eq!(Facing::default(), Facing::Back);
        assert!(!Facing::Back.is_mirrored());
    }
}
