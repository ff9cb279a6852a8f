use super::background::BackgroundSlot;
use super::blend::{composite, composite_parallel};
use crate::config::PipelineConfig;
use crate::error::{CompositeError, Result};
use crate::frame::{mirror_horizontal, resample, Facing, FrameMetadata, PixelBuffer, ResizeFilter};
use crate::segmentation::{self, BooleanMask, BoundaryRefiner, LabelMask, LabelMatch};
use std::borrow::Cow;
use std::sync::Arc;

/// Replace the background of a single frame.
///
/// Stateless form of [`BackgroundCompositor::process_frame`]: labels are
/// matched exactly and the background is resampled bilinearly on every call.
/// An absent or empty mask returns the frame unchanged.
pub fn process_frame(
    frame: &PixelBuffer,
    mask_bytes: Option<&[u8]>,
    target_label: i32,
    background: Option<&PixelBuffer>,
    facing: Facing,
) -> Result<PixelBuffer> {
    let Some(bytes) = mask_bytes.filter(|bytes| !bytes.is_empty()) else {
        return Ok(frame.clone());
    };
    let background = background.ok_or(CompositeError::MissingBackground)?;

    let (width, height) = frame.dimensions();
    let labels = segmentation::decode(bytes, width, height)?;
    let keep = LabelMatch.refine(&labels, target_label);
    let background = resample(background, width, height, ResizeFilter::default())?;

    composite_oriented(frame, &background, &keep, facing, false)
}

/// Mirror around the composite for front cameras.
///
/// The mask is computed on the unmirrored sensor image and is applied to the
/// mirrored frame as-is, then the result is flipped back.
fn composite_oriented(
    frame: &PixelBuffer,
    background: &PixelBuffer,
    keep: &BooleanMask,
    facing: Facing,
    parallel: bool,
) -> Result<PixelBuffer> {
    let oriented = if facing.is_mirrored() {
        Cow::Owned(mirror_horizontal(frame))
    } else {
        Cow::Borrowed(frame)
    };

    let composed = if parallel {
        composite_parallel(&oriented, background, keep)?
    } else {
        composite(&oriented, background, keep)?
    };

    Ok(if facing.is_mirrored() {
        mirror_horizontal(&composed)
    } else {
        composed
    })
}

/// Long-lived background replacement pipeline.
///
/// Owns the refiner and the background slot for a session. `process_frame`
/// takes `&self`, so one compositor can be shared with the thread that
/// changes the background selection.
pub struct BackgroundCompositor {
    config: PipelineConfig,
    refiner: Box<dyn BoundaryRefiner>,
    background: BackgroundSlot,
}

impl BackgroundCompositor {
    pub fn new(config: PipelineConfig) -> Self {
        let refiner = config.refine.build();
        Self::with_refiner(config, refiner)
    }

    /// Use a caller-supplied refiner instead of the configured strategy
    pub fn with_refiner(config: PipelineConfig, refiner: Box<dyn BoundaryRefiner>) -> Self {
        tracing::info!(
            "Compositor ready: refiner={}, filter={:?}, parallel={}",
            refiner.name(),
            config.resize_filter,
            config.parallel
        );
        Self {
            config,
            refiner,
            background: BackgroundSlot::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Select a new background; the cached resize of the previous one is dropped
    pub fn set_background(&self, asset: impl Into<Arc<PixelBuffer>>) {
        self.background.set(asset);
    }

    pub fn clear_background(&self) {
        self.background.clear();
    }

    pub fn has_background(&self) -> bool {
        self.background.is_set()
    }

    pub fn background(&self) -> &BackgroundSlot {
        &self.background
    }

    /// Decode and refine a mask computed at `width` x `height`
    pub fn refine_mask(
        &self,
        mask_bytes: &[u8],
        width: u32,
        height: u32,
        target_label: i32,
    ) -> Result<BooleanMask> {
        let labels = segmentation::decode(mask_bytes, width, height)?;
        Ok(self.refiner.refine(&labels, target_label))
    }

    /// Composite one frame whose mask has the frame's own resolution
    pub fn process_frame(
        &self,
        frame: &PixelBuffer,
        mask_bytes: Option<&[u8]>,
        target_label: i32,
        meta: &FrameMetadata,
    ) -> Result<PixelBuffer> {
        let (width, height) = meta.dimensions();
        self.process_scaled_frame(frame, mask_bytes, width, height, target_label, meta)
    }

    /// Composite one frame whose mask was computed at `mask_width` x
    /// `mask_height`; the labels are rescaled to the frame first.
    pub fn process_scaled_frame(
        &self,
        frame: &PixelBuffer,
        mask_bytes: Option<&[u8]>,
        mask_width: u32,
        mask_height: u32,
        target_label: i32,
        meta: &FrameMetadata,
    ) -> Result<PixelBuffer> {
        let _span = tracing::debug_span!("process_frame").entered();

        if frame.dimensions() != meta.dimensions() {
            return Err(CompositeError::dimensions(
                "frame",
                meta.dimensions(),
                frame.dimensions(),
            ));
        }

        let Some(bytes) = mask_bytes.filter(|bytes| !bytes.is_empty()) else {
            tracing::debug!("No mask for frame, passing through");
            return Ok(frame.clone());
        };

        if !self.config.replace_background {
            return Ok(frame.clone());
        }

        if !self.background.is_set() {
            return Err(CompositeError::MissingBackground);
        }

        let labels = segmentation::decode(bytes, mask_width, mask_height)?;
        let labels = if labels.dimensions() == meta.dimensions() {
            labels
        } else {
            segmentation::rescale(&labels, meta.width, meta.height)?
        };

        self.blend(frame, &labels, target_label, meta.facing)
    }

    fn blend(
        &self,
        frame: &PixelBuffer,
        labels: &LabelMask,
        target_label: i32,
        facing: Facing,
    ) -> Result<PixelBuffer> {
        let keep = self.refiner.refine(labels, target_label);

        let (width, height) = frame.dimensions();
        let background = self
            .background
            .fitted(width, height, self.config.resize_filter)?
            .ok_or(CompositeError::MissingBackground)?;

        tracing::debug!(
            "Compositing {}x{} frame: {} foreground pixels, facing {:?}",
            width,
            height,
            keep.foreground_count(),
            facing
        );

        composite_oriented(frame, &background, &keep, facing, self.config.parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{Connectivity, RefineStrategy};
    use image::Rgba;

    const FG: Rgba<u8> = Rgba([200, 100, 50, 255]);
    const BG: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn compositor() -> BackgroundCompositor {
        BackgroundCompositor::new(PipelineConfig::default())
    }

    #[test]
    fn test_missing_background() {
        let frame = PixelBuffer::from_pixel(2, 2, FG);
        let meta = FrameMetadata::for_frame(&frame, Facing::Back);

        let result = compositor().process_frame(&frame, Some(&[1u8, 0, 1, 0][..]), 1, &meta);

        assert_eq!(result.unwrap_err(), CompositeError::MissingBackground);
    }

    #[test]
    fn test_absent_mask_passes_through_without_background() {
        let frame = PixelBuffer::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 1, 255]));
        let pipeline = compositor();

        for facing in [Facing::Back, Facing::Front] {
            let meta = FrameMetadata::for_frame(&frame, facing);
            assert_eq!(pipeline.process_frame(&frame, None, 1, &meta).unwrap(), frame);
            assert_eq!(
                pipeline.process_frame(&frame, Some(&[0u8; 0][..]), 1, &meta).unwrap(),
                frame
            );
        }
    }

    #[test]
    fn test_replace_disabled_passes_through() {
        let config = PipelineConfig::builder().replace_background(false).build();
        let pipeline = BackgroundCompositor::new(config);
        let frame = PixelBuffer::from_pixel(2, 1, FG);
        let meta = FrameMetadata::for_frame(&frame, Facing::Back);

        let result = pipeline.process_frame(&frame, Some(&[0u8, 0][..]), 1, &meta).unwrap();
        assert_eq!(result, frame);
    }

    #[test]
    fn test_metadata_must_describe_frame() {
        let pipeline = compositor();
        pipeline.set_background(PixelBuffer::from_pixel(2, 2, BG));
        let frame = PixelBuffer::from_pixel(2, 2, FG);
        let meta = FrameMetadata::new(Facing::Back, 3, 2);

        assert!(matches!(
            pipeline.process_frame(&frame, Some(&[1u8, 1, 1, 1][..]), 1, &meta),
            Err(CompositeError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_background_is_stretched_and_cached() {
        let pipeline = compositor();
        pipeline.set_background(PixelBuffer::from_pixel(10, 10, BG));
        let frame = PixelBuffer::from_pixel(4, 3, FG);
        let meta = FrameMetadata::for_frame(&frame, Facing::Back);
        let mask = [1u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];

        let result = pipeline.process_frame(&frame, Some(&mask[..]), 1, &meta).unwrap();

        assert_eq!(pipeline.background().cached_dimensions(), Some((4, 3)));
        assert_eq!(*result.get_pixel(0, 0), FG);
        assert_eq!(*result.get_pixel(1, 0), BG);
        assert_eq!(*result.get_pixel(3, 2), FG);
    }

    #[test]
    fn test_scaled_mask_is_rescaled_to_frame() {
        let pipeline = compositor();
        pipeline.set_background(PixelBuffer::from_pixel(4, 4, BG));
        let frame = PixelBuffer::from_pixel(4, 4, FG);
        let meta = FrameMetadata::for_frame(&frame, Facing::Back);

        // 2x2 mask, foreground in the top-left quadrant only
        let result = pipeline
            .process_scaled_frame(&frame, Some(&[1u8, 0, 0, 0][..]), 2, 2, 1, &meta)
            .unwrap();

        for y in 0..4 {
            for x in 0..4 {
                let expected = if x < 2 && y < 2 { FG } else { BG };
                assert_eq!(*result.get_pixel(x, y), expected);
            }
        }
    }

    #[test]
    fn test_component_refiner_removes_speck() {
        let config = PipelineConfig::builder()
            .refine(RefineStrategy::Components {
                min_area: 2,
                connectivity: Connectivity::Four,
            })
            .build();
        let pipeline = BackgroundCompositor::new(config);
        pipeline.set_background(PixelBuffer::from_pixel(3, 3, BG));
        let frame = PixelBuffer::from_pixel(3, 3, FG);
        let meta = FrameMetadata::for_frame(&frame, Facing::Back);
        let mask = [1u8, 1, 0, 0, 0, 0, 0, 0, 1];

        let result = pipeline.process_frame(&frame, Some(&mask[..]), 1, &meta).unwrap();

        assert_eq!(*result.get_pixel(0, 0), FG);
        assert_eq!(*result.get_pixel(1, 0), FG);
        assert_eq!(*result.get_pixel(2, 2), BG);
    }

    #[test]
    fn test_refine_mask_uses_configured_refiner() {
        let pipeline = compositor();
        let mask = pipeline.refine_mask(&[2, 1, 2, 0], 2, 2, 2).unwrap();

        assert!(mask.get(0, 0));
        assert!(!mask.get(1, 0));
        assert!(mask.get(0, 1));
        assert!(!mask.get(1, 1));
    }
}
