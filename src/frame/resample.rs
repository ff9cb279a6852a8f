use super::types::PixelBuffer;
use crate::error::{CompositeError, Result};
use image::imageops::{self, FilterType};
use std::borrow::Cow;

/// Interpolation used when a background has to be stretched to the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    /// Nearest-neighbour sampling, cheapest, blocky when upscaling
    Nearest,
    /// Bilinear interpolation (`FilterType::Triangle`)
    #[default]
    Bilinear,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
        }
    }
}

/// Stretch `background` to exactly `target_width` x `target_height`.
///
/// Each axis is scaled independently, so the aspect ratio of the background
/// is not preserved. When the background already has the target size it is
/// returned borrowed and untouched.
pub fn resample(
    background: &PixelBuffer,
    target_width: u32,
    target_height: u32,
    filter: ResizeFilter,
) -> Result<Cow<'_, PixelBuffer>> {
    if target_width == 0 || target_height == 0 {
        return Err(CompositeError::InvalidDimensions(target_width, target_height));
    }

    if background.dimensions() == (target_width, target_height) {
        return Ok(Cow::Borrowed(background));
    }

    let (src_width, src_height) = background.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(CompositeError::InvalidDimensions(src_width, src_height));
    }

    let _span = tracing::debug_span!("resample").entered();
    tracing::debug!(
        "Resampling background {}x{} -> {}x{} ({:?})",
        src_width,
        src_height,
        target_width,
        target_height,
        filter
    );

    Ok(Cow::Owned(imageops::resize(
        background,
        target_width,
        target_height,
        filter.into(),
    )))
}
