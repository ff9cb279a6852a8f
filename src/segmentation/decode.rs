use super::types::LabelMask;
use crate::error::{CompositeError, Result};
use ndarray::Array2;

/// Decode the analyzer's one-byte-per-pixel label payload.
///
/// Bytes are laid out row-major and hold signed labels, so each one is
/// reinterpreted as `i8` and sign-extended.
pub fn decode(bytes: &[u8], width: u32, height: u32) -> Result<LabelMask> {
    let _span = tracing::debug_span!("decode").entered();

    let expected = width as usize * height as usize;
    if bytes.len() != expected {
        return Err(CompositeError::ShapeMismatch(format!(
            "mask has {} bytes, frame {}x{} has {} pixels",
            bytes.len(),
            width,
            height,
            expected
        )));
    }

    let labels: Vec<i32> = bytes.iter().map(|&b| i32::from(b as i8)).collect();

    Array2::from_shape_vec((height as usize, width as usize), labels)
        .map(LabelMask::from_array)
        .map_err(|e| CompositeError::ShapeMismatch(e.to_string()))
}

/// Resize a label grid to the frame's dimensions.
///
/// Analyzers often run below capture resolution. Labels are categorical, so
/// they are sampled nearest-neighbour instead of being interpolated.
pub fn rescale(mask: &LabelMask, target_width: u32, target_height: u32) -> Result<LabelMask> {
    if mask.dimensions() == (target_width, target_height) {
        return Ok(mask.clone());
    }
    if target_width == 0 || target_height == 0 {
        return Err(CompositeError::InvalidDimensions(target_width, target_height));
    }

    let (src_width, src_height) = mask.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(CompositeError::InvalidDimensions(src_width, src_height));
    }

    let _span = tracing::debug_span!("rescale_mask").entered();

    let labels = mask.labels();
    let (src_w, src_h) = (src_width as usize, src_height as usize);
    let (dst_w, dst_h) = (target_width as usize, target_height as usize);
    let resized = Array2::from_shape_fn((dst_h, dst_w), |(row, col)| {
        // Sample at the centre of each destination pixel
        let src_row = ((2 * row + 1) * src_h / (2 * dst_h)).min(src_h - 1);
        let src_col = ((2 * col + 1) * src_w / (2 * dst_w)).min(src_w - 1);
        labels[[src_row, src_col]]
    });

    Ok(LabelMask::from_array(resized))
}
