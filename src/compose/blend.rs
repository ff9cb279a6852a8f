use crate::error::{CompositeError, Result};
use crate::frame::PixelBuffer;
use crate::segmentation::BooleanMask;
use ndarray::Axis;
use rayon::prelude::*;

const CHANNELS: usize = 4;

fn check_shapes(
    foreground: &PixelBuffer,
    background: &PixelBuffer,
    mask: &BooleanMask,
) -> Result<()> {
    let expected = foreground.dimensions();
    if background.dimensions() != expected {
        return Err(CompositeError::dimensions(
            "background",
            expected,
            background.dimensions(),
        ));
    }
    if mask.dimensions() != expected {
        return Err(CompositeError::dimensions("mask", expected, mask.dimensions()));
    }
    Ok(())
}

/// Select each output pixel from `foreground` where the mask keeps it and
/// from `background` everywhere else.
///
/// There is no feathering at the boundary: the cut follows the mask exactly.
pub fn composite(
    foreground: &PixelBuffer,
    background: &PixelBuffer,
    mask: &BooleanMask,
) -> Result<PixelBuffer> {
    check_shapes(foreground, background, mask)?;
    let _span = tracing::debug_span!("composite").entered();

    let mut output = foreground.clone();
    for ((out, bg), &keep) in output
        .pixels_mut()
        .zip(background.pixels())
        .zip(mask.as_array().iter())
    {
        if !keep {
            *out = *bg;
        }
    }

    Ok(output)
}

/// Same selection as [`composite`], split across rows on the rayon pool
pub fn composite_parallel(
    foreground: &PixelBuffer,
    background: &PixelBuffer,
    mask: &BooleanMask,
) -> Result<PixelBuffer> {
    check_shapes(foreground, background, mask)?;
    let _span = tracing::debug_span!("composite_parallel").entered();

    let (width, height) = foreground.dimensions();
    let mut output = foreground.clone();
    if width == 0 || height == 0 {
        return Ok(output);
    }

    let row_len = width as usize * CHANNELS;
    let out_rows: &mut [u8] = &mut output;
    let bg_rows: &[u8] = background.as_raw();

    out_rows
        .par_chunks_exact_mut(row_len)
        .zip(bg_rows.par_chunks_exact(row_len))
        .zip(mask.as_array().axis_iter(Axis(0)).into_par_iter())
        .for_each(|((out_row, bg_row), keep_row)| {
            for ((out_px, bg_px), &keep) in out_row
                .chunks_exact_mut(CHANNELS)
                .zip(bg_row.chunks_exact(CHANNELS))
                .zip(keep_row.iter())
            {
                if !keep {
                    out_px.copy_from_slice(bg_px);
                }
            }
        });

    Ok(output)
}
