use super::types::PixelBuffer;
use image::imageops;

/// Reverse the column order of every row.
///
/// Front-facing cameras deliver a sensor image that is mirrored relative to
/// what the user sees, while the segmentation mask is computed against the
/// unmirrored sensor image. The pipeline therefore flips the frame before
/// compositing and flips the result back afterwards.
pub fn mirror_horizontal(buffer: &PixelBuffer) -> PixelBuffer {
    let _span = tracing::debug_span!("mirror").entered();
    imageops::flip_horizontal(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn numbered(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn test_mirror_reverses_columns() {
        let buffer = numbered(3, 2);
        let mirrored = mirror_horizontal(&buffer);

        assert_eq!(mirrored.dimensions(), (3, 2));
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(mirrored.get_pixel(x, y), buffer.get_pixel(2 - x, y));
            }
        }
    }

    #[test]
    fn test_mirror_is_an_involution() {
        for (w, h) in [(1, 1), (2, 5), (4, 3), (9, 1)] {
            let buffer = numbered(w, h);
            assert_eq!(mirror_horizontal(&mirror_horizontal(&buffer)), buffer);
        }
    }

    #[test]
    fn test_mirror_empty_buffer() {
        let buffer = PixelBuffer::new(0, 0);
        assert_eq!(mirror_horizontal(&buffer).dimensions(), (0, 0));
    }
}
