use image::{GrayImage, Luma, Rgba, RgbaImage};
use ndarray::Array2;

/// Label the analyzer assigns to the person/foreground class
pub const DEFAULT_FOREGROUND_LABEL: i32 = 1;

/// Per-pixel class labels produced by the segmentation analyzer.
///
/// Indexed `[row, col]`; dimensions match the frame the mask was computed
/// from. Label values are opaque apart from the one the caller treats as
/// foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMask {
    labels: Array2<i32>,
}

impl LabelMask {
    pub fn from_array(labels: Array2<i32>) -> Self {
        Self { labels }
    }

    pub fn width(&self) -> u32 {
        self.labels.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.labels.nrows() as u32
    }

    /// Returns (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn labels(&self) -> &Array2<i32> {
        &self.labels
    }

    /// Label at column `x`, row `y`
    pub fn get(&self, x: u32, y: u32) -> i32 {
        self.labels[[y as usize, x as usize]]
    }
}

/// Keep/replace decision per pixel after refinement.
///
/// `true` means the foreground pixel is kept, `false` means it is replaced by
/// the background. Same shape as the [`LabelMask`] it was refined from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanMask {
    keep: Array2<bool>,
}

impl BooleanMask {
    pub fn from_array(keep: Array2<bool>) -> Self {
        Self { keep }
    }

    pub fn width(&self) -> u32 {
        self.keep.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.keep.nrows() as u32
    }

    /// Returns (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn as_array(&self) -> &Array2<bool> {
        &self.keep
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.keep[[y as usize, x as usize]]
    }

    /// Number of pixels retained as foreground
    pub fn foreground_count(&self) -> usize {
        self.keep.iter().filter(|&&keep| keep).count()
    }

    /// Render the mask as white (foreground) on black for inspection
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width(), self.height(), |x, y| {
            let value = if self.get(x, y) { 255 } else { 0 };
            Rgba([value, value, value, 255])
        })
    }

    /// Binary image form (255 = keep) for the `imageproc` operators
    pub(crate) fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    /// Any non-zero intensity counts as keep
    pub(crate) fn from_gray(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let keep = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            image.get_pixel(col as u32, row as u32)[0] != 0
        });
        Self { keep }
    }
}
