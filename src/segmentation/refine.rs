use super::types::{BooleanMask, LabelMask};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::{morphology, region_labelling};
use ndarray::Array2;

/// Turns a label grid into a keep/replace decision per pixel.
///
/// The foreground label is a parameter so callers can invert figure and
/// ground without changing the refiner. Implementations must return a mask
/// with the same dimensions as `labels`.
pub trait BoundaryRefiner: Send + Sync {
    fn refine(&self, labels: &LabelMask, target_label: i32) -> BooleanMask;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Keeps exactly the pixels whose label equals the target
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelMatch;

impl BoundaryRefiner for LabelMatch {
    fn refine(&self, labels: &LabelMask, target_label: i32) -> BooleanMask {
        let _span = tracing::debug_span!("refine_label_match").entered();
        BooleanMask::from_array(matching(labels, target_label))
    }

    fn name(&self) -> &'static str {
        "label-match"
    }
}

fn matching(labels: &LabelMask, target_label: i32) -> Array2<bool> {
    labels.labels().mapv(|label| label == target_label)
}

/// Pixel adjacency used when walking connected regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge neighbours only
    #[default]
    Four,
    /// Edge and corner neighbours
    Eight,
}

impl From<Connectivity> for region_labelling::Connectivity {
    fn from(connectivity: Connectivity) -> Self {
        match connectivity {
            Connectivity::Four => region_labelling::Connectivity::Four,
            Connectivity::Eight => region_labelling::Connectivity::Eight,
        }
    }
}

/// Drops connected foreground regions smaller than `min_area` pixels.
///
/// Raw analyzer output tends to leave isolated foreground specks in the
/// background; labelling each region and discarding the small ones removes
/// them while leaving the main silhouette's boundary untouched.
#[derive(Debug, Clone, Copy)]
pub struct ComponentFilter {
    pub min_area: usize,
    pub connectivity: Connectivity,
}

impl ComponentFilter {
    pub fn new(min_area: usize, connectivity: Connectivity) -> Self {
        Self {
            min_area,
            connectivity,
        }
    }
}

impl BoundaryRefiner for ComponentFilter {
    fn refine(&self, labels: &LabelMask, target_label: i32) -> BooleanMask {
        let _span = tracing::debug_span!("refine_components").entered();

        let candidates = BooleanMask::from_array(matching(labels, target_label));
        let (width, height) = candidates.dimensions();
        if self.min_area <= 1 || width == 0 || height == 0 {
            return candidates;
        }

        let regions = region_labelling::connected_components(
            &candidates.to_gray(),
            self.connectivity.into(),
            Luma([0u8]),
        );

        // Region ids start at 1; 0 is background
        let region_count = regions.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;
        let mut areas = vec![0usize; region_count + 1];
        for p in regions.pixels() {
            areas[p[0] as usize] += 1;
        }

        let dropped = areas
            .iter()
            .skip(1)
            .filter(|&&area| area < self.min_area)
            .count();
        tracing::debug!(
            "Dropped {} of {} regions smaller than {} pixels",
            dropped,
            region_count,
            self.min_area
        );

        let keep = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            let id = regions.get_pixel(col as u32, row as u32)[0] as usize;
            id != 0 && areas[id] >= self.min_area
        });
        BooleanMask::from_array(keep)
    }

    fn name(&self) -> &'static str {
        "components"
    }
}

/// Binary morphology applied after label matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MorphOp {
    /// Erode then dilate: removes specks narrower than the window
    #[default]
    Open,
    /// Dilate then erode: fills holes narrower than the window
    Close,
}

/// Smooths the matched mask with a square `(2 * radius + 1)` window
/// (chessboard distance).
///
/// Pixels outside the frame are ignored rather than treated as background,
/// so silhouettes touching the border are not eaten away.
#[derive(Debug, Clone, Copy)]
pub struct Morphology {
    pub op: MorphOp,
    pub radius: u8,
}

impl Morphology {
    pub fn new(op: MorphOp, radius: u8) -> Self {
        Self { op, radius }
    }
}

impl BoundaryRefiner for Morphology {
    fn refine(&self, labels: &LabelMask, target_label: i32) -> BooleanMask {
        let _span = tracing::debug_span!("refine_morphology").entered();

        let matched = BooleanMask::from_array(matching(labels, target_label));
        let (width, height) = matched.dimensions();
        if self.radius == 0 || width == 0 || height == 0 {
            return matched;
        }

        let gray: GrayImage = matched.to_gray();
        let smoothed = match self.op {
            MorphOp::Open => morphology::open(&gray, Norm::LInf, self.radius),
            MorphOp::Close => morphology::close(&gray, Norm::LInf, self.radius),
        };
        BooleanMask::from_gray(&smoothed)
    }

    fn name(&self) -> &'static str {
        match self.op {
            MorphOp::Open => "open",
            MorphOp::Close => "close",
        }
    }
}

/// Which refiner a pipeline should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefineStrategy {
    #[default]
    LabelMatch,
    Components {
        min_area: usize,
        connectivity: Connectivity,
    },
    Morphology {
        op: MorphOp,
        radius: u8,
    },
}

impl RefineStrategy {
    pub fn build(self) -> Box<dyn BoundaryRefiner> {
        match self {
            RefineStrategy::LabelMatch => Box::new(LabelMatch),
            RefineStrategy::Components {
                min_area,
                connectivity,
            } => Box::new(ComponentFilter::new(min_area, connectivity)),
            RefineStrategy::Morphology { op, radius } => Box::new(Morphology::new(op, radius)),
        }
    }
}
