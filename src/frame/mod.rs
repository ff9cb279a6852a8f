mod orient;
mod resample;
pub mod types;

pub use orient::mirror_horizontal;
pub use resample::{resample, ResizeFilter};
pub use types::{Facing, FrameMetadata, PixelBuffer};
