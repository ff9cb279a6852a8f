//! Mask-driven background replacement for live camera frames.
//!
//! A segmentation analyzer supplies a one-byte label per pixel; the
//! compositor decodes and refines those labels into a keep/replace mask,
//! stretches the selected background to the frame, and selects each output
//! pixel from the frame or the background. Front-camera frames are mirrored
//! around the compositing step.

pub mod capture;
pub mod compose;
pub mod config;
pub mod error;
pub mod frame;
pub mod output;
pub mod segmentation;

pub use compose::{process_frame, BackgroundCompositor};
pub use config::PipelineConfig;
pub use error::{CompositeError, Result};
pub use frame::{Facing, FrameMetadata, PixelBuffer};
