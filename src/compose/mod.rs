mod background;
mod blend;
mod pipeline;

pub use background::BackgroundSlot;
pub use blend::{composite, composite_parallel};
pub use pipeline::{process_frame, BackgroundCompositor};
