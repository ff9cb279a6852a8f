mod decode;
mod refine;
pub mod types;

pub use decode::{decode, rescale};
pub use refine::{
    BoundaryRefiner, ComponentFilter, Connectivity, LabelMatch, MorphOp, Morphology,
    RefineStrategy,
};
pub use types::{BooleanMask, LabelMask, DEFAULT_FOREGROUND_LABEL};
