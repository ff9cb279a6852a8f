use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(u32, u32),

    #[error("No background image configured")]
    MissingBackground,
}

impl CompositeError {
    pub(crate) fn dimensions(what: &str, expected: (u32, u32), actual: (u32, u32)) -> Self {
        CompositeError::ShapeMismatch(format!(
            "{what} is {}x{}, expected {}x{}",
            actual.0, actual.1, expected.0, expected.1
        ))
    }
}

pub type Result<T> = std::result::Result<T, CompositeError>;
