//! Error types for grid transforms.

use grid_kernel::KernelError;
use thiserror::Error;

use crate::types::DataType;

/// Errors that can occur while validating, dispatching or assembling a
/// grid transform.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A required coordinate was neither passed nor carried by the input.
    #[error("coordinate error: {0}")]
    CoordinateError(String),

    /// Rank, extent or shape incompatibility.
    #[error("dimension error: {0}")]
    DimensionError(String),

    /// The caller's partitioning splits a dimension the kernel needs whole.
    #[error("chunk error: {0}")]
    ChunkError(String),

    /// Linked arguments disagree on an attribute such as `units`.
    #[error("attribute error: {0}")]
    AttributeError(String),

    /// The element type has no missing-value sentinel.
    #[error("unsupported dtype: {0}")]
    UnsupportedDtype(DataType),

    /// A transform option is outside its domain.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The kernel rejected a block.
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// Reshaping a block or the assembled output failed.
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl TransformError {
    /// Create a CoordinateError.
    pub fn coordinate(msg: impl Into<String>) -> Self {
        Self::CoordinateError(msg.into())
    }

    /// Create a DimensionError.
    pub fn dimension(msg: impl Into<String>) -> Self {
        Self::DimensionError(msg.into())
    }

    /// Create a ChunkError.
    pub fn chunk(msg: impl Into<String>) -> Self {
        Self::ChunkError(msg.into())
    }

    /// Create an AttributeError.
    pub fn attribute(msg: impl Into<String>) -> Self {
        Self::AttributeError(msg.into())
    }

    /// Create an InvalidOption error.
    pub fn invalid_option(msg: impl Into<String>) -> Self {
        Self::InvalidOption(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors raised by input validation, before any kernel call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::CoordinateError(_)
                | Self::DimensionError(_)
                | Self::ChunkError(_)
                | Self::AttributeError(_)
                | Self::UnsupportedDtype(_)
                | Self::InvalidOption(_)
        )
    }
}

/// Result type for grid transforms.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TransformError::coordinate("linint1: `xi` is required");
        assert_eq!(err.to_string(), "coordinate error: linint1: `xi` is required");

        let err = TransformError::UnsupportedDtype(DataType::Bool);
        assert_eq!(err.to_string(), "unsupported dtype: bool");
    }

    #[test]
    fn test_kernel_errors_convert() {
        let err: TransformError = KernelError::decomposition("singular").into();
        assert!(matches!(err, TransformError::Kernel(_)));
        assert!(!err.is_validation());
        assert!(TransformError::chunk("split").is_validation());
    }
}
