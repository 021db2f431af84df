//! Error types for kernel calls.

use thiserror::Error;

/// Errors a kernel can raise for a single invocation.
///
/// These are hard failures. Recoverable conditions in scattered-point
/// interpolation are reported through [`crate::ScatterStatus`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// A buffer argument does not have the length the call requires.
    #[error("kernel argument `{name}` has length {actual}, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A 2-D buffer argument does not have the shape the call requires.
    #[error("kernel argument `{name}` has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A scalar parameter is outside its domain.
    #[error("invalid kernel parameter: {0}")]
    InvalidParameter(String),

    /// The decomposition could not be computed.
    #[error("decomposition failed: {0}")]
    Decomposition(String),
}

impl KernelError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a Decomposition error.
    pub fn decomposition(msg: impl Into<String>) -> Self {
        Self::Decomposition(msg.into())
    }

    pub(crate) fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::LengthMismatch {
                name,
                expected,
                actual,
            })
        }
    }

    pub(crate) fn check_shape(name: &'static str, expected: &[usize], actual: &[usize]) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::ShapeMismatch {
                name,
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            })
        }
    }
}

/// Result type for kernel calls.
pub type Result<T> = std::result::Result<T, KernelError>;
