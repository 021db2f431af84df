//! Status codes reported by scattered-point interpolation.

use std::fmt;

/// Non-fatal outcome of a scattered-point interpolation call.
///
/// Any value other than [`ScatterStatus::Ok`] means the kernel filled its
/// output with the missing sentinel. Callers surface these as warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScatterStatus {
    Ok,
    /// Fewer than two points on an input axis, or no output points.
    InsufficientPoints,
    /// The x coordinates are not strictly increasing.
    NonMonotonicX,
    /// The y coordinates are not strictly increasing.
    NonMonotonicY,
}

impl ScatterStatus {
    /// Maps a numeric status code (0..=3) to a status.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::InsufficientPoints),
            2 => Some(Self::NonMonotonicX),
            3 => Some(Self::NonMonotonicY),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::InsufficientPoints => 1,
            Self::NonMonotonicX => 2,
            Self::NonMonotonicY => 3,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Human readable description used in warnings.
    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::InsufficientPoints => "not enough points in input or output array",
            Self::NonMonotonicX => "xi values are not monotonically increasing",
            Self::NonMonotonicY => "yi values are not monotonically increasing",
        }
    }
}

impl fmt::Display for ScatterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.code(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for code in 0..4 {
            let status = ScatterStatus::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(ScatterStatus::from_code(4), None);
        assert_eq!(ScatterStatus::from_code(-1), None);
    }

    #[test]
    fn test_only_zero_is_ok() {
        assert!(ScatterStatus::Ok.is_ok());
        assert!(!ScatterStatus::NonMonotonicY.is_ok());
        assert_eq!(
            ScatterStatus::NonMonotonicX.to_string(),
            "status 2: xi values are not monotonically increasing"
        );
    }
}
