//! Shared test utilities for the grid-transform workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Grid and coordinate generators
//! - A call-counting kernel wrapper
//! - Approximate equality assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true }
//! ```

pub mod generators;
pub mod kernels;

// Re-export commonly used items at the crate root
pub use generators::*;
pub use kernels::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Element-wise approximate equality of two arrays of the same shape.
/// NaN matches NaN.
///
/// ```
/// use test_utils::assert_all_close;
/// use ndarray::arr1;
///
/// assert_all_close!(arr1(&[1.0, f64::NAN]), arr1(&[1.0000001, f64::NAN]), 1e-6);
/// ```
#[macro_export]
macro_rules! assert_all_close {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = &$left;
        let right = &$right;
        assert_eq!(left.shape(), right.shape(), "shape mismatch");
        for (index, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            let (l, r): (f64, f64) = (*l as f64, *r as f64);
            if l.is_nan() && r.is_nan() {
                continue;
            }
            if !((l - r).abs() <= $epsilon as f64) {
                panic!(
                    "assertion failed: element {} differs: left `{:?}`, right `{:?}`",
                    index, l, r
                );
            }
        }
    }};
}
