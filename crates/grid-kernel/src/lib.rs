//! Kernel contract for grid transforms.
//!
//! The dispatch layer in `grid-transform` never does numerics itself. It
//! hands complete, contiguous blocks to a [`Kernel`] and trusts the result.
//! This crate defines that boundary:
//!
//! - [`Kernel`]: one method per entry point, all buffers in kernel axis order
//!   (innermost spatial axis first) with missing values encoded as `xmsg`
//! - [`ScatterStatus`]: non-fatal status codes from scattered-point calls
//! - [`ReferenceKernel`]: a straightforward implementation of every entry
//!   point, used as the default collaborator
//!
//! # Example
//!
//! ```
//! use grid_kernel::{Kernel, ReferenceKernel};
//! use ndarray::arr1;
//!
//! let xi = arr1(&[0.0, 1.0, 2.0]);
//! let fi = arr1(&[10.0, 20.0, 30.0]);
//! let xo = arr1(&[0.5, 1.5]);
//!
//! let fo = ReferenceKernel
//!     .linint1(xi.view(), fi.view(), xo.view(), false, f64::MAX)
//!     .unwrap();
//! assert_eq!(fo.to_vec(), vec![15.0, 25.0]);
//! ```

pub mod error;
pub mod kernel;
pub mod reference;
pub mod status;

pub use error::{KernelError, Result};
pub use kernel::{
    DistanceMethod, EofDecomposition, EofMatrix, EofParams, Kernel, TripleGridParams,
};
pub use reference::ReferenceKernel;
pub use status::ScatterStatus;
