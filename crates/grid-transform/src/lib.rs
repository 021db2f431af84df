//! Chunked dispatch layer for geoscience grid transforms.
//!
//! This crate applies numerical grid kernels to labeled or plain N-D arrays
//! of any batch rank. It enables:
//!
//! - **Batch partitioning**: every leading dimension is split into unit
//!   blocks, the transformed (active) trailing dimensions stay whole
//! - **Parallel dispatch**: blocks run on rayon, optionally in a dedicated pool
//! - **Missing-value bridging**: host sentinels (NaN by default) are
//!   translated to the kernel's sentinel and back exactly once per block
//! - **Labeled results**: dimension names, coordinates and attributes follow
//!   the data through every transform
//!
//! # Architecture
//!
//! ```text
//! GridTransformer::linint2(fi, ...)
//!      │
//!      ├─► validate (ranks, coordinates, units, chunking)
//!      │
//!      ├─► ChunkPlan: batch blocks × whole active dims
//!      │
//!      ├─► Dispatcher: sequential or rayon per block
//!      │         │
//!      │         └─► BlockInvocation: reshape ─► reverse ─► bridge ─► Kernel
//!      │
//!      └─► assemble: concatenate, relabel, copy attributes
//!               │
//!               ▼
//!          GridArray<T>
//! ```
//!
//! # Example
//!
//! ```
//! use grid_transform::{GridTransformer, InterpOptions, LabeledArray};
//! use ndarray::{arr1, Array2};
//!
//! let fi = LabeledArray::new(Array2::from_elem((3, 4), 1.5), ["time", "lon"])?
//!     .with_coord("lon", arr1(&[0.0, 1.0, 2.0, 3.0]))?;
//! let xo = arr1(&[0.5, 2.5]).into_dyn();
//!
//! let out = GridTransformer::new().linint1(fi, &xo, None, &InterpOptions::default())?;
//! assert_eq!(out.shape(), &[3, 2]);
//! # Ok::<(), grid_transform::TransformError>(())
//! ```

pub mod array;
pub mod assemble;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod invoke;
pub mod missing;
pub mod plan;
pub mod transforms;
pub mod types;
pub mod validate;

// Re-export commonly used types at crate root
pub use array::{GridArray, LabeledArray};
pub use assemble::{assemble, Assembly, OutputDim};
pub use config::TransformConfig;
pub use dispatch::{BlockOutput, BlockWarning, Dispatched, Dispatcher, OutputRule, TransformDescriptor};
pub use error::{Result, TransformError};
pub use invoke::BlockInvocation;
pub use missing::{bridge_in, bridge_out, Element, KernelScalar, MissingValues};
pub use plan::ChunkPlan;
pub use transforms::GridTransformer;
pub use types::{
    Attributes, DataType, EofOptions, FillValue, InputKind, InterpOptions, TransformOptions,
    TripleToGridOptions,
};

pub use grid_kernel::{DistanceMethod, EofMatrix, Kernel, ReferenceKernel, ScatterStatus};
