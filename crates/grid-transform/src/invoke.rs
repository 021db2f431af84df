//! Per-block kernel invocation.
//!
//! ```text
//! host block ─► reshape ─► reverse axes ─► bridge in ─► to f64
//!                                                          │
//!                                                       kernel
//!                                                          │
//! host block ◄─ bridge out ◄─ reshape/truncate ◄─ reverse axes ◄─ from f64
//! ```
//!
//! The same [`MissingValues`] descriptor serves both bridging steps of every
//! block of a call, so each value is translated exactly once per direction.

use ndarray::{Array, ArrayD, Axis, Dimension, IxDyn, Slice};

use crate::error::Result;
use crate::missing::{KernelScalar, MissingValues};

/// Reshapes `array` in logical row-major order, whatever its memory layout.
pub(crate) fn reshape<T: Clone>(array: ArrayD<T>, shape: &[usize]) -> Result<ArrayD<T>> {
    let flat: Vec<T> = array.iter().cloned().collect();
    Ok(ArrayD::from_shape_vec(IxDyn(shape), flat)?)
}

pub struct BlockInvocation<'m, T> {
    missing: &'m MissingValues<T>,
}

impl<'m, T: KernelScalar> BlockInvocation<'m, T> {
    pub fn new(missing: &'m MissingValues<T>) -> Self {
        Self { missing }
    }

    /// Kernel-side missing sentinel.
    pub fn xmsg(&self) -> f64 {
        self.missing.kernel().to_kernel()
    }

    /// Reshapes a host block to `host_shape` (dropping its unit batch axes),
    /// reverses it into kernel axis order and bridges it into kernel
    /// convention.
    pub fn prepare(&self, block: ArrayD<T>, host_shape: &[usize]) -> Result<ArrayD<f64>> {
        let mut block = reshape(block, host_shape)?.reversed_axes();
        self.missing.bridge_in(&mut block);
        Ok(block.mapv(KernelScalar::to_kernel))
    }

    /// Reverses a kernel result back into host order, truncates the last axis
    /// to `valid` entries when given, reshapes it to the declared block shape
    /// and bridges it back to host convention.
    pub fn finish<D: Dimension>(
        &self,
        output: Array<f64, D>,
        declared: &[usize],
        valid: Option<usize>,
    ) -> Result<ArrayD<T>> {
        let mut output = output.into_dyn().reversed_axes();
        let mut shape = declared.to_vec();
        if let (Some(valid), Some(last)) = (valid, shape.last_mut()) {
            let axis = Axis(output.ndim() - 1);
            let keep = valid.min(output.len_of(axis));
            output = output.slice_axis(axis, Slice::from(..keep)).to_owned();
            *last = keep;
        }
        let mut block = reshape(output.mapv(T::from_kernel), &shape)?;
        self.missing.bridge_out(&mut block);
        Ok(block)
    }
}
