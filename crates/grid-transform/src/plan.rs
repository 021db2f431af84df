//! Partitioning of an array into kernel-sized blocks.
//!
//! The trailing `active` dimensions are what the kernel operates over and
//! always form one full-extent block. Every leading ("batch") dimension is
//! split into extent-1 blocks, so each block is exactly one kernel call.

use ndarray::{ArrayD, Slice};

use crate::array::LabeledArray;
use crate::error::{Result, TransformError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    shape: Vec<usize>,
    active: usize,
}

impl ChunkPlan {
    pub fn new(shape: &[usize], active: usize) -> Result<Self> {
        if active > shape.len() {
            return Err(TransformError::dimension(format!(
                "{active} active dimensions requested for an array of rank {}",
                shape.len()
            )));
        }
        Ok(Self {
            shape: shape.to_vec(),
            active,
        })
    }

    pub fn for_array<T>(array: &LabeledArray<T>, active: usize) -> Result<Self> {
        Self::new(array.shape(), active)
    }

    /// Per-dimension block extents, in the same form as
    /// [`LabeledArray::with_chunks`].
    pub fn chunks(&self) -> Vec<Vec<usize>> {
        let batch = self.batch_ndim();
        self.shape
            .iter()
            .enumerate()
            .map(|(axis, &extent)| {
                if axis < batch {
                    vec![1; extent]
                } else {
                    vec![extent]
                }
            })
            .collect()
    }

    pub fn active_ndim(&self) -> usize {
        self.active
    }

    pub fn batch_ndim(&self) -> usize {
        self.shape.len() - self.active
    }

    pub fn batch_shape(&self) -> &[usize] {
        &self.shape[..self.batch_ndim()]
    }

    pub fn active_shape(&self) -> &[usize] {
        &self.shape[self.batch_ndim()..]
    }

    pub fn num_blocks(&self) -> usize {
        self.batch_shape().iter().product()
    }

    /// Shape of every input block: ones on batch axes, full active extents.
    pub fn block_shape(&self) -> Vec<usize> {
        let mut shape = vec![1; self.batch_ndim()];
        shape.extend_from_slice(self.active_shape());
        shape
    }

    /// Batch index of block `block`, in row-major plan order.
    pub fn block_origin(&self, block: usize) -> Vec<usize> {
        let mut origin = vec![0; self.batch_ndim()];
        let mut rest = block;
        for (slot, &extent) in origin.iter_mut().zip(self.batch_shape()).rev() {
            *slot = rest % extent;
            rest /= extent;
        }
        origin
    }

    /// Private copy of block `block` of `data`.
    pub fn extract<T: Clone>(&self, data: &ArrayD<T>, block: usize) -> ArrayD<T> {
        let origin = self.block_origin(block);
        data.slice_each_axis(|axis| match origin.get(axis.axis.index()) {
            Some(&start) => Slice::from(start..start + 1),
            None => Slice::from(..),
        })
        .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    #[test]
    fn test_partition_invariant() {
        let plan = ChunkPlan::new(&[3, 4, 5, 6], 2).unwrap();
        assert_eq!(plan.chunks(), vec![vec![1; 3], vec![1; 4], vec![5], vec![6]]);
        assert_eq!(plan.num_blocks(), 12);
        assert_eq!(plan.block_shape(), vec![1, 1, 5, 6]);
        for (axis, blocks) in plan.chunks().iter().enumerate() {
            assert_eq!(blocks.iter().sum::<usize>(), [3, 4, 5, 6][axis]);
        }
    }

    #[test]
    fn test_block_origin_row_major() {
        let plan = ChunkPlan::new(&[2, 3, 7], 1).unwrap();
        assert_eq!(plan.block_origin(0), vec![0, 0]);
        assert_eq!(plan.block_origin(1), vec![0, 1]);
        assert_eq!(plan.block_origin(3), vec![1, 0]);
        assert_eq!(plan.block_origin(5), vec![1, 2]);
    }

    #[test]
    fn test_extract_copies_one_block() {
        let data = Array::from_iter(0..24).into_shape_with_order(IxDyn(&[2, 3, 4])).unwrap();
        let plan = ChunkPlan::new(data.shape(), 1).unwrap();
        let block = plan.extract(&data, 4);
        assert_eq!(block.shape(), &[1, 1, 4]);
        assert_eq!(block.iter().copied().collect::<Vec<_>>(), vec![16, 17, 18, 19]);
    }

    #[test]
    fn test_no_batch_dims_is_single_block() {
        let plan = ChunkPlan::new(&[5, 6], 2).unwrap();
        assert_eq!(plan.num_blocks(), 1);
        assert!(plan.block_origin(0).is_empty());
        assert!(ChunkPlan::new(&[5], 2).is_err());
    }
}
