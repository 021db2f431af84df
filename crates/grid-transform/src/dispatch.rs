//! Block dispatch: one wrapper invocation per planned block.

use grid_kernel::ScatterStatus;
use ndarray::ArrayD;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::array::LabeledArray;
use crate::config::TransformConfig;
use crate::error::{Result, TransformError};
use crate::missing::Element;
use crate::plan::ChunkPlan;

/// How a transform reshapes its active dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputRule {
    /// The active extents are replaced by these fixed extents.
    Replace(Vec<usize>),
    /// As `Replace`, but the last extent is an upper bound: each block is
    /// truncated to the valid count the kernel reports.
    Truncate(Vec<usize>),
}

impl OutputRule {
    pub fn extents(&self) -> &[usize] {
        match self {
            Self::Replace(extents) | Self::Truncate(extents) => extents,
        }
    }
}

/// Static per-operation metadata shared by planner, dispatcher and assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformDescriptor {
    pub name: &'static str,
    pub active_dims: usize,
    pub output: OutputRule,
}

impl TransformDescriptor {
    pub fn new(name: &'static str, active_dims: usize, output: OutputRule) -> Self {
        Self {
            name,
            active_dims,
            output,
        }
    }

    /// Declared shape of every output block, known before any kernel call.
    pub fn output_block_shape(&self, plan: &ChunkPlan) -> Vec<usize> {
        let mut shape = vec![1; plan.batch_ndim()];
        shape.extend_from_slice(self.output.extents());
        shape
    }

    /// Whether a produced block honours the declared shape.
    pub fn accepts(&self, declared: &[usize], actual: &[usize]) -> bool {
        match &self.output {
            OutputRule::Replace(_) => declared == actual,
            OutputRule::Truncate(_) => {
                declared.len() == actual.len()
                    && declared.split_last().zip(actual.split_last()).is_some_and(
                        |((d_last, d_lead), (a_last, a_lead))| d_lead == a_lead && a_last <= d_last,
                    )
            }
        }
    }
}

/// What a wrapper returns for one block.
#[derive(Debug, Clone)]
pub struct BlockOutput<T> {
    pub data: ArrayD<T>,
    pub status: Option<ScatterStatus>,
}

impl<T> From<ArrayD<T>> for BlockOutput<T> {
    fn from(data: ArrayD<T>) -> Self {
        Self { data, status: None }
    }
}

/// A non-fatal kernel status attributed to one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWarning {
    pub block: usize,
    pub status: ScatterStatus,
}

/// Output blocks in plan order plus any warnings raised along the way.
#[derive(Debug, Clone)]
pub struct Dispatched<T> {
    pub blocks: Vec<ArrayD<T>>,
    pub warnings: Vec<BlockWarning>,
}

/// Runs a per-block wrapper over every block of a plan.
pub struct Dispatcher<'a> {
    config: &'a TransformConfig,
    pool: Option<&'a ThreadPool>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a TransformConfig, pool: Option<&'a ThreadPool>) -> Self {
        Self { config, pool }
    }

    /// Calls `wrapper(block_index, block, declared_shape)` once per block.
    ///
    /// Each invocation gets a private copy of its block. Results come back in
    /// plan order regardless of completion order. The first failing block
    /// aborts the call. Output blocks may use a different element type `U`
    /// than the input, e.g. `f64` coordinates from an integer field.
    pub fn dispatch<T, U, F>(
        &self,
        array: &LabeledArray<T>,
        plan: &ChunkPlan,
        descriptor: &TransformDescriptor,
        wrapper: F,
    ) -> Result<Dispatched<U>>
    where
        T: Element,
        U: Send,
        F: Fn(usize, ArrayD<T>, &[usize]) -> Result<BlockOutput<U>> + Sync,
    {
        let declared = descriptor.output_block_shape(plan);
        let num_blocks = plan.num_blocks();
        let parallel = self.config.runs_parallel(num_blocks);

        tracing::debug!(
            op = descriptor.name,
            blocks = num_blocks,
            input_shape = ?array.shape(),
            block_shape = ?declared,
            parallel,
            "dispatching transform"
        );

        let run = |index: usize| -> Result<BlockOutput<U>> {
            let block = plan.extract(array.data(), index);
            tracing::trace!(op = descriptor.name, block = index, "invoking kernel");
            let output = wrapper(index, block, &declared)?;
            if !descriptor.accepts(&declared, output.data.shape()) {
                return Err(TransformError::dimension(format!(
                    "{}: block {index} has shape {:?}, declared {:?}",
                    descriptor.name,
                    output.data.shape(),
                    declared
                )));
            }
            Ok(output)
        };

        let outputs: Vec<BlockOutput<U>> = if !parallel {
            (0..num_blocks).map(run).collect::<Result<_>>()?
        } else if let Some(pool) = self.pool {
            pool.install(|| (0..num_blocks).into_par_iter().map(run).collect::<Result<_>>())?
        } else {
            (0..num_blocks).into_par_iter().map(run).collect::<Result<_>>()?
        };

        let mut warnings = Vec::new();
        let mut blocks = Vec::with_capacity(outputs.len());
        for (block, output) in outputs.into_iter().enumerate() {
            if let Some(status) = output.status.filter(|s| !s.is_ok()) {
                tracing::warn!(
                    op = descriptor.name,
                    block,
                    code = status.code(),
                    "{}",
                    status.message()
                );
                warnings.push(BlockWarning { block, status });
            }
            blocks.push(output.data);
        }

        Ok(Dispatched { blocks, warnings })
    }
}
