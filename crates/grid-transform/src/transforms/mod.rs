//! The public transform surface.
//!
//! Each transform module only validates its inputs, builds a
//! [`TransformDescriptor`] and calls its kernel entry point from a block
//! wrapper. Planning, dispatch and assembly are shared.

mod eof;
mod linint;
mod pressure;
mod regrid;
mod triple;

use grid_kernel::{Kernel, ReferenceKernel};
use ndarray::ArrayD;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::array::{GridArray, LabeledArray};
use crate::assemble::{assemble, Assembly, OutputDim};
use crate::config::TransformConfig;
use crate::dispatch::{BlockOutput, BlockWarning, Dispatcher, TransformDescriptor};
use crate::error::{Result, TransformError};
use crate::missing::Element;
use crate::plan::ChunkPlan;
use crate::types::InputKind;

/// Entry point for every grid transform.
///
/// Generic over the kernel so tests and alternative numerics can be swapped
/// in. The default is [`ReferenceKernel`].
pub struct GridTransformer<K = ReferenceKernel> {
    kernel: K,
    config: TransformConfig,
    pool: Option<ThreadPool>,
}

impl Default for GridTransformer<ReferenceKernel> {
    fn default() -> Self {
        Self::with_kernel(ReferenceKernel)
    }
}

impl GridTransformer<ReferenceKernel> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Kernel> GridTransformer<K> {
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: TransformConfig::default(),
            pool: None,
        }
    }

    /// Builds a transformer with an explicit configuration. A non-zero
    /// `num_threads` gets a dedicated thread pool.
    pub fn with_config(kernel: K, config: TransformConfig) -> Result<Self> {
        config.validate().map_err(TransformError::Config)?;
        let pool = if config.num_threads > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.num_threads)
                .thread_name(|i| format!("grid-transform-{i}"))
                .build()
                .map_err(|e| TransformError::config(e.to_string()))?;
            Some(pool)
        } else {
            None
        };
        Ok(Self {
            kernel,
            config,
            pool,
        })
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.config, self.pool.as_ref())
    }

    fn keep_attrs(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(self.config.keep_attrs)
    }

    /// Plans, dispatches and assembles one validated transform call.
    fn run<T, U, F>(
        &self,
        source: &LabeledArray<T>,
        kind: InputKind,
        descriptor: &TransformDescriptor,
        trailing: Vec<OutputDim>,
        keep_attrs: bool,
        wrapper: F,
    ) -> Result<(GridArray<U>, Vec<BlockWarning>)>
    where
        T: Element,
        U: Clone + Send,
        F: Fn(usize, ArrayD<T>, &[usize]) -> Result<BlockOutput<U>> + Sync,
    {
        let plan = ChunkPlan::for_array(source, descriptor.active_dims)?;
        let dispatched = self.dispatcher().dispatch(source, &plan, descriptor, wrapper)?;
        let output = assemble(
            dispatched.blocks,
            &plan,
            descriptor,
            Assembly {
                source,
                kind,
                trailing,
                keep_attrs,
            },
        )?;
        Ok((output, dispatched.warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_config_validates() {
        let config = TransformConfig {
            parallel_threshold: 0,
            ..TransformConfig::default()
        };
        assert!(matches!(
            GridTransformer::with_config(ReferenceKernel, config),
            Err(TransformError::Config(_))
        ));
    }

    #[test]
    fn test_dedicated_pool() {
        let config = TransformConfig {
            num_threads: 2,
            ..TransformConfig::default()
        };
        let transformer = GridTransformer::with_config(ReferenceKernel, config).unwrap();
        assert_eq!(transformer.pool.as_ref().map(|p| p.current_num_threads()), Some(2));
        assert!(transformer.keep_attrs(None));
        assert!(!transformer.keep_attrs(Some(false)));
    }
}
