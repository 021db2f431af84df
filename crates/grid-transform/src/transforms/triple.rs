//! Conversions between grids and `(x, y, value)` triples.

use grid_kernel::{DistanceMethod, Kernel, TripleGridParams};
use ndarray::{ArrayD, Ix1, Ix2};

use super::GridTransformer;
use crate::array::GridArray;
use crate::assemble::OutputDim;
use crate::dispatch::{OutputRule, TransformDescriptor};
use crate::error::{Result, TransformError};
use crate::invoke::BlockInvocation;
use crate::missing::{KernelScalar, MissingValues};
use crate::types::{TransformOptions, TripleToGridOptions};
use crate::validate;

fn triple_grid_params<T>(op: &str, options: &TripleToGridOptions<T>) -> Result<TripleGridParams> {
    if !options.domain.is_finite() {
        return Err(TransformError::invalid_option(format!(
            "{op}: domain must be finite, got {}",
            options.domain
        )));
    }
    let mut params = TripleGridParams {
        method: options.method,
        domain: options.domain,
        ..TripleGridParams::default()
    };
    if let Some(distmx) = options.distmx {
        if options.method != DistanceMethod::GreatCircle {
            return Err(TransformError::invalid_option(format!(
                "{op}: distmx is only supported with great-circle placement"
            )));
        }
        if distmx.is_nan() || distmx <= 0.0 {
            return Err(TransformError::invalid_option(format!(
                "{op}: distmx must be positive, got {distmx}"
            )));
        }
        params.distmx = distmx;
    }
    Ok(params)
}

impl<K: Kernel> GridTransformer<K> {
    /// Serializes a 2-D grid into a `(3, n)` array whose rows are x, y and
    /// value, x varying fastest. Missing cells are omitted, so `n` is the
    /// number of valid cells.
    ///
    /// The result is always `f64`, so coordinates survive an integer `data`.
    /// A labeled result has the dimensions `triple` (the three rows) and
    /// `pts` (one column per valid cell); neither carries a coordinate.
    ///
    /// `x` and `y` may be omitted when `data` carries coordinates for its
    /// second and first dimension.
    pub fn grid_to_triple<T: KernelScalar>(
        &self,
        data: impl Into<GridArray<T>>,
        x: Option<&ArrayD<f64>>,
        y: Option<&ArrayD<f64>>,
        options: &TransformOptions<T>,
    ) -> Result<GridArray<f64>> {
        const OP: &str = "grid_to_triple";
        let (data, kind) = data.into().promote();
        validate::exact_rank(OP, "data", data.ndim(), 2)?;
        let x = validate::axis_coordinate(OP, "x", x, &data, 1)?;
        let y = validate::axis_coordinate(OP, "y", y, &data, 0)?;
        validate::active_dims_whole(OP, &data, 2)?;
        let missing = MissingValues::resolve(options.missing_value)?;
        let triple_missing = MissingValues::<f64>::resolve(None)?;

        let descriptor = TransformDescriptor::new(
            OP,
            2,
            OutputRule::Truncate(vec![3, x.len() * y.len()]),
        );
        let active_shape = data.shape().to_vec();
        let invocation = BlockInvocation::new(&missing);
        let triple_out = BlockInvocation::new(&triple_missing);

        let (output, _) = self.run(
            &data,
            kind,
            &descriptor,
            vec![OutputDim::new("triple"), OutputDim::new("pts")],
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let z = invocation.prepare(block, &active_shape)?.into_dimensionality::<Ix2>()?;
                let (triples, count) =
                    self.kernel.grid2triple(x.view(), y.view(), z.view(), invocation.xmsg())?;
                tracing::debug!(op = OP, valid = count, cells = z.len(), "serialized grid");
                Ok(triple_out.finish(triples, declared, Some(count))?.into())
            },
        )?;
        Ok(output)
    }

    /// Places scattered values (rightmost dimension of `data`, located by
    /// `x_in`/`y_in`) onto the grid `y_out` × `x_out`. The output replaces
    /// the point dimension with `y` and `x`.
    pub fn triple_to_grid<T: KernelScalar>(
        &self,
        data: impl Into<GridArray<T>>,
        x_in: &ArrayD<f64>,
        y_in: &ArrayD<f64>,
        x_out: &ArrayD<f64>,
        y_out: &ArrayD<f64>,
        options: &TripleToGridOptions<T>,
    ) -> Result<GridArray<T>> {
        const OP: &str = "triple_to_grid";
        let (data, kind) = data.into().promote();
        validate::min_rank(OP, "data", data.ndim(), 1)?;
        let npts = data.shape()[data.ndim() - 1];
        let x_in = validate::rank1(OP, "x_in", x_in)?;
        let y_in = validate::rank1(OP, "y_in", y_in)?;
        validate::matching_extent(OP, "x_in", x_in.len(), npts, "the rightmost dimension of `data`")?;
        validate::paired_lengths(OP, ("x_in", x_in.len()), ("y_in", y_in.len()))?;
        let x_out = validate::rank1(OP, "x_out", x_out)?.to_owned();
        let y_out = validate::rank1(OP, "y_out", y_out)?.to_owned();
        let params = triple_grid_params(OP, options)?;
        validate::active_dims_whole(OP, &data, 1)?;
        let missing = MissingValues::resolve(options.missing_value)?;

        let descriptor = TransformDescriptor::new(
            OP,
            1,
            OutputRule::Replace(vec![y_out.len(), x_out.len()]),
        );
        let trailing = vec![
            OutputDim::new("y").with_coord(y_out.clone()),
            OutputDim::new("x").with_coord(x_out.clone()),
        ];
        let invocation = BlockInvocation::new(&missing);

        let (output, _) = self.run(
            &data,
            kind,
            &descriptor,
            trailing,
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let z = invocation.prepare(block, &[npts])?.into_dimensionality::<Ix1>()?;
                let grid = self.kernel.triple2grid(
                    x_in,
                    y_in,
                    z.view(),
                    x_out.view(),
                    y_out.view(),
                    invocation.xmsg(),
                    &params,
                )?;
                Ok(invocation.finish(grid, declared, None)?.into())
            },
        )?;
        Ok(output)
    }
}
