//! EOF decomposition of a field into spatial patterns and time series.
//!
//! The observation axis is moved last and every other axis is flattened into
//! stations, so the whole array is one block. Planning and assembly are the
//! shared ones; the single block skips the parallel dispatcher. Any caller
//! partitioning is therefore irrelevant and ignored.
//!
//! Patterns and time series are always `f64`, whatever the input element.

use grid_kernel::{EofDecomposition, EofParams, Kernel};
use ndarray::{Array, Dimension, Ix2};
use serde_json::json;

use super::GridTransformer;
use crate::array::{GridArray, LabeledArray};
use crate::assemble::{assemble, Assembly, OutputDim};
use crate::dispatch::{OutputRule, TransformDescriptor};
use crate::error::{Result, TransformError};
use crate::invoke::BlockInvocation;
use crate::missing::{KernelScalar, MissingValues};
use crate::plan::ChunkPlan;
use crate::types::{EofOptions, InputKind};
use crate::validate;

/// A finished decomposition and everything needed to label its outputs.
struct Decomposed<T> {
    /// The input with its observation axis moved last.
    source: LabeledArray<T>,
    kind: InputKind,
    plan: ChunkPlan,
    result: EofDecomposition,
    neval: usize,
    matrix: &'static str,
}

impl<T: KernelScalar> Decomposed<T> {
    fn time_axis(&self) -> usize {
        self.source.ndim() - 1
    }

    /// Bridges one kernel output back to host order as NaN-missing `f64`
    /// and labels it.
    fn label<D: Dimension>(
        &self,
        op: &'static str,
        kernel_output: Array<f64, D>,
        extents: Vec<usize>,
        trailing: Vec<OutputDim>,
        keep_attrs: bool,
    ) -> Result<GridArray<f64>> {
        let descriptor = TransformDescriptor::new(op, self.source.ndim(), OutputRule::Replace(extents));
        let declared = descriptor.output_block_shape(&self.plan);
        let missing = MissingValues::<f64>::resolve(None)?;
        let block = BlockInvocation::new(&missing).finish(kernel_output, &declared, None)?;
        let output = assemble(
            vec![block],
            &self.plan,
            &descriptor,
            Assembly {
                source: &self.source,
                kind: self.kind,
                trailing,
                keep_attrs,
            },
        )?;

        Ok(match output {
            GridArray::Labeled(array) => GridArray::Labeled(
                array
                    .with_attr("eigenvalues", json!(self.result.eigenvalues.to_vec()))
                    .with_attr("pcvar", json!(self.result.variance_fraction.to_vec()))
                    .with_attr("trace", json!(self.result.trace))
                    .with_attr("matrix", self.matrix),
            ),
            unlabeled => unlabeled,
        })
    }
}

impl<K: Kernel> GridTransformer<K> {
    fn decompose<T: KernelScalar>(
        &self,
        op: &'static str,
        data: GridArray<T>,
        n_components: usize,
        options: &EofOptions<T>,
    ) -> Result<Decomposed<T>> {
        let (data, kind) = data.promote();
        validate::min_rank(op, "data", data.ndim(), 2)?;
        let ndim = data.ndim();
        let signed = ndim as isize;
        if !(-signed..signed).contains(&options.time_dim) {
            return Err(TransformError::invalid_option(format!(
                "{op}: time_dim {} is out of range for rank {ndim}",
                options.time_dim
            )));
        }
        if !(0.0..=100.0).contains(&options.pcrit) {
            return Err(TransformError::invalid_option(format!(
                "{op}: pcrit must be within 0..=100, got {}",
                options.pcrit
            )));
        }

        let time_axis = options.time_dim.rem_euclid(signed) as usize;
        let mut order: Vec<usize> = (0..ndim).filter(|&axis| axis != time_axis).collect();
        order.push(time_axis);
        let source = data.permuted(&order)?;

        let nobs = source.shape()[ndim - 1];
        let stations: usize = source.shape()[..ndim - 1].iter().product();
        if n_components == 0 || n_components > stations {
            return Err(TransformError::invalid_option(format!(
                "{op}: n_components must be within 1..={stations}, got {n_components}"
            )));
        }
        let missing = MissingValues::resolve(options.missing_value)?;

        let plan = ChunkPlan::for_array(&source, ndim)?;
        let block = plan.extract(source.data(), 0);
        let invocation = BlockInvocation::new(&missing);
        let matrix = invocation
            .prepare(block, &[stations, nobs])?
            .into_dimensionality::<Ix2>()?;

        tracing::debug!(op, stations, observations = nobs, n_components, "decomposing");
        let params = EofParams {
            matrix: options.matrix,
            pcrit: options.pcrit,
        };
        let result = self
            .kernel
            .eof(matrix.view(), n_components, invocation.xmsg(), &params)?;

        Ok(Decomposed {
            source,
            kind,
            plan,
            result,
            neval: n_components,
            matrix: options.matrix.as_str(),
        })
    }

    /// Leading `n_components` EOF patterns of `data`, shaped
    /// `(evn, space...)` where space is every dimension except `time_dim`.
    ///
    /// A labeled result carries the attributes `eigenvalues`, `pcvar` (percent
    /// variance explained), `trace` and `matrix`.
    pub fn eofunc<T: KernelScalar>(
        &self,
        data: impl Into<GridArray<T>>,
        n_components: usize,
        options: &EofOptions<T>,
    ) -> Result<GridArray<f64>> {
        const OP: &str = "eofunc";
        let decomposed = self.decompose(OP, data.into(), n_components, options)?;
        let time_axis = decomposed.time_axis();

        let mut extents = vec![decomposed.neval];
        extents.extend_from_slice(&decomposed.source.shape()[..time_axis]);
        let mut trailing = vec![OutputDim::new("evn")];
        trailing.extend((0..time_axis).map(|axis| OutputDim::kept_from(&decomposed.source, axis)));

        decomposed.label(
            OP,
            decomposed.result.eigenvectors.clone(),
            extents,
            trailing,
            self.keep_attrs(options.keep_attrs),
        )
    }

    /// Principal component time series of the leading `n_components` EOFs,
    /// shaped `(evn, time)`.
    pub fn eofunc_ts<T: KernelScalar>(
        &self,
        data: impl Into<GridArray<T>>,
        n_components: usize,
        options: &EofOptions<T>,
    ) -> Result<GridArray<f64>> {
        const OP: &str = "eofunc_ts";
        let decomposed = self.decompose(OP, data.into(), n_components, options)?;
        let time_axis = decomposed.time_axis();

        let extents = vec![decomposed.neval, decomposed.source.shape()[time_axis]];
        let trailing = vec![
            OutputDim::new("evn"),
            OutputDim::kept_from(&decomposed.source, time_axis),
        ];

        decomposed.label(
            OP,
            decomposed.result.principal_components.clone(),
            extents,
            trailing,
            self.keep_attrs(options.keep_attrs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array3};

    /// (time, lat, lon) field driven by a single oscillating pattern.
    fn field() -> LabeledArray<f64> {
        let signal = [1.0, -1.0, 2.0, -2.0, 0.5, -0.5];
        let data = Array3::from_shape_fn((6, 2, 3), |(t, j, i)| signal[t] * (1 + j * 3 + i) as f64);
        LabeledArray::new(data, ["time", "lat", "lon"])
            .unwrap()
            .with_coord("time", arr1(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap()
            .with_coord("lat", arr1(&[-10.0, 10.0]))
            .unwrap()
            .with_attr("long_name", "synthetic")
    }

    #[test]
    fn test_eofunc_layout_and_attrs() {
        let out = GridTransformer::new()
            .eofunc(field(), 2, &EofOptions::new().time_dim(0))
            .unwrap()
            .into_labeled()
            .unwrap();
        assert_eq!(out.dims(), ["evn", "lat", "lon"]);
        assert_eq!(out.shape(), &[2, 2, 3]);
        assert_eq!(out.coord("lat").unwrap()[1], 10.0);
        assert_eq!(out.attrs()["matrix"], json!("covariance"));
        assert_eq!(out.attrs()["long_name"], json!("synthetic"));

        let pcvar = out.attrs()["pcvar"].as_array().unwrap();
        assert!((pcvar[0].as_f64().unwrap() - 100.0).abs() < 1e-9);

        // loadings follow the spatial amplitude 1..=6
        let first = out.data().index_axis(ndarray::Axis(0), 0);
        assert!((first[[1, 2]] / first[[0, 0]] - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_eofunc_ts_layout() {
        let out = GridTransformer::new()
            .eofunc_ts(field(), 1, &EofOptions::new().time_dim(0))
            .unwrap()
            .into_labeled()
            .unwrap();
        assert_eq!(out.dims(), ["evn", "time"]);
        assert_eq!(out.shape(), &[1, 6]);
        assert_eq!(out.coord("time").unwrap().len(), 6);
    }

    #[test]
    fn test_component_count_bounds() {
        let transformer = GridTransformer::new();
        let options = EofOptions::new().time_dim(0);
        for n in [0, 7] {
            let err = transformer.eofunc(field(), n, &options).unwrap_err();
            assert!(matches!(err, TransformError::InvalidOption(_)));
        }
        let err = transformer
            .eofunc(field(), 1, &EofOptions::new().time_dim(3))
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidOption(_)));
    }

    #[test]
    fn test_integer_field_yields_float_patterns() {
        let signal = [1, -1, 2, -2, 1, -1];
        let data = Array3::from_shape_fn((6, 2, 3), |(t, j, i)| signal[t] * (1 + j * 3 + i) as i32);
        let transformer = GridTransformer::new();
        let options = EofOptions::<i32>::new().time_dim(0);

        let patterns = transformer.eofunc(data.clone(), 1, &options).unwrap().into_data();
        let first = patterns.index_axis(ndarray::Axis(0), 0);
        assert!(first.iter().all(|v| v.abs() > 1e-3));
        assert!((first[[1, 2]] / first[[0, 0]] - 6.0).abs() < 1e-9);

        let series = transformer.eofunc_ts(data, 1, &options).unwrap().into_data();
        assert_eq!(series.shape(), &[1, 6]);
        assert!(series.iter().all(|v| v.abs() > 1e-3));
    }

    #[test]
    fn test_caller_partitioning_ignored() {
        let chunked = field().with_chunks(vec![vec![3, 3], vec![2], vec![3]]).unwrap();
        let transformer = GridTransformer::new();
        let options = EofOptions::new().time_dim(0);

        let out = transformer.eofunc(chunked, 1, &options).unwrap();
        let whole = transformer.eofunc(field(), 1, &options).unwrap();
        assert_eq!(out.shape(), &[1, 2, 3]);
        assert_eq!(out.data(), whole.data());
    }

    #[test]
    fn test_unlabeled_input_stays_unlabeled() {
        let data = field().into_data();
        let out = GridTransformer::new()
            .eofunc(data, 1, &EofOptions::new().time_dim(-3))
            .unwrap();
        assert!(!out.is_labeled());
        assert_eq!(out.shape(), &[1, 2, 3]);
    }
}
