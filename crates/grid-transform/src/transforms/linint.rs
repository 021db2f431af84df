//! Linear interpolation: 1-D, 2-D grid and 2-D scattered points.

use grid_kernel::Kernel;
use ndarray::{Array1, ArrayD, Ix1, Ix2};

use super::GridTransformer;
use crate::array::{GridArray, LabeledArray};
use crate::assemble::OutputDim;
use crate::dispatch::{BlockOutput, BlockWarning, OutputRule, TransformDescriptor};
use crate::error::Result;
use crate::invoke::BlockInvocation;
use crate::missing::{KernelScalar, MissingValues};
use crate::types::InterpOptions;
use crate::validate;

/// Resolves `(xi, yi)` for the two trailing axes of `fi`.
fn grid_axes<T>(
    op: &str,
    fi: &LabeledArray<T>,
    xi: Option<&ArrayD<f64>>,
    yi: Option<&ArrayD<f64>>,
) -> Result<(Array1<f64>, Array1<f64>)> {
    validate::min_rank(op, "fi", fi.ndim(), 2)?;
    let ndim = fi.ndim();
    let xi = validate::axis_coordinate(op, "xi", xi, fi, ndim - 1)?;
    let yi = validate::axis_coordinate(op, "yi", yi, fi, ndim - 2)?;
    Ok((xi, yi))
}

impl<K: Kernel> GridTransformer<K> {
    /// Interpolates along the rightmost dimension of `fi` from `xi` onto `xo`.
    ///
    /// `xi` may be omitted when `fi` is labeled and carries a coordinate for
    /// its rightmost dimension. The output replaces that dimension with `xo`.
    pub fn linint1<T: KernelScalar>(
        &self,
        fi: impl Into<GridArray<T>>,
        xo: &ArrayD<f64>,
        xi: Option<&ArrayD<f64>>,
        options: &InterpOptions<T>,
    ) -> Result<GridArray<T>> {
        const OP: &str = "linint1";
        let (fi, kind) = fi.into().promote();
        validate::min_rank(OP, "fi", fi.ndim(), 1)?;
        let x_axis = fi.ndim() - 1;
        let xi = validate::axis_coordinate(OP, "xi", xi, &fi, x_axis)?;
        let xo = validate::rank1(OP, "xo", xo)?.to_owned();
        validate::active_dims_whole(OP, &fi, 1)?;
        let missing = MissingValues::resolve(options.missing_value)?;

        let descriptor = TransformDescriptor::new(OP, 1, OutputRule::Replace(vec![xo.len()]));
        let trailing = vec![OutputDim::renamed_from(&fi, x_axis).with_coord(xo.clone())];
        let active_shape = fi.shape()[x_axis..].to_vec();
        let invocation = BlockInvocation::new(&missing);

        let (output, _) = self.run(
            &fi,
            kind,
            &descriptor,
            trailing,
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let fi = invocation.prepare(block, &active_shape)?.into_dimensionality::<Ix1>()?;
                let fo = self.kernel.linint1(
                    xi.view(),
                    fi.view(),
                    xo.view(),
                    options.cyclic,
                    invocation.xmsg(),
                )?;
                Ok(invocation.finish(fo, declared, None)?.into())
            },
        )?;
        Ok(output)
    }

    /// Interpolates the two rightmost dimensions of `fi` onto the grid
    /// `yo` × `xo`.
    ///
    /// Both axes need at least two points. `cyclic` applies to x.
    pub fn linint2<T: KernelScalar>(
        &self,
        fi: impl Into<GridArray<T>>,
        xo: &ArrayD<f64>,
        yo: &ArrayD<f64>,
        xi: Option<&ArrayD<f64>>,
        yi: Option<&ArrayD<f64>>,
        options: &InterpOptions<T>,
    ) -> Result<GridArray<T>> {
        const OP: &str = "linint2";
        let (fi, kind) = fi.into().promote();
        let (xi, yi) = grid_axes(OP, &fi, xi, yi)?;
        validate::min_extent(OP, "xi", xi.len(), 2)?;
        validate::min_extent(OP, "yi", yi.len(), 2)?;
        let xo = validate::rank1(OP, "xo", xo)?.to_owned();
        let yo = validate::rank1(OP, "yo", yo)?.to_owned();
        validate::active_dims_whole(OP, &fi, 2)?;
        let missing = MissingValues::resolve(options.missing_value)?;

        let ndim = fi.ndim();
        let descriptor = TransformDescriptor::new(
            OP,
            2,
            OutputRule::Replace(vec![yo.len(), xo.len()]),
        );
        let trailing = vec![
            OutputDim::renamed_from(&fi, ndim - 2).with_coord(yo.clone()),
            OutputDim::renamed_from(&fi, ndim - 1).with_coord(xo.clone()),
        ];
        let active_shape = fi.shape()[ndim - 2..].to_vec();
        let invocation = BlockInvocation::new(&missing);

        let (output, _) = self.run(
            &fi,
            kind,
            &descriptor,
            trailing,
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let fi = invocation.prepare(block, &active_shape)?.into_dimensionality::<Ix2>()?;
                let fo = self.kernel.linint2(
                    xi.view(),
                    yi.view(),
                    fi.view(),
                    xo.view(),
                    yo.view(),
                    options.cyclic,
                    invocation.xmsg(),
                )?;
                Ok(invocation.finish(fo, declared, None)?.into())
            },
        )?;
        Ok(output)
    }

    /// Interpolates the two rightmost dimensions of `fi` to the scattered
    /// points `(xo[k], yo[k])`. The output's last dimension is `pts`.
    ///
    /// Kernel status codes are logged as warnings; use
    /// [`GridTransformer::linint2pts_with_warnings`] to inspect them.
    pub fn linint2pts<T: KernelScalar>(
        &self,
        fi: impl Into<GridArray<T>>,
        xo: &ArrayD<f64>,
        yo: &ArrayD<f64>,
        xi: Option<&ArrayD<f64>>,
        yi: Option<&ArrayD<f64>>,
        options: &InterpOptions<T>,
    ) -> Result<GridArray<T>> {
        self.linint2pts_with_warnings(fi, xo, yo, xi, yi, options)
            .map(|(output, _)| output)
    }

    /// As [`GridTransformer::linint2pts`], also returning one warning per
    /// block whose kernel status was not ok.
    pub fn linint2pts_with_warnings<T: KernelScalar>(
        &self,
        fi: impl Into<GridArray<T>>,
        xo: &ArrayD<f64>,
        yo: &ArrayD<f64>,
        xi: Option<&ArrayD<f64>>,
        yi: Option<&ArrayD<f64>>,
        options: &InterpOptions<T>,
    ) -> Result<(GridArray<T>, Vec<BlockWarning>)> {
        const OP: &str = "linint2pts";
        let (fi, kind) = fi.into().promote();
        let (xi, yi) = grid_axes(OP, &fi, xi, yi)?;
        let xo = validate::rank1(OP, "xo", xo)?.to_owned();
        let yo = validate::rank1(OP, "yo", yo)?.to_owned();
        validate::paired_lengths(OP, ("xo", xo.len()), ("yo", yo.len()))?;
        validate::active_dims_whole(OP, &fi, 2)?;
        let missing = MissingValues::resolve(options.missing_value)?;

        let ndim = fi.ndim();
        let descriptor = TransformDescriptor::new(OP, 2, OutputRule::Replace(vec![xo.len()]));
        let active_shape = fi.shape()[ndim - 2..].to_vec();
        let invocation = BlockInvocation::new(&missing);

        self.run(
            &fi,
            kind,
            &descriptor,
            vec![OutputDim::new("pts")],
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let fi = invocation.prepare(block, &active_shape)?.into_dimensionality::<Ix2>()?;
                let (fo, status) = self.kernel.linint2pts(
                    xi.view(),
                    yi.view(),
                    fi.view(),
                    xo.view(),
                    yo.view(),
                    options.cyclic,
                    invocation.xmsg(),
                )?;
                Ok(BlockOutput {
                    data: invocation.finish(fo, declared, None)?,
                    status: Some(status),
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use grid_kernel::ScatterStatus;
    use ndarray::{arr1, Array2, Array3};

    fn coord(values: &[f64]) -> ArrayD<f64> {
        arr1(values).into_dyn()
    }

    #[test]
    fn test_linint1_identity() {
        let transformer = GridTransformer::new();
        let fi = arr1(&[1.0, 2.0, 3.0, 4.0]);
        let xi = coord(&[0.0, 1.0, 2.0, 3.0]);

        let out = transformer
            .linint1(fi.clone(), &xi, Some(&xi), &InterpOptions::default())
            .unwrap();
        assert!(!out.is_labeled());
        assert_eq!(out.into_data(), fi.into_dyn());
    }

    #[test]
    fn test_linint1_uses_labeled_coordinate() {
        let transformer = GridTransformer::new();
        let fi = LabeledArray::new(Array2::from_shape_fn((2, 3), |(t, x)| (t * 10 + x) as f64), ["time", "x"])
            .unwrap()
            .with_coord("x", arr1(&[0.0, 1.0, 2.0]))
            .unwrap();

        let out = transformer
            .linint1(fi, &coord(&[0.5, 1.5]), None, &InterpOptions::default())
            .unwrap();
        let out = out.into_labeled().unwrap();
        assert_eq!(out.dims(), ["time", "x"]);
        assert_eq!(out.coord("x").unwrap().to_vec(), vec![0.5, 1.5]);
        assert_eq!(out.data()[[1, 1]], 11.5);
    }

    #[test]
    fn test_linint2_requires_two_points() {
        let transformer = GridTransformer::new();
        let fi = Array2::<f64>::zeros((1, 3));
        let err = transformer
            .linint2(
                fi,
                &coord(&[0.0]),
                &coord(&[0.0]),
                Some(&coord(&[0.0, 1.0, 2.0])),
                Some(&coord(&[0.0])),
                &InterpOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::DimensionError(_)));
    }

    #[test]
    fn test_linint2pts_reports_status() {
        let transformer = GridTransformer::new();
        let fi = Array3::from_shape_fn((2, 2, 2), |(b, y, x)| (b + y + x) as f64);
        let (out, warnings) = transformer
            .linint2pts_with_warnings(
                fi,
                &coord(&[0.5]),
                &coord(&[0.5]),
                Some(&coord(&[1.0, 0.0])),
                Some(&coord(&[0.0, 1.0])),
                &InterpOptions::default(),
            )
            .unwrap();
        assert_eq!(out.shape(), &[2, 1]);
        assert!(out.data().iter().all(|v| v.is_nan()));
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.status == ScatterStatus::NonMonotonicX));
    }
}
