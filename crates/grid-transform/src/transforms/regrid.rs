//! Regridding between curvilinear and rectilinear grids.

use grid_kernel::Kernel;
use ndarray::{ArrayD, ArrayView2, Ix2};

use super::GridTransformer;
use crate::array::{GridArray, LabeledArray};
use crate::assemble::OutputDim;
use crate::dispatch::{OutputRule, TransformDescriptor};
use crate::error::Result;
use crate::invoke::BlockInvocation;
use crate::missing::{KernelScalar, MissingValues};
use crate::types::TransformOptions;
use crate::validate;

/// Checks 2-D latitude/longitude arrays against the rightmost two dimensions
/// of `fi` and returns them as views.
fn curvilinear_coords<'a, T>(
    op: &str,
    fi: &LabeledArray<T>,
    lat2d: &'a ArrayD<f64>,
    lon2d: &'a ArrayD<f64>,
) -> Result<(ArrayView2<'a, f64>, ArrayView2<'a, f64>)> {
    validate::min_rank(op, "fi", fi.ndim(), 2)?;
    let lat2d = validate::rank2(op, "lat2d", lat2d)?;
    let lon2d = validate::rank2(op, "lon2d", lon2d)?;
    validate::matching_shape(op, "lon2d", lon2d.shape(), lat2d.shape(), "`lat2d`")?;
    validate::matching_shape(
        op,
        "lat2d",
        lat2d.shape(),
        &fi.shape()[fi.ndim() - 2..],
        "the rightmost two dimensions of `fi`",
    )?;
    validate::min_extent(op, "lat2d", lat2d.nrows(), 2)?;
    validate::min_extent(op, "lat2d", lat2d.ncols(), 2)?;
    Ok((lat2d, lon2d))
}

impl<K: Kernel> GridTransformer<K> {
    /// Regrids the curvilinear rightmost two dimensions of `fi`, located by
    /// `lat2d`/`lon2d`, onto the rectilinear grid `lat1d` × `lon1d`.
    pub fn rcm2rgrid<T: KernelScalar>(
        &self,
        fi: impl Into<GridArray<T>>,
        lat2d: &ArrayD<f64>,
        lon2d: &ArrayD<f64>,
        lat1d: &ArrayD<f64>,
        lon1d: &ArrayD<f64>,
        options: &TransformOptions<T>,
    ) -> Result<GridArray<T>> {
        const OP: &str = "rcm2rgrid";
        let (fi, kind) = fi.into().promote();
        let (lat2d, lon2d) = curvilinear_coords(OP, &fi, lat2d, lon2d)?;
        let lat1d = validate::rank1(OP, "lat1d", lat1d)?.to_owned();
        let lon1d = validate::rank1(OP, "lon1d", lon1d)?.to_owned();
        validate::active_dims_whole(OP, &fi, 2)?;
        let missing = MissingValues::resolve(options.missing_value)?;

        let ndim = fi.ndim();
        let descriptor = TransformDescriptor::new(
            OP,
            2,
            OutputRule::Replace(vec![lat1d.len(), lon1d.len()]),
        );
        let trailing = vec![
            OutputDim::renamed_from(&fi, ndim - 2).with_coord(lat1d.clone()),
            OutputDim::renamed_from(&fi, ndim - 1).with_coord(lon1d.clone()),
        ];
        let active_shape = fi.shape()[ndim - 2..].to_vec();
        let (lat2d, lon2d) = (lat2d.reversed_axes(), lon2d.reversed_axes());
        let invocation = BlockInvocation::new(&missing);

        let (output, _) = self.run(
            &fi,
            kind,
            &descriptor,
            trailing,
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let fi = invocation.prepare(block, &active_shape)?.into_dimensionality::<Ix2>()?;
                let fo = self.kernel.rcm2rgrid(
                    lat2d,
                    lon2d,
                    fi.view(),
                    lat1d.view(),
                    lon1d.view(),
                    invocation.xmsg(),
                )?;
                Ok(invocation.finish(fo, declared, None)?.into())
            },
        )?;
        Ok(output)
    }

    /// Regrids the rectilinear rightmost two dimensions of `fi` onto the
    /// curvilinear grid `lat2d`/`lon2d`.
    ///
    /// `lat1d`/`lon1d` may be omitted when `fi` carries them. The output keeps
    /// the dimension names but not their 1-D coordinates.
    pub fn rgrid2rcm<T: KernelScalar>(
        &self,
        fi: impl Into<GridArray<T>>,
        lat2d: &ArrayD<f64>,
        lon2d: &ArrayD<f64>,
        lat1d: Option<&ArrayD<f64>>,
        lon1d: Option<&ArrayD<f64>>,
        options: &TransformOptions<T>,
    ) -> Result<GridArray<T>> {
        const OP: &str = "rgrid2rcm";
        let (fi, kind) = fi.into().promote();
        validate::min_rank(OP, "fi", fi.ndim(), 2)?;
        let ndim = fi.ndim();
        let lat1d = validate::axis_coordinate(OP, "lat1d", lat1d, &fi, ndim - 2)?;
        let lon1d = validate::axis_coordinate(OP, "lon1d", lon1d, &fi, ndim - 1)?;
        validate::min_extent(OP, "lat1d", lat1d.len(), 2)?;
        validate::min_extent(OP, "lon1d", lon1d.len(), 2)?;
        let lat2d = validate::rank2(OP, "lat2d", lat2d)?;
        let lon2d = validate::rank2(OP, "lon2d", lon2d)?;
        validate::matching_shape(OP, "lon2d", lon2d.shape(), lat2d.shape(), "`lat2d`")?;
        validate::active_dims_whole(OP, &fi, 2)?;
        let missing = MissingValues::resolve(options.missing_value)?;

        let descriptor =
            TransformDescriptor::new(OP, 2, OutputRule::Replace(lat2d.shape().to_vec()));
        let trailing = vec![
            OutputDim::renamed_from(&fi, ndim - 2),
            OutputDim::renamed_from(&fi, ndim - 1),
        ];
        let active_shape = fi.shape()[ndim - 2..].to_vec();
        let (lat2d, lon2d) = (lat2d.reversed_axes(), lon2d.reversed_axes());
        let invocation = BlockInvocation::new(&missing);

        let (output, _) = self.run(
            &fi,
            kind,
            &descriptor,
            trailing,
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let fi = invocation.prepare(block, &active_shape)?.into_dimensionality::<Ix2>()?;
                let fo = self.kernel.rgrid2rcm(
                    lat1d.view(),
                    lon1d.view(),
                    fi.view(),
                    lat2d,
                    lon2d,
                    invocation.xmsg(),
                )?;
                Ok(invocation.finish(fo, declared, None)?.into())
            },
        )?;
        Ok(output)
    }

    /// Samples the curvilinear rightmost two dimensions of `fi` at the
    /// scattered locations `(lat[k], lon[k])`. The output's last dimension
    /// is `pts`.
    pub fn rcm2points<T: KernelScalar>(
        &self,
        fi: impl Into<GridArray<T>>,
        lat2d: &ArrayD<f64>,
        lon2d: &ArrayD<f64>,
        lat: &ArrayD<f64>,
        lon: &ArrayD<f64>,
        options: &TransformOptions<T>,
    ) -> Result<GridArray<T>> {
        const OP: &str = "rcm2points";
        let (fi, kind) = fi.into().promote();
        let (lat2d, lon2d) = curvilinear_coords(OP, &fi, lat2d, lon2d)?;
        let lat = validate::rank1(OP, "lat", lat)?.to_owned();
        let lon = validate::rank1(OP, "lon", lon)?.to_owned();
        validate::paired_lengths(OP, ("lat", lat.len()), ("lon", lon.len()))?;
        validate::active_dims_whole(OP, &fi, 2)?;
        let missing = MissingValues::resolve(options.missing_value)?;

        let ndim = fi.ndim();
        let descriptor = TransformDescriptor::new(OP, 2, OutputRule::Replace(vec![lat.len()]));
        let active_shape = fi.shape()[ndim - 2..].to_vec();
        let (lat2d, lon2d) = (lat2d.reversed_axes(), lon2d.reversed_axes());
        let invocation = BlockInvocation::new(&missing);

        let (output, _) = self.run(
            &fi,
            kind,
            &descriptor,
            vec![OutputDim::new("pts")],
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let fi = invocation.prepare(block, &active_shape)?.into_dimensionality::<Ix2>()?;
                let fo = self.kernel.rcm2points(
                    lat2d,
                    lon2d,
                    fi.view(),
                    lat.view(),
                    lon.view(),
                    invocation.xmsg(),
                )?;
                Ok(invocation.finish(fo, declared, None)?.into())
            },
        )?;
        Ok(output)
    }
}
