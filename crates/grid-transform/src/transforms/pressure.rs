//! Pressure layer thickness on constant pressure levels.

use grid_kernel::Kernel;
use ndarray::{Array1, Ix2};

use super::GridTransformer;
use crate::array::{GridArray, LabeledArray};
use crate::assemble::OutputDim;
use crate::dispatch::{OutputRule, TransformDescriptor};
use crate::error::{Result, TransformError};
use crate::invoke::{self, BlockInvocation};
use crate::missing::{KernelScalar, MissingValues};
use crate::types::{InputKind, TransformOptions};
use crate::validate;

impl<K: Kernel> GridTransformer<K> {
    /// Thickness of the layer each pressure level represents, bounded below
    /// by the surface pressure and above by `pressure_top`.
    ///
    /// `pressure_surface` may be a scalar, `(lat, lon)` or
    /// `(time, lat, lon)`; the output inserts a `lev` dimension before the
    /// horizontal ones. `pressure_top` defaults to the lowest level pressure.
    /// The result is labeled when `pressure_surface` is.
    ///
    /// Units are compared only when both pressure inputs are labeled. A plain
    /// `pressure_levels` array is taken to be in the surface's units.
    pub fn dpres_plevel<T: KernelScalar>(
        &self,
        pressure_levels: impl Into<GridArray<T>>,
        pressure_surface: impl Into<GridArray<T>>,
        pressure_top: Option<f64>,
        options: &TransformOptions<T>,
    ) -> Result<GridArray<T>> {
        const OP: &str = "dpres_plevel";
        let levels = pressure_levels.into();
        let (psfc, kind) = pressure_surface.into().promote();

        validate::exact_rank(OP, "pressure_levels", levels.ndim(), 1)?;
        validate::min_extent(OP, "pressure_levels", levels.shape()[0], 1)?;
        if let (Some(level_attrs), InputKind::Labeled) = (levels.attrs(), kind) {
            validate::units_match(
                OP,
                ("pressure_levels", Some(level_attrs)),
                ("pressure_surface", Some(psfc.attrs())),
            )?;
        }

        let scalar = psfc.ndim() == 0 || (psfc.ndim() == 1 && psfc.shape()[0] == 1);
        if !scalar && !(2..=3).contains(&psfc.ndim()) {
            return Err(TransformError::dimension(format!(
                "{OP}: `pressure_surface` must be a scalar, (lat, lon) or (time, lat, lon), got rank {}",
                psfc.ndim()
            )));
        }

        let lev_dim = match &levels {
            GridArray::Labeled(array) => array.dims()[0].clone(),
            GridArray::Unlabeled(_) => "lev".to_string(),
        };
        let plev: Array1<f64> = levels
            .into_data()
            .mapv(KernelScalar::to_kernel)
            .into_dimensionality()?;
        let lowest = plev.iter().copied().fold(f64::INFINITY, f64::min);
        let ptop = pressure_top.unwrap_or(lowest);
        if !ptop.is_finite() || ptop > lowest {
            return Err(TransformError::invalid_option(format!(
                "{OP}: pressure_top {ptop} must be finite and no greater than the lowest level {lowest}"
            )));
        }

        let psfc = if scalar {
            let attrs = psfc.attrs().clone();
            LabeledArray::new(invoke::reshape(psfc.into_data(), &[1, 1])?, ["lat", "lon"])?
                .with_attrs(attrs)
        } else {
            psfc
        };
        validate::active_dims_whole(OP, &psfc, 2)?;
        let missing = MissingValues::resolve(options.missing_value)?;

        let ndim = psfc.ndim();
        let nlev = plev.len();
        let grid_shape = psfc.shape()[ndim - 2..].to_vec();
        let descriptor = TransformDescriptor::new(
            OP,
            2,
            OutputRule::Replace(vec![nlev, grid_shape[0], grid_shape[1]]),
        );
        let trailing = vec![
            OutputDim::new(lev_dim.clone()).with_coord(plev.clone()),
            OutputDim::kept_from(&psfc, ndim - 2),
            OutputDim::kept_from(&psfc, ndim - 1),
        ];
        let invocation = BlockInvocation::new(&missing);

        let (output, _) = self.run(
            &psfc,
            kind,
            &descriptor,
            trailing,
            self.keep_attrs(options.keep_attrs),
            |_, block, declared| {
                let surface = invocation.prepare(block, &grid_shape)?.into_dimensionality::<Ix2>()?;
                let dp = self
                    .kernel
                    .dpres_plevel(plev.view(), surface.view(), ptop, invocation.xmsg())?;
                Ok(invocation.finish(dp, declared, None)?.into())
            },
        )?;

        if !scalar {
            return Ok(output);
        }
        let attrs = output.attrs().cloned().unwrap_or_default();
        let data = invoke::reshape(output.into_data(), &[nlev])?;
        Ok(match kind {
            InputKind::Unlabeled => GridArray::Unlabeled(data),
            InputKind::Labeled => GridArray::Labeled(
                LabeledArray::new(data, [lev_dim.as_str()])?
                    .with_coord(&lev_dim, plev)?
                    .with_attrs(attrs),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr0, arr1, Array2, Array3};

    fn levels() -> LabeledArray<f64> {
        LabeledArray::new(arr1(&[1000.0, 850.0, 700.0, 500.0]), ["plev"])
            .unwrap()
            .with_attr("units", "hPa")
    }

    #[test]
    fn test_columns_sum_to_depth() {
        let psfc = LabeledArray::new(Array2::from_elem((2, 3), 900.0), ["lat", "lon"])
            .unwrap()
            .with_attr("units", "hPa");
        let out = GridTransformer::new()
            .dpres_plevel(levels(), psfc, Some(400.0), &TransformOptions::default())
            .unwrap()
            .into_labeled()
            .unwrap();

        assert_eq!(out.dims(), ["plev", "lat", "lon"]);
        assert_eq!(out.shape(), &[4, 2, 3]);
        assert_eq!(out.coord("plev").unwrap()[1], 850.0);
        // 1000 hPa lies below the surface
        assert!(out.data()[[0, 1, 2]].is_nan());
        let column: f64 = (1..4).map(|k| out.data()[[k, 1, 2]]).sum();
        assert!((column - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_scalar_surface() {
        let out = GridTransformer::new()
            .dpres_plevel(
                arr1(&[1000.0f64, 850.0, 700.0, 500.0]),
                arr0(1013.0),
                None,
                &TransformOptions::default(),
            )
            .unwrap();
        assert!(!out.is_labeled());
        assert_eq!(out.shape(), &[4]);
        assert!((out.data().sum() - 513.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_batch_kept() {
        let psfc = LabeledArray::new(Array3::from_elem((2, 1, 2), 1000.0), ["time", "lat", "lon"])
            .unwrap()
            .with_coord("time", arr1(&[0.0, 1.0]))
            .unwrap()
            .with_attr("units", "hPa");
        let out = GridTransformer::new()
            .dpres_plevel(levels(), psfc, None, &TransformOptions::default())
            .unwrap()
            .into_labeled()
            .unwrap();
        assert_eq!(out.dims(), ["time", "plev", "lat", "lon"]);
        assert_eq!(out.coord("time").unwrap()[1], 1.0);
    }

    #[test]
    fn test_top_above_lowest_level_rejected() {
        let err = GridTransformer::new()
            .dpres_plevel(
                arr1(&[1000.0f64, 500.0]),
                arr0(1000.0),
                Some(600.0),
                &TransformOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidOption(_)));
    }

    #[test]
    fn test_units_disagree() {
        let psfc = LabeledArray::new(Array2::from_elem((1, 1), 101300.0), ["lat", "lon"])
            .unwrap()
            .with_attr("units", "Pa");
        let err = GridTransformer::new()
            .dpres_plevel(levels(), psfc, None, &TransformOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::AttributeError(_)));
    }

    #[test]
    fn test_plain_levels_skip_unit_check() {
        let psfc = LabeledArray::new(Array2::from_elem((1, 1), 101300.0), ["lat", "lon"])
            .unwrap()
            .with_attr("units", "Pa");
        let out = GridTransformer::new()
            .dpres_plevel(
                arr1(&[100000.0, 50000.0]),
                psfc,
                None,
                &TransformOptions::default(),
            )
            .unwrap();
        assert_eq!(out.shape(), &[2, 1, 1]);
        assert_eq!(out.attrs().unwrap()["units"], serde_json::json!("Pa"));
    }

    #[test]
    fn test_rank_four_surface_rejected() {
        let psfc = ndarray::Array4::from_elem((1, 1, 1, 1), 1000.0f64);
        let err = GridTransformer::new()
            .dpres_plevel(arr1(&[1000.0]), psfc, None, &TransformOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::DimensionError(_)));
    }
}
