//! Generators for synthetic grids and coordinates.
//!
//! These create predictable, verifiable patterns so results can be checked
//! by hand.

use ndarray::{Array, Array1, ArrayD, IxDyn};

/// A coordinate argument as the transforms take it.
///
/// ```
/// use test_utils::coord;
///
/// assert_eq!(coord(&[1.0, 2.0]).shape(), &[2]);
/// ```
pub fn coord(values: &[f64]) -> ArrayD<f64> {
    Array1::from(values.to_vec()).into_dyn()
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    Array::linspace(start, stop, n)
}

/// Midpoints between consecutive entries of `axis`.
pub fn midpoints(axis: &Array1<f64>) -> Array1<f64> {
    axis.windows(2).into_iter().map(|w| 0.5 * (w[0] + w[1])).collect()
}

/// Interleaves `axis` with its midpoints: `n` values become `2n - 1`.
///
/// ```
/// use test_utils::{linspace, supersample};
///
/// let fine = supersample(&linspace(0.0, 3.0, 4));
/// assert_eq!(fine.to_vec(), vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
/// ```
pub fn supersample(axis: &Array1<f64>) -> Array1<f64> {
    let mids = midpoints(axis);
    let mut out = Vec::with_capacity(axis.len() + mids.len());
    for (i, &value) in axis.iter().enumerate() {
        out.push(value);
        if let Some(&mid) = mids.get(i) {
            out.push(mid);
        }
    }
    Array1::from(out)
}

/// An N-D array where each cell holds a weighted sum of its indices, so the
/// field is linear along every axis and bilinear interpolation reproduces
/// it exactly.
///
/// The weight of axis `k` is `10^(ndim - 1 - k)`.
pub fn ramp(shape: &[usize]) -> ArrayD<f64> {
    let ndim = shape.len();
    ArrayD::from_shape_fn(IxDyn(shape), |index| {
        (0..ndim)
            .map(|k| index[k] as f64 * 10f64.powi((ndim - 1 - k) as i32))
            .sum()
    })
}

/// A temperature-like field in Kelvin over `(lat, lon)`, warm at the equator.
pub fn temperature_field(lat: &Array1<f64>, lon: &Array1<f64>) -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(&[lat.len(), lon.len()]), |index| {
        let phi = lat[index[0]].to_radians();
        let lambda = lon[index[1]].to_radians();
        250.0 + 50.0 * phi.cos() + 2.0 * lambda.sin()
    })
}
