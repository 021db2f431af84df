//! Conversions between grids and scattered `(x, y, value)` triples.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::{KernelError, Result};
use crate::kernel::{DistanceMethod, TripleGridParams};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

pub(crate) fn grid2triple(
    x: ArrayView1<'_, f64>,
    y: ArrayView1<'_, f64>,
    z: ArrayView2<'_, f64>,
    xmsg: f64,
) -> Result<(Array2<f64>, usize)> {
    KernelError::check_shape("z", &[x.len(), y.len()], z.shape())?;

    let mut triples = Array2::from_elem((x.len() * y.len(), 3), xmsg);
    let mut count = 0;
    for (j, &yj) in y.iter().enumerate() {
        for (i, &xi) in x.iter().enumerate() {
            let value = z[[i, j]];
            if value == xmsg {
                continue;
            }
            triples[[count, 0]] = xi;
            triples[[count, 1]] = yj;
            triples[[count, 2]] = value;
            count += 1;
        }
    }
    Ok((triples, count))
}

/// Grid bounds widened by `domain` grid spacings on each side.
fn extended_bounds(axis: ArrayView1<'_, f64>, domain: f64) -> (f64, f64) {
    let (lo, hi) = axis.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    let spacing = if axis.len() > 1 {
        (hi - lo) / (axis.len() - 1) as f64
    } else {
        0.0
    };
    let pad = domain.max(0.0) * spacing;
    (lo - pad, hi + pad)
}

fn nearest(axis: ArrayView1<'_, f64>, value: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (k, &a) in axis.iter().enumerate() {
        let distance = (a - value).abs();
        if distance < best_distance {
            best = k;
            best_distance = distance;
        }
    }
    best
}

/// Great-circle distance in kilometres between two `(lon, lat)` points in degrees.
pub(crate) fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Assigns each observation to its nearest grid point. When several
/// observations compete for one point, the closest one wins.
pub(crate) fn triple2grid(
    x: ArrayView1<'_, f64>,
    y: ArrayView1<'_, f64>,
    z: ArrayView1<'_, f64>,
    xgrid: ArrayView1<'_, f64>,
    ygrid: ArrayView1<'_, f64>,
    xmsg: f64,
    params: &TripleGridParams,
) -> Result<Array2<f64>> {
    KernelError::check_len("y", x.len(), y.len())?;
    KernelError::check_len("z", x.len(), z.len())?;

    let shape = (xgrid.len(), ygrid.len());
    let mut grid = Array2::from_elem(shape, xmsg);
    if xgrid.is_empty() || ygrid.is_empty() {
        return Ok(grid);
    }
    let mut closest = Array2::from_elem(shape, f64::INFINITY);
    let (x_lo, x_hi) = extended_bounds(xgrid, params.domain);
    let (y_lo, y_hi) = extended_bounds(ygrid, params.domain);

    for ((&xk, &yk), &zk) in x.iter().zip(y.iter()).zip(z.iter()) {
        if zk == xmsg || !xk.is_finite() || !yk.is_finite() {
            continue;
        }
        if xk < x_lo || xk > x_hi || yk < y_lo || yk > y_hi {
            continue;
        }
        let (i, j) = (nearest(xgrid, xk), nearest(ygrid, yk));
        let distance = match params.method {
            DistanceMethod::Cartesian => (xk - xgrid[i]).hypot(yk - ygrid[j]),
            DistanceMethod::GreatCircle => {
                let km = haversine_km(xk, yk, xgrid[i], ygrid[j]);
                if km > params.distmx {
                    continue;
                }
                km
            }
        };
        if distance < closest[[i, j]] {
            closest[[i, j]] = distance;
            grid[[i, j]] = zk;
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    const XMSG: f64 = f64::MAX;

    #[test]
    fn test_grid2triple_x_fastest() {
        let x = arr1(&[1.0, 3.0, 5.0]);
        let y = arr1(&[2.0, 4.0]);
        let z = arr2(&[[10.0, 40.0], [20.0, 50.0], [30.0, 60.0]]);
        let (triples, count) = grid2triple(x.view(), y.view(), z.view(), XMSG).unwrap();
        assert_eq!(count, 6);
        assert_eq!(triples.column(0).to_vec(), vec![1.0, 3.0, 5.0, 1.0, 3.0, 5.0]);
        assert_eq!(triples.column(1).to_vec(), vec![2.0, 2.0, 2.0, 4.0, 4.0, 4.0]);
        assert_eq!(
            triples.column(2).to_vec(),
            vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]
        );
    }

    #[test]
    fn test_grid2triple_skips_missing() {
        let x = arr1(&[1.0, 3.0]);
        let y = arr1(&[2.0]);
        let z = arr2(&[[XMSG], [7.0]]);
        let (triples, count) = grid2triple(x.view(), y.view(), z.view(), XMSG).unwrap();
        assert_eq!(count, 1);
        assert_eq!(triples.row(0).to_vec(), vec![3.0, 2.0, 7.0]);
        assert!(triples.row(1).iter().all(|&v| v == XMSG));
    }

    #[test]
    fn test_triple2grid_cartesian_closest_wins() {
        let xgrid = arr1(&[0.0, 1.0, 2.0]);
        let ygrid = arr1(&[0.0, 1.0]);
        let x = arr1(&[0.9, 1.05, 2.0, 10.0]);
        let y = arr1(&[0.0, 0.0, 1.0, 0.0]);
        let z = arr1(&[1.0, 2.0, 3.0, 4.0]);
        let params = TripleGridParams {
            method: DistanceMethod::Cartesian,
            ..TripleGridParams::default()
        };
        let grid = triple2grid(
            x.view(),
            y.view(),
            z.view(),
            xgrid.view(),
            ygrid.view(),
            XMSG,
            &params,
        )
        .unwrap();
        assert_eq!(grid[[1, 0]], 2.0);
        assert_eq!(grid[[2, 1]], 3.0);
        assert_eq!(grid[[0, 0]], XMSG);
        assert_eq!(grid.iter().filter(|&&v| v != XMSG).count(), 2);
    }

    #[test]
    fn test_triple2grid_great_circle_radius() {
        let xgrid = arr1(&[0.0, 10.0]);
        let ygrid = arr1(&[0.0, 10.0]);
        let x = arr1(&[0.5]);
        let y = arr1(&[0.0]);
        let z = arr1(&[5.0]);
        let tight = TripleGridParams {
            distmx: 10.0,
            ..TripleGridParams::default()
        };
        let grid = triple2grid(
            x.view(),
            y.view(),
            z.view(),
            xgrid.view(),
            ygrid.view(),
            XMSG,
            &tight,
        )
        .unwrap();
        assert!(grid.iter().all(|&v| v == XMSG));

        let grid = triple2grid(
            x.view(),
            y.view(),
            z.view(),
            xgrid.view(),
            ygrid.view(),
            XMSG,
            &TripleGridParams::default(),
        )
        .unwrap();
        assert_eq!(grid[[0, 0]], 5.0);
    }

    #[test]
    fn test_haversine_quarter_meridian() {
        let d = haversine_km(0.0, 0.0, 0.0, 90.0);
        assert!((d - EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
