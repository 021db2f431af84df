//! Regridding between curvilinear and rectilinear grids.
//!
//! Values are formed by inverse-distance-squared weighting of the non-missing
//! corners of the cell that encloses the target, measured in degrees. A
//! target that lands on a corner takes that corner's value unchanged.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::linear::bracket;
use crate::error::{KernelError, Result};

/// `(lat, lon, value)` of one cell corner.
type Corner = (f64, f64, f64);

fn inverse_distance(corners: &[Corner], lat: f64, lon: f64, xmsg: f64) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for &(clat, clon, value) in corners {
        if value == xmsg {
            continue;
        }
        let d2 = (clat - lat).powi(2) + (clon - lon).powi(2);
        if d2 == 0.0 {
            return value;
        }
        weighted += value / d2;
        total += 1.0 / d2;
    }
    if total > 0.0 {
        weighted / total
    } else {
        xmsg
    }
}

/// Samples the curvilinear field at one location by searching for the first
/// cell whose lat/lon bounding box contains it.
fn sample_curvilinear(
    lat2d: ArrayView2<'_, f64>,
    lon2d: ArrayView2<'_, f64>,
    fi: ArrayView2<'_, f64>,
    lat: f64,
    lon: f64,
    xmsg: f64,
) -> f64 {
    if !lat.is_finite() || !lon.is_finite() {
        return xmsg;
    }
    let (nx, ny) = lat2d.dim();
    for i in 0..nx.saturating_sub(1) {
        for j in 0..ny.saturating_sub(1) {
            let cell = [(i, j), (i + 1, j), (i, j + 1), (i + 1, j + 1)];
            let corners: [Corner; 4] =
                cell.map(|idx| (lat2d[idx], lon2d[idx], fi[idx]));
            if corners.iter().any(|c| !c.0.is_finite() || !c.1.is_finite()) {
                continue;
            }
            let (lat_lo, lat_hi) = span(corners.iter().map(|c| c.0));
            let (lon_lo, lon_hi) = span(corners.iter().map(|c| c.1));
            if (lat_lo..=lat_hi).contains(&lat) && (lon_lo..=lon_hi).contains(&lon) {
                return inverse_distance(&corners, lat, lon, xmsg);
            }
        }
    }
    xmsg
}

fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn check_curvilinear(
    lat2d: ArrayView2<'_, f64>,
    lon2d: ArrayView2<'_, f64>,
    fi: ArrayView2<'_, f64>,
) -> Result<()> {
    KernelError::check_shape("lon2d", lat2d.shape(), lon2d.shape())?;
    KernelError::check_shape("fi", lat2d.shape(), fi.shape())
}

pub(crate) fn rcm2rgrid(
    lat2d: ArrayView2<'_, f64>,
    lon2d: ArrayView2<'_, f64>,
    fi: ArrayView2<'_, f64>,
    lat1d: ArrayView1<'_, f64>,
    lon1d: ArrayView1<'_, f64>,
    xmsg: f64,
) -> Result<Array2<f64>> {
    check_curvilinear(lat2d, lon2d, fi)?;
    Ok(Array2::from_shape_fn((lon1d.len(), lat1d.len()), |(i, j)| {
        sample_curvilinear(lat2d, lon2d, fi, lat1d[j], lon1d[i], xmsg)
    }))
}

pub(crate) fn rcm2points(
    lat2d: ArrayView2<'_, f64>,
    lon2d: ArrayView2<'_, f64>,
    fi: ArrayView2<'_, f64>,
    lat: ArrayView1<'_, f64>,
    lon: ArrayView1<'_, f64>,
    xmsg: f64,
) -> Result<Array1<f64>> {
    check_curvilinear(lat2d, lon2d, fi)?;
    KernelError::check_len("lon", lat.len(), lon.len())?;
    Ok(lat
        .iter()
        .zip(lon.iter())
        .map(|(&la, &lo)| sample_curvilinear(lat2d, lon2d, fi, la, lo, xmsg))
        .collect())
}

pub(crate) fn rgrid2rcm(
    lat1d: ArrayView1<'_, f64>,
    lon1d: ArrayView1<'_, f64>,
    fi: ArrayView2<'_, f64>,
    lat2d: ArrayView2<'_, f64>,
    lon2d: ArrayView2<'_, f64>,
    xmsg: f64,
) -> Result<Array2<f64>> {
    KernelError::check_shape("fi", &[lon1d.len(), lat1d.len()], fi.shape())?;
    KernelError::check_shape("lon2d", lat2d.shape(), lon2d.shape())?;
    let (lats, lons) = (lat1d.to_vec(), lon1d.to_vec());

    Ok(Array2::from_shape_fn(lat2d.dim(), |idx| {
        let (lat, lon) = (lat2d[idx], lon2d[idx]);
        let (Some((i0, i1, _)), Some((j0, j1, _))) = (
            bracket(&lons, lon, false).neighbours(),
            bracket(&lats, lat, false).neighbours(),
        ) else {
            return xmsg;
        };
        let corners = [(i0, j0), (i1, j0), (i0, j1), (i1, j1)]
            .map(|(i, j)| (lats[j], lons[i], fi[[i, j]]));
        inverse_distance(&corners, lat, lon, xmsg)
    }))
}
