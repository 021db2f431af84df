//! Pressure layer thickness for constant pressure levels.

use ndarray::{Array3, ArrayView1, ArrayView2};

use crate::error::{KernelError, Result};

/// Each level owns the layer between the midpoints to its neighbours. The
/// lowest level in a column extends down to the surface pressure and the
/// highest up to `ptop`, so the non-missing thicknesses of a column sum to
/// `psfc - ptop`. Levels below the surface or above `ptop` are missing.
pub(crate) fn dpres_plevel(
    plev: ArrayView1<'_, f64>,
    psfc: ArrayView2<'_, f64>,
    ptop: f64,
    xmsg: f64,
) -> Result<Array3<f64>> {
    if plev.iter().any(|p| !p.is_finite()) {
        return Err(KernelError::invalid_parameter(
            "pressure levels must be finite",
        ));
    }
    if !ptop.is_finite() {
        return Err(KernelError::invalid_parameter("ptop must be finite"));
    }

    let nlev = plev.len();
    let (nx, ny) = psfc.dim();

    // Surface first.
    let mut order: Vec<usize> = (0..nlev).collect();
    order.sort_by(|&a, &b| plev[b].total_cmp(&plev[a]));

    let mut dp = Array3::from_elem((nx, ny, nlev), xmsg);
    for ((i, j), &surface) in psfc.indexed_iter() {
        if surface == xmsg || !surface.is_finite() {
            continue;
        }
        let column: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&k| plev[k] <= surface && plev[k] >= ptop)
            .collect();

        for (pos, &k) in column.iter().enumerate() {
            let bottom = match pos.checked_sub(1) {
                Some(below) => 0.5 * (plev[column[below]] + plev[k]),
                None => surface,
            };
            let top = match column.get(pos + 1) {
                Some(&above) => 0.5 * (plev[k] + plev[above]),
                None => ptop,
            };
            dp[[i, j, k]] = bottom - top;
        }
    }
    Ok(dp)
}
