//! Empirical orthogonal functions via a symmetric eigendecomposition.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2};

use crate::error::{KernelError, Result};
use crate::kernel::{EofDecomposition, EofMatrix, EofParams};

/// Anomaly series of one station that passed screening.
struct Station {
    index: usize,
    anomaly: Vec<f64>,
}

/// Keeps stations with at least `pcrit` percent valid observations and
/// turns them into anomalies. Missing observations contribute zero anomaly.
fn screen_stations(data: ArrayView2<'_, f64>, xmsg: f64, params: &EofParams) -> Vec<Station> {
    let nobs = data.nrows();
    let is_valid = |v: f64| v != xmsg && v.is_finite();

    data.columns()
        .into_iter()
        .enumerate()
        .filter_map(|(index, column)| {
            let valid: Vec<f64> = column.iter().copied().filter(|&v| is_valid(v)).collect();
            if valid.is_empty() {
                return None;
            }
            let percent = 100.0 * valid.len() as f64 / nobs as f64;
            if percent < params.pcrit {
                return None;
            }
            let mean = valid.iter().sum::<f64>() / valid.len() as f64;
            let mut anomaly: Vec<f64> = column
                .iter()
                .map(|&v| if is_valid(v) { v - mean } else { 0.0 })
                .collect();

            if params.matrix == EofMatrix::Correlation {
                let variance = anomaly.iter().map(|a| a * a).sum::<f64>() / (nobs - 1) as f64;
                let sd = variance.sqrt();
                if sd == 0.0 {
                    return None;
                }
                anomaly.iter_mut().for_each(|a| *a /= sd);
            }
            Some(Station { index, anomaly })
        })
        .collect()
}

pub(crate) fn decompose(
    data: ArrayView2<'_, f64>,
    neval: usize,
    xmsg: f64,
    params: &EofParams,
) -> Result<EofDecomposition> {
    let (nobs, msta) = data.dim();
    if neval == 0 {
        return Err(KernelError::invalid_parameter("neval must be positive"));
    }
    if !(0.0..=100.0).contains(&params.pcrit) {
        return Err(KernelError::invalid_parameter(format!(
            "pcrit must be within 0..=100, got {}",
            params.pcrit
        )));
    }
    if nobs < 2 {
        return Err(KernelError::decomposition(
            "at least two observations are required",
        ));
    }

    let stations = screen_stations(data, xmsg, params);
    if stations.len() < neval {
        return Err(KernelError::decomposition(format!(
            "{} of {} stations passed screening, {} components requested",
            stations.len(),
            msta,
            neval
        )));
    }

    let anomalies = DMatrix::from_fn(nobs, stations.len(), |t, s| stations[s].anomaly[t]);
    let matrix = (anomalies.transpose() * &anomalies) / (nobs - 1) as f64;
    let trace = matrix.trace();
    let eigen = SymmetricEigen::new(matrix);

    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let mut eigenvalues = Array1::zeros(neval);
    let mut variance_fraction = Array1::zeros(neval);
    let mut eigenvectors = Array2::from_elem((msta, neval), xmsg);
    let mut principal_components = Array2::zeros((nobs, neval));

    for (k, &idx) in order.iter().take(neval).enumerate() {
        let lambda = eigen.eigenvalues[idx];
        eigenvalues[k] = lambda;
        variance_fraction[k] = if trace > 0.0 { 100.0 * lambda / trace } else { 0.0 };

        // Eigenvectors are defined up to sign; fix it so the loadings sum is non-negative.
        let vector = eigen.eigenvectors.column(idx);
        let sign = if vector.sum() < 0.0 { -1.0 } else { 1.0 };
        for (s, station) in stations.iter().enumerate() {
            eigenvectors[[station.index, k]] = sign * vector[s];
        }
        for t in 0..nobs {
            principal_components[[t, k]] = stations
                .iter()
                .enumerate()
                .map(|(s, station)| station.anomaly[t] * sign * vector[s])
                .sum();
        }
    }

    tracing::trace!(nobs, msta, used = stations.len(), neval, trace, "eof decomposition");

    Ok(EofDecomposition {
        eigenvalues,
        eigenvectors,
        variance_fraction,
        principal_components,
        trace,
    })
}
