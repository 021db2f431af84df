//! Piecewise linear interpolation on rectilinear axes.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{KernelError, Result};
use crate::status::ScatterStatus;

/// Position of a target coordinate relative to a source axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Bracket {
    Exact(usize),
    /// Between `lo` and `hi`, with weight `w` on `hi`.
    Between { lo: usize, hi: usize, w: f64 },
    Outside,
}

impl Bracket {
    /// Both neighbours and the weight on the upper one. An exact hit uses the
    /// same index twice with zero weight.
    pub(crate) fn neighbours(self) -> Option<(usize, usize, f64)> {
        match self {
            Bracket::Exact(k) => Some((k, k, 0.0)),
            Bracket::Between { lo, hi, w } => Some((lo, hi, w)),
            Bracket::Outside => None,
        }
    }
}

fn locate(axis: &[f64], x: f64) -> Bracket {
    if let Some(k) = axis.iter().position(|&a| a == x) {
        return Bracket::Exact(k);
    }
    for (k, pair) in axis.windows(2).enumerate() {
        let (a0, a1) = (pair[0], pair[1]);
        if (a0 - x) * (a1 - x) < 0.0 {
            return Bracket::Between {
                lo: k,
                hi: k + 1,
                w: (x - a0) / (a1 - a0),
            };
        }
    }
    Bracket::Outside
}

/// Finds where `x` falls on a monotonic `axis` (ascending or descending).
///
/// With `cyclic`, the axis is treated as periodic with period
/// `last - first + (axis[1] - axis[0])`, so targets beyond either end and in
/// the gap between the last and first point still resolve.
pub(crate) fn bracket(axis: &[f64], x: f64, cyclic: bool) -> Bracket {
    if axis.is_empty() || !x.is_finite() {
        return Bracket::Outside;
    }
    let direct = locate(axis, x);
    if direct != Bracket::Outside || !cyclic || axis.len() < 2 {
        return direct;
    }

    let n = axis.len();
    let period = axis[n - 1] - axis[0] + (axis[1] - axis[0]);
    if period == 0.0 || !period.is_finite() {
        return Bracket::Outside;
    }
    let shifted = x - ((x - axis[0]) / period).floor() * period;
    match locate(axis, shifted) {
        Bracket::Outside => {
            let (a0, a1) = (axis[n - 1], axis[0] + period);
            if shifted == a1 {
                Bracket::Exact(0)
            } else if (a0 - shifted) * (a1 - shifted) < 0.0 {
                Bracket::Between {
                    lo: n - 1,
                    hi: 0,
                    w: (shifted - a0) / (a1 - a0),
                }
            } else {
                Bracket::Outside
            }
        }
        found => found,
    }
}

/// Reads one value of `line` at `at`, honouring the missing sentinel.
pub(crate) fn sample(line: ArrayView1<'_, f64>, at: Bracket, xmsg: f64) -> f64 {
    match at {
        Bracket::Exact(k) => line[k],
        Bracket::Between { lo, hi, w } => {
            let (v0, v1) = (line[lo], line[hi]);
            if v0 == xmsg || v1 == xmsg {
                xmsg
            } else {
                v0 + w * (v1 - v0)
            }
        }
        Bracket::Outside => xmsg,
    }
}

fn strictly_increasing(axis: &[f64]) -> bool {
    axis.windows(2).all(|pair| pair[0] < pair[1])
}

pub(crate) fn linint1(
    xi: ArrayView1<'_, f64>,
    fi: ArrayView1<'_, f64>,
    xo: ArrayView1<'_, f64>,
    cyclic: bool,
    xmsg: f64,
) -> Result<Array1<f64>> {
    KernelError::check_len("fi", xi.len(), fi.len())?;
    let xi = xi.to_vec();

    Ok(xo
        .iter()
        .map(|&x| sample(fi, bracket(&xi, x, cyclic), xmsg))
        .collect())
}

/// Interpolates along x first, then along y. Targets that coincide with
/// source nodes on both axes therefore reproduce the source value exactly.
pub(crate) fn linint2(
    xi: ArrayView1<'_, f64>,
    yi: ArrayView1<'_, f64>,
    fi: ArrayView2<'_, f64>,
    xo: ArrayView1<'_, f64>,
    yo: ArrayView1<'_, f64>,
    cyclic: bool,
    xmsg: f64,
) -> Result<Array2<f64>> {
    KernelError::check_shape("fi", &[xi.len(), yi.len()], fi.shape())?;
    let (xi, yi) = (xi.to_vec(), yi.to_vec());

    let along_x: Vec<Bracket> = xo.iter().map(|&x| bracket(&xi, x, cyclic)).collect();
    let along_y: Vec<Bracket> = yo.iter().map(|&y| bracket(&yi, y, false)).collect();

    let mut partial = Array2::from_elem((xo.len(), yi.len()), xmsg);
    for (j, column) in fi.axis_iter(Axis(1)).enumerate() {
        for (io, &at) in along_x.iter().enumerate() {
            partial[[io, j]] = sample(column, at, xmsg);
        }
    }

    let mut fo = Array2::from_elem((xo.len(), yo.len()), xmsg);
    for (io, row) in partial.axis_iter(Axis(0)).enumerate() {
        for (jo, &at) in along_y.iter().enumerate() {
            fo[[io, jo]] = sample(row, at, xmsg);
        }
    }
    Ok(fo)
}

pub(crate) fn linint2pts(
    xi: ArrayView1<'_, f64>,
    yi: ArrayView1<'_, f64>,
    fi: ArrayView2<'_, f64>,
    xo: ArrayView1<'_, f64>,
    yo: ArrayView1<'_, f64>,
    cyclic: bool,
    xmsg: f64,
) -> Result<(Array1<f64>, ScatterStatus)> {
    KernelError::check_shape("fi", &[xi.len(), yi.len()], fi.shape())?;
    KernelError::check_len("yo", xo.len(), yo.len())?;
    let (xi, yi) = (xi.to_vec(), yi.to_vec());
    let missing = Array1::from_elem(xo.len(), xmsg);

    if xi.len() < 2 || yi.len() < 2 || xo.is_empty() {
        return Ok((missing, ScatterStatus::InsufficientPoints));
    }
    if !strictly_increasing(&xi) {
        return Ok((missing, ScatterStatus::NonMonotonicX));
    }
    if !strictly_increasing(&yi) {
        return Ok((missing, ScatterStatus::NonMonotonicY));
    }

    let fo = xo
        .iter()
        .zip(yo.iter())
        .map(|(&x, &y)| {
            let (Some((i0, i1, wx)), Some((j0, j1, wy))) = (
                bracket(&xi, x, cyclic).neighbours(),
                bracket(&yi, y, false).neighbours(),
            ) else {
                return xmsg;
            };
            let corners = [fi[[i0, j0]], fi[[i1, j0]], fi[[i0, j1]], fi[[i1, j1]]];
            if corners.iter().any(|&v| v == xmsg) {
                return xmsg;
            }
            let [v00, v10, v01, v11] = corners;
            v00 * (1.0 - wx) * (1.0 - wy)
                + v10 * wx * (1.0 - wy)
                + v01 * (1.0 - wx) * wy
                + v11 * wx * wy
        })
        .collect();
    Ok((fo, ScatterStatus::Ok))
}
