//! The kernel call contract.
//!
//! Every buffer crossing this boundary is in kernel axis order: the innermost
//! spatial axis comes first, which is the reverse of the host layout. A 2-D
//! field `fi` is therefore indexed `fi[[x, y]]`. Missing values are encoded
//! with the caller-provided `xmsg` sentinel and never with NaN.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2};

use crate::error::{KernelError, Result};
use crate::status::ScatterStatus;

/// How distances between an observation and a grid point are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceMethod {
    /// Planar distance in coordinate units.
    Cartesian,
    /// Great-circle distance with `x` as longitude and `y` as latitude.
    #[default]
    GreatCircle,
}

impl DistanceMethod {
    /// Maps the numeric selector (0 = Cartesian, 1 = great circle).
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Cartesian),
            1 => Some(Self::GreatCircle),
            _ => None,
        }
    }
}

impl FromStr for DistanceMethod {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cartesian" | "0" => Ok(Self::Cartesian),
            "great_circle" | "greatcircle" | "1" => Ok(Self::GreatCircle),
            _ => Err(KernelError::invalid_parameter(format!(
                "unknown distance method: {s}"
            ))),
        }
    }
}

/// Which matrix the EOF decomposition diagonalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EofMatrix {
    #[default]
    Covariance,
    Correlation,
}

impl EofMatrix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Covariance => "covariance",
            Self::Correlation => "correlation",
        }
    }
}

impl fmt::Display for EofMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EofMatrix {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "covariance" | "0" => Ok(Self::Covariance),
            "correlation" | "1" => Ok(Self::Correlation),
            _ => Err(KernelError::invalid_parameter(format!(
                "unknown EOF matrix: {s}"
            ))),
        }
    }
}

/// Parameters that steer scattered-to-grid placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripleGridParams {
    pub method: DistanceMethod,
    /// Fraction of one grid spacing by which the grid bounds are widened
    /// when deciding whether an observation may influence a boundary cell.
    pub domain: f64,
    /// Search radius in kilometres. Only honoured by great-circle placement.
    pub distmx: f64,
}

impl Default for TripleGridParams {
    fn default() -> Self {
        Self {
            method: DistanceMethod::GreatCircle,
            domain: 1.0,
            distmx: 1.0e20,
        }
    }
}

/// Parameters for the EOF decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EofParams {
    pub matrix: EofMatrix,
    /// Minimum percentage (0..=100) of valid observations a station needs
    /// to take part in the decomposition.
    pub pcrit: f64,
}

impl Default for EofParams {
    fn default() -> Self {
        Self {
            matrix: EofMatrix::Covariance,
            pcrit: 50.0,
        }
    }
}

/// Output of [`Kernel::eof`].
#[derive(Debug, Clone, PartialEq)]
pub struct EofDecomposition {
    /// Eigenvalues in descending order, one per requested component.
    pub eigenvalues: Array1<f64>,
    /// Unit-norm eigenvectors indexed `[station, component]`. Stations that
    /// failed the `pcrit` test hold `xmsg`.
    pub eigenvectors: Array2<f64>,
    /// Percentage of the total variance explained by each component.
    pub variance_fraction: Array1<f64>,
    /// Principal component time series indexed `[observation, component]`.
    pub principal_components: Array2<f64>,
    /// Trace of the covariance (or correlation) matrix.
    pub trace: f64,
}

/// Numerical entry points the dispatch layer calls once per block.
///
/// Implementations must be free of side effects that other blocks can
/// observe: the dispatcher calls them concurrently from a thread pool.
#[allow(clippy::too_many_arguments)]
pub trait Kernel: Send + Sync {
    /// Piecewise linear interpolation of `fi` (indexed like `xi`) onto `xo`.
    fn linint1(
        &self,
        xi: ArrayView1<'_, f64>,
        fi: ArrayView1<'_, f64>,
        xo: ArrayView1<'_, f64>,
        cyclic: bool,
        xmsg: f64,
    ) -> Result<Array1<f64>>;

    /// Bilinear interpolation of `fi[[x, y]]` onto the grid `xo` × `yo`.
    /// The result is indexed `[xo, yo]`.
    fn linint2(
        &self,
        xi: ArrayView1<'_, f64>,
        yi: ArrayView1<'_, f64>,
        fi: ArrayView2<'_, f64>,
        xo: ArrayView1<'_, f64>,
        yo: ArrayView1<'_, f64>,
        cyclic: bool,
        xmsg: f64,
    ) -> Result<Array2<f64>>;

    /// Bilinear interpolation of `fi[[x, y]]` at the points `(xo[k], yo[k])`.
    fn linint2pts(
        &self,
        xi: ArrayView1<'_, f64>,
        yi: ArrayView1<'_, f64>,
        fi: ArrayView2<'_, f64>,
        xo: ArrayView1<'_, f64>,
        yo: ArrayView1<'_, f64>,
        cyclic: bool,
        xmsg: f64,
    ) -> Result<(Array1<f64>, ScatterStatus)>;

    /// Curvilinear grid to rectilinear grid. The result is indexed
    /// `[lon1d, lat1d]`.
    fn rcm2rgrid(
        &self,
        lat2d: ArrayView2<'_, f64>,
        lon2d: ArrayView2<'_, f64>,
        fi: ArrayView2<'_, f64>,
        lat1d: ArrayView1<'_, f64>,
        lon1d: ArrayView1<'_, f64>,
        xmsg: f64,
    ) -> Result<Array2<f64>>;

    /// Rectilinear grid (`fi[[lon, lat]]`) to the curvilinear grid described by
    /// `lat2d`/`lon2d`. The result has the shape of `lat2d`.
    fn rgrid2rcm(
        &self,
        lat1d: ArrayView1<'_, f64>,
        lon1d: ArrayView1<'_, f64>,
        fi: ArrayView2<'_, f64>,
        lat2d: ArrayView2<'_, f64>,
        lon2d: ArrayView2<'_, f64>,
        xmsg: f64,
    ) -> Result<Array2<f64>>;

    /// Curvilinear grid to scattered `(lat[k], lon[k])` locations.
    fn rcm2points(
        &self,
        lat2d: ArrayView2<'_, f64>,
        lon2d: ArrayView2<'_, f64>,
        fi: ArrayView2<'_, f64>,
        lat: ArrayView1<'_, f64>,
        lon: ArrayView1<'_, f64>,
        xmsg: f64,
    ) -> Result<Array1<f64>>;

    /// Serializes the non-missing cells of `z[[x, y]]` into `(x, y, value)`
    /// rows, x varying fastest.
    ///
    /// Returns a `[x.len() * y.len(), 3]` buffer and the number of leading rows
    /// that are valid. Rows past that count hold `xmsg`.
    fn grid2triple(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        z: ArrayView2<'_, f64>,
        xmsg: f64,
    ) -> Result<(Array2<f64>, usize)>;

    /// Places scattered `(x[k], y[k], z[k])` values onto the grid
    /// `xgrid` × `ygrid`. The result is indexed `[xgrid, ygrid]`.
    fn triple2grid(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        z: ArrayView1<'_, f64>,
        xgrid: ArrayView1<'_, f64>,
        ygrid: ArrayView1<'_, f64>,
        xmsg: f64,
        params: &TripleGridParams,
    ) -> Result<Array2<f64>>;

    /// EOF decomposition of `data[[observation, station]]`.
    fn eof(
        &self,
        data: ArrayView2<'_, f64>,
        neval: usize,
        xmsg: f64,
        params: &EofParams,
    ) -> Result<EofDecomposition>;

    /// Layer thickness of the constant pressure levels `plev` for every
    /// surface pressure in `psfc[[x, y]]`. The result is indexed `[x, y, lev]`.
    fn dpres_plevel(
        &self,
        plev: ArrayView1<'_, f64>,
        psfc: ArrayView2<'_, f64>,
        ptop: f64,
        xmsg: f64,
    ) -> Result<Array3<f64>>;
}
