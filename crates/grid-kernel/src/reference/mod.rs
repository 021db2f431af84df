//! Plain-Rust implementation of every kernel entry point.

mod curvilinear;
mod eof;
mod linear;
mod pressure;
mod scatter;

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2};

use crate::error::Result;
use crate::kernel::{EofDecomposition, EofParams, Kernel, TripleGridParams};
use crate::status::ScatterStatus;

/// Default kernel. Stateless, so one instance can serve any number of
/// concurrent block invocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernel;

impl ReferenceKernel {
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for ReferenceKernel {
    fn linint1(
        &self,
        xi: ArrayView1<'_, f64>,
        fi: ArrayView1<'_, f64>,
        xo: ArrayView1<'_, f64>,
        cyclic: bool,
        xmsg: f64,
    ) -> Result<Array1<f64>> {
        linear::linint1(xi, fi, xo, cyclic, xmsg)
    }

    fn linint2(
        &self,
        xi: ArrayView1<'_, f64>,
        yi: ArrayView1<'_, f64>,
        fi: ArrayView2<'_, f64>,
        xo: ArrayView1<'_, f64>,
        yo: ArrayView1<'_, f64>,
        cyclic: bool,
        xmsg: f64,
    ) -> Result<Array2<f64>> {
        linear::linint2(xi, yi, fi, xo, yo, cyclic, xmsg)
    }

    fn linint2pts(
        &self,
        xi: ArrayView1<'_, f64>,
        yi: ArrayView1<'_, f64>,
        fi: ArrayView2<'_, f64>,
        xo: ArrayView1<'_, f64>,
        yo: ArrayView1<'_, f64>,
        cyclic: bool,
        xmsg: f64,
    ) -> Result<(Array1<f64>, ScatterStatus)> {
        linear::linint2pts(xi, yi, fi, xo, yo, cyclic, xmsg)
    }

    fn rcm2rgrid(
        &self,
        lat2d: ArrayView2<'_, f64>,
        lon2d: ArrayView2<'_, f64>,
        fi: ArrayView2<'_, f64>,
        lat1d: ArrayView1<'_, f64>,
        lon1d: ArrayView1<'_, f64>,
        xmsg: f64,
    ) -> Result<Array2<f64>> {
        curvilinear::rcm2rgrid(lat2d, lon2d, fi, lat1d, lon1d, xmsg)
    }

    fn rgrid2rcm(
        &self,
        lat1d: ArrayView1<'_, f64>,
        lon1d: ArrayView1<'_, f64>,
        fi: ArrayView2<'_, f64>,
        lat2d: ArrayView2<'_, f64>,
        lon2d: ArrayView2<'_, f64>,
        xmsg: f64,
    ) -> Result<Array2<f64>> {
        curvilinear::rgrid2rcm(lat1d, lon1d, fi, lat2d, lon2d, xmsg)
    }

    fn rcm2points(
        &self,
        lat2d: ArrayView2<'_, f64>,
        lon2d: ArrayView2<'_, f64>,
        fi: ArrayView2<'_, f64>,
        lat: ArrayView1<'_, f64>,
        lon: ArrayView1<'_, f64>,
        xmsg: f64,
    ) -> Result<Array1<f64>> {
        curvilinear::rcm2points(lat2d, lon2d, fi, lat, lon, xmsg)
    }

    fn grid2triple(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        z: ArrayView2<'_, f64>,
        xmsg: f64,
    ) -> Result<(Array2<f64>, usize)> {
        scatter::grid2triple(x, y, z, xmsg)
    }

    fn triple2grid(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        z: ArrayView1<'_, f64>,
        xgrid: ArrayView1<'_, f64>,
        ygrid: ArrayView1<'_, f64>,
        xmsg: f64,
        params: &TripleGridParams,
    ) -> Result<Array2<f64>> {
        scatter::triple2grid(x, y, z, xgrid, ygrid, xmsg, params)
    }

    fn eof(
        &self,
        data: ArrayView2<'_, f64>,
        neval: usize,
        xmsg: f64,
        params: &EofParams,
    ) -> Result<EofDecomposition> {
        eof::decompose(data, neval, xmsg, params)
    }

    fn dpres_plevel(
        &self,
        plev: ArrayView1<'_, f64>,
        psfc: ArrayView2<'_, f64>,
        ptop: f64,
        xmsg: f64,
    ) -> Result<Array3<f64>> {
        pressure::dpres_plevel(plev, psfc, ptop, xmsg)
    }
}
