//! Kernel wrappers for observing what the dispatch layer hands to a kernel.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use grid_kernel::{
    EofDecomposition, EofParams, Kernel, ReferenceKernel, Result, ScatterStatus, TripleGridParams,
};
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2};

/// Delegates to [`ReferenceKernel`] and counts every invocation.
///
/// Also remembers the last `xmsg` it was given, so tests can check which
/// sentinel crossed the boundary.
#[derive(Debug, Default)]
pub struct CountingKernel {
    inner: ReferenceKernel,
    calls: AtomicUsize,
    last_xmsg: AtomicU64,
}

impl CountingKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of kernel invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `xmsg` of the most recent invocation, if any.
    pub fn last_xmsg(&self) -> Option<f64> {
        (self.calls() > 0).then(|| f64::from_bits(self.last_xmsg.load(Ordering::SeqCst)))
    }

    fn record(&self, xmsg: f64) {
        self.last_xmsg.store(xmsg.to_bits(), Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Kernel for CountingKernel {
    fn linint1(
        &self,
        xi: ArrayView1<'_, f64>,
        fi: ArrayView1<'_, f64>,
        xo: ArrayView1<'_, f64>,
        cyclic: bool,
        xmsg: f64,
    ) -> Result<Array1<f64>> {
        self.record(xmsg);
        self.inner.linint1(xi, fi, xo, cyclic, xmsg)
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
        self.record(xmsg);
        self.inner.linint2(xi, yi, fi, xo, yo, cyclic, xmsg)
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
        self.record(xmsg);
        self.inner.linint2pts(xi, yi, fi, xo, yo, cyclic, xmsg)
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
        self.record(xmsg);
        self.inner.rcm2rgrid(lat2d, lon2d, fi, lat1d, lon1d, xmsg)
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
        self.record(xmsg);
        self.inner.rgrid2rcm(lat1d, lon1d, fi, lat2d, lon2d, xmsg)
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
        self.record(xmsg);
        self.inner.rcm2points(lat2d, lon2d, fi, lat, lon, xmsg)
    }

    fn grid2triple(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        z: ArrayView2<'_, f64>,
        xmsg: f64,
    ) -> Result<(Array2<f64>, usize)> {
        self.record(xmsg);
        self.inner.grid2triple(x, y, z, xmsg)
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
        self.record(xmsg);
        self.inner.triple2grid(x, y, z, xgrid, ygrid, xmsg, params)
    }

    fn eof(
        &self,
        data: ArrayView2<'_, f64>,
        neval: usize,
        xmsg: f64,
        params: &EofParams,
    ) -> Result<EofDecomposition> {
        self.record(xmsg);
        self.inner.eof(data, neval, xmsg, params)
    }

    fn dpres_plevel(
        &self,
        plev: ArrayView1<'_, f64>,
        psfc: ArrayView2<'_, f64>,
        ptop: f64,
        xmsg: f64,
    ) -> Result<Array3<f64>> {
        self.record(xmsg);
        self.inner.dpres_plevel(plev, psfc, ptop, xmsg)
    }
}
