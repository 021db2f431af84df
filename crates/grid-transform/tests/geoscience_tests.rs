//! Regridding, EOF and pressure-layer transforms on labeled fields.

use grid_transform::{
    DistanceMethod, EofMatrix, EofOptions, GridTransformer, LabeledArray, TransformOptions,
    TripleToGridOptions,
};
use ndarray::{arr1, Array2, Array3, ArrayD, Axis, IxDyn};
use test_utils::{assert_all_close, assert_approx_eq, coord, linspace, temperature_field};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("grid_transform=debug"))
        .with_test_writer()
        .try_init();
}

/// A rectilinear grid spelled out as 2-D latitude/longitude arrays.
fn curvilinear(lat: &[f64], lon: &[f64]) -> (ArrayD<f64>, ArrayD<f64>) {
    let shape = IxDyn(&[lat.len(), lon.len()]);
    let lat2d = ArrayD::from_shape_fn(shape.clone(), |i| lat[i[0]]);
    let lon2d = ArrayD::from_shape_fn(shape, |i| lon[i[1]]);
    (lat2d, lon2d)
}

#[test]
fn test_curvilinear_round_trip_on_nodes() {
    init_tracing();
    let lat = [-10.0, 0.0, 10.0];
    let lon = [100.0, 110.0, 120.0, 130.0];
    let (lat2d, lon2d) = curvilinear(&lat, &lon);
    let field = temperature_field(&arr1(&lat), &arr1(&lon));
    let batch = ndarray::stack(Axis(0), &[field.view(), field.view()]).unwrap();
    let fi = LabeledArray::new(batch, ["time", "y", "x"])
        .unwrap()
        .with_coord("time", arr1(&[0.0, 1.0]))
        .unwrap();

    let transformer = GridTransformer::new();
    let options = TransformOptions::default();
    let regular = transformer
        .rcm2rgrid(fi, &lat2d, &lon2d, &coord(&lat), &coord(&lon), &options)
        .unwrap()
        .into_labeled()
        .unwrap();
    assert_eq!(regular.dims(), ["time", "y", "x"]);
    assert_eq!(regular.coord("x").unwrap().to_vec(), lon.to_vec());
    assert_all_close!(regular.data().index_axis(Axis(0), 1), field, 1e-9);

    let back = transformer
        .rgrid2rcm(regular, &lat2d, &lon2d, None, None, &options)
        .unwrap()
        .into_labeled()
        .unwrap();
    assert!(back.coord("x").is_none());
    assert_eq!(back.coord("time").unwrap().len(), 2);
    assert_all_close!(back.data().index_axis(Axis(0), 0), field, 1e-9);

    let points = transformer
        .rcm2points(back, &lat2d, &lon2d, &coord(&[0.0, 10.0]), &coord(&[110.0, 130.0]), &options)
        .unwrap();
    assert_eq!(points.shape(), &[2, 2]);
    assert_approx_eq!(points.data()[[1, 0]], field[[1, 1]], 1e-9);
    assert_approx_eq!(points.data()[[1, 1]], field[[2, 3]], 1e-9);
}

#[test]
fn test_triple_round_trip_restores_grid() {
    let x = linspace(0.0, 3.0, 4);
    let y = linspace(0.0, 2.0, 3);
    let grid = Array2::from_shape_fn((3, 4), |(j, i)| (j * 4 + i) as f64).into_dyn();
    let transformer = GridTransformer::new();

    let triples = transformer
        .grid_to_triple(
            grid.clone(),
            Some(&x.clone().into_dyn()),
            Some(&y.clone().into_dyn()),
            &TransformOptions::default(),
        )
        .unwrap()
        .into_data();
    let rows: Vec<ArrayD<f64>> = (0..3)
        .map(|r| triples.index_axis(Axis(0), r).to_owned())
        .collect();

    let options = TripleToGridOptions::new()
        .method(DistanceMethod::Cartesian)
        .domain(0.0);
    let regridded = transformer
        .triple_to_grid(
            rows[2].clone(),
            &rows[0],
            &rows[1],
            &x.into_dyn(),
            &y.into_dyn(),
            &options,
        )
        .unwrap()
        .into_data();
    assert_eq!(regridded, grid);
}

#[test]
fn test_eof_on_two_patterns() {
    init_tracing();
    // (lat, lon, time): a strong zonal pattern plus a weak meridional one
    let strong = [1.0, -2.0, 3.0, -1.0, 2.0, -3.0, 0.5, -0.5];
    let weak = [0.3, 0.1, -0.2, -0.3, 0.2, 0.1, -0.1, -0.1];
    let data = Array3::from_shape_fn((2, 3, 8), |(j, i, t)| {
        strong[t] * (i as f64 + 1.0) + weak[t] * (j as f64 * 2.0 - 1.0)
    });
    let fi = LabeledArray::new(data, ["lat", "lon", "time"])
        .unwrap()
        .with_coord("time", linspace(0.0, 7.0, 8))
        .unwrap();

    let transformer = GridTransformer::new();
    let options = EofOptions::new().matrix(EofMatrix::Covariance);
    let patterns = transformer
        .eofunc(fi.clone(), 2, &options)
        .unwrap()
        .into_labeled()
        .unwrap();
    assert_eq!(patterns.dims(), ["evn", "lat", "lon"]);

    let eigenvalues: Vec<f64> = patterns.attrs()["eigenvalues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert!(eigenvalues[0] > eigenvalues[1]);
    let pcvar: f64 = patterns.attrs()["pcvar"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .sum();
    assert_approx_eq!(pcvar, 100.0, 1e-6);

    let series = transformer.eofunc_ts(fi, 2, &options).unwrap().into_labeled().unwrap();
    assert_eq!(series.dims(), ["evn", "time"]);
    assert_eq!(series.coord("time").unwrap()[7], 7.0);
}

#[test]
fn test_pressure_thickness_over_time() {
    let levels = LabeledArray::new(arr1(&[1000.0, 925.0, 850.0, 700.0, 500.0, 300.0]), ["plev"])
        .unwrap()
        .with_attr("units", "hPa");
    let psfc = LabeledArray::new(
        Array3::from_shape_fn((2, 2, 2), |(t, j, i)| 1010.0 - (t * 40 + j * 100 + i * 5) as f64),
        ["time", "lat", "lon"],
    )
    .unwrap()
    .with_attr("units", "hPa");

    let out = GridTransformer::new()
        .dpres_plevel(levels, psfc.clone(), Some(200.0), &TransformOptions::default())
        .unwrap()
        .into_labeled()
        .unwrap();
    assert_eq!(out.dims(), ["time", "plev", "lat", "lon"]);
    assert_eq!(out.shape(), &[2, 6, 2, 2]);

    for t in 0..2 {
        for j in 0..2 {
            for i in 0..2 {
                let column: f64 = (0..6)
                    .map(|k| out.data()[[t, k, j, i]])
                    .filter(|v| !v.is_nan())
                    .sum();
                assert_approx_eq!(column, psfc.data()[[t, j, i]] - 200.0, 1e-9);
            }
        }
    }
}
