//! Input validation run before any data movement.
//!
//! Every predicate is pure and names the operation and argument in its
//! error message. Transforms call these in sequence, so an invalid input is
//! rejected before a single block reaches the kernel.

use ndarray::{Array1, ArrayD, ArrayView1, ArrayView2, Ix1, Ix2};

use crate::array::LabeledArray;
use crate::error::{Result, TransformError};
use crate::types::Attributes;

/// Views `array` as rank 1.
pub fn rank1<'a>(op: &str, name: &str, array: &'a ArrayD<f64>) -> Result<ArrayView1<'a, f64>> {
    array.view().into_dimensionality::<Ix1>().map_err(|_| {
        TransformError::dimension(format!(
            "{op}: `{name}` must be 1-D, found rank {}",
            array.ndim()
        ))
    })
}

/// Views `array` as rank 2.
pub fn rank2<'a>(op: &str, name: &str, array: &'a ArrayD<f64>) -> Result<ArrayView2<'a, f64>> {
    array.view().into_dimensionality::<Ix2>().map_err(|_| {
        TransformError::dimension(format!(
            "{op}: `{name}` must be 2-D, found rank {}",
            array.ndim()
        ))
    })
}

pub fn min_rank(op: &str, name: &str, ndim: usize, min: usize) -> Result<()> {
    if ndim < min {
        return Err(TransformError::dimension(format!(
            "{op}: `{name}` must be at least {min}-D, found rank {ndim}"
        )));
    }
    Ok(())
}

pub fn exact_rank(op: &str, name: &str, ndim: usize, expected: usize) -> Result<()> {
    if ndim != expected {
        return Err(TransformError::dimension(format!(
            "{op}: `{name}` must be {expected}-D, found rank {ndim}"
        )));
    }
    Ok(())
}

/// A coordinate's length must match the data extent it describes.
pub fn matching_extent(op: &str, name: &str, len: usize, extent: usize, what: &str) -> Result<()> {
    if len != extent {
        return Err(TransformError::dimension(format!(
            "{op}: `{name}` has length {len}, but {what} has extent {extent}"
        )));
    }
    Ok(())
}

/// Paired arguments such as `xo`/`yo` must agree in length.
pub fn paired_lengths(op: &str, a: (&str, usize), b: (&str, usize)) -> Result<()> {
    if a.1 != b.1 {
        return Err(TransformError::dimension(format!(
            "{op}: `{}` (length {}) and `{}` (length {}) must have the same length",
            a.0, a.1, b.0, b.1
        )));
    }
    Ok(())
}

pub fn matching_shape(op: &str, name: &str, shape: &[usize], expected: &[usize], what: &str) -> Result<()> {
    if shape != expected {
        return Err(TransformError::dimension(format!(
            "{op}: `{name}` has shape {shape:?}, but {what} has shape {expected:?}"
        )));
    }
    Ok(())
}

pub fn min_extent(op: &str, name: &str, extent: usize, min: usize) -> Result<()> {
    if extent < min {
        return Err(TransformError::dimension(format!(
            "{op}: `{name}` needs at least {min} points, found {extent}"
        )));
    }
    Ok(())
}

/// Resolves the coordinate for `axis` of `array`: an explicit argument wins,
/// otherwise the array's own coordinate for that dimension is used.
pub fn axis_coordinate<T>(
    op: &str,
    name: &str,
    explicit: Option<&ArrayD<f64>>,
    array: &LabeledArray<T>,
    axis: usize,
) -> Result<Array1<f64>> {
    let dim = &array.dims()[axis];
    let coord = match explicit {
        Some(values) => rank1(op, name, values)?.to_owned(),
        None => array.axis_coord(axis).cloned().ok_or_else(|| {
            TransformError::coordinate(format!(
                "{op}: `{name}` must be provided when the input has no coordinate for dimension `{dim}`"
            ))
        })?,
    };
    matching_extent(op, name, coord.len(), array.shape()[axis], &format!("dimension `{dim}`"))?;
    Ok(coord)
}

/// Physically linked arguments must agree on `units`. Both absent is fine.
pub fn units_match(
    op: &str,
    a: (&str, Option<&Attributes>),
    b: (&str, Option<&Attributes>),
) -> Result<()> {
    let units_a = a.1.and_then(|attrs| attrs.get("units"));
    let units_b = b.1.and_then(|attrs| attrs.get("units"));
    match (units_a, units_b) {
        (None, None) => Ok(()),
        (Some(ua), Some(ub)) if ua == ub => Ok(()),
        (Some(ua), Some(ub)) => Err(TransformError::attribute(format!(
            "{op}: `{}` has units {ua} but `{}` has units {ub}",
            a.0, b.0
        ))),
        (Some(_), None) | (None, Some(_)) => Err(TransformError::attribute(format!(
            "{op}: units must be given for both `{}` and `{}` or for neither",
            a.0, b.0
        ))),
    }
}

/// The trailing `active` dimensions must each sit in a single block.
pub fn active_dims_whole<T>(op: &str, array: &LabeledArray<T>, active: usize) -> Result<()> {
    let ndim = array.ndim();
    for axis in ndim.saturating_sub(active)..ndim {
        let blocks = array.axis_chunks(axis);
        if blocks.len() > 1 {
            return Err(TransformError::chunk(format!(
                "{op}: dimension `{}` is split into blocks {blocks:?}; \
                 it must be a single block of extent {}",
                array.dims()[axis],
                array.shape()[axis]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array2, IxDyn};
    use serde_json::json;

    fn attrs(units: &str) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("units".to_string(), json!(units));
        attrs
    }

    #[test]
    fn test_rank_checks() {
        let flat = arr1(&[1.0, 2.0]).into_dyn();
        assert!(rank1("op", "xi", &flat).is_ok());
        let err = rank2("op", "lat2d", &flat).unwrap_err();
        assert_eq!(err.to_string(), "dimension error: op: `lat2d` must be 2-D, found rank 1");
    }

    #[test]
    fn test_axis_coordinate_prefers_explicit() {
        let array = LabeledArray::new(Array2::<f64>::zeros((2, 3)), ["lat", "lon"])
            .unwrap()
            .with_coord("lon", arr1(&[0.0, 1.0, 2.0]))
            .unwrap();

        let explicit = arr1(&[5.0, 6.0, 7.0]).into_dyn();
        let coord = axis_coordinate("op", "xi", Some(&explicit), &array, 1).unwrap();
        assert_eq!(coord[0], 5.0);

        let coord = axis_coordinate("op", "xi", None, &array, 1).unwrap();
        assert_eq!(coord[2], 2.0);

        let err = axis_coordinate("op", "yi", None, &array, 0).unwrap_err();
        assert!(matches!(err, TransformError::CoordinateError(_)));

        let short = ArrayD::<f64>::zeros(IxDyn(&[2]));
        let err = axis_coordinate("op", "xi", Some(&short), &array, 1).unwrap_err();
        assert!(matches!(err, TransformError::DimensionError(_)));
    }

    #[test]
    fn test_units() {
        let hpa = attrs("hPa");
        let pa = attrs("Pa");
        assert!(units_match("op", ("a", Some(&hpa)), ("b", Some(&hpa))).is_ok());
        assert!(units_match("op", ("a", None), ("b", None)).is_ok());
        assert!(matches!(
            units_match("op", ("a", Some(&hpa)), ("b", Some(&pa))),
            Err(TransformError::AttributeError(_))
        ));
        assert!(matches!(
            units_match("op", ("a", Some(&hpa)), ("b", None)),
            Err(TransformError::AttributeError(_))
        ));
    }

    #[test]
    fn test_active_dims_whole() {
        let array = LabeledArray::new(Array2::<f64>::zeros((4, 6)), ["time", "x"])
            .unwrap()
            .with_chunks(vec![vec![2, 2], vec![6]])
            .unwrap();
        assert!(active_dims_whole("op", &array, 1).is_ok());
        assert!(matches!(
            active_dims_whole("op", &array, 2),
            Err(TransformError::ChunkError(_))
        ));
    }

    #[test]
    fn test_paired_and_extent() {
        assert!(paired_lengths("op", ("xo", 3), ("yo", 3)).is_ok());
        assert!(paired_lengths("op", ("xo", 3), ("yo", 2)).is_err());
        assert!(min_extent("op", "xi", 1, 2).is_err());
        assert!(matching_shape("op", "lat2d", &[2, 3], &[2, 3], "data").is_ok());
    }
}
