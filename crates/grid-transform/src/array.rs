//! Labeled and unlabeled N-D arrays.

use std::collections::{BTreeMap, HashSet};

use ndarray::{Array, Array1, ArrayD, Dimension};

use crate::error::{Result, TransformError};
use crate::types::{Attributes, InputKind};

/// An N-D array with named dimensions, optional 1-D coordinates, an optional
/// partitioning and provenance attributes.
///
/// Invariants enforced by the constructors:
/// - one unique name per dimension
/// - a coordinate's length equals its dimension's extent
/// - partition block extents are positive and sum to the dimension's extent
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray<T> {
    data: ArrayD<T>,
    dims: Vec<String>,
    coords: BTreeMap<String, Array1<f64>>,
    chunks: Option<Vec<Vec<usize>>>,
    attrs: Attributes,
}

impl<T> LabeledArray<T> {
    /// Wraps `data` with one name per dimension.
    pub fn new<S, I, D>(data: Array<T, D>, dims: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
        D: Dimension,
    {
        let data = data.into_dyn();
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != data.ndim() {
            return Err(TransformError::dimension(format!(
                "{} dimension names given for an array of rank {}",
                dims.len(),
                data.ndim()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = dims.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(TransformError::dimension(format!(
                "duplicate dimension name `{dup}`"
            )));
        }
        Ok(Self {
            data,
            dims,
            coords: BTreeMap::new(),
            chunks: None,
            attrs: Attributes::new(),
        })
    }

    /// Promotes a raw array using synthetic names `dim_0..dim_{n-1}`.
    pub fn from_unlabeled<D: Dimension>(data: Array<T, D>) -> Self {
        let data = data.into_dyn();
        let dims = (0..data.ndim()).map(|i| format!("dim_{i}")).collect();
        Self {
            data,
            dims,
            coords: BTreeMap::new(),
            chunks: None,
            attrs: Attributes::new(),
        }
    }

    /// Attaches a coordinate to dimension `dim`.
    pub fn with_coord(mut self, dim: &str, values: Array1<f64>) -> Result<Self> {
        let axis = self.axis_of(dim).ok_or_else(|| {
            TransformError::coordinate(format!("no dimension named `{dim}`"))
        })?;
        let extent = self.data.shape()[axis];
        if values.len() != extent {
            return Err(TransformError::dimension(format!(
                "coordinate `{dim}` has length {}, dimension extent is {extent}",
                values.len()
            )));
        }
        self.coords.insert(dim.to_string(), values);
        Ok(self)
    }

    /// Declares a partitioning: for each dimension, its block extents in order.
    pub fn with_chunks(mut self, chunks: Vec<Vec<usize>>) -> Result<Self> {
        if chunks.len() != self.ndim() {
            return Err(TransformError::chunk(format!(
                "partitioning covers {} dimensions, array has {}",
                chunks.len(),
                self.ndim()
            )));
        }
        for ((name, blocks), &extent) in self.dims.iter().zip(&chunks).zip(self.data.shape()) {
            if blocks.iter().any(|&b| b == 0) {
                return Err(TransformError::chunk(format!(
                    "dimension `{name}` has an empty block"
                )));
            }
            let total: usize = blocks.iter().sum();
            if total != extent {
                return Err(TransformError::chunk(format!(
                    "blocks of dimension `{name}` sum to {total}, extent is {extent}"
                )));
            }
        }
        self.chunks = Some(chunks);
        Ok(self)
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<T> {
        self.data
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    pub fn coord(&self, dim: &str) -> Option<&Array1<f64>> {
        self.coords.get(dim)
    }

    /// Coordinate of the dimension at `axis`, if any.
    pub fn axis_coord(&self, axis: usize) -> Option<&Array1<f64>> {
        self.dims.get(axis).and_then(|dim| self.coords.get(dim))
    }

    pub fn coords(&self) -> &BTreeMap<String, Array1<f64>> {
        &self.coords
    }

    pub fn chunks(&self) -> Option<&[Vec<usize>]> {
        self.chunks.as_deref()
    }

    pub fn is_chunked(&self) -> bool {
        self.chunks.is_some()
    }

    /// Block extents along `axis`; a single full block when unpartitioned.
    pub fn axis_chunks(&self, axis: usize) -> Vec<usize> {
        match &self.chunks {
            Some(chunks) => chunks[axis].clone(),
            None => vec![self.data.shape()[axis]],
        }
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn units(&self) -> Option<&serde_json::Value> {
        self.attrs.get("units")
    }

    /// Reorders the axes. Coordinates follow their dimensions.
    pub fn permuted(self, order: &[usize]) -> Result<Self>
    where
        T: Clone,
    {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        if sorted != (0..self.ndim()).collect::<Vec<_>>() {
            return Err(TransformError::dimension(format!(
                "{order:?} is not a permutation of {} axes",
                self.ndim()
            )));
        }
        let data = self
            .data
            .permuted_axes(order.to_vec())
            .as_standard_layout()
            .into_owned();
        let dims = order.iter().map(|&i| self.dims[i].clone()).collect();
        let chunks = self
            .chunks
            .map(|chunks| order.iter().map(|&i| chunks[i].clone()).collect());
        Ok(Self {
            data,
            dims,
            coords: self.coords,
            chunks,
            attrs: self.attrs,
        })
    }
}

/// The primary input or output of a transform: labeled or a raw buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum GridArray<T> {
    Labeled(LabeledArray<T>),
    Unlabeled(ArrayD<T>),
}

impl<T> GridArray<T> {
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Labeled(_) => InputKind::Labeled,
            Self::Unlabeled(_) => InputKind::Unlabeled,
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.kind() == InputKind::Labeled
    }

    pub fn data(&self) -> &ArrayD<T> {
        match self {
            Self::Labeled(array) => array.data(),
            Self::Unlabeled(data) => data,
        }
    }

    pub fn into_data(self) -> ArrayD<T> {
        match self {
            Self::Labeled(array) => array.into_data(),
            Self::Unlabeled(data) => data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data().shape()
    }

    pub fn ndim(&self) -> usize {
        self.data().ndim()
    }

    pub fn as_labeled(&self) -> Option<&LabeledArray<T>> {
        match self {
            Self::Labeled(array) => Some(array),
            Self::Unlabeled(_) => None,
        }
    }

    pub fn into_labeled(self) -> Option<LabeledArray<T>> {
        match self {
            Self::Labeled(array) => Some(array),
            Self::Unlabeled(_) => None,
        }
    }

    pub fn attrs(&self) -> Option<&Attributes> {
        self.as_labeled().map(LabeledArray::attrs)
    }

    /// Labeled view of the input plus the kind to demote back to.
    pub fn promote(self) -> (LabeledArray<T>, InputKind) {
        match self {
            Self::Labeled(array) => (array, InputKind::Labeled),
            Self::Unlabeled(data) => (LabeledArray::from_unlabeled(data), InputKind::Unlabeled),
        }
    }
}

impl<T> From<LabeledArray<T>> for GridArray<T> {
    fn from(array: LabeledArray<T>) -> Self {
        Self::Labeled(array)
    }
}

impl<T, D: Dimension> From<Array<T, D>> for GridArray<T> {
    fn from(data: Array<T, D>) -> Self {
        Self::Unlabeled(data.into_dyn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array2, Array3};

    fn sample() -> LabeledArray<f64> {
        LabeledArray::new(Array2::<f64>::zeros((2, 3)), ["lat", "lon"]).unwrap()
    }

    #[test]
    fn test_new_checks_names() {
        let err = LabeledArray::new(Array2::<f64>::zeros((2, 3)), ["lat"]).unwrap_err();
        assert!(matches!(err, TransformError::DimensionError(_)));

        let err = LabeledArray::new(Array2::<f64>::zeros((2, 3)), ["x", "x"]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_coordinate_length_invariant() {
        let array = sample().with_coord("lon", arr1(&[0.0, 1.0, 2.0])).unwrap();
        assert_eq!(array.axis_coord(1).unwrap().len(), 3);

        let err = sample().with_coord("lat", arr1(&[0.0])).unwrap_err();
        assert!(matches!(err, TransformError::DimensionError(_)));
        let err = sample().with_coord("time", arr1(&[0.0])).unwrap_err();
        assert!(matches!(err, TransformError::CoordinateError(_)));
    }

    #[test]
    fn test_chunks_must_tile_extent() {
        let array = sample().with_chunks(vec![vec![1, 1], vec![3]]).unwrap();
        assert_eq!(array.axis_chunks(0), vec![1, 1]);

        assert!(matches!(
            sample().with_chunks(vec![vec![2], vec![2, 2]]),
            Err(TransformError::ChunkError(_))
        ));
        assert!(matches!(
            sample().with_chunks(vec![vec![2, 0], vec![3]]),
            Err(TransformError::ChunkError(_))
        ));
        assert_eq!(sample().axis_chunks(1), vec![3]);
    }

    #[test]
    fn test_promote_unlabeled() {
        let grid: GridArray<f64> = Array3::<f64>::zeros((2, 3, 4)).into();
        assert_eq!(grid.kind(), InputKind::Unlabeled);
        let (array, kind) = grid.promote();
        assert_eq!(kind, InputKind::Unlabeled);
        assert_eq!(array.dims(), ["dim_0", "dim_1", "dim_2"]);
    }

    #[test]
    fn test_permuted_moves_dims_and_chunks() {
        let array = sample()
            .with_coord("lat", arr1(&[10.0, 20.0]))
            .unwrap()
            .with_chunks(vec![vec![1, 1], vec![3]])
            .unwrap()
            .permuted(&[1, 0])
            .unwrap();
        assert_eq!(array.dims(), ["lon", "lat"]);
        assert_eq!(array.shape(), &[3, 2]);
        assert_eq!(array.axis_chunks(1), vec![1, 1]);
        assert_eq!(array.axis_coord(1).unwrap()[1], 20.0);
    }
}
