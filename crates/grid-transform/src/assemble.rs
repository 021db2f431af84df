//! Reassembly of output blocks into the caller-facing result.

use ndarray::{Array1, ArrayD, IxDyn};

use crate::array::{GridArray, LabeledArray};
use crate::dispatch::TransformDescriptor;
use crate::error::{Result, TransformError};
use crate::plan::ChunkPlan;
use crate::types::InputKind;

/// Name and optional coordinate of one output dimension that replaces the
/// transformed (active) dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDim {
    pub name: String,
    pub coord: Option<Array1<f64>>,
}

impl OutputDim {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coord: None,
        }
    }

    pub fn with_coord(mut self, coord: Array1<f64>) -> Self {
        self.coord = Some(coord);
        self
    }

    /// Keeps the source dimension name but none of its coordinates.
    pub fn renamed_from<T>(source: &LabeledArray<T>, axis: usize) -> Self {
        Self::new(source.dims()[axis].clone())
    }

    /// Keeps the source dimension unchanged, coordinate included.
    pub fn kept_from<T>(source: &LabeledArray<T>, axis: usize) -> Self {
        Self {
            name: source.dims()[axis].clone(),
            coord: source.axis_coord(axis).cloned(),
        }
    }
}

/// How the assembler labels its result.
#[derive(Debug, Clone)]
pub struct Assembly<'a, T> {
    pub source: &'a LabeledArray<T>,
    pub kind: InputKind,
    pub trailing: Vec<OutputDim>,
    pub keep_attrs: bool,
}

/// Concatenates `blocks` in plan order into one array with the batch
/// dimensions of the source followed by the `trailing` output dimensions.
///
/// Batch coordinates are carried over, the trailing ones come from
/// `assembly.trailing`. Attributes are copied when `keep_attrs` is set. An
/// unlabeled input yields an unlabeled result. The output element type `U`
/// may differ from the source's `T`.
pub fn assemble<T, U: Clone>(
    blocks: Vec<ArrayD<U>>,
    plan: &ChunkPlan,
    descriptor: &TransformDescriptor,
    assembly: Assembly<'_, T>,
) -> Result<GridArray<U>> {
    let batch = plan.batch_ndim();
    let trailing_shape: Vec<usize> = match blocks.first() {
        Some(first) => first.shape()[batch..].to_vec(),
        None => descriptor.output.extents().to_vec(),
    };
    if let Some(ragged) = blocks.iter().position(|b| b.shape()[batch..] != trailing_shape[..]) {
        return Err(TransformError::dimension(format!(
            "{}: block {ragged} has trailing shape {:?}, block 0 has {:?}",
            descriptor.name,
            &blocks[ragged].shape()[batch..],
            trailing_shape
        )));
    }
    if assembly.trailing.len() != trailing_shape.len() {
        return Err(TransformError::dimension(format!(
            "{}: {} output dimension names for {} output axes",
            descriptor.name,
            assembly.trailing.len(),
            trailing_shape.len()
        )));
    }

    let mut shape = plan.batch_shape().to_vec();
    shape.extend_from_slice(&trailing_shape);
    let flat: Vec<U> = blocks.iter().flat_map(|b| b.iter().cloned()).collect();
    let data = ArrayD::from_shape_vec(IxDyn(&shape), flat)?;

    tracing::debug!(
        op = descriptor.name,
        output_shape = ?shape,
        labeled = assembly.kind == InputKind::Labeled,
        "assembled transform output"
    );

    if assembly.kind == InputKind::Unlabeled {
        return Ok(GridArray::Unlabeled(data));
    }

    let source = assembly.source;
    let dims = source.dims()[..batch]
        .iter()
        .cloned()
        .chain(assembly.trailing.iter().map(|d| d.name.clone()));
    let mut output = LabeledArray::new(data, dims)?;

    for dim in &source.dims()[..batch] {
        if let Some(coord) = source.coord(dim) {
            output = output.with_coord(dim, coord.clone())?;
        }
    }
    for dim in assembly.trailing {
        if let Some(coord) = dim.coord {
            output = output.with_coord(&dim.name, coord)?;
        }
    }
    if assembly.keep_attrs {
        output = output.with_attrs(source.attrs().clone());
    }
    Ok(GridArray::Labeled(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::OutputRule;
    use ndarray::{arr1, Array3};

    fn source() -> LabeledArray<f64> {
        LabeledArray::new(Array3::<f64>::zeros((2, 3, 4)), ["time", "lat", "lon"])
            .unwrap()
            .with_coord("time", arr1(&[0.0, 6.0]))
            .unwrap()
            .with_coord("lon", arr1(&[0.0, 1.0, 2.0, 3.0]))
            .unwrap()
            .with_attr("units", "K")
    }

    /// `count` blocks with one unit axis per batch dimension.
    fn blocks(count: usize, batch: usize, trailing: &[usize]) -> Vec<ArrayD<f64>> {
        let mut shape = vec![1; batch];
        shape.extend_from_slice(trailing);
        (0..count)
            .map(|i| ArrayD::from_elem(IxDyn(&shape), i as f64))
            .collect()
    }

    #[test]
    fn test_substitutes_trailing_coords() {
        let source = source();
        let plan = ChunkPlan::for_array(&source, 2).unwrap();
        let descriptor = TransformDescriptor::new("regrid", 2, OutputRule::Replace(vec![2, 5]));
        let assembly = Assembly {
            source: &source,
            kind: InputKind::Labeled,
            trailing: vec![
                OutputDim::new("lat").with_coord(arr1(&[-1.0, 1.0])),
                OutputDim::new("lon").with_coord(arr1(&[0.0, 0.5, 1.0, 1.5, 2.0])),
            ],
            keep_attrs: true,
        };

        let GridArray::Labeled(out) = assemble(blocks(2, 1, &[2, 5]), &plan, &descriptor, assembly).unwrap() else {
            panic!("expected labeled output");
        };
        assert_eq!(out.shape(), &[2, 2, 5]);
        assert_eq!(out.coord("time").unwrap()[1], 6.0);
        assert_eq!(out.coord("lon").unwrap().len(), 5);
        assert_eq!(out.units(), Some(&serde_json::json!("K")));
        assert_eq!(out.data()[[1, 0, 0]], 1.0);
    }

    #[test]
    fn test_drop_attrs_and_demote() {
        let source = source();
        let plan = ChunkPlan::for_array(&source, 1).unwrap();
        let descriptor = TransformDescriptor::new("interp", 1, OutputRule::Replace(vec![3]));

        let labeled = assemble(
            blocks(6, 2, &[3]),
            &plan,
            &descriptor,
            Assembly {
                source: &source,
                kind: InputKind::Labeled,
                trailing: vec![OutputDim::renamed_from(&source, 2)],
                keep_attrs: false,
            },
        )
        .unwrap();
        assert!(labeled.attrs().unwrap().is_empty());
        assert!(labeled.as_labeled().unwrap().coord("lon").is_none());

        let unlabeled = assemble(
            blocks(6, 2, &[3]),
            &plan,
            &descriptor,
            Assembly {
                source: &source,
                kind: InputKind::Unlabeled,
                trailing: vec![OutputDim::new("lon")],
                keep_attrs: true,
            },
        )
        .unwrap();
        assert!(!unlabeled.is_labeled());
        assert_eq!(unlabeled.shape(), &[2, 3, 3]);
    }

    #[test]
    fn test_ragged_blocks_rejected() {
        let source = source();
        let plan = ChunkPlan::for_array(&source, 1).unwrap();
        let descriptor = TransformDescriptor::new("triple", 1, OutputRule::Truncate(vec![4]));
        let mut parts = blocks(5, 2, &[4]);
        parts.extend(blocks(1, 2, &[3]));

        let err = assemble(
            parts,
            &plan,
            &descriptor,
            Assembly {
                source: &source,
                kind: InputKind::Labeled,
                trailing: vec![OutputDim::new("pts")],
                keep_attrs: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::DimensionError(_)));
    }
}
