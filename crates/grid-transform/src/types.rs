//! Core types for grid transforms.

use std::fmt;

use grid_kernel::{DistanceMethod, EofMatrix};
use serde::{Deserialize, Serialize};

/// String-keyed provenance attributes of a labeled array.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Element type of an array crossing the dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A missing-value sentinel independent of the concrete element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(f64, f64),
    Text(String),
}

/// Whether the primary input of a call carried labels. Decided once at the
/// entry point and used to demote the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Labeled,
    Unlabeled,
}

macro_rules! common_option_setters {
    () => {
        /// Host missing value. Defaults to NaN for floating and complex data.
        pub fn missing_value(mut self, value: T) -> Self {
            self.missing_value = Some(value);
            self
        }

        /// Whether the output carries the input's attributes.
        pub fn keep_attrs(mut self, keep: bool) -> Self {
            self.keep_attrs = Some(keep);
            self
        }
    };
}

/// Options shared by every transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions<T> {
    pub missing_value: Option<T>,
    /// `None` falls back to [`crate::TransformConfig::keep_attrs`].
    pub keep_attrs: Option<bool>,
}

impl<T> Default for TransformOptions<T> {
    fn default() -> Self {
        Self {
            missing_value: None,
            keep_attrs: None,
        }
    }
}

impl<T> TransformOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    common_option_setters!();
}

/// Options for the linear interpolation family.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpOptions<T> {
    /// Treat the rightmost input axis as periodic.
    pub cyclic: bool,
    pub missing_value: Option<T>,
    pub keep_attrs: Option<bool>,
}

impl<T> Default for InterpOptions<T> {
    fn default() -> Self {
        Self {
            cyclic: false,
            missing_value: None,
            keep_attrs: None,
        }
    }
}

impl<T> InterpOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cyclic(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }

    common_option_setters!();
}

/// Options for placing scattered values onto a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleToGridOptions<T> {
    pub method: DistanceMethod,
    /// Grid spacings by which the grid bounds are widened. Zero or negative
    /// restricts placement to the grid itself.
    pub domain: f64,
    /// Search radius in kilometres. Only valid with great-circle placement.
    pub distmx: Option<f64>,
    pub missing_value: Option<T>,
    pub keep_attrs: Option<bool>,
}

impl<T> Default for TripleToGridOptions<T> {
    fn default() -> Self {
        Self {
            method: DistanceMethod::GreatCircle,
            domain: 1.0,
            distmx: None,
            missing_value: None,
            keep_attrs: None,
        }
    }
}

impl<T> TripleToGridOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: DistanceMethod) -> Self {
        self.method = method;
        self
    }

    pub fn domain(mut self, domain: f64) -> Self {
        self.domain = domain;
        self
    }

    pub fn distmx(mut self, distmx: f64) -> Self {
        self.distmx = Some(distmx);
        self
    }

    common_option_setters!();
}

/// Options for the EOF decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct EofOptions<T> {
    pub matrix: EofMatrix,
    /// Minimum percentage of valid observations per station.
    pub pcrit: f64,
    /// Observation (time) axis. Negative values count from the end.
    pub time_dim: isize,
    pub missing_value: Option<T>,
    pub keep_attrs: Option<bool>,
}

impl<T> Default for EofOptions<T> {
    fn default() -> Self {
        Self {
            matrix: EofMatrix::Covariance,
            pcrit: 50.0,
            time_dim: -1,
            missing_value: None,
            keep_attrs: None,
        }
    }
}

impl<T> EofOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matrix(mut self, matrix: EofMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn pcrit(mut self, pcrit: f64) -> Self {
        self.pcrit = pcrit;
        self
    }

    pub fn time_dim(mut self, time_dim: isize) -> Self {
        self.time_dim = time_dim;
        self
    }

    common_option_setters!();
}
