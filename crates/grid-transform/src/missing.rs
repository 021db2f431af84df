//! Bridging between host and kernel missing-value conventions.
//!
//! Hosts mark no-data with NaN (or a caller-chosen scalar). Kernels expect a
//! dtype-specific extremal sentinel. Every block is bridged in exactly once
//! before the kernel call and bridged out exactly once after it, using one
//! [`MissingValues`] descriptor resolved per call.
//!
//! | dtype         | host default  | kernel sentinel |
//! |---------------|---------------|-----------------|
//! | signed int    | `MAX`         | `MAX`           |
//! | unsigned int  | `MAX`         | `MAX`           |
//! | float         | NaN           | `MAX`           |
//! | complex       | NaN + NaN i   | `MAX` + 0 i     |
//! | string        | `""`          | `""`            |
//! | bool          | unsupported   | unsupported     |

use std::fmt;

use ndarray::{ArrayBase, DataMut, Dimension};
use num_complex::Complex;
use num_traits::Float;

use crate::error::{Result, TransformError};
use crate::types::{DataType, FillValue};

impl DataType {
    /// Host sentinel used when the caller does not pass one.
    pub fn host_default(&self) -> Option<FillValue> {
        match self {
            Self::Bool => None,
            Self::Float32 | Self::Float64 => Some(FillValue::Float(f64::NAN)),
            Self::Complex64 | Self::Complex128 => Some(FillValue::Complex(f64::NAN, f64::NAN)),
            Self::String => Some(FillValue::Text(String::new())),
            integer => integer.kernel_sentinel(),
        }
    }

    /// Sentinel the kernel recognises as missing.
    pub fn kernel_sentinel(&self) -> Option<FillValue> {
        match self {
            Self::Bool => None,
            Self::Int8 => Some(FillValue::Int(i8::MAX.into())),
            Self::Int16 => Some(FillValue::Int(i16::MAX.into())),
            Self::Int32 => Some(FillValue::Int(i32::MAX.into())),
            Self::Int64 => Some(FillValue::Int(i64::MAX)),
            Self::UInt8 => Some(FillValue::UInt(u8::MAX.into())),
            Self::UInt16 => Some(FillValue::UInt(u16::MAX.into())),
            Self::UInt32 => Some(FillValue::UInt(u32::MAX.into())),
            Self::UInt64 => Some(FillValue::UInt(u64::MAX)),
            Self::Float32 => Some(FillValue::Float(f32::MAX.into())),
            Self::Float64 => Some(FillValue::Float(f64::MAX)),
            Self::Complex64 => Some(FillValue::Complex(f32::MAX.into(), 0.0)),
            Self::Complex128 => Some(FillValue::Complex(f64::MAX, 0.0)),
            Self::String => Some(FillValue::Text(String::new())),
        }
    }
}

fn nan_aware_eq<F: Float>(value: F, sentinel: F) -> bool {
    if sentinel.is_nan() {
        value.is_nan()
    } else {
        value == sentinel
    }
}

/// An element type that can cross the dispatch layer.
pub trait Element: Clone + Send + Sync + fmt::Debug + 'static {
    const DATA_TYPE: DataType;

    /// Converts a type-erased sentinel into this type, if representable.
    fn from_fill(fill: &FillValue) -> Option<Self>;

    /// Whether `self` counts as `sentinel`. NaN sentinels match any NaN.
    fn is_missing(&self, sentinel: &Self) -> bool;
}

macro_rules! impl_element_int {
    ($($t:ty => $dt:ident),* $(,)?) => {$(
        impl Element for $t {
            const DATA_TYPE: DataType = DataType::$dt;

            fn from_fill(fill: &FillValue) -> Option<Self> {
                match *fill {
                    FillValue::Int(v) => <$t>::try_from(v).ok(),
                    FillValue::UInt(v) => <$t>::try_from(v).ok(),
                    _ => None,
                }
            }

            fn is_missing(&self, sentinel: &Self) -> bool {
                self == sentinel
            }
        }
    )*};
}

impl_element_int!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
);

macro_rules! impl_element_float {
    ($($t:ty => $dt:ident, $cdt:ident),* $(,)?) => {$(
        impl Element for $t {
            const DATA_TYPE: DataType = DataType::$dt;

            fn from_fill(fill: &FillValue) -> Option<Self> {
                match *fill {
                    FillValue::Float(v) => Some(v as $t),
                    _ => None,
                }
            }

            fn is_missing(&self, sentinel: &Self) -> bool {
                nan_aware_eq(*self, *sentinel)
            }
        }

        impl Element for Complex<$t> {
            const DATA_TYPE: DataType = DataType::$cdt;

            fn from_fill(fill: &FillValue) -> Option<Self> {
                match *fill {
                    FillValue::Complex(re, im) => Some(Complex::new(re as $t, im as $t)),
                    _ => None,
                }
            }

            fn is_missing(&self, sentinel: &Self) -> bool {
                if sentinel.re.is_nan() || sentinel.im.is_nan() {
                    self.re.is_nan() || self.im.is_nan()
                } else {
                    self == sentinel
                }
            }
        }
    )*};
}

impl_element_float!(f32 => Float32, Complex64, f64 => Float64, Complex128);

impl Element for String {
    const DATA_TYPE: DataType = DataType::String;

    fn from_fill(fill: &FillValue) -> Option<Self> {
        match fill {
            FillValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn is_missing(&self, sentinel: &Self) -> bool {
        self == sentinel
    }
}

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn from_fill(_fill: &FillValue) -> Option<Self> {
        None
    }

    fn is_missing(&self, sentinel: &Self) -> bool {
        self == sentinel
    }
}

/// A real element type the kernels can compute on.
///
/// Kernels run in `f64`. Conversions back saturate at the type bounds, so a
/// kernel sentinel of `f64` maps back to the integer `MAX` sentinel.
pub trait KernelScalar: Element + Copy {
    fn to_kernel(self) -> f64;
    fn from_kernel(value: f64) -> Self;
}

macro_rules! impl_kernel_scalar {
    ($($t:ty),* $(,)?) => {$(
        impl KernelScalar for $t {
            #[inline]
            fn to_kernel(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_kernel(value: f64) -> Self {
                value as $t
            }
        }
    )*};
}

impl_kernel_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// The (host, kernel) sentinel pair for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingValues<T> {
    host: T,
    kernel: T,
}

impl<T: Element> MissingValues<T> {
    /// Resolves the pair for `T`, falling back to the dtype's host default
    /// when `host` is `None`.
    pub fn resolve(host: Option<T>) -> Result<Self> {
        let unsupported = || TransformError::UnsupportedDtype(T::DATA_TYPE);
        let kernel = T::DATA_TYPE
            .kernel_sentinel()
            .and_then(|fill| T::from_fill(&fill))
            .ok_or_else(unsupported)?;
        let host = match host {
            Some(value) => value,
            None => T::DATA_TYPE
                .host_default()
                .and_then(|fill| T::from_fill(&fill))
                .ok_or_else(unsupported)?,
        };
        Ok(Self { host, kernel })
    }

    pub fn host(&self) -> &T {
        &self.host
    }

    pub fn kernel(&self) -> &T {
        &self.kernel
    }

    /// Replaces host sentinels with the kernel sentinel in place. Returns the
    /// number of elements replaced.
    pub fn bridge_in<S, D>(&self, array: &mut ArrayBase<S, D>) -> usize
    where
        S: DataMut<Elem = T>,
        D: Dimension,
    {
        replace(array, &self.host, &self.kernel)
    }

    /// Replaces kernel sentinels with the host sentinel in place. Returns the
    /// number of elements replaced.
    pub fn bridge_out<S, D>(&self, array: &mut ArrayBase<S, D>) -> usize
    where
        S: DataMut<Elem = T>,
        D: Dimension,
    {
        replace(array, &self.kernel, &self.host)
    }
}

fn replace<T, S, D>(array: &mut ArrayBase<S, D>, from: &T, to: &T) -> usize
where
    T: Element,
    S: DataMut<Elem = T>,
    D: Dimension,
{
    let mut replaced = 0;
    array.map_inplace(|value| {
        if value.is_missing(from) {
            *value = to.clone();
            replaced += 1;
        }
    });
    replaced
}

/// Resolves the sentinel pair for `array` and bridges it into kernel
/// convention. The returned descriptor must be reused for [`bridge_out`].
pub fn bridge_in<T, S, D>(array: &mut ArrayBase<S, D>, host: Option<T>) -> Result<MissingValues<T>>
where
    T: Element,
    S: DataMut<Elem = T>,
    D: Dimension,
{
    let missing = MissingValues::resolve(host)?;
    missing.bridge_in(array);
    Ok(missing)
}

/// Restores host sentinels wherever the kernel sentinel appears.
pub fn bridge_out<T, S, D>(array: &mut ArrayBase<S, D>, missing: &MissingValues<T>)
where
    T: Element,
    S: DataMut<Elem = T>,
    D: Dimension,
{
    missing.bridge_out(array);
}
