//! Scalar abstraction for input and output coordinates.
//!
//! The triangulation itself always computes in `f64`. Callers may hand in
//! single- or double-precision coordinates, and the output mesh can either
//! match the input precision or force one of the two. [`CoordinateScalar`]
//! captures what the crate needs from such a scalar type.

use num_traits::{Float, NumCast, cast};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Floating-point precision of a coordinate array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Precision {
    /// 32-bit IEEE 754 coordinates.
    Single,
    /// 64-bit IEEE 754 coordinates.
    Double,
}

/// Errors that can occur when converting a coordinate between scalar types.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoordinateConversionError {
    /// The value is not representable in the target type.
    #[error("Failed to convert coordinate value {value} from {from_type} to {to_type}")]
    ConversionFailed {
        /// String representation of the problematic value
        value: String,
        /// Source type name
        from_type: &'static str,
        /// Target type name
        to_type: &'static str,
    },
    /// Non-finite value (NaN or infinity) encountered.
    #[error("Non-finite coordinate value {value}")]
    NonFiniteValue {
        /// String representation of the non-finite value
        value: String,
    },
}

/// Trait alias for the scalar types accepted as input coordinates.
///
/// # Required Traits
///
/// - `Float`: floating-point arithmetic and classification
/// - `NumCast`: lossless or checked conversion to and from `f64`
/// - `Default`, `Copy`, `Debug`
/// - `Serialize` / `DeserializeOwned`: output meshes are serializable
///
/// # Examples
///
/// ```rust
/// use delaunay3d::geometry::traits::coordinate::{CoordinateScalar, Precision};
///
/// assert_eq!(f32::PRECISION, Precision::Single);
/// assert_eq!(f64::PRECISION, Precision::Double);
/// assert_eq!(2.5_f32.to_f64_checked().unwrap(), 2.5);
/// ```
pub trait CoordinateScalar:
    Float + NumCast + Default + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Precision this scalar type stores.
    const PRECISION: Precision;

    /// Converts the value to `f64`, rejecting NaN and infinities.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateConversionError::NonFiniteValue`] for NaN or
    /// infinite input and [`CoordinateConversionError::ConversionFailed`] if
    /// the cast itself fails.
    fn to_f64_checked(self) -> Result<f64, CoordinateConversionError> {
        if !self.is_finite() {
            return Err(CoordinateConversionError::NonFiniteValue {
                value: format!("{self:?}"),
            });
        }
        cast::<Self, f64>(self).ok_or_else(|| CoordinateConversionError::ConversionFailed {
            value: format!("{self:?}"),
            from_type: std::any::type_name::<Self>(),
            to_type: "f64",
        })
    }

    /// Converts an `f64` back into this scalar type.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateConversionError::ConversionFailed`] if `value` is
    /// outside the finite range of `Self`.
    fn from_f64_checked(value: f64) -> Result<Self, CoordinateConversionError> {
        cast::<f64, Self>(value)
            .filter(|converted| converted.is_finite())
            .ok_or_else(|| CoordinateConversionError::ConversionFailed {
                value: format!("{value:?}"),
                from_type: "f64",
                to_type: std::any::type_name::<Self>(),
            })
    }
}

impl CoordinateScalar for f32 {
    const PRECISION: Precision = Precision::Single;
}

impl CoordinateScalar for f64 {
    const PRECISION: Precision = Precision::Double;
}
