//! Point type used throughout the triangulation.
//!
//! All geometry is computed in double precision on [`nalgebra::Point3`].
//! Input coordinates of any [`CoordinateScalar`] are converted on entry and
//! rejected if they are not finite.

use crate::geometry::traits::coordinate::{CoordinateConversionError, CoordinateScalar};

/// A point in 3D Euclidean space.
pub type Point = nalgebra::Point3<f64>;

/// A displacement between two [`Point`]s.
pub type Vector = nalgebra::Vector3<f64>;

/// Converts caller coordinates into a double-precision [`Point`].
///
/// # Errors
///
/// Returns the axis (0, 1 or 2) and the conversion error for the first
/// coordinate that is NaN, infinite, or not representable as `f64`.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::geometry::point::{Point, point_from_coords};
///
/// let p = point_from_coords(&[1.0_f32, 2.0, 3.0]).unwrap();
/// assert_eq!(p, Point::new(1.0, 2.0, 3.0));
/// assert!(point_from_coords(&[0.0, f64::NAN, 0.0]).is_err());
/// ```
pub fn point_from_coords<T: CoordinateScalar>(
    coords: &[T; 3],
) -> Result<Point, (usize, CoordinateConversionError)> {
    let mut xyz = [0.0_f64; 3];
    for (axis, value) in coords.iter().enumerate() {
        xyz[axis] = value.to_f64_checked().map_err(|e| (axis, e))?;
    }
    Ok(Point::from(xyz))
}

/// Returns the coordinates of `point` as a plain array.
#[inline]
#[must_use]
pub fn to_array(point: &Point) -> [f64; 3] {
    [point.x, point.y, point.z]
}
