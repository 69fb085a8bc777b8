//! Geometric predicates for tetrahedra.
//!
//! Orientation and barycentric coordinates are evaluated in double
//! precision from triple products of edge vectors. No exact arithmetic is
//! attempted: the insertion algorithm tolerates near-degenerate cells by
//! counting them as degeneracies instead of failing.

use crate::geometry::point::{Point, Vector};

/// Represents the orientation of a tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The fourth point sees the first three clockwise (negative volume).
    NEGATIVE,
    /// The four points are coplanar.
    DEGENERATE,
    /// The fourth point sees the first three counterclockwise (positive volume).
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Determinant of the 3x3 matrix with rows `a`, `b`, `c`.
#[inline]
fn triple_product(a: &Vector, b: &Vector, c: &Vector) -> f64 {
    a.dot(&b.cross(c))
}

/// Six times the signed volume of the tetrahedron `(p0, p1, p2, p3)`.
///
/// The value is positive when `p0, p1, p2` appear counterclockwise as seen
/// from `p3`.
///
/// # Example
///
/// ```
/// use delaunay3d::geometry::point::Point;
/// use delaunay3d::geometry::predicates::signed_volume6;
///
/// let v = signed_volume6(
///     &Point::new(0.0, 0.0, 0.0),
///     &Point::new(1.0, 0.0, 0.0),
///     &Point::new(0.0, 1.0, 0.0),
///     &Point::new(0.0, 0.0, 1.0),
/// );
/// assert_eq!(v, 1.0);
/// ```
#[inline]
#[must_use]
pub fn signed_volume6(p0: &Point, p1: &Point, p2: &Point, p3: &Point) -> f64 {
    triple_product(&(p1 - p0), &(p2 - p0), &(p3 - p0))
}

/// Orientation of the tetrahedron `(p0, p1, p2, p3)`.
///
/// Coplanarity is decided with a relative tolerance scaled by the cube of the
/// longest edge vector from `p0`, so the answer does not depend on the
/// absolute size of the input.
#[must_use]
pub fn tetrahedron_orientation(p0: &Point, p1: &Point, p2: &Point, p3: &Point) -> Orientation {
    let (a, b, c) = (p1 - p0, p2 - p0, p3 - p0);
    let volume = triple_product(&a, &b, &c);
    let scale = a.norm().max(b.norm()).max(c.norm());
    let tolerance = f64::EPSILON * 16.0 * scale * scale * scale;

    if volume > tolerance {
        Orientation::POSITIVE
    } else if volume < -tolerance {
        Orientation::NEGATIVE
    } else {
        Orientation::DEGENERATE
    }
}

/// Barycentric coordinates of `x` with respect to the tetrahedron `tet`.
///
/// Coordinate `i` is the weight of vertex `i`; it is negative exactly when
/// `x` lies on the far side of the face opposite vertex `i`. The four
/// weights sum to one.
///
/// Returns `None` when the tetrahedron has zero volume or the weights are
/// not finite.
///
/// # Example
///
/// ```
/// use delaunay3d::geometry::point::Point;
/// use delaunay3d::geometry::predicates::barycentric_coordinates;
///
/// let tet = [
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
///     Point::new(0.0, 0.0, 1.0),
/// ];
/// let bc = barycentric_coordinates(&tet, &Point::new(0.25, 0.25, 0.25)).unwrap();
/// assert!(bc.iter().all(|&w| (w - 0.25).abs() < 1e-12));
/// ```
#[must_use]
pub fn barycentric_coordinates(tet: &[Point; 4], x: &Point) -> Option<[f64; 4]> {
    let a = tet[1] - tet[0];
    let b = tet[2] - tet[0];
    let c = tet[3] - tet[0];
    let d = x - tet[0];

    let volume = triple_product(&a, &b, &c);
    if volume == 0.0 || !volume.is_finite() {
        return None;
    }

    let w1 = triple_product(&d, &b, &c) / volume;
    let w2 = triple_product(&a, &d, &c) / volume;
    let w3 = triple_product(&a, &b, &d) / volume;
    let w0 = 1.0 - w1 - w2 - w3;

    let weights = [w0, w1, w2, w3];
    weights.iter().all(|w| w.is_finite()).then_some(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tet() -> [Point; 4] {
        [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_orientation_sign_flips_with_swap() {
        let t = unit_tet();
        assert_eq!(
            tetrahedron_orientation(&t[0], &t[1], &t[2], &t[3]),
            Orientation::POSITIVE
        );
        assert_eq!(
            tetrahedron_orientation(&t[1], &t[0], &t[2], &t[3]),
            Orientation::NEGATIVE
        );
    }

    #[test]
    fn test_orientation_coplanar_is_degenerate() {
        let p = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
        ];
        assert_eq!(
            tetrahedron_orientation(&p[0], &p[1], &p[2], &p[3]),
            Orientation::DEGENERATE
        );
        assert_eq!(format!("{}", Orientation::DEGENERATE), "DEGENERATE");
    }

    #[test]
    fn test_barycentric_vertices_and_outside() {
        let t = unit_tet();
        let bc = barycentric_coordinates(&t, &t[2]).unwrap();
        assert_relative_eq!(bc[2], 1.0);
        assert_relative_eq!(bc[0], 0.0);

        // Beyond the face opposite vertex 0 (the slanted face x + y + z = 1).
        let bc = barycentric_coordinates(&t, &Point::new(1.0, 1.0, 1.0)).unwrap();
        assert!(bc[0] < 0.0);
        assert!(bc[1..].iter().all(|&w| w > 0.0));
        assert_relative_eq!(bc.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_barycentric_flat_tetrahedron_is_none() {
        let flat = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
        ];
        assert!(barycentric_coordinates(&flat, &Point::new(0.2, 0.2, 0.0)).is_none());
    }
}
