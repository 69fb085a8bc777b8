//! Circumsphere calculations for tetrahedra, triangles and edges.
//!
//! The tetrahedron circumcenter is the closed-form solution of the
//! perpendicular-bisector system
//!
//! ```text
//! 2 (p_i - p_0) · (c - p_0) = |p_i - p_0|²,   i = 1, 2, 3
//! ```
//!
//! evaluated relative to `p_0` to keep the magnitudes small. Degenerate
//! (zero-volume) tetrahedra get an unbounded sphere so that any point tests
//! inside it.

use serde::{Deserialize, Serialize};

use crate::geometry::point::Point;

/// Relative tolerance applied to the squared radius in
/// [`Circumsphere::contains`].
///
/// A point counts as inside only when its squared distance to the center is
/// below `radius² · (1 - INSPHERE_RELATIVE_TOLERANCE)`, so points that lie on
/// the sphere up to rounding are treated as outside.
pub const INSPHERE_RELATIVE_TOLERANCE: f64 = 1.0e-10;

/// Center and squared radius of a sphere.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circumsphere {
    /// The circumcenter.
    pub center: Point,
    /// The squared circumradius, or `f64::MAX` for degenerate input.
    pub radius_squared: f64,
}

impl Circumsphere {
    /// Sphere returned for degenerate simplices.
    #[must_use]
    pub const fn unbounded(center: Point) -> Self {
        Self {
            center,
            radius_squared: f64::MAX,
        }
    }

    /// Whether this sphere came from a degenerate simplex.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.radius_squared >= f64::MAX
    }

    /// Whether `point` lies strictly inside the sphere.
    ///
    /// # Example
    ///
    /// ```
    /// use delaunay3d::geometry::point::Point;
    /// use delaunay3d::geometry::util::circumsphere::Circumsphere;
    ///
    /// let sphere = Circumsphere { center: Point::origin(), radius_squared: 1.0 };
    /// assert!(sphere.contains(&Point::new(0.5, 0.0, 0.0)));
    /// assert!(!sphere.contains(&Point::new(1.0, 0.0, 0.0))); // on the sphere
    /// ```
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        (point - self.center).norm_squared()
            < self.radius_squared * (1.0 - INSPHERE_RELATIVE_TOLERANCE)
    }
}

/// Circumsphere of the tetrahedron `(p0, p1, p2, p3)`.
///
/// # Example
///
/// ```
/// use delaunay3d::geometry::point::Point;
/// use delaunay3d::geometry::util::circumsphere::tetrahedron_circumsphere;
///
/// let sphere = tetrahedron_circumsphere(
///     &Point::new(0.0, 0.0, 0.0),
///     &Point::new(1.0, 0.0, 0.0),
///     &Point::new(0.0, 1.0, 0.0),
///     &Point::new(0.0, 0.0, 1.0),
/// );
/// assert_eq!(sphere.center, Point::new(0.5, 0.5, 0.5));
/// assert!((sphere.radius_squared - 0.75).abs() < 1e-12);
/// ```
#[must_use]
pub fn tetrahedron_circumsphere(p0: &Point, p1: &Point, p2: &Point, p3: &Point) -> Circumsphere {
    let a = p1 - p0;
    let b = p2 - p0;
    let c = p3 - p0;

    let b_cross_c = b.cross(&c);
    let denominator = 2.0 * a.dot(&b_cross_c);
    if denominator == 0.0 || !denominator.is_finite() {
        return Circumsphere::unbounded(centroid(&[*p0, *p1, *p2, *p3]));
    }

    let offset = (b_cross_c * a.norm_squared()
        + c.cross(&a) * b.norm_squared()
        + a.cross(&b) * c.norm_squared())
        / denominator;
    let radius_squared = offset.norm_squared();

    if !radius_squared.is_finite() {
        return Circumsphere::unbounded(centroid(&[*p0, *p1, *p2, *p3]));
    }

    Circumsphere {
        center: p0 + offset,
        radius_squared,
    }
}

/// Squared radius of the circle through `p0`, `p1`, `p2`, measured in the
/// plane of the triangle.
///
/// Collinear triangles return `f64::MAX`.
///
/// # Example
///
/// ```
/// use delaunay3d::geometry::point::Point;
/// use delaunay3d::geometry::util::circumsphere::triangle_circumradius_squared;
///
/// // Right triangle: the hypotenuse is a diameter.
/// let r2 = triangle_circumradius_squared(
///     &Point::new(0.0, 0.0, 5.0),
///     &Point::new(2.0, 0.0, 5.0),
///     &Point::new(0.0, 2.0, 5.0),
/// );
/// assert!((r2 - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn triangle_circumradius_squared(p0: &Point, p1: &Point, p2: &Point) -> f64 {
    let a = p1 - p0;
    let b = p2 - p0;
    let cross_squared = a.cross(&b).norm_squared();
    if cross_squared == 0.0 {
        return f64::MAX;
    }
    let value =
        a.norm_squared() * b.norm_squared() * (a - b).norm_squared() / (4.0 * cross_squared);
    if value.is_finite() { value } else { f64::MAX }
}

/// Squared radius of the smallest sphere through both endpoints of an edge.
#[inline]
#[must_use]
pub fn edge_circumradius_squared(p0: &Point, p1: &Point) -> f64 {
    0.25 * (p1 - p0).norm_squared()
}

fn centroid(points: &[Point]) -> Point {
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    #[expect(clippy::cast_precision_loss, reason = "at most four points")]
    let count = points.len() as f64;
    Point::from(sum / count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_circumsphere_is_equidistant() {
        let p = [
            Point::new(0.3, -1.2, 0.7),
            Point::new(2.1, 0.4, -0.5),
            Point::new(-0.8, 1.9, 0.2),
            Point::new(0.5, 0.1, 2.6),
        ];
        let sphere = tetrahedron_circumsphere(&p[0], &p[1], &p[2], &p[3]);
        for q in &p {
            assert_relative_eq!(
                (q - sphere.center).norm_squared(),
                sphere.radius_squared,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_circumsphere_independent_of_vertex_order() {
        let p = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(1.0, 2.0, 0.0),
            Point::new(1.0, 0.7, 1.5),
        ];
        let s1 = tetrahedron_circumsphere(&p[0], &p[1], &p[2], &p[3]);
        let s2 = tetrahedron_circumsphere(&p[3], &p[1], &p[0], &p[2]);
        assert_relative_eq!(s1.radius_squared, s2.radius_squared, max_relative = 1e-12);
        assert_relative_eq!(s1.center, s2.center, epsilon = 1e-12);
        assert_relative_eq!(s1.center, Point::new(1.0, 0.75, 0.23), epsilon = 1e-12);
    }

    #[test]
    fn test_flat_tetrahedron_is_unbounded() {
        let sphere = tetrahedron_circumsphere(
            &Point::new(0.0, 0.0, 0.0),
            &Point::new(1.0, 0.0, 0.0),
            &Point::new(0.0, 1.0, 0.0),
            &Point::new(1.0, 1.0, 0.0),
        );
        assert!(sphere.is_unbounded());
        assert!(sphere.contains(&Point::new(1.0e6, -1.0e6, 3.0e5)));
    }

    #[test]
    fn test_contains_is_strict() {
        let sphere = Circumsphere {
            center: Point::new(1.0, 1.0, 1.0),
            radius_squared: 4.0,
        };
        assert!(sphere.contains(&Point::new(1.0, 1.0, 2.9)));
        assert!(!sphere.contains(&Point::new(1.0, 1.0, 3.0)));
        assert!(!sphere.contains(&Point::new(1.0, 1.0, 3.1)));
    }

    #[test]
    fn test_triangle_and_edge_radii() {
        let r2 = triangle_circumradius_squared(
            &Point::new(0.0, 0.0, 0.0),
            &Point::new(1.0, 0.0, 0.0),
            &Point::new(0.5, 3.0_f64.sqrt() / 2.0, 0.0),
        );
        assert_relative_eq!(r2, 1.0 / 3.0, max_relative = 1e-12);

        let collinear = triangle_circumradius_squared(
            &Point::new(0.0, 0.0, 0.0),
            &Point::new(1.0, 1.0, 1.0),
            &Point::new(2.0, 2.0, 2.0),
        );
        assert_eq!(collinear, f64::MAX);

        assert_relative_eq!(
            edge_circumradius_squared(&Point::new(0.0, 0.0, 0.0), &Point::new(0.0, 4.0, 0.0)),
            4.0
        );
    }
}
