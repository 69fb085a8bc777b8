//! Axis-aligned bounding boxes.

use crate::geometry::point::{Point, Vector};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::geometry::bounds::Bounds;
/// use delaunay3d::geometry::point::Point;
///
/// let points = [Point::new(0.0, 0.0, 0.0), Point::new(1.0, 2.0, 2.0)];
/// let bounds = Bounds::from_points(&points).unwrap();
/// assert_eq!(bounds.center(), Point::new(0.5, 1.0, 1.0));
/// assert_eq!(bounds.diagonal_length(), 3.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// Creates a box from its two extreme corners.
    ///
    /// The corners are reordered per axis, so any two opposite corners work.
    #[must_use]
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// A cube of half-width `half_extent` centered on `center`.
    #[must_use]
    pub fn cube(center: Point, half_extent: f64) -> Self {
        let offset = Vector::repeat(half_extent.abs());
        Self {
            min: center - offset,
            max: center + offset,
        }
    }

    /// Smallest box enclosing `points`, or `None` when `points` is empty.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self {
            min: *first,
            max: *first,
        };
        for point in rest {
            bounds.expand(point);
        }
        Some(bounds)
    }

    /// Grows the box to include `point`.
    pub fn expand(&mut self, point: &Point) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// The minimum corner.
    #[must_use]
    pub const fn min(&self) -> &Point {
        &self.min
    }

    /// The maximum corner.
    #[must_use]
    pub const fn max(&self) -> &Point {
        &self.max
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along x, y and z.
    #[must_use]
    pub fn extent(&self) -> Vector {
        self.max - self.min
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal_length(&self) -> f64 {
        self.extent().norm()
    }

    /// Whether `point` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }
}
