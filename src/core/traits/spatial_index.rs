//! Point-location acceleration used during insertion.
//!
//! The insertion loop asks the index two questions for every point: has a
//! point within the coincidence tolerance already been inserted, and which
//! inserted point lies closest to it. The second answer seeds the
//! tetrahedron walk in [`locate`](crate::core::algorithms::locate).

use crate::core::tetrahedral_mesh::PointId;
use crate::geometry::bounds::Bounds;
use crate::geometry::point::Point;

/// A spatial index over the points inserted so far.
///
/// Implementations must be deterministic: the same sequence of
/// [`insert`](Self::insert) calls followed by the same query must give the
/// same answer. When several inserted points are equally close, the one with
/// the smallest id wins.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::collections::HashGridIndex;
/// use delaunay3d::core::traits::spatial_index::SpatialPointIndex;
/// use delaunay3d::geometry::bounds::Bounds;
/// use delaunay3d::geometry::point::Point;
///
/// let mut index = HashGridIndex::default();
/// index.initialize(&Bounds::cube(Point::origin(), 1.0), 0.01, 16);
/// index.insert(0, &Point::new(0.5, 0.5, 0.5));
///
/// assert_eq!(index.find_coincident(&Point::new(0.505, 0.5, 0.5)), Some(0));
/// assert_eq!(index.find_coincident(&Point::new(0.6, 0.5, 0.5)), None);
/// assert_eq!(index.find_closest_inserted(&Point::new(-0.9, 0.0, 0.0)), Some(0));
/// ```
pub trait SpatialPointIndex {
    /// Clears the index and prepares it for points inside `bounds`.
    ///
    /// `tolerance` is the absolute coincidence distance. `expected_points`
    /// is a sizing hint only; inserting more points, or points outside
    /// `bounds`, must still work.
    fn initialize(&mut self, bounds: &Bounds, tolerance: f64, expected_points: usize);

    /// Records that `point` was inserted under `id`.
    fn insert(&mut self, id: PointId, point: &Point);

    /// An inserted point within the coincidence tolerance of `point`.
    ///
    /// Distances equal to the tolerance count as coincident. When several
    /// inserted points qualify the closest one is returned.
    fn find_coincident(&self, point: &Point) -> Option<PointId>;

    /// The inserted point closest to `point`, or `None` when nothing has
    /// been inserted.
    fn find_closest_inserted(&self, point: &Point) -> Option<PointId>;

    /// Absolute coincidence tolerance passed to [`initialize`](Self::initialize).
    fn tolerance(&self) -> f64;

    /// Number of inserted points.
    fn len(&self) -> usize;

    /// Whether no points have been inserted.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
