//! Point location by barycentric walking.
//!
//! Starting from a seed tetrahedron, the walk computes the query point's
//! barycentric coordinates and steps across the face opposite the most
//! negative coordinate until every coordinate is non-negative.
//!
//! # Algorithm
//!
//! 1. Pick any live tetrahedron incident to the seed point
//! 2. Compute barycentric coordinates of the query point
//! 3. Cross the face opposite the smallest negative weight
//! 4. Stop when all weights are non-negative or the step budget runs out
//!
//! The walk is iterative with an explicit step counter. Failing to terminate
//! is reported as [`LocateError::StepLimitExceeded`], which the inserter
//! counts as a degeneracy.

use crate::core::tetrahedral_mesh::{PointId, TetId, TetrahedralMesh};
use crate::geometry::point::Point;
use crate::geometry::predicates::barycentric_coordinates;

/// Default bound on walk steps.
pub const DEFAULT_MAX_WALK_STEPS: usize = 200;

/// Local vertex indices of the face opposite each vertex.
///
/// For a positively oriented tetrahedron, face `i` is counterclockwise when
/// viewed from vertex `i`, so `(face[0], face[1], face[2], apex)` is again
/// positive for any apex on the same side as vertex `i`.
pub const FACE_TABLE: [[usize; 3]; 4] = [[1, 3, 2], [0, 2, 3], [0, 3, 1], [0, 1, 2]];

/// Global point ids of the face of `points` opposite local vertex `opposite`.
#[inline]
#[must_use]
pub const fn face_points(points: &[PointId; 4], opposite: usize) -> [PointId; 3] {
    let local = FACE_TABLE[opposite];
    [points[local[0]], points[local[1]], points[local[2]]]
}

/// Error during point location.
///
/// Every variant is recoverable: the point is skipped and counted as a
/// degeneracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// The spatial index holds no points to seed the walk.
    #[error("Cannot locate in an empty index")]
    EmptyIndex,

    /// The seed point is not referenced by any live tetrahedron.
    #[error("Seed point {point} has no live incident tetrahedron")]
    NoIncidentTetrahedron {
        /// The seed point id
        point: PointId,
    },

    /// The walk reached a tetrahedron with zero volume.
    #[error("Walk reached degenerate tetrahedron {tet}")]
    DegenerateTetrahedron {
        /// The flat tetrahedron
        tet: TetId,
    },

    /// The walk tried to leave the mesh through a boundary face.
    #[error("Walk left the mesh through a boundary face of tetrahedron {tet}")]
    OutsideMesh {
        /// The last tetrahedron visited
        tet: TetId,
    },

    /// The walk did not terminate within the step budget.
    #[error("Walk did not terminate after {steps} steps - possible numerical degeneracy")]
    StepLimitExceeded {
        /// Number of tetrahedra visited
        steps: usize,
    },
}

/// The first live tetrahedron incident to `seed`.
///
/// # Errors
///
/// Returns [`LocateError::NoIncidentTetrahedron`] when the point has no
/// incident tetrahedra.
pub fn seed_tetrahedron(mesh: &TetrahedralMesh, seed: PointId) -> Result<TetId, LocateError> {
    mesh.point_cells(seed)
        .iter()
        .copied()
        .find(|&tet| mesh.is_live(tet))
        .ok_or(LocateError::NoIncidentTetrahedron { point: seed })
}

/// Index of the first strictly most negative weight, or `None` when all
/// weights are non-negative.
#[inline]
fn most_negative(weights: &[f64; 4]) -> Option<usize> {
    let mut best = None;
    let mut lowest = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w < lowest {
            lowest = w;
            best = Some(i);
        }
    }
    best
}

/// Walks from `start` to the tetrahedron containing `point`.
///
/// Points on a face or edge are reported in whichever incident tetrahedron
/// the walk reaches first.
///
/// # Errors
///
/// Returns a [`LocateError`] when the walk hits a flat tetrahedron, leaves
/// the mesh, or exceeds `max_steps` visited tetrahedra.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::algorithms::locate::locate_tetrahedron;
/// use delaunay3d::core::tetrahedral_mesh::TetrahedralMesh;
/// use delaunay3d::geometry::point::Point;
///
/// let mut mesh = TetrahedralMesh::with_points(vec![
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
///     Point::new(0.0, 0.0, 1.0),
///     Point::new(1.0, 1.0, 1.0),
/// ]);
/// let a = mesh.insert_cell([0, 1, 2, 3]);
/// let b = mesh.insert_cell([1, 2, 3, 4]);
///
/// let found = locate_tetrahedron(&mesh, &Point::new(0.6, 0.6, 0.6), a, 200)?;
/// assert_eq!(found, b);
/// # Ok::<(), delaunay3d::core::algorithms::locate::LocateError>(())
/// ```
pub fn locate_tetrahedron(
    mesh: &TetrahedralMesh,
    point: &Point,
    start: TetId,
    max_steps: usize,
) -> Result<TetId, LocateError> {
    let mut current = start;
    for _ in 0..max_steps {
        let weights = barycentric_coordinates(&mesh.cell_coordinates(current), point)
            .ok_or(LocateError::DegenerateTetrahedron { tet: current })?;

        let Some(exit) = most_negative(&weights) else {
            return Ok(current);
        };

        let [p1, p2, p3] = face_points(&mesh.cell_points(current), exit);
        current = mesh
            .face_neighbor(current, p1, p2, p3)
            .ok_or(LocateError::OutsideMesh { tet: current })?;
    }
    Err(LocateError::StepLimitExceeded { steps: max_steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::predicates::{Orientation, tetrahedron_orientation};

    fn two_cell_mesh() -> (TetrahedralMesh, TetId, TetId) {
        let mut mesh = TetrahedralMesh::with_points(vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 1.0, 1.0),
        ]);
        let a = mesh.insert_cell([0, 1, 2, 3]);
        let b = mesh.insert_cell([1, 2, 3, 4]);
        (mesh, a, b)
    }

    #[test]
    fn test_face_table_keeps_positive_orientation() {
        let p = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ];
        for (opposite, face) in FACE_TABLE.iter().enumerate() {
            assert_eq!(
                tetrahedron_orientation(&p[face[0]], &p[face[1]], &p[face[2]], &p[opposite]),
                Orientation::POSITIVE,
                "face {opposite}"
            );
        }
    }

    #[test]
    fn test_most_negative_prefers_first_on_ties() {
        assert_eq!(most_negative(&[0.5, 0.2, 0.1, 0.2]), None);
        assert_eq!(most_negative(&[0.5, -0.2, 0.9, -0.2]), Some(1));
        assert_eq!(most_negative(&[-0.1, -0.3, 1.2, 0.2]), Some(1));
    }

    #[test]
    fn test_locate_inside_start() {
        let (mesh, a, _) = two_cell_mesh();
        assert_eq!(
            locate_tetrahedron(&mesh, &Point::new(0.1, 0.1, 0.1), a, 10),
            Ok(a)
        );
    }

    #[test]
    fn test_locate_outside_mesh() {
        let (mesh, a, _) = two_cell_mesh();
        assert_eq!(
            locate_tetrahedron(&mesh, &Point::new(-1.0, 0.1, 0.1), a, 10),
            Err(LocateError::OutsideMesh { tet: a })
        );
    }

    #[test]
    fn test_locate_respects_step_limit() {
        let (mesh, a, _) = two_cell_mesh();
        assert_eq!(
            locate_tetrahedron(&mesh, &Point::new(0.6, 0.6, 0.6), a, 1),
            Err(LocateError::StepLimitExceeded { steps: 1 })
        );
    }

    #[test]
    fn test_seed_tetrahedron() {
        let (mut mesh, a, b) = two_cell_mesh();
        assert_eq!(seed_tetrahedron(&mesh, 4), Ok(b));
        assert_eq!(seed_tetrahedron(&mesh, 0), Ok(a));
        mesh.remove_reference(0, a);
        assert_eq!(
            seed_tetrahedron(&mesh, 0),
            Err(LocateError::NoIncidentTetrahedron { point: 0 })
        );
    }
}
