//! Structural and empty-circumsphere validation of finished meshes.
//!
//! These checks are brute force and intended for tests, debugging and
//! offline verification, not for the insertion hot path.

use thiserror::Error;

use crate::core::algorithms::incremental_insertion::Triangulation;
use crate::core::algorithms::locate::face_points;
use crate::core::collections::{FastHashMap, fast_hash_map_with_capacity};
use crate::core::tetrahedral_mesh::{PointId, TetId, TetrahedralMesh};
use crate::geometry::util::circumsphere::tetrahedron_circumsphere;

/// Relative slack applied to the squared circumradius when looking for
/// violations. Looser than the insertion test so rounding on cospherical
/// points is not reported.
pub const VALIDATION_RELATIVE_TOLERANCE: f64 = 1.0e-8;

/// Errors reported by mesh validation.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::util::MeshValidationError;
///
/// let err = MeshValidationError::DelaunayViolation { tet: 3, point: 7 };
/// assert_eq!(
///     err.to_string(),
///     "Tetrahedron 3 violates the Delaunay property: point 7 lies inside its circumsphere"
/// );
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshValidationError {
    /// A mesh point lies strictly inside the circumsphere of a live
    /// tetrahedron it does not belong to.
    #[error(
        "Tetrahedron {tet} violates the Delaunay property: point {point} lies inside its circumsphere"
    )]
    DelaunayViolation {
        /// The offending tetrahedron
        tet: TetId,
        /// The point inside its circumsphere
        point: PointId,
    },

    /// More than two live tetrahedra share one face.
    #[error("Face {face:?} is shared by {count} tetrahedra")]
    OverSharedFace {
        /// The face, sorted ascending
        face: [PointId; 3],
        /// Number of live tetrahedra using it
        count: usize,
    },

    /// The point-to-tetrahedron links disagree with the cells.
    #[error("Point {point} and tetrahedron {tet} have an inconsistent link")]
    BrokenLink {
        /// The point whose link list is wrong
        point: PointId,
        /// The tetrahedron involved
        tet: TetId,
    },

    /// An input point is neither in the mesh nor accounted for as a
    /// duplicate or degeneracy.
    #[error("Input point {point} is not covered by any tetrahedron")]
    UncoveredPoint {
        /// Index of the input point
        point: PointId,
    },
}

/// All `(tet, point)` pairs where a mesh vertex lies strictly inside the
/// circumsphere of a live tetrahedron.
///
/// Only points with at least one incident live tetrahedron are tested, so
/// duplicates and skipped points are ignored. Circumspheres are recomputed
/// from the coordinates rather than read from any cache, and degenerate
/// tetrahedra are skipped.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::tetrahedral_mesh::TetrahedralMesh;
/// use delaunay3d::core::util::find_delaunay_violations;
/// use delaunay3d::geometry::point::Point;
///
/// let mut mesh = TetrahedralMesh::with_points(vec![
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
///     Point::new(0.0, 0.0, 1.0),
/// ]);
/// mesh.insert_cell([0, 1, 2, 3]);
/// assert!(find_delaunay_violations(&mesh).is_empty());
/// ```
#[must_use]
pub fn find_delaunay_violations(mesh: &TetrahedralMesh) -> Vec<(TetId, PointId)> {
    let vertices: Vec<PointId> = (0..mesh.number_of_points())
        .filter(|&p| !mesh.point_cells(p).is_empty())
        .collect();

    let mut violations = Vec::new();
    for (tet, points) in mesh.live_cells() {
        let [a, b, c, d] = mesh.cell_coordinates(tet);
        let sphere = tetrahedron_circumsphere(&a, &b, &c, &d);
        if sphere.is_unbounded() {
            continue;
        }
        let limit = sphere.radius_squared * (1.0 - VALIDATION_RELATIVE_TOLERANCE);
        for &p in &vertices {
            if points.contains(&p) {
                continue;
            }
            if (mesh.point(p) - sphere.center).norm_squared() < limit {
                violations.push((tet, p));
            }
        }
    }

    tracing::debug!(
        tetrahedra = mesh.number_of_live_cells(),
        vertices = vertices.len(),
        violations = violations.len(),
        "checked empty-circumsphere property"
    );
    violations
}

/// Fails on the first Delaunay violation.
///
/// # Errors
///
/// Returns [`MeshValidationError::DelaunayViolation`] for the first
/// violating pair found by [`find_delaunay_violations`].
pub fn validate_delaunay(mesh: &TetrahedralMesh) -> Result<(), MeshValidationError> {
    match find_delaunay_violations(mesh).first() {
        Some(&(tet, point)) => Err(MeshValidationError::DelaunayViolation { tet, point }),
        None => Ok(()),
    }
}

/// Checks that no face is used by more than two live tetrahedra.
///
/// # Errors
///
/// Returns [`MeshValidationError::OverSharedFace`] for the first face
/// (in ascending order) used three or more times.
pub fn validate_face_sharing(mesh: &TetrahedralMesh) -> Result<(), MeshValidationError> {
    let mut counts: FastHashMap<[PointId; 3], usize> =
        fast_hash_map_with_capacity(mesh.number_of_live_cells() * 2);
    for (_, points) in mesh.live_cells() {
        for opposite in 0..4 {
            let mut face = face_points(&points, opposite);
            face.sort_unstable();
            *counts.entry(face).or_insert(0) += 1;
        }
    }

    let mut over_shared: Vec<_> = counts.into_iter().filter(|&(_, count)| count > 2).collect();
    over_shared.sort_unstable();
    match over_shared.first() {
        Some(&(face, count)) => Err(MeshValidationError::OverSharedFace { face, count }),
        None => Ok(()),
    }
}

/// Checks that the point links list exactly the live tetrahedra using each
/// point.
///
/// # Errors
///
/// Returns [`MeshValidationError::BrokenLink`] when a live tetrahedron is
/// missing from the links of one of its points, or a link names a hole or a
/// tetrahedron that does not use the point.
pub fn validate_links(mesh: &TetrahedralMesh) -> Result<(), MeshValidationError> {
    for (tet, points) in mesh.live_cells() {
        for point in points {
            if !mesh.point_cells(point).contains(&tet) {
                return Err(MeshValidationError::BrokenLink { point, tet });
            }
        }
    }
    for point in 0..mesh.number_of_points() {
        for &tet in mesh.point_cells(point) {
            let consistent = mesh
                .cell(tet)
                .is_some_and(|cell| mesh.is_live(tet) && cell.contains_point(point));
            if !consistent {
                return Err(MeshValidationError::BrokenLink { point, tet });
            }
        }
    }
    Ok(())
}

/// Checks that every input point is accounted for.
///
/// The number of input points with incident tetrahedra must equal the
/// inserted count. Each remaining input point must coincide (within the run
/// tolerance) with an inserted point, except for at most as many points as
/// were reported degenerate. Cancelled runs only get the first check.
///
/// # Errors
///
/// Returns [`MeshValidationError::UncoveredPoint`] naming the first point
/// that cannot be accounted for.
pub fn validate_point_coverage(triangulation: &Triangulation) -> Result<(), MeshValidationError> {
    let mesh = triangulation.mesh();
    let report = triangulation.report();
    let real_points = triangulation.number_of_real_points();

    let (covered, uncovered): (Vec<PointId>, Vec<PointId>) =
        (0..real_points).partition(|&p| !mesh.point_cells(p).is_empty());

    if covered.len() != report.inserted {
        let point = uncovered.first().copied().unwrap_or(real_points);
        return Err(MeshValidationError::UncoveredPoint { point });
    }
    if report.cancelled {
        return Ok(());
    }

    let tolerance_squared = triangulation.tolerance() * triangulation.tolerance();
    let mut unexplained = 0;
    for &point in &uncovered {
        let position = mesh.point(point);
        let duplicate = covered
            .iter()
            .any(|&other| (mesh.point(other) - position).norm_squared() <= tolerance_squared);
        if !duplicate {
            unexplained += 1;
            if unexplained > report.degeneracies {
                return Err(MeshValidationError::UncoveredPoint { point });
            }
        }
    }
    Ok(())
}

impl Triangulation {
    /// Runs every structural check and the empty-circumsphere check.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshValidationError`] found, checking links, face
    /// sharing, point coverage and finally the Delaunay property.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay3d::core::delaunay_3d::Delaunay3d;
    /// use delaunay3d::core::collections::HashGridIndex;
    /// use std::ops::ControlFlow;
    ///
    /// let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.2, 0.3, 0.9]];
    /// let triangulation = Delaunay3d::default()
    ///     .build_triangulation(&points, HashGridIndex::new(), |_, _| ControlFlow::Continue(()))?;
    /// assert!(triangulation.validate().is_ok());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn validate(&self) -> Result<(), MeshValidationError> {
        validate_links(self.mesh())?;
        validate_face_sharing(self.mesh())?;
        validate_point_coverage(self)?;
        validate_delaunay(self.mesh())
    }

    /// Whether the mesh satisfies the empty-circumsphere property.
    #[must_use]
    pub fn is_delaunay(&self) -> bool {
        find_delaunay_violations(self.mesh()).is_empty()
    }

    /// See [`validate_delaunay`].
    ///
    /// # Errors
    ///
    /// Returns [`MeshValidationError::DelaunayViolation`] on the first violation.
    pub fn validate_delaunay(&self) -> Result<(), MeshValidationError> {
        validate_delaunay(self.mesh())
    }

    /// See [`validate_face_sharing`].
    ///
    /// # Errors
    ///
    /// Returns [`MeshValidationError::OverSharedFace`] for a face used by
    /// three or more live tetrahedra.
    pub fn validate_face_sharing(&self) -> Result<(), MeshValidationError> {
        validate_face_sharing(self.mesh())
    }

    /// See [`validate_point_coverage`].
    ///
    /// # Errors
    ///
    /// Returns [`MeshValidationError::UncoveredPoint`] for an input point
    /// that is neither inserted nor explained by the report.
    pub fn validate_point_coverage(&self) -> Result<(), MeshValidationError> {
        validate_point_coverage(self)
    }
}
