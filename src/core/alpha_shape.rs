//! Alpha-shape extraction from a finished tetrahedralization.
//!
//! With `alpha > 0` every primitive is classified by the radius of its
//! smallest circumscribing sphere:
//!
//! - a tetrahedron is kept when its circumradius is at most `alpha`
//! - a face of a rejected tetrahedron is kept when its circumcircle radius is
//!   at most `alpha` and the tetrahedron on its other side (if any) is
//!   rejected too
//! - an edge of a rejected tetrahedron that no kept tetrahedron or face
//!   contains is kept when half its length is at most `alpha`
//! - a point that no kept primitive uses becomes a vertex cell
//!
//! Classification does not depend on which primitive types are emitted: the
//! toggles in [`AlphaFilter`] only decide what is written out.
//!
//! With `alpha == 0` every tetrahedron is emitted and nothing else.

use serde::{Deserialize, Serialize};

use crate::core::algorithms::incremental_insertion::Triangulation;
use crate::core::algorithms::locate::face_points;
use crate::core::collections::{FastHashSet, fast_hash_set_with_capacity};
use crate::core::output::MeshCell;
use crate::core::tetrahedral_mesh::{PointId, TetId};
use crate::geometry::util::circumsphere::{edge_circumradius_squared, triangle_circumradius_squared};

/// Local vertex pairs of the six tetrahedron edges.
const EDGE_TABLE: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Which primitives to extract and at what radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlphaFilter {
    /// Alpha radius; `0` means "all tetrahedra, nothing else".
    pub alpha: f64,
    /// Emit tetrahedra.
    pub tetrahedra: bool,
    /// Emit triangles.
    pub triangles: bool,
    /// Emit lines.
    pub lines: bool,
    /// Emit vertices.
    pub vertices: bool,
    /// Keep primitives that touch the bounding points.
    pub include_bounding: bool,
}

impl Default for AlphaFilter {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            tetrahedra: true,
            triangles: true,
            lines: true,
            vertices: true,
            include_bounding: false,
        }
    }
}

fn sorted<const K: usize>(mut ids: [PointId; K]) -> [PointId; K] {
    ids.sort_unstable();
    ids
}

/// Extracts the cells selected by `filter`.
///
/// Cells are returned grouped by type (tetrahedra, then triangles, lines and
/// vertices), each group in mesh order. Point ids refer to the triangulation
/// point array.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::alpha_shape::{AlphaFilter, extract_alpha_shape};
/// use delaunay3d::core::algorithms::incremental_insertion::{DelaunayInserter, InsertionSettings};
/// use delaunay3d::core::output::MeshCell;
/// use delaunay3d::geometry::point::Point;
///
/// let mut inserter = DelaunayInserter::new();
/// inserter.init_point_insertion(
///     vec![
///         Point::new(0.0, 0.0, 0.0),
///         Point::new(1.0, 0.0, 0.0),
///         Point::new(0.0, 1.0, 0.0),
///         Point::new(0.0, 0.0, 1.0),
///     ],
///     InsertionSettings::default(),
/// )?;
/// for id in 0..4 {
///     inserter.insert_point(id)?;
/// }
/// let triangulation = inserter.end_point_insertion();
///
/// // The circumradius is sqrt(0.75), the longest edge is sqrt(2).
/// let small = AlphaFilter { alpha: 0.6, ..AlphaFilter::default() };
/// let cells = extract_alpha_shape(&triangulation, &small);
/// assert_eq!(cells.iter().filter(|c| matches!(c, MeshCell::Line(_))).count(), 3);
/// assert_eq!(cells.iter().filter(|c| matches!(c, MeshCell::Vertex(_))).count(), 0);
///
/// let large = AlphaFilter { alpha: 1.0, ..AlphaFilter::default() };
/// let tet = triangulation.real_tetrahedra().next().map(|(_, points)| points).unwrap();
/// assert_eq!(extract_alpha_shape(&triangulation, &large), vec![MeshCell::Tetra(tet)]);
/// # Ok::<(), delaunay3d::core::algorithms::incremental_insertion::InsertionError>(())
/// ```
#[must_use]
pub fn extract_alpha_shape(triangulation: &Triangulation, filter: &AlphaFilter) -> Vec<MeshCell> {
    let eligible = |points: &[PointId]| {
        filter.include_bounding || points.iter().all(|&p| !triangulation.is_bounding_point(p))
    };

    if filter.alpha <= 0.0 {
        return triangulation
            .live_tetrahedra()
            .filter(|(_, points)| eligible(points))
            .map(|(_, points)| MeshCell::Tetra(points))
            .collect();
    }

    let mesh = triangulation.mesh();
    let alpha_squared = filter.alpha * filter.alpha;
    let candidates: Vec<(TetId, [PointId; 4])> = triangulation
        .live_tetrahedra()
        .filter(|(_, points)| eligible(points))
        .collect();

    let mut kept_tets: FastHashSet<TetId> = fast_hash_set_with_capacity(candidates.len());
    let mut used_points: FastHashSet<PointId> = FastHashSet::default();
    let mut covered_edges: FastHashSet<[PointId; 2]> = FastHashSet::default();
    let mut cells = Vec::new();

    for &(tet, points) in &candidates {
        let within = triangulation
            .circumsphere(tet)
            .is_some_and(|sphere| sphere.radius_squared <= alpha_squared);
        if within {
            kept_tets.insert(tet);
            used_points.extend(points);
            for [a, b] in EDGE_TABLE {
                covered_edges.insert(sorted([points[a], points[b]]));
            }
            if filter.tetrahedra {
                cells.push(MeshCell::Tetra(points));
            }
        }
    }

    let mut seen_faces: FastHashSet<[PointId; 3]> = FastHashSet::default();
    for &(tet, points) in &candidates {
        if kept_tets.contains(&tet) {
            continue;
        }
        for opposite in 0..4 {
            let face = face_points(&points, opposite);
            if !eligible(&face) || !seen_faces.insert(sorted(face)) {
                continue;
            }
            let neighbor_kept = mesh
                .face_neighbor(tet, face[0], face[1], face[2])
                .is_some_and(|neighbor| kept_tets.contains(&neighbor));
            if neighbor_kept {
                continue;
            }
            let [a, b, c] = face.map(|id| mesh.point(id));
            if triangle_circumradius_squared(a, b, c) <= alpha_squared {
                used_points.extend(face);
                for (i, j) in [(0, 1), (0, 2), (1, 2)] {
                    covered_edges.insert(sorted([face[i], face[j]]));
                }
                if filter.triangles {
                    cells.push(MeshCell::Triangle(face));
                }
            }
        }
    }

    for &(tet, points) in &candidates {
        if kept_tets.contains(&tet) {
            continue;
        }
        for [a, b] in EDGE_TABLE {
            let edge = [points[a], points[b]];
            if !covered_edges.insert(sorted(edge)) {
                continue;
            }
            if edge_circumradius_squared(mesh.point(edge[0]), mesh.point(edge[1]))
                <= alpha_squared
            {
                used_points.extend(edge);
                if filter.lines {
                    cells.push(MeshCell::Line(edge));
                }
            }
        }
    }

    if filter.vertices {
        let point_count = if filter.include_bounding {
            mesh.number_of_points()
        } else {
            triangulation.number_of_real_points()
        };
        for point in 0..point_count {
            if !used_points.contains(&point) && !mesh.point_cells(point).is_empty() {
                cells.push(MeshCell::Vertex(point));
            }
        }
    }

    cells
}
