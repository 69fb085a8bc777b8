//! Output mesh handed to callers.
//!
//! An [`UnstructuredMesh`] is a point array plus a list of mixed cells, the
//! shape visualization pipelines consume. Cells index into the point array.
//! When the bounding triangulation is excluded the point array holds only
//! the input points, so ids match the caller's input ids.

use serde::{Deserialize, Serialize};

use crate::core::tetrahedral_mesh::PointId;
use crate::geometry::traits::coordinate::Precision;

/// Requested precision of output coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputPrecision {
    /// Match the precision of the input coordinates.
    #[default]
    Default,
    /// Always emit `f32` coordinates.
    Single,
    /// Always emit `f64` coordinates.
    Double,
}

impl OutputPrecision {
    /// Resolves [`OutputPrecision::Default`] against the input precision.
    #[must_use]
    pub const fn resolve(self, input: Precision) -> Precision {
        match self {
            Self::Default => input,
            Self::Single => Precision::Single,
            Self::Double => Precision::Double,
        }
    }
}

/// Output coordinates in the resolved precision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OutputPoints {
    /// Single-precision coordinates.
    Single(Vec<[f32; 3]>),
    /// Double-precision coordinates.
    Double(Vec<[f64; 3]>),
}

impl OutputPoints {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(points) => points.len(),
            Self::Double(points) => points.len(),
        }
    }

    /// Whether there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Precision of the stored coordinates.
    #[must_use]
    pub const fn precision(&self) -> Precision {
        match self {
            Self::Single(_) => Precision::Single,
            Self::Double(_) => Precision::Double,
        }
    }

    /// Coordinates of point `id` widened to `f64`.
    #[must_use]
    pub fn get(&self, id: PointId) -> Option<[f64; 3]> {
        match self {
            Self::Single(points) => points
                .get(id)
                .map(|p| [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])]),
            Self::Double(points) => points.get(id).copied(),
        }
    }
}

/// One output cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshCell {
    /// A tetrahedron, positively oriented.
    Tetra([PointId; 4]),
    /// A triangle.
    Triangle([PointId; 3]),
    /// An edge.
    Line([PointId; 2]),
    /// An isolated vertex.
    Vertex(PointId),
}

impl MeshCell {
    /// Point ids of the cell.
    #[must_use]
    pub fn point_ids(&self) -> &[PointId] {
        match self {
            Self::Tetra(points) => points.as_slice(),
            Self::Triangle(points) => points.as_slice(),
            Self::Line(points) => points.as_slice(),
            Self::Vertex(point) => std::slice::from_ref(point),
        }
    }
}

/// Points plus mixed cells.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::output::{MeshCell, OutputPoints, UnstructuredMesh};
///
/// let mesh = UnstructuredMesh::new(
///     OutputPoints::Double(vec![[0.0; 3], [1.0, 0.0, 0.0]]),
///     vec![MeshCell::Line([0, 1]), MeshCell::Vertex(1)],
/// );
/// assert_eq!(mesh.lines().collect::<Vec<_>>(), vec![[0, 1]]);
/// assert_eq!(mesh.number_of_vertices(), 1);
/// assert_eq!(mesh.number_of_tetrahedra(), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnstructuredMesh {
    points: OutputPoints,
    cells: Vec<MeshCell>,
}

impl UnstructuredMesh {
    /// Assembles a mesh from points and cells.
    #[must_use]
    pub const fn new(points: OutputPoints, cells: Vec<MeshCell>) -> Self {
        Self { points, cells }
    }

    /// The point array.
    #[must_use]
    pub const fn points(&self) -> &OutputPoints {
        &self.points
    }

    /// All cells in output order: tetrahedra, triangles, lines, vertices.
    #[must_use]
    pub fn cells(&self) -> &[MeshCell] {
        &self.cells
    }

    /// Number of points.
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Number of cells of every type.
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Tetrahedra in output order.
    pub fn tetrahedra(&self) -> impl Iterator<Item = [PointId; 4]> + '_ {
        self.cells.iter().filter_map(|cell| match cell {
            MeshCell::Tetra(points) => Some(*points),
            _ => None,
        })
    }

    /// Triangles in output order.
    pub fn triangles(&self) -> impl Iterator<Item = [PointId; 3]> + '_ {
        self.cells.iter().filter_map(|cell| match cell {
            MeshCell::Triangle(points) => Some(*points),
            _ => None,
        })
    }

    /// Lines in output order.
    pub fn lines(&self) -> impl Iterator<Item = [PointId; 2]> + '_ {
        self.cells.iter().filter_map(|cell| match cell {
            MeshCell::Line(points) => Some(*points),
            _ => None,
        })
    }

    /// Vertex cells in output order.
    pub fn vertices(&self) -> impl Iterator<Item = PointId> + '_ {
        self.cells.iter().filter_map(|cell| match cell {
            MeshCell::Vertex(point) => Some(*point),
            _ => None,
        })
    }

    /// Number of tetrahedra.
    #[must_use]
    pub fn number_of_tetrahedra(&self) -> usize {
        self.tetrahedra().count()
    }

    /// Number of triangles.
    #[must_use]
    pub fn number_of_triangles(&self) -> usize {
        self.triangles().count()
    }

    /// Number of lines.
    #[must_use]
    pub fn number_of_lines(&self) -> usize {
        self.lines().count()
    }

    /// Number of vertex cells.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices().count()
    }
}
