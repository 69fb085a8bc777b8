//! Tetrahedral mesh storage with point-to-cell adjacency.
//!
//! Tetrahedra and points are plain integer indices into two arenas. Each
//! point keeps the list of live tetrahedra that reference it, which is all
//! the topology the insertion algorithm needs: the neighbor across a face is
//! found by scanning the incidence list of one of the face's points.
//!
//! Deleted tetrahedra are not removed from the arena. They are marked as
//! holes and either overwritten in place by [`TetrahedralMesh::replace_cell`]
//! or skipped by every accessor that iterates live cells.
//!
//! This is an engine structure: ids passed in are assumed to come from the
//! mesh itself, and out-of-range ids panic like slice indexing does.

use serde::{Deserialize, Serialize};

use crate::core::collections::PointCellList;
use crate::geometry::point::Point;

/// Index of a point in the mesh point array.
pub type PointId = usize;

/// Index of a tetrahedron in the mesh cell arena.
pub type TetId = usize;

/// Number of slots added to a point's incidence list when it fills up.
pub const LINK_GROWTH: usize = 5;

/// Lifecycle state of a tetrahedron slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetState {
    /// Part of the current triangulation.
    #[default]
    Live,
    /// Deleted; the slot is kept so ids stay stable.
    Hole,
}

/// Four point ids plus a lifecycle state.
///
/// For live tetrahedra the points are ordered so that `points[0..3]` appear
/// counterclockwise when viewed from `points[3]`, which makes the signed
/// volume positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tetrahedron {
    /// Vertex ids.
    pub points: [PointId; 4],
    /// Whether the slot is live or a hole.
    pub state: TetState,
}

impl Tetrahedron {
    /// A live tetrahedron over `points`.
    #[must_use]
    pub const fn new(points: [PointId; 4]) -> Self {
        Self {
            points,
            state: TetState::Live,
        }
    }

    /// Whether `point` is one of the four vertices.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: PointId) -> bool {
        self.points.contains(&point)
    }
}

/// Points, tetrahedra and point-to-cell adjacency.
///
/// # Examples
///
/// ```rust
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
/// assert_eq!(mesh.face_neighbor(a, 1, 2, 3), Some(b));
/// assert_eq!(mesh.face_neighbor(a, 0, 1, 2), None);
/// assert_eq!(mesh.point_cells(2), &[a, b]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TetrahedralMesh {
    points: Vec<Point>,
    cells: Vec<Tetrahedron>,
    links: Vec<PointCellList>,
}

impl TetrahedralMesh {
    /// An empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mesh over `points` with no tetrahedra yet.
    #[must_use]
    pub fn with_points(points: Vec<Point>) -> Self {
        let links = vec![PointCellList::new(); points.len()];
        Self {
            points,
            cells: Vec::new(),
            links,
        }
    }

    /// Reserves room for `expected_cells` tetrahedra.
    pub fn allocate(&mut self, expected_cells: usize) {
        self.cells.reserve(expected_cells);
    }

    /// Appends a point and returns its id.
    pub fn push_point(&mut self, point: Point) -> PointId {
        self.points.push(point);
        self.links.push(PointCellList::new());
        self.points.len() - 1
    }

    /// Coordinates of `id`.
    #[inline]
    #[must_use]
    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id]
    }

    /// All points, real and auxiliary.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Number of tetrahedron slots, holes included.
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of live tetrahedra.
    #[must_use]
    pub fn number_of_live_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.state == TetState::Live)
            .count()
    }

    /// Appends a live tetrahedron and registers it with its four points.
    pub fn insert_cell(&mut self, points: [PointId; 4]) -> TetId {
        let id = self.cells.len();
        self.cells.push(Tetrahedron::new(points));
        for point in points {
            self.add_reference(point, id);
        }
        id
    }

    /// Overwrites the slot `tet` with a live tetrahedron over `points`.
    ///
    /// Adjacency is not touched: the caller removes references for the old
    /// point set and adds them for the new one.
    pub fn replace_cell(&mut self, tet: TetId, points: [PointId; 4]) {
        self.cells[tet] = Tetrahedron::new(points);
    }

    /// Marks `tet` as a hole.
    ///
    /// References to it must already have been removed with
    /// [`remove_reference`](Self::remove_reference).
    pub fn mark_hole(&mut self, tet: TetId) {
        self.cells[tet].state = TetState::Hole;
    }

    /// Records that `tet` uses `point`.
    ///
    /// Full incidence lists grow by [`LINK_GROWTH`] slots at a time.
    pub fn add_reference(&mut self, point: PointId, tet: TetId) {
        let list = &mut self.links[point];
        if list.len() == list.capacity() {
            list.reserve_exact(LINK_GROWTH);
        }
        list.push(tet);
    }

    /// Forgets that `tet` uses `point`. Unknown pairs are ignored.
    pub fn remove_reference(&mut self, point: PointId, tet: TetId) {
        let list = &mut self.links[point];
        if let Some(position) = list.iter().position(|&cell| cell == tet) {
            list.remove(position);
        }
    }

    /// The tetrahedron other than `tet` that contains `p1`, `p2` and `p3`.
    ///
    /// Returns `None` when the face lies on the mesh boundary. Runs in time
    /// proportional to the number of cells incident to `p1`.
    #[must_use]
    pub fn face_neighbor(
        &self,
        tet: TetId,
        p1: PointId,
        p2: PointId,
        p3: PointId,
    ) -> Option<TetId> {
        self.links[p1].iter().copied().find(|&candidate| {
            candidate != tet && {
                let cell = &self.cells[candidate];
                cell.state == TetState::Live && cell.contains_point(p2) && cell.contains_point(p3)
            }
        })
    }

    /// The four point ids of `tet`.
    #[inline]
    #[must_use]
    pub fn cell_points(&self, tet: TetId) -> [PointId; 4] {
        self.cells[tet].points
    }

    /// The four corner coordinates of `tet`.
    #[must_use]
    pub fn cell_coordinates(&self, tet: TetId) -> [Point; 4] {
        self.cells[tet].points.map(|id| self.points[id])
    }

    /// The tetrahedron stored in slot `tet`, holes included.
    #[must_use]
    pub fn cell(&self, tet: TetId) -> Option<&Tetrahedron> {
        self.cells.get(tet)
    }

    /// Live tetrahedra incident to `point`.
    #[inline]
    #[must_use]
    pub fn point_cells(&self, point: PointId) -> &[TetId] {
        self.links.get(point).map_or(&[], |list| list.as_slice())
    }

    /// Whether `tet` is a live slot.
    #[must_use]
    pub fn is_live(&self, tet: TetId) -> bool {
        self.cells
            .get(tet)
            .is_some_and(|cell| cell.state == TetState::Live)
    }

    /// Live tetrahedra in slot order.
    pub fn live_cells(&self) -> impl Iterator<Item = (TetId, [PointId; 4])> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.state == TetState::Live)
            .map(|(id, cell)| (id, cell.points))
    }

    /// Trims every incidence list to its length once no more insertions
    /// follow. Adjacency stays queryable.
    pub fn shrink_links(&mut self) {
        for list in &mut self.links {
            list.shrink_to_fit();
        }
        self.links.shrink_to_fit();
    }
}
