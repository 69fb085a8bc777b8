//! Cavity growth for Bowyer-Watson insertion.
//!
//! The cavity of a new point `x` is the connected set of tetrahedra whose
//! circumspheres contain `x`, grown outward from the tetrahedron that
//! contains `x`. Its boundary is the set of faces between a cavity
//! tetrahedron and either the mesh boundary or a tetrahedron outside the
//! cavity.
//!
//! Every tetrahedron is tested at most once per insertion. Test results are
//! kept in an epoch-stamped mark array, so starting a new insertion costs
//! one counter increment instead of a clear.

use crate::core::algorithms::locate::face_points;
use crate::core::circumsphere_cache::CircumsphereCache;
use crate::core::collections::{FaceBuffer, TetIdBuffer};
use crate::core::tetrahedral_mesh::{TetId, TetrahedralMesh};
use crate::geometry::point::Point;

/// Classification of a tetrahedron during one cavity search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CavityMark {
    /// Not tested yet during the current search.
    #[default]
    Unchecked,
    /// Its circumsphere contains the new point.
    InCavity,
    /// Tested and rejected.
    Outside,
}

/// Tetrahedra to delete and the faces that bound them.
///
/// Each boundary face is ordered counterclockwise as seen from inside the
/// cavity, so `(f[0], f[1], f[2], x)` is positively oriented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cavity {
    /// Cavity tetrahedra in discovery order. The first entry contains `x`.
    pub tets: TetIdBuffer,
    /// Boundary faces in discovery order.
    pub faces: FaceBuffer,
}

impl Cavity {
    /// Resets both buffers, keeping their allocations.
    pub fn clear(&mut self) {
        self.tets.clear();
        self.faces.clear();
    }
}

/// Reusable state for cavity searches.
#[derive(Clone, Debug, Default)]
pub struct CavitySearch {
    marks: Vec<(u64, CavityMark)>,
    epoch: u64,
}

impl CavitySearch {
    /// A search with no marks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark of `tet` in the current search.
    #[must_use]
    pub fn mark(&self, tet: TetId) -> CavityMark {
        match self.marks.get(tet) {
            Some(&(epoch, mark)) if epoch == self.epoch => mark,
            _ => CavityMark::Unchecked,
        }
    }

    fn set_mark(&mut self, tet: TetId, mark: CavityMark) {
        if tet >= self.marks.len() {
            let len = (tet + 1).max(self.marks.len() * 2);
            self.marks.resize(len, (0, CavityMark::Unchecked));
        }
        self.marks[tet] = (self.epoch, mark);
    }

    /// Grows the cavity of `point` from `start` into `cavity`.
    ///
    /// `start` must be live and contain `point`. Faces with no neighbor are
    /// mesh-boundary faces and always end up on the cavity boundary.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay3d::core::algorithms::cavity::{Cavity, CavitySearch};
    /// use delaunay3d::core::circumsphere_cache::CircumsphereCache;
    /// use delaunay3d::core::tetrahedral_mesh::TetrahedralMesh;
    /// use delaunay3d::geometry::point::Point;
    ///
    /// let mut mesh = TetrahedralMesh::with_points(vec![
    ///     Point::new(0.0, 0.0, 0.0),
    ///     Point::new(1.0, 0.0, 0.0),
    ///     Point::new(0.0, 1.0, 0.0),
    ///     Point::new(0.0, 0.0, 1.0),
    /// ]);
    /// let tet = mesh.insert_cell([0, 1, 2, 3]);
    /// let mut spheres = CircumsphereCache::default();
    /// spheres.set(tet, Point::new(0.5, 0.5, 0.5), 0.75)?;
    ///
    /// let mut cavity = Cavity::default();
    /// CavitySearch::new().find_enclosing_cavity(
    ///     &mesh,
    ///     &spheres,
    ///     &Point::new(0.2, 0.2, 0.2),
    ///     tet,
    ///     &mut cavity,
    /// );
    /// assert_eq!(cavity.tets.as_slice(), &[tet]);
    /// assert_eq!(cavity.faces.len(), 4);
    /// # Ok::<(), delaunay3d::core::circumsphere_cache::CircumsphereCacheError>(())
    /// ```
    pub fn find_enclosing_cavity(
        &mut self,
        mesh: &TetrahedralMesh,
        spheres: &CircumsphereCache,
        point: &Point,
        start: TetId,
        cavity: &mut Cavity,
    ) {
        self.epoch += 1;
        cavity.clear();

        cavity.tets.push(start);
        self.set_mark(start, CavityMark::InCavity);

        // The worklist grows while it is scanned.
        let mut next = 0;
        while next < cavity.tets.len() {
            let tet = cavity.tets[next];
            next += 1;
            let points = mesh.cell_points(tet);

            for opposite in 0..4 {
                let face = face_points(&points, opposite);
                let Some(neighbor) = mesh.face_neighbor(tet, face[0], face[1], face[2]) else {
                    cavity.faces.push(face);
                    continue;
                };
                match self.mark(neighbor) {
                    CavityMark::Unchecked => {
                        if spheres.inside_sphere(point, neighbor) {
                            self.set_mark(neighbor, CavityMark::InCavity);
                            cavity.tets.push(neighbor);
                        } else {
                            self.set_mark(neighbor, CavityMark::Outside);
                            cavity.faces.push(face);
                        }
                    }
                    CavityMark::InCavity => {}
                    CavityMark::Outside => cavity.faces.push(face),
                }
            }
        }
    }
}
