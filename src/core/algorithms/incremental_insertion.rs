//! Incremental Delaunay insertion using the cavity-based algorithm.
//!
//! Each point goes through the same steps:
//! 1. Reject it if an inserted point lies within the coincidence tolerance
//! 2. Seed a walk at a tetrahedron incident to the closest inserted point
//! 3. Walk to the tetrahedron containing the point
//! 4. Grow the cavity of tetrahedra whose circumspheres contain the point
//! 5. Connect every cavity boundary face to the point, reusing the slots of
//!    deleted tetrahedra before appending new ones
//!
//! The mesh is bootstrapped with an octahedron of six auxiliary points
//! appended after the `N` input points, so ids `>= N` are always bounding
//! points. Per-point failures are counted in an [`InsertionReport`] and never
//! abort the run.

use serde::{Deserialize, Serialize};

use crate::core::algorithms::cavity::{Cavity, CavitySearch};
use crate::core::algorithms::locate::{
    DEFAULT_MAX_WALK_STEPS, LocateError, locate_tetrahedron, seed_tetrahedron,
};
use crate::core::circumsphere_cache::{CircumsphereCache, CircumsphereCacheError};
use crate::core::collections::HashGridIndex;
use crate::core::tetrahedral_mesh::{PointId, TetId, TetrahedralMesh};
use crate::core::traits::spatial_index::SpatialPointIndex;
use crate::geometry::bounds::Bounds;
use crate::geometry::point::Point;
use crate::geometry::util::circumsphere::{Circumsphere, tetrahedron_circumsphere};

/// Smallest multiple of the bounding diagonal used for the octahedron.
pub const MIN_BOUNDING_OFFSET: f64 = 2.5;

/// Number of auxiliary bounding points.
pub const BOUNDING_POINT_COUNT: usize = 6;

/// Octahedron vertices as (axis, direction) offsets from the center, in
/// id order `-x, +x, -y, +y, -z, +z`.
const BOUNDING_DIRECTIONS: [(usize, f64); BOUNDING_POINT_COUNT] = [
    (0, -1.0),
    (0, 1.0),
    (1, -1.0),
    (1, 1.0),
    (2, -1.0),
    (2, 1.0),
];

/// The four positively oriented tetrahedra filling the octahedron, in local
/// bounding-point ids. All four share the x-axis edge.
const BOUNDING_TETRAHEDRA: [[usize; 4]; 4] =
    [[0, 1, 2, 4], [0, 1, 4, 3], [0, 1, 3, 5], [0, 1, 5, 2]];

/// Error during incremental insertion.
///
/// These abort the run. Recoverable per-point problems are reported through
/// [`InsertionOutcome`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsertionError {
    /// Initialization received no points.
    #[error("Cannot triangulate an empty point set")]
    EmptyInput,

    /// Initialization received a NaN or infinite coordinate.
    #[error("Point {index} has a non-finite coordinate")]
    NonFinitePoint {
        /// Index of the offending point
        index: usize,
    },

    /// The id does not name an input point.
    #[error("Point id {id} is out of range for {count} input points")]
    PointOutOfRange {
        /// Requested id
        id: PointId,
        /// Number of input points
        count: usize,
    },

    /// The circumsphere cache could not grow.
    #[error("Circumsphere cache error: {0}")]
    Cache(#[from] CircumsphereCacheError),
}

/// Parameters of one insertion run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsertionSettings {
    /// Coincidence tolerance as a fraction of the bounding diagonal.
    pub tolerance: f64,
    /// Bounding octahedron size as a multiple of the bounding diagonal.
    pub offset: f64,
    /// Upper bound on tetrahedra visited by one location walk.
    pub max_walk_steps: usize,
}

impl Default for InsertionSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            offset: MIN_BOUNDING_OFFSET,
            max_walk_steps: DEFAULT_MAX_WALK_STEPS,
        }
    }
}

impl InsertionSettings {
    /// The offset actually used, never below [`MIN_BOUNDING_OFFSET`].
    #[must_use]
    pub fn effective_offset(&self) -> f64 {
        self.offset.max(MIN_BOUNDING_OFFSET)
    }
}

/// What happened to one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionOutcome {
    /// The point is now a vertex of the mesh.
    Inserted {
        /// Tetrahedra appended to the arena.
        created: usize,
        /// Deleted slots overwritten in place.
        replaced: usize,
        /// Deleted slots left as permanent holes.
        holes: usize,
    },
    /// An inserted point lies within the coincidence tolerance.
    Duplicate {
        /// The point it coincides with
        existing: PointId,
    },
    /// No enclosing tetrahedron was found; the mesh is unchanged.
    Degenerate {
        /// Why location failed
        reason: LocateError,
    },
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionReport {
    /// Points that became mesh vertices.
    pub inserted: usize,
    /// Points rejected as coincident with an earlier point.
    pub duplicates: usize,
    /// Points skipped because location failed.
    pub degeneracies: usize,
    /// Tetrahedron slots left as holes.
    pub holes: usize,
    /// Whether the run was stopped before every point was processed.
    pub cancelled: bool,
}

impl InsertionReport {
    /// Folds one outcome into the counters.
    pub const fn record(&mut self, outcome: &InsertionOutcome) {
        match outcome {
            InsertionOutcome::Inserted { holes, .. } => {
                self.inserted += 1;
                self.holes += *holes;
            }
            InsertionOutcome::Duplicate { .. } => self.duplicates += 1,
            InsertionOutcome::Degenerate { .. } => self.degeneracies += 1,
        }
    }
}

/// Incremental Bowyer-Watson tetrahedralizer.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::algorithms::incremental_insertion::{
///     DelaunayInserter, InsertionOutcome, InsertionSettings,
/// };
/// use delaunay3d::geometry::point::Point;
///
/// let points = vec![
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
///     Point::new(0.0, 0.0, 1.0),
///     Point::new(0.0, 0.0, 0.0),
/// ];
/// let mut inserter = DelaunayInserter::new();
/// inserter.init_point_insertion(points, InsertionSettings::default())?;
/// for id in 0..5 {
///     inserter.insert_point(id)?;
/// }
/// assert!(matches!(
///     inserter.insert_point(4)?,
///     InsertionOutcome::Duplicate { existing: 0 }
/// ));
///
/// let triangulation = inserter.end_point_insertion();
/// assert_eq!(triangulation.report().inserted, 4);
/// assert_eq!(triangulation.report().duplicates, 2);
/// assert_eq!(triangulation.real_tetrahedra().count(), 1);
/// # Ok::<(), delaunay3d::core::algorithms::incremental_insertion::InsertionError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DelaunayInserter<I: SpatialPointIndex = HashGridIndex> {
    mesh: TetrahedralMesh,
    spheres: CircumsphereCache,
    index: I,
    search: CavitySearch,
    cavity: Cavity,
    holes: Vec<TetId>,
    real_points: usize,
    characteristic_length: f64,
    tolerance: f64,
    max_walk_steps: usize,
    report: InsertionReport,
}

impl DelaunayInserter<HashGridIndex> {
    /// An inserter backed by a [`HashGridIndex`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_index(HashGridIndex::new())
    }
}

impl Default for DelaunayInserter<HashGridIndex> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: SpatialPointIndex> DelaunayInserter<I> {
    /// An inserter backed by a caller-supplied spatial index.
    pub fn with_index(index: I) -> Self {
        Self {
            mesh: TetrahedralMesh::new(),
            spheres: CircumsphereCache::default(),
            index,
            search: CavitySearch::new(),
            cavity: Cavity::default(),
            holes: Vec::new(),
            real_points: 0,
            characteristic_length: 0.0,
            tolerance: 0.0,
            max_walk_steps: DEFAULT_MAX_WALK_STEPS,
            report: InsertionReport::default(),
        }
    }

    /// Starts a run over `points` by building the bounding octahedron.
    ///
    /// Any previous run is discarded. The points are not inserted yet; call
    /// [`insert_point`](Self::insert_point) for each id in `0..points.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`InsertionError::EmptyInput`] for an empty point set,
    /// [`InsertionError::NonFinitePoint`] for NaN or infinite coordinates and
    /// [`InsertionError::Cache`] if the circumsphere cache cannot grow.
    pub fn init_point_insertion(
        &mut self,
        points: Vec<Point>,
        settings: InsertionSettings,
    ) -> Result<(), InsertionError> {
        if let Some(index) = points
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(InsertionError::NonFinitePoint { index });
        }
        let bounds = Bounds::from_points(&points).ok_or(InsertionError::EmptyInput)?;

        let mut diagonal = bounds.diagonal_length();
        if diagonal <= 0.0 || !diagonal.is_finite() {
            diagonal = 1.0;
        }
        let real_points = points.len();
        let center = bounds.center();

        self.real_points = real_points;
        self.characteristic_length = settings.effective_offset() * diagonal;
        self.tolerance = settings.tolerance.max(0.0) * diagonal;
        self.max_walk_steps = settings.max_walk_steps;
        self.report = InsertionReport::default();
        self.holes.clear();
        self.search = CavitySearch::new();
        self.spheres = CircumsphereCache::for_point_count(real_points);

        self.mesh = TetrahedralMesh::with_points(points);
        self.mesh.allocate(real_points.saturating_mul(7));
        for (axis, direction) in BOUNDING_DIRECTIONS {
            let mut corner = center;
            corner[axis] += direction * self.characteristic_length;
            self.mesh.push_point(corner);
        }

        self.index
            .initialize(&bounds, self.tolerance, real_points + BOUNDING_POINT_COUNT);
        for id in real_points..real_points + BOUNDING_POINT_COUNT {
            let corner = *self.mesh.point(id);
            self.index.insert(id, &corner);
        }

        for local in BOUNDING_TETRAHEDRA {
            let tet = self.mesh.insert_cell(local.map(|l| l + real_points));
            self.cache_circumsphere(tet)?;
        }

        tracing::debug!(
            points = real_points,
            center = ?center,
            characteristic_length = self.characteristic_length,
            tolerance = self.tolerance,
            "initialized point insertion"
        );
        Ok(())
    }

    /// Inserts input point `id` into the mesh.
    ///
    /// Duplicates and location failures leave the mesh untouched and are
    /// returned as outcomes, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`InsertionError::PointOutOfRange`] if `id` is not an input
    /// point and [`InsertionError::Cache`] if the circumsphere cache cannot
    /// grow. After a cache error the mesh must be discarded.
    pub fn insert_point(&mut self, id: PointId) -> Result<InsertionOutcome, InsertionError> {
        if id >= self.real_points {
            return Err(InsertionError::PointOutOfRange {
                id,
                count: self.real_points,
            });
        }
        let point = *self.mesh.point(id);

        if let Some(existing) = self.index.find_coincident(&point) {
            tracing::trace!(id, existing, "rejected duplicate point");
            let outcome = InsertionOutcome::Duplicate { existing };
            self.report.record(&outcome);
            return Ok(outcome);
        }

        let start = match self.locate(&point) {
            Ok(tet) => tet,
            Err(reason) => {
                tracing::trace!(id, %reason, "skipped degenerate point");
                let outcome = InsertionOutcome::Degenerate { reason };
                self.report.record(&outcome);
                return Ok(outcome);
            }
        };

        self.search.find_enclosing_cavity(
            &self.mesh,
            &self.spheres,
            &point,
            start,
            &mut self.cavity,
        );
        self.index.insert(id, &point);

        let outcome = self.retriangulate(id)?;
        self.report.record(&outcome);
        Ok(outcome)
    }

    fn locate(&self, point: &Point) -> Result<TetId, LocateError> {
        let seed = self
            .index
            .find_closest_inserted(point)
            .ok_or(LocateError::EmptyIndex)?;
        let start = seed_tetrahedron(&self.mesh, seed)?;
        locate_tetrahedron(&self.mesh, point, start, self.max_walk_steps)
    }

    /// Replaces the current cavity with a fan of tetrahedra around `apex`.
    fn retriangulate(&mut self, apex: PointId) -> Result<InsertionOutcome, InsertionError> {
        let cavity = std::mem::take(&mut self.cavity);

        for &tet in &cavity.tets {
            for point in self.mesh.cell_points(tet) {
                self.mesh.remove_reference(point, tet);
            }
        }

        let mut created = 0;
        let mut replaced = 0;
        let mut reusable = cavity.tets.iter().copied();
        for face in &cavity.faces {
            let points = [face[0], face[1], face[2], apex];
            let tet = if let Some(slot) = reusable.next() {
                self.mesh.replace_cell(slot, points);
                for point in points {
                    self.mesh.add_reference(point, slot);
                }
                replaced += 1;
                slot
            } else {
                created += 1;
                self.mesh.insert_cell(points)
            };
            self.cache_circumsphere(tet)?;
        }

        let mut holes = 0;
        for slot in reusable {
            self.mesh.mark_hole(slot);
            self.holes.push(slot);
            holes += 1;
        }

        self.cavity = cavity;
        Ok(InsertionOutcome::Inserted {
            created,
            replaced,
            holes,
        })
    }

    fn cache_circumsphere(&mut self, tet: TetId) -> Result<(), CircumsphereCacheError> {
        let [p0, p1, p2, p3] = self.mesh.cell_coordinates(tet);
        self.spheres
            .set_sphere(tet, tetrahedron_circumsphere(&p0, &p1, &p2, &p3))
    }

    /// The mesh built so far.
    #[must_use]
    pub const fn mesh(&self) -> &TetrahedralMesh {
        &self.mesh
    }

    /// Counters for the current run.
    #[must_use]
    pub const fn report(&self) -> &InsertionReport {
        &self.report
    }

    /// Number of input points in the current run.
    #[must_use]
    pub const fn number_of_real_points(&self) -> usize {
        self.real_points
    }

    /// Absolute coincidence tolerance of the current run.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Distance from the center to each bounding point.
    #[must_use]
    pub const fn characteristic_length(&self) -> f64 {
        self.characteristic_length
    }

    /// Flags the run as stopped early.
    pub const fn mark_cancelled(&mut self) {
        self.report.cancelled = true;
    }

    /// Finishes the run and hands over the mesh.
    ///
    /// Emits one warning if any point was skipped as degenerate.
    #[must_use]
    pub fn end_point_insertion(mut self) -> Triangulation {
        self.mesh.shrink_links();

        tracing::debug!(
            live_tetrahedra = self.mesh.number_of_live_cells(),
            holes = self.holes.len(),
            inserted = self.report.inserted,
            duplicates = self.report.duplicates,
            "finished point insertion"
        );
        if self.report.degeneracies > 0 {
            tracing::warn!(
                degeneracies = self.report.degeneracies,
                duplicates = self.report.duplicates,
                "{} points could not be located and were skipped",
                self.report.degeneracies
            );
        }

        Triangulation {
            mesh: self.mesh,
            spheres: self.spheres,
            holes: self.holes,
            real_points: self.real_points,
            characteristic_length: self.characteristic_length,
            tolerance: self.tolerance,
            report: self.report,
        }
    }
}

/// A finished tetrahedralization including its bounding octahedron.
#[derive(Clone, Debug)]
pub struct Triangulation {
    mesh: TetrahedralMesh,
    spheres: CircumsphereCache,
    holes: Vec<TetId>,
    real_points: usize,
    characteristic_length: f64,
    tolerance: f64,
    report: InsertionReport,
}

impl Triangulation {
    /// The underlying mesh, bounding points and holes included.
    #[must_use]
    pub const fn mesh(&self) -> &TetrahedralMesh {
        &self.mesh
    }

    /// Counters accumulated while inserting.
    #[must_use]
    pub const fn report(&self) -> &InsertionReport {
        &self.report
    }

    /// Number of input points `N`; ids `>= N` are bounding points.
    #[must_use]
    pub const fn number_of_real_points(&self) -> usize {
        self.real_points
    }

    /// Whether `id` is one of the six auxiliary bounding points.
    #[must_use]
    pub const fn is_bounding_point(&self, id: PointId) -> bool {
        id >= self.real_points
    }

    /// Slots left as holes, in creation order.
    #[must_use]
    pub fn holes(&self) -> &[TetId] {
        &self.holes
    }

    /// Absolute coincidence tolerance used for the run.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Distance from the center to each bounding point.
    #[must_use]
    pub const fn characteristic_length(&self) -> f64 {
        self.characteristic_length
    }

    /// Cached circumsphere of live tetrahedron `tet`.
    #[must_use]
    pub fn circumsphere(&self, tet: TetId) -> Option<&Circumsphere> {
        if self.mesh.is_live(tet) {
            self.spheres.get(tet)
        } else {
            None
        }
    }

    /// All live tetrahedra, bounding ones included.
    pub fn live_tetrahedra(&self) -> impl Iterator<Item = (TetId, [PointId; 4])> + '_ {
        self.mesh.live_cells()
    }

    /// Live tetrahedra whose four points are all input points.
    pub fn real_tetrahedra(&self) -> impl Iterator<Item = (TetId, [PointId; 4])> + '_ {
        self.mesh
            .live_cells()
            .filter(|(_, points)| points.iter().all(|&p| p < self.real_points))
    }
}
