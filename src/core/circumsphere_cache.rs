//! Per-tetrahedron circumsphere storage.
//!
//! The cache is a dense array indexed by [`TetId`]. Growth goes through
//! [`Vec::try_reserve_exact`] so an allocation failure surfaces as
//! [`CircumsphereCacheError`] instead of aborting the process.

use std::collections::TryReserveError;

use crate::core::tetrahedral_mesh::TetId;
use crate::geometry::point::Point;
use crate::geometry::util::circumsphere::Circumsphere;

/// Errors raised while growing the cache.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CircumsphereCacheError {
    /// The allocator refused to grow the backing array.
    #[error("failed to grow circumsphere cache to {requested} entries: {source}")]
    Allocation {
        /// Number of entries the cache tried to hold.
        requested: usize,
        /// Underlying allocator error.
        #[source]
        source: TryReserveError,
    },
}

/// Circumspheres keyed by tetrahedron id.
///
/// Entries for ids that were never set hold an unbounded placeholder sphere.
/// Entries for deleted tetrahedra are stale until overwritten; callers must
/// not query them.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::circumsphere_cache::CircumsphereCache;
/// use delaunay3d::geometry::point::Point;
///
/// let mut cache = CircumsphereCache::with_extend_size(4);
/// cache.set(10, Point::origin(), 1.0)?;
/// assert!(cache.inside_sphere(&Point::new(0.5, 0.0, 0.0), 10));
/// assert!(!cache.inside_sphere(&Point::new(1.0, 0.0, 0.0), 10));
/// # Ok::<(), delaunay3d::core::circumsphere_cache::CircumsphereCacheError>(())
/// ```
#[derive(Clone, Debug)]
pub struct CircumsphereCache {
    spheres: Vec<Circumsphere>,
    extend_size: usize,
}

impl Default for CircumsphereCache {
    fn default() -> Self {
        Self::with_extend_size(Self::DEFAULT_EXTEND_SIZE)
    }
}

impl CircumsphereCache {
    /// Growth increment used by [`Default`].
    pub const DEFAULT_EXTEND_SIZE: usize = 1000;

    /// An empty cache that grows by at least `extend_size` entries at a time.
    #[must_use]
    pub fn with_extend_size(extend_size: usize) -> Self {
        Self {
            spheres: Vec::new(),
            extend_size: extend_size.max(1),
        }
    }

    /// An empty cache sized for a triangulation of `point_count` points.
    ///
    /// A Delaunay tetrahedralization of `n` well-spread points has roughly
    /// `6.5 n` tetrahedra.
    #[must_use]
    pub fn for_point_count(point_count: usize) -> Self {
        Self::with_extend_size(point_count.saturating_mul(13) / 2)
    }

    /// Number of addressable entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// Whether no entry has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Stores the sphere of `tet`, growing the cache when needed.
    ///
    /// # Errors
    ///
    /// Returns [`CircumsphereCacheError::Allocation`] if the backing array
    /// cannot grow.
    pub fn set(
        &mut self,
        tet: TetId,
        center: Point,
        radius_squared: f64,
    ) -> Result<(), CircumsphereCacheError> {
        self.set_sphere(
            tet,
            Circumsphere {
                center,
                radius_squared,
            },
        )
    }

    /// Stores a precomputed [`Circumsphere`] for `tet`.
    ///
    /// # Errors
    ///
    /// Returns [`CircumsphereCacheError::Allocation`] if the backing array
    /// cannot grow.
    pub fn set_sphere(
        &mut self,
        tet: TetId,
        sphere: Circumsphere,
    ) -> Result<(), CircumsphereCacheError> {
        if tet >= self.spheres.len() {
            self.grow_to_fit(tet)?;
        }
        self.spheres[tet] = sphere;
        Ok(())
    }

    fn grow_to_fit(&mut self, tet: TetId) -> Result<(), CircumsphereCacheError> {
        let current = self.spheres.len();
        let requested = tet
            .saturating_add(1)
            .max(current.saturating_mul(2))
            .max(current.saturating_add(self.extend_size));
        self.spheres
            .try_reserve_exact(requested - current)
            .map_err(|source| CircumsphereCacheError::Allocation { requested, source })?;
        self.spheres
            .resize(requested, Circumsphere::unbounded(Point::origin()));
        tracing::trace!(from = current, to = requested, "grew circumsphere cache");
        Ok(())
    }

    /// The sphere stored for `tet`, or `None` beyond the cache length.
    #[inline]
    #[must_use]
    pub fn get(&self, tet: TetId) -> Option<&Circumsphere> {
        self.spheres.get(tet)
    }

    /// Whether `point` lies strictly inside the cached sphere of `tet`.
    ///
    /// Ids that were never stored behave like degenerate cells and report
    /// `true`.
    #[inline]
    #[must_use]
    pub fn inside_sphere(&self, point: &Point, tet: TetId) -> bool {
        self.spheres
            .get(tet)
            .is_none_or(|sphere| sphere.contains(point))
    }
}
