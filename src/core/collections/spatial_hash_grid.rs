//! Spatial hash-grid acceleration structure.
//!
//! This is the default [`SpatialPointIndex`] used by the insertion loop.
//! Points are bucketed by the floored cell coordinates
//! `floor((p - origin) / cell_size)` in a sparse hash map, so points far
//! outside the initialization bounds (the bounding octahedron, for one) are
//! keyed like any other point.
//!
//! The cell size is never smaller than the coincidence tolerance, which
//! keeps every coincidence candidate inside the 3×3×3 neighborhood of the
//! query cell.

use super::{FastHashMap, SmallBuffer};
use crate::core::tetrahedral_mesh::PointId;
use crate::core::traits::spatial_index::SpatialPointIndex;
use crate::geometry::bounds::Bounds;
use crate::geometry::point::Point;

const BUCKET_INLINE_CAPACITY: usize = 8;

/// Average number of points the grid aims to hold per occupied cell.
const POINTS_PER_BUCKET: f64 = 4.0;

/// Upper bound on cells per axis.
const MAX_DIVISIONS: f64 = 1024.0;

/// Integer cell coordinates.
type GridKey = [i64; 3];

type Bucket = SmallBuffer<(PointId, Point), BUCKET_INLINE_CAPACITY>;

/// A sparse uniform grid over inserted points.
///
/// Queries for the closest inserted point search outward in cubic shells
/// around the query cell and fall back to a scan of all occupied buckets once
/// a shell would touch more cells than are occupied.
#[derive(Clone, Debug)]
pub struct HashGridIndex {
    origin: Point,
    cell_size: f64,
    tolerance: f64,
    len: usize,
    cells: FastHashMap<GridKey, Bucket>,
}

impl Default for HashGridIndex {
    fn default() -> Self {
        Self {
            origin: Point::origin(),
            cell_size: 1.0,
            tolerance: 0.0,
            len: 0,
            cells: FastHashMap::default(),
        }
    }
}

impl HashGridIndex {
    /// Creates an empty index. Call
    /// [`initialize`](SpatialPointIndex::initialize) before inserting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Edge length of one grid cell.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty grid cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "float-to-int casts saturate, so far-away points land in edge cells"
    )]
    fn key_for(&self, point: &Point) -> GridKey {
        let relative = (point - self.origin) / self.cell_size;
        [
            relative.x.floor() as i64,
            relative.y.floor() as i64,
            relative.z.floor() as i64,
        ]
    }

    fn visit_bucket<F>(&self, key: &GridKey, f: &mut F)
    where
        F: FnMut(PointId, &Point),
    {
        if let Some(bucket) = self.cells.get(key) {
            for (id, point) in bucket {
                f(*id, point);
            }
        }
    }

    /// Visits every cell whose Chebyshev distance from `base` equals `ring`.
    fn visit_shell<F>(&self, base: &GridKey, ring: i64, f: &mut F)
    where
        F: FnMut(PointId, &Point),
    {
        if ring == 0 {
            self.visit_bucket(base, f);
            return;
        }
        for dx in -ring..=ring {
            for dy in -ring..=ring {
                let on_side = dx.abs() == ring || dy.abs() == ring;
                if on_side {
                    for dz in -ring..=ring {
                        let key = [
                            base[0].saturating_add(dx),
                            base[1].saturating_add(dy),
                            base[2].saturating_add(dz),
                        ];
                        self.visit_bucket(&key, f);
                    }
                } else {
                    for dz in [-ring, ring] {
                        let key = [
                            base[0].saturating_add(dx),
                            base[1].saturating_add(dy),
                            base[2].saturating_add(dz),
                        ];
                        self.visit_bucket(&key, f);
                    }
                }
            }
        }
    }

    fn shell_cell_count(ring: i64) -> usize {
        let side = usize::try_from(2 * ring + 1).unwrap_or(usize::MAX);
        side.saturating_mul(side).saturating_mul(side)
    }
}

/// Keeps the closer candidate, breaking ties on the smaller id.
fn closer(best: &mut Option<(f64, PointId)>, candidate: (f64, PointId)) {
    let replace = best.is_none_or(|(distance, id)| {
        candidate.0 < distance || (candidate.0 == distance && candidate.1 < id)
    });
    if replace {
        *best = Some(candidate);
    }
}

impl SpatialPointIndex for HashGridIndex {
    #[expect(
        clippy::cast_precision_loss,
        reason = "expected_points is only a sizing hint"
    )]
    fn initialize(&mut self, bounds: &Bounds, tolerance: f64, expected_points: usize) {
        self.cells.clear();
        self.len = 0;
        self.origin = *bounds.min();
        self.tolerance = if tolerance.is_finite() { tolerance.max(0.0) } else { 0.0 };

        let extent = bounds.extent().max();
        let divisions = (expected_points.max(1) as f64 / POINTS_PER_BUCKET)
            .cbrt()
            .ceil()
            .clamp(1.0, MAX_DIVISIONS);

        let mut cell_size = extent / divisions;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            cell_size = 1.0;
        }
        self.cell_size = cell_size.max(self.tolerance).max(f64::MIN_POSITIVE);

        tracing::trace!(
            cell_size = self.cell_size,
            divisions,
            tolerance = self.tolerance,
            "initialized hash grid index"
        );
    }

    fn insert(&mut self, id: PointId, point: &Point) {
        let key = self.key_for(point);
        self.cells.entry(key).or_default().push((id, *point));
        self.len += 1;
    }

    fn find_coincident(&self, point: &Point) -> Option<PointId> {
        if self.len == 0 {
            return None;
        }
        let tolerance_squared = self.tolerance * self.tolerance;
        let base = self.key_for(point);
        let mut best: Option<(f64, PointId)> = None;
        self.visit_shell(&base, 0, &mut |id, candidate| {
            let distance = (candidate - point).norm_squared();
            if distance <= tolerance_squared {
                closer(&mut best, (distance, id));
            }
        });
        self.visit_shell(&base, 1, &mut |id, candidate| {
            let distance = (candidate - point).norm_squared();
            if distance <= tolerance_squared {
                closer(&mut best, (distance, id));
            }
        });
        best.map(|(_, id)| id)
    }

    fn find_closest_inserted(&self, point: &Point) -> Option<PointId> {
        if self.len == 0 {
            return None;
        }
        let base = self.key_for(point);
        let mut best: Option<(f64, PointId)> = None;

        // Every point in shell r is at least (r - 1) cells away from the query.
        let mut ring = 0_i64;
        loop {
            if let Some((distance, _)) = best {
                #[expect(clippy::cast_precision_loss, reason = "ring counts stay small")]
                let reach = (ring - 1) as f64 * self.cell_size;
                if ring > 0 && distance < reach * reach {
                    break;
                }
            }
            if Self::shell_cell_count(ring) > self.cells.len() {
                for (id, candidate) in self.cells.values().flatten() {
                    closer(&mut best, ((candidate - point).norm_squared(), *id));
                }
                break;
            }
            self.visit_shell(&base, ring, &mut |id, candidate| {
                closer(&mut best, ((candidate - point).norm_squared(), id));
            });
            ring += 1;
        }
        best.map(|(_, id)| id)
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn len(&self) -> usize {
        self.len
    }
}
