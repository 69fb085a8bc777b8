//! Point set generators for tests and benchmarks.
//!
//! Everything here returns raw `[f64; 3]` coordinates, the same shape
//! [`Delaunay3d::triangulate`](crate::core::delaunay_3d::Delaunay3d::triangulate)
//! consumes.

use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

/// Errors from the point generators.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RandomPointGenerationError {
    /// The coordinate range is empty or not finite.
    #[error("Invalid coordinate range: min {min} must be finite and below max {max}")]
    InvalidRange {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// A grid needs at least one point per axis and must fit in memory.
    #[error("Invalid point count: {points_per_axis} points per axis")]
    InvalidPointCount {
        /// Requested points per axis
        points_per_axis: usize,
    },
}

fn check_range(range: (f64, f64)) -> Result<(), RandomPointGenerationError> {
    let (min, max) = range;
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(RandomPointGenerationError::InvalidRange { min, max })
    }
}

fn sample<R: Rng>(rng: &mut R, n_points: usize, range: (f64, f64)) -> Vec<[f64; 3]> {
    (0..n_points)
        .map(|_| [(); 3].map(|()| rng.random_range(range.0..range.1)))
        .collect()
}

/// `n_points` uniform random points in the cube `range³`.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidRange`] unless
/// `range.0 < range.1` and both are finite.
pub fn generate_random_points(
    n_points: usize,
    range: (f64, f64),
) -> Result<Vec<[f64; 3]>, RandomPointGenerationError> {
    check_range(range)?;
    Ok(sample(&mut rand::rng(), n_points, range))
}

/// Like [`generate_random_points`] but reproducible from `seed`.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidRange`] unless
/// `range.0 < range.1` and both are finite.
///
/// # Examples
///
/// ```
/// use delaunay3d::geometry::util::point_generation::generate_random_points_seeded;
///
/// let a = generate_random_points_seeded(100, (-5.0, 5.0), 42).unwrap();
/// let b = generate_random_points_seeded(100, (-5.0, 5.0), 42).unwrap();
/// assert_eq!(a, b);
/// assert_ne!(a, generate_random_points_seeded(100, (-5.0, 5.0), 43).unwrap());
/// assert!(generate_random_points_seeded(10, (1.0, 1.0), 0).is_err());
/// ```
pub fn generate_random_points_seeded(
    n_points: usize,
    range: (f64, f64),
    seed: u64,
) -> Result<Vec<[f64; 3]>, RandomPointGenerationError> {
    check_range(range)?;
    Ok(sample(&mut StdRng::seed_from_u64(seed), n_points, range))
}

/// `points_per_axis³` points on a regular grid starting at `offset`.
///
/// Points are ordered with x varying fastest. Grids are maximally
/// cospherical, which makes them a useful stress input.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidPointCount`] when
/// `points_per_axis` is zero or the total count overflows `usize`.
///
/// # Examples
///
/// ```
/// use delaunay3d::geometry::util::point_generation::generate_grid_points;
///
/// let grid = generate_grid_points(3, 0.5, [1.0, 0.0, 0.0]).unwrap();
/// assert_eq!(grid.len(), 27);
/// assert_eq!(grid[1], [1.5, 0.0, 0.0]);
/// assert_eq!(grid[26], [2.0, 1.0, 1.0]);
/// ```
pub fn generate_grid_points(
    points_per_axis: usize,
    spacing: f64,
    offset: [f64; 3],
) -> Result<Vec<[f64; 3]>, RandomPointGenerationError> {
    let total = points_per_axis
        .checked_mul(points_per_axis)
        .and_then(|n| n.checked_mul(points_per_axis))
        .filter(|&n| n > 0)
        .ok_or(RandomPointGenerationError::InvalidPointCount { points_per_axis })?;

    let step = |i: usize| -> f64 {
        #[expect(clippy::cast_precision_loss, reason = "grid indices are small")]
        let i = i as f64;
        i * spacing
    };

    let mut points = Vec::with_capacity(total);
    for k in 0..points_per_axis {
        for j in 0..points_per_axis {
            for i in 0..points_per_axis {
                points.push([
                    offset[0] + step(i),
                    offset[1] + step(j),
                    offset[2] + step(k),
                ]);
            }
        }
    }
    Ok(points)
}

/// `n_points` seeded random points on the sphere of `radius` around
/// `center`, a worst case for the empty-circumsphere test.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidRange`] when `radius` is not
/// finite and positive.
pub fn generate_sphere_points_seeded(
    n_points: usize,
    center: [f64; 3],
    radius: f64,
    seed: u64,
) -> Result<Vec<[f64; 3]>, RandomPointGenerationError> {
    check_range((0.0, radius))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n_points);
    while points.len() < n_points {
        let v = [(); 3].map(|()| rng.random_range(-1.0..1.0));
        let norm = v.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm < 1.0e-3 || norm > 1.0 {
            continue;
        }
        points.push([
            center[0] + radius * v[0] / norm,
            center[1] + radius * v[1] / norm,
            center[2] + radius * v[2] / norm,
        ]);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_random_points_stay_in_range() {
        let points = generate_random_points(200, (-2.0, 3.0)).unwrap();
        assert_eq!(points.len(), 200);
        assert!(points.iter().flatten().all(|&c| (-2.0..3.0).contains(&c)));
    }

    #[test]
    fn test_invalid_ranges() {
        assert_eq!(
            generate_random_points(5, (2.0, 1.0)),
            Err(RandomPointGenerationError::InvalidRange { min: 2.0, max: 1.0 })
        );
        assert!(generate_random_points_seeded(5, (0.0, f64::INFINITY), 1).is_err());
        assert!(generate_sphere_points_seeded(5, [0.0; 3], -1.0, 1).is_err());
    }

    #[test]
    fn test_grid_rejects_zero_and_overflow() {
        assert_eq!(
            generate_grid_points(0, 1.0, [0.0; 3]),
            Err(RandomPointGenerationError::InvalidPointCount { points_per_axis: 0 })
        );
        assert!(generate_grid_points(usize::MAX, 1.0, [0.0; 3]).is_err());
    }

    #[test]
    fn test_sphere_points_lie_on_sphere() {
        let center = [1.0, -2.0, 0.5];
        let points = generate_sphere_points_seeded(64, center, 3.0, 9).unwrap();
        assert_eq!(points.len(), 64);
        for p in &points {
            let d2: f64 = (0..3).map(|i| (p[i] - center[i]).powi(2)).sum();
            assert_relative_eq!(d2.sqrt(), 3.0, epsilon = 1e-12);
        }
    }
}
