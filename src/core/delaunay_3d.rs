//! Batch tetrahedralization of a point set.
//!
//! [`Delaunay3d`] runs the incremental inserter over every input point in
//! order, optionally reporting progress and honoring cancellation, and then
//! turns the finished [`Triangulation`] into an [`UnstructuredMesh`]
//! according to [`Delaunay3dOptions`].
//!
//! # Example
//!
//! ```rust
//! use delaunay3d::core::delaunay_3d::{Delaunay3d, Delaunay3dOptionsBuilder};
//!
//! let points = [
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//!     [0.0, 0.0, 0.0],
//! ];
//! let filter = Delaunay3d::new(Delaunay3dOptionsBuilder::default().build()?);
//! let output = filter.triangulate(&points)?;
//!
//! assert_eq!(output.mesh().number_of_tetrahedra(), 1);
//! assert_eq!(output.mesh().number_of_points(), 5);
//! assert_eq!(output.number_of_duplicate_points(), 1);
//! assert_eq!(output.number_of_degeneracies(), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::core::algorithms::incremental_insertion::{
    DelaunayInserter, InsertionError, InsertionReport, InsertionSettings, MIN_BOUNDING_OFFSET,
    Triangulation,
};
use crate::core::algorithms::locate::DEFAULT_MAX_WALK_STEPS;
use crate::core::alpha_shape::{AlphaFilter, extract_alpha_shape};
use crate::core::circumsphere_cache::CircumsphereCacheError;
use crate::core::collections::HashGridIndex;
use crate::core::output::{OutputPoints, OutputPrecision, UnstructuredMesh};
use crate::core::traits::spatial_index::SpatialPointIndex;
use crate::geometry::point::{Point, point_from_coords, to_array};
use crate::geometry::traits::coordinate::{CoordinateConversionError, CoordinateScalar, Precision};

/// Default number of points between progress callbacks.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 250;

/// Errors that abort a triangulation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriangulationError {
    /// No input points were supplied.
    #[error("No input points to triangulate")]
    EmptyInput,

    /// An input coordinate is NaN or infinite.
    #[error("Input point {index} has an invalid coordinate on axis {axis}: {source}")]
    NonFiniteCoordinate {
        /// Index of the input point
        index: usize,
        /// Offending axis (0, 1 or 2)
        axis: usize,
        /// The underlying conversion error
        #[source]
        source: CoordinateConversionError,
    },

    /// The circumsphere cache could not grow.
    #[error("Allocation failure: {0}")]
    Allocation(#[from] CircumsphereCacheError),

    /// An output coordinate does not fit the requested precision.
    #[error("Output point {index} cannot be represented in the requested precision: {source}")]
    CoordinateConversion {
        /// Index of the output point
        index: usize,
        /// The underlying conversion error
        #[source]
        source: CoordinateConversionError,
    },

    /// Any other insertion failure.
    #[error("Insertion error: {0}")]
    Insertion(InsertionError),
}

impl From<InsertionError> for TriangulationError {
    fn from(error: InsertionError) -> Self {
        match error {
            InsertionError::EmptyInput => Self::EmptyInput,
            InsertionError::Cache(source) => Self::Allocation(source),
            other => Self::Insertion(other),
        }
    }
}

/// Configuration of a [`Delaunay3d`] run.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::delaunay_3d::Delaunay3dOptionsBuilder;
/// use delaunay3d::core::output::OutputPrecision;
///
/// let options = Delaunay3dOptionsBuilder::default()
///     .alpha(0.5)
///     .alpha_lines(false)
///     .output_precision(OutputPrecision::Single)
///     .build()
///     .unwrap();
/// assert_eq!(options.alpha(), 0.5);
/// assert!(!options.alpha_lines());
/// assert_eq!(options.offset(), 2.5);
///
/// assert!(Delaunay3dOptionsBuilder::default().alpha(-1.0).build().is_err());
/// assert!(Delaunay3dOptionsBuilder::default().tolerance(2.0).build().is_err());
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Delaunay3dOptions {
    /// Alpha radius; `0` emits all tetrahedra and nothing else.
    #[builder(default = "0.0")]
    alpha: f64,
    /// Emit tetrahedra that pass the alpha test.
    #[builder(default = "true")]
    alpha_tets: bool,
    /// Emit triangles that pass the alpha test.
    #[builder(default = "true")]
    alpha_tris: bool,
    /// Emit lines that pass the alpha test.
    #[builder(default = "true")]
    alpha_lines: bool,
    /// Emit vertices not used by any other primitive.
    #[builder(default = "true")]
    alpha_verts: bool,
    /// Coincidence tolerance as a fraction of the bounding diagonal.
    #[builder(default = "0.001")]
    tolerance: f64,
    /// Keep the bounding octahedron and its tetrahedra in the output.
    #[builder(default = "false")]
    bounding_triangulation: bool,
    /// Bounding octahedron size as a multiple of the bounding diagonal.
    #[builder(default = "MIN_BOUNDING_OFFSET")]
    offset: f64,
    /// Precision of output coordinates.
    #[builder(default)]
    output_precision: OutputPrecision,
    /// Upper bound on tetrahedra visited while locating one point.
    #[builder(default = "DEFAULT_MAX_WALK_STEPS")]
    max_walk_steps: usize,
    /// Number of points between progress callbacks.
    #[builder(default = "DEFAULT_PROGRESS_INTERVAL")]
    progress_interval: usize,
}

impl Delaunay3dOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(alpha) = self.alpha
            && (!alpha.is_finite() || alpha < 0.0)
        {
            return Err(format!("alpha must be finite and non-negative, got {alpha}"));
        }
        if let Some(tolerance) = self.tolerance
            && !(0.0..=1.0).contains(&tolerance)
        {
            return Err(format!("tolerance must lie in [0, 1], got {tolerance}"));
        }
        if let Some(offset) = self.offset
            && !offset.is_finite()
        {
            return Err(format!("offset must be finite, got {offset}"));
        }
        if self.max_walk_steps == Some(0) {
            return Err("max_walk_steps must be positive".to_string());
        }
        if self.progress_interval == Some(0) {
            return Err("progress_interval must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for Delaunay3dOptions {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            alpha_tets: true,
            alpha_tris: true,
            alpha_lines: true,
            alpha_verts: true,
            tolerance: 0.001,
            bounding_triangulation: false,
            offset: MIN_BOUNDING_OFFSET,
            output_precision: OutputPrecision::Default,
            max_walk_steps: DEFAULT_MAX_WALK_STEPS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl Delaunay3dOptions {
    /// Alpha radius.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether tetrahedra are emitted.
    #[must_use]
    pub const fn alpha_tets(&self) -> bool {
        self.alpha_tets
    }

    /// Whether triangles are emitted.
    #[must_use]
    pub const fn alpha_tris(&self) -> bool {
        self.alpha_tris
    }

    /// Whether lines are emitted.
    #[must_use]
    pub const fn alpha_lines(&self) -> bool {
        self.alpha_lines
    }

    /// Whether isolated vertices are emitted.
    #[must_use]
    pub const fn alpha_verts(&self) -> bool {
        self.alpha_verts
    }

    /// Coincidence tolerance as a fraction of the bounding diagonal.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Whether bounding points and tetrahedra are kept.
    #[must_use]
    pub const fn bounding_triangulation(&self) -> bool {
        self.bounding_triangulation
    }

    /// Effective offset multiplier, never below 2.5.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset.max(MIN_BOUNDING_OFFSET)
    }

    /// Requested output precision.
    #[must_use]
    pub const fn output_precision(&self) -> OutputPrecision {
        self.output_precision
    }

    /// Walk step bound.
    #[must_use]
    pub const fn max_walk_steps(&self) -> usize {
        self.max_walk_steps
    }

    /// Points between progress callbacks.
    #[must_use]
    pub const fn progress_interval(&self) -> usize {
        self.progress_interval
    }

    /// Settings handed to the inserter.
    #[must_use]
    pub fn insertion_settings(&self) -> InsertionSettings {
        InsertionSettings {
            tolerance: self.tolerance,
            offset: self.offset(),
            max_walk_steps: self.max_walk_steps,
        }
    }

    /// Filter handed to the alpha-shape extractor.
    #[must_use]
    pub const fn alpha_filter(&self) -> AlphaFilter {
        AlphaFilter {
            alpha: self.alpha,
            tetrahedra: self.alpha_tets,
            triangles: self.alpha_tris,
            lines: self.alpha_lines,
            vertices: self.alpha_verts,
            include_bounding: self.bounding_triangulation,
        }
    }
}

/// Result of a [`Delaunay3d`] run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delaunay3dOutput {
    mesh: UnstructuredMesh,
    report: InsertionReport,
}

impl Delaunay3dOutput {
    /// The output mesh.
    #[must_use]
    pub const fn mesh(&self) -> &UnstructuredMesh {
        &self.mesh
    }

    /// Consumes the output and returns the mesh.
    #[must_use]
    pub fn into_mesh(self) -> UnstructuredMesh {
        self.mesh
    }

    /// All run counters.
    #[must_use]
    pub const fn report(&self) -> &InsertionReport {
        &self.report
    }

    /// Points rejected as coincident with an earlier point.
    #[must_use]
    pub const fn number_of_duplicate_points(&self) -> usize {
        self.report.duplicates
    }

    /// Points skipped because no enclosing tetrahedron was found.
    #[must_use]
    pub const fn number_of_degeneracies(&self) -> usize {
        self.report.degeneracies
    }

    /// Whether the run was cancelled before every point was processed.
    #[must_use]
    pub const fn was_cancelled(&self) -> bool {
        self.report.cancelled
    }
}

/// The 3D Delaunay filter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Delaunay3d {
    options: Delaunay3dOptions,
}

impl Delaunay3d {
    /// A filter with the given options.
    #[must_use]
    pub const fn new(options: Delaunay3dOptions) -> Self {
        Self { options }
    }

    /// The filter options.
    #[must_use]
    pub const fn options(&self) -> &Delaunay3dOptions {
        &self.options
    }

    /// Triangulates `points` and extracts the configured output.
    ///
    /// # Errors
    ///
    /// See [`TriangulationError`].
    pub fn triangulate<T: CoordinateScalar>(
        &self,
        points: &[[T; 3]],
    ) -> Result<Delaunay3dOutput, TriangulationError> {
        self.triangulate_with_index(points, HashGridIndex::new(), |_, _| ControlFlow::Continue(()))
    }

    /// Like [`triangulate`](Self::triangulate), calling `observer(done,
    /// total)` every [`progress_interval`](Delaunay3dOptions::progress_interval)
    /// points.
    ///
    /// Returning [`ControlFlow::Break`] stops the run; the output then holds
    /// the Delaunay mesh of the points inserted so far.
    ///
    /// # Errors
    ///
    /// See [`TriangulationError`].
    pub fn triangulate_with_progress<T, F>(
        &self,
        points: &[[T; 3]],
        observer: F,
    ) -> Result<Delaunay3dOutput, TriangulationError>
    where
        T: CoordinateScalar,
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        self.triangulate_with_index(points, HashGridIndex::new(), observer)
    }

    /// Like [`triangulate_with_progress`](Self::triangulate_with_progress)
    /// with a caller-supplied spatial index.
    ///
    /// # Errors
    ///
    /// See [`TriangulationError`].
    pub fn triangulate_with_index<T, I, F>(
        &self,
        points: &[[T; 3]],
        index: I,
        observer: F,
    ) -> Result<Delaunay3dOutput, TriangulationError>
    where
        T: CoordinateScalar,
        I: SpatialPointIndex,
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        let triangulation = self.build_triangulation(points, index, observer)?;
        let mesh = self.to_unstructured_mesh(&triangulation, T::PRECISION)?;
        Ok(Delaunay3dOutput {
            mesh,
            report: *triangulation.report(),
        })
    }

    /// Runs insertion only and returns the full triangulation, bounding
    /// octahedron included.
    ///
    /// `observer` is called with `(processed, total)` every
    /// `progress_interval` points and once more with `(total, total)` after
    /// the last point. Only a break returned before the last point cancels
    /// the run.
    ///
    /// # Errors
    ///
    /// See [`TriangulationError`].
    pub fn build_triangulation<T, I, F>(
        &self,
        points: &[[T; 3]],
        index: I,
        mut observer: F,
    ) -> Result<Triangulation, TriangulationError>
    where
        T: CoordinateScalar,
        I: SpatialPointIndex,
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        if points.is_empty() {
            return Err(TriangulationError::EmptyInput);
        }
        let converted = points
            .iter()
            .enumerate()
            .map(|(index, coords)| {
                point_from_coords(coords).map_err(|(axis, source)| {
                    TriangulationError::NonFiniteCoordinate {
                        index,
                        axis,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<Point>, _>>()?;

        let total = converted.len();
        let interval = self.options.progress_interval.max(1);
        let mut inserter = DelaunayInserter::with_index(index);
        inserter.init_point_insertion(converted, self.options.insertion_settings())?;

        for id in 0..total {
            if id % interval == 0 && observer(id, total).is_break() {
                tracing::debug!(processed = id, total, "point insertion cancelled");
                inserter.mark_cancelled();
                break;
            }
            inserter.insert_point(id)?;
        }

        let triangulation = inserter.end_point_insertion();
        if !triangulation.report().cancelled {
            // Every point was processed, so a break here cannot cancel anything.
            let _ = observer(total, total);
        }
        Ok(triangulation)
    }

    /// Converts a triangulation into the configured output mesh.
    ///
    /// `input` is the precision of the original coordinates and is used when
    /// the output precision is [`OutputPrecision::Default`].
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::CoordinateConversion`] when a point does
    /// not fit single precision.
    pub fn to_unstructured_mesh(
        &self,
        triangulation: &Triangulation,
        input: Precision,
    ) -> Result<UnstructuredMesh, TriangulationError> {
        let cells = extract_alpha_shape(triangulation, &self.options.alpha_filter());

        let all_points = triangulation.mesh().points();
        let kept = if self.options.bounding_triangulation {
            all_points
        } else {
            &all_points[..triangulation.number_of_real_points()]
        };

        let points = match self.options.output_precision.resolve(input) {
            Precision::Double => OutputPoints::Double(kept.iter().map(to_array).collect()),
            Precision::Single => OutputPoints::Single(
                kept.iter()
                    .enumerate()
                    .map(|(index, point)| narrow_point(point).map_err(|source| {
                        TriangulationError::CoordinateConversion { index, source }
                    }))
                    .collect::<Result<_, _>>()?,
            ),
        };
        Ok(UnstructuredMesh::new(points, cells))
    }
}

fn narrow_point(point: &Point) -> Result<[f32; 3], CoordinateConversionError> {
    Ok([
        f32::from_f64_checked(point.x)?,
        f32::from_f64_checked(point.y)?,
        f32::from_f64_checked(point.z)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_points() -> Vec<[f64; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let built = Delaunay3dOptionsBuilder::default().build().unwrap();
        assert_eq!(built, Delaunay3dOptions::default());
        assert_eq!(built.progress_interval(), DEFAULT_PROGRESS_INTERVAL);
        assert_eq!(built.max_walk_steps(), 200);
        assert_eq!(built.tolerance(), 0.001);
        assert!(built.alpha_tets() && built.alpha_tris() && built.alpha_verts());
        assert!(!built.bounding_triangulation());
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(Delaunay3dOptionsBuilder::default().alpha(f64::NAN).build().is_err());
        assert!(Delaunay3dOptionsBuilder::default().tolerance(-0.1).build().is_err());
        assert!(Delaunay3dOptionsBuilder::default().offset(f64::INFINITY).build().is_err());
        assert!(Delaunay3dOptionsBuilder::default().max_walk_steps(0).build().is_err());
        assert!(Delaunay3dOptionsBuilder::default().progress_interval(0).build().is_err());
    }

    #[test]
    fn test_offset_minimum() {
        let options = Delaunay3dOptionsBuilder::default().offset(1.0).build().unwrap();
        assert_eq!(options.offset(), MIN_BOUNDING_OFFSET);
        assert_eq!(options.insertion_settings().offset, MIN_BOUNDING_OFFSET);
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let points: [[f64; 3]; 0] = [];
        assert_eq!(
            Delaunay3d::default().triangulate(&points),
            Err(TriangulationError::EmptyInput)
        );
    }

    #[test]
    fn test_non_finite_input_reports_index_and_axis() {
        let mut points = corner_points();
        points[3][1] = f64::INFINITY;
        let err = Delaunay3d::default().triangulate(&points).unwrap_err();
        assert!(matches!(
            err,
            TriangulationError::NonFiniteCoordinate {
                index: 3,
                axis: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_bounding_triangulation_keeps_auxiliary_points() {
        let options = Delaunay3dOptionsBuilder::default()
            .bounding_triangulation(true)
            .build()
            .unwrap();
        let output = Delaunay3d::new(options).triangulate(&corner_points()).unwrap();
        assert_eq!(output.mesh().number_of_points(), 10);
        assert!(output.mesh().number_of_tetrahedra() > 1);
    }

    #[test]
    fn test_output_precision_follows_input_by_default() {
        let single: Vec<[f32; 3]> = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let output = Delaunay3d::default().triangulate(&single).unwrap();
        assert_eq!(output.mesh().points().precision(), Precision::Single);

        let options = Delaunay3dOptionsBuilder::default()
            .output_precision(OutputPrecision::Double)
            .build()
            .unwrap();
        let output = Delaunay3d::new(options).triangulate(&single).unwrap();
        assert_eq!(output.mesh().points().precision(), Precision::Double);
        assert_eq!(output.mesh().points().get(1), Some([1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_forced_single_precision_overflow() {
        let mut points = corner_points();
        points[1] = [1.0e39, 0.0, 0.0];
        let options = Delaunay3dOptionsBuilder::default()
            .output_precision(OutputPrecision::Single)
            .build()
            .unwrap();
        let err = Delaunay3d::new(options).triangulate(&points).unwrap_err();
        assert!(matches!(
            err,
            TriangulationError::CoordinateConversion { index: 1, .. }
        ));
    }

    #[test]
    fn test_progress_observer_cadence() {
        let points: Vec<[f64; 3]> = (0..10)
            .map(|i| {
                let t = f64::from(i);
                [t.sin(), t.cos(), 0.1 * t]
            })
            .collect();
        let options = Delaunay3dOptionsBuilder::default()
            .progress_interval(4)
            .build()
            .unwrap();
        let mut calls = Vec::new();
        let output = Delaunay3d::new(options)
            .triangulate_with_progress(&points, |done, total| {
                calls.push((done, total));
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(calls, vec![(0, 10), (4, 10), (8, 10), (10, 10)]);
        assert!(!output.was_cancelled());
    }

    #[test]
    fn test_insertion_error_mapping() {
        assert_eq!(
            TriangulationError::from(InsertionError::EmptyInput),
            TriangulationError::EmptyInput
        );
        assert!(matches!(
            TriangulationError::from(InsertionError::PointOutOfRange { id: 3, count: 1 }),
            TriangulationError::Insertion(_)
        ));
    }
}
