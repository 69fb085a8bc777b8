//! # delaunay3d
//!
//! Incremental 3D Delaunay tetrahedralization of unstructured point clouds,
//! with alpha-shape extraction of tetrahedra, triangles, lines and vertices.
//!
//! # Features
//!
//! - Bowyer-Watson insertion inside a bounding octahedron, one point at a time
//! - Hash-grid spatial index for duplicate rejection and walk seeding
//! - Alpha shapes with independent toggles for each primitive type
//! - Optional bounding triangulation in the output
//! - `f32` or `f64` input and output coordinates
//! - Serialization/Deserialization of options, reports and meshes with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use delaunay3d::prelude::*;
//!
//! let points = [
//!     [0.0, 0.0, 0.0],
//!     [2.0, 0.0, 0.0],
//!     [1.0, 2.0, 0.0],
//!     [1.0, 0.7, 1.5],
//!     [1.0, 0.7, -1.5],
//! ];
//!
//! let output = Delaunay3d::default().triangulate(&points)?;
//! assert_eq!(output.mesh().number_of_tetrahedra(), 2);
//! assert_eq!(output.mesh().number_of_points(), 5);
//! assert_eq!(output.number_of_duplicate_points(), 0);
//! # Ok::<(), TriangulationError>(())
//! ```
//!
//! # Alpha Shapes
//!
//! With a positive alpha only primitives whose circumradius is at most
//! alpha are kept; faces, edges and isolated points fill in where whole
//! tetrahedra are rejected.
//!
//! ```rust
//! use delaunay3d::prelude::*;
//!
//! let points = [
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//! ];
//!
//! let options = Delaunay3dOptionsBuilder::default().alpha(0.75).build()?;
//! let output = Delaunay3d::new(options).triangulate(&points)?;
//! assert_eq!(output.mesh().number_of_tetrahedra(), 0);
//! assert_eq!(output.mesh().number_of_triangles(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Incremental Insertion
//!
//! [`DelaunayInserter`](core::algorithms::incremental_insertion::DelaunayInserter)
//! exposes the three phases directly for callers that stream points.
//!
//! ```rust
//! use delaunay3d::prelude::*;
//!
//! let mut inserter = DelaunayInserter::new();
//! inserter.init_point_insertion(
//!     vec![
//!         Point::new(0.0, 0.0, 0.0),
//!         Point::new(1.0, 0.0, 0.0),
//!         Point::new(0.0, 1.0, 0.0),
//!         Point::new(0.0, 0.0, 1.0),
//!     ],
//!     InsertionSettings::default(),
//! )?;
//! for id in 0..4 {
//!     inserter.insert_point(id)?;
//! }
//! let triangulation = inserter.end_point_insertion();
//! assert!(triangulation.validate().is_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Mesh storage, insertion algorithms and the public filter.
///
/// The [`delaunay_3d`](core::delaunay_3d) module is the batch entry point;
/// everything it uses is public so callers can drive the steps themselves.
pub mod core {
    /// Insertion algorithms: point location, cavity growth and retriangulation.
    pub mod algorithms {
        /// Bowyer-Watson cavity search
        pub mod cavity;
        /// Incremental cavity-based insertion
        pub mod incremental_insertion;
        /// Point location by walking across faces
        pub mod locate;
    }
    /// Alpha-shape extraction
    pub mod alpha_shape;
    pub mod circumsphere_cache;
    /// Collection types tuned for mesh construction
    pub mod collections;
    /// Batch filter facade
    pub mod delaunay_3d;
    pub mod output;
    pub mod tetrahedral_mesh;
    pub mod util;
    /// Capability traits at the seams of the inserter.
    pub mod traits {
        pub mod spatial_index;
        pub use spatial_index::*;
    }
    // Re-export the `core` modules.
    pub use alpha_shape::*;
    pub use delaunay_3d::*;
    pub use output::*;
    pub use tetrahedral_mesh::*;
    pub use traits::*;
    pub use util::*;
    // Note: collections module not re-exported here to avoid namespace pollution
}

/// Points, bounds, orientation predicates and circumspheres.
///
/// All geometry runs in `f64` on `nalgebra` points; the
/// [`CoordinateScalar`](geometry::traits::coordinate::CoordinateScalar)
/// trait converts `f32` and `f64` input into that representation.
pub mod geometry {
    pub mod bounds;
    pub mod point;
    pub mod predicates;
    /// Circumsphere formulas and point generators
    pub mod util;
    /// Scalar abstraction for input and output coordinates.
    pub mod traits {
        pub mod coordinate;
        pub use coordinate::*;
    }
    pub use bounds::*;
    pub use point::*;
    pub use predicates::*;
    pub use traits::*;
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::core::{
        algorithms::incremental_insertion::{
            DelaunayInserter, InsertionError, InsertionOutcome, InsertionReport, InsertionSettings,
            Triangulation,
        },
        alpha_shape::{AlphaFilter, extract_alpha_shape},
        collections::HashGridIndex,
        delaunay_3d::{
            Delaunay3d, Delaunay3dOptions, Delaunay3dOptionsBuilder, Delaunay3dOutput,
            TriangulationError,
        },
        output::{MeshCell, OutputPoints, OutputPrecision, UnstructuredMesh},
        tetrahedral_mesh::{PointId, TetId},
        traits::spatial_index::SpatialPointIndex,
        util::MeshValidationError,
    };

    pub use crate::geometry::{
        bounds::Bounds,
        point::Point,
        traits::coordinate::{CoordinateScalar, Precision},
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
