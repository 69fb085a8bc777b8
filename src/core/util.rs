//! Validation helpers for finished meshes.

pub mod delaunay_validation;

pub use delaunay_validation::*;
