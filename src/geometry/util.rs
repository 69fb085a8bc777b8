//! Geometric helpers: circumspheres and point set generators.

pub mod circumsphere;
pub mod point_generation;

pub use circumsphere::*;
pub use point_generation::*;
