//! High-performance collection types used by the triangulation.
//!
//! - [`aliases`]: Fx-hashed maps and sets plus the inline [`SmallBuffer`]
//! - [`buffers`]: semantic buffer aliases sized for tetrahedral meshes
//! - [`spatial_hash_grid`]: the default [`SpatialPointIndex`](crate::core::traits::spatial_index::SpatialPointIndex)

pub mod aliases;
pub mod buffers;
pub mod spatial_hash_grid;

pub use aliases::*;
pub use buffers::*;
pub use spatial_hash_grid::HashGridIndex;
