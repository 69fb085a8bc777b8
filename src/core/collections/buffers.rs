//! Algorithm-specific buffer types.

use crate::core::tetrahedral_mesh::{PointId, TetId};

use super::SmallBuffer;

/// Inline capacity of a point's incident-tetrahedron list.
pub const POINT_CELLS_INLINE_CAPACITY: usize = 16;

/// Inline capacity of per-insertion cavity buffers.
pub const CAVITY_BUFFER_SIZE: usize = 32;

/// Tetrahedra incident to one point.
///
/// Used as the per-point adjacency list of the
/// [`TetrahedralMesh`](crate::core::tetrahedral_mesh::TetrahedralMesh).
pub type PointCellList = SmallBuffer<TetId, POINT_CELLS_INLINE_CAPACITY>;

/// Tetrahedra collected while growing a cavity.
pub type TetIdBuffer = SmallBuffer<TetId, CAVITY_BUFFER_SIZE>;

/// An ordered triangle of point ids.
pub type Face = [PointId; 3];

/// Boundary faces collected while growing a cavity.
pub type FaceBuffer = SmallBuffer<Face, CAVITY_BUFFER_SIZE>;
