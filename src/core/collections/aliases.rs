//! Core collection aliases.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Optimized `HashMap` type for performance-critical operations.
/// Uses `rustc_hash::FxHasher` for faster hashing in non-cryptographic contexts.
///
/// # Security Warning
///
/// ⚠️ **Not DoS-resistant**: Do not use with attacker-controlled keys.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Optimized `HashSet` type for membership tests on point and cell ids.
///
/// # Examples
///
/// ```rust
/// use delaunay3d::core::collections::FastHashSet;
///
/// let mut seen: FastHashSet<[usize; 3]> = FastHashSet::default();
/// assert!(seen.insert([0, 1, 2]));
/// assert!(!seen.insert([0, 1, 2]));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that uses inline storage for small collections and
/// falls back to the heap for larger ones.
///
/// # Size Guidelines
///
/// - **N=4**: the four vertices or faces of a tetrahedron
/// - **N=16**: per-point cell lists (typical Delaunay vertex degree is ~25
///   tetrahedra, with many points far below that)
/// - **N=32**: per-insertion cavity buffers
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Creates a [`FastHashMap`] with at least `capacity` slots.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

/// Creates a [`FastHashSet`] with at least `capacity` slots.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}
