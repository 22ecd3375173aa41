//! Geometry neighbor lookup module

pub mod compressed;
pub mod builder;

pub use compressed::CompressedNeighborMap;
pub use builder::NeighborMapBuilder;

use crate::cell::CellId;

/// Read-only access to the detector adjacency graph.
///
/// Implementations are shared between partition workers, so they must be `Sync`.
pub trait NeighborProvider: Sync {
    /// Cells adjacent to `cell`, in the provider's enumeration order.
    /// Unknown cells have no neighbors.
    fn neighbors(&self, cell: CellId) -> &[CellId];

    /// Whether `a` lists `b` among its neighbors
    fn are_neighbors(&self, a: CellId, b: CellId) -> bool {
        self.neighbors(a).contains(&b)
    }
}
