//! Memory-efficient neighbor map representation

use std::collections::HashMap;
use std::mem;
use crate::cell::CellId;
use crate::geometry::NeighborProvider;

/// Compressed sparse representation of the trigger cell adjacency graph
#[derive(Debug, Clone, Default)]
pub struct CompressedNeighborMap {
    /// Number of cells with an adjacency entry
    pub cell_count: usize,

    /// Offset array: index where each cell's neighbors begin
    /// offsets[i] to offsets[i+1] defines the neighbor range for cell i
    pub offsets: Vec<u32>,

    /// Neighbor array: concatenated, sorted neighbor lists
    pub neighbors: Vec<CellId>,

    /// Detector identifier of each internal cell index
    pub cell_ids: Vec<CellId>,

    /// Mapping from detector identifier to internal cell index
    index: HashMap<CellId, u32>,
}

impl CompressedNeighborMap {
    /// Assemble a map from already sorted CSR arrays
    pub(crate) fn from_parts(cell_ids: Vec<CellId>, offsets: Vec<u32>, neighbors: Vec<CellId>) -> Self {
        let mut map = Self {
            cell_count: cell_ids.len(),
            offsets,
            neighbors,
            cell_ids,
            index: HashMap::new(),
        };
        map.rebuild_index();
        map
    }

    fn rebuild_index(&mut self) {
        self.index = self.cell_ids.iter()
            .enumerate()
            .map(|(i, &id)| (id, i as u32))
            .collect();
    }

    /// Get the neighbor slice of an internal cell index
    fn neighbors_at(&self, idx: usize) -> &[CellId] {
        let start = self.offsets[idx] as usize;
        let end = self.offsets[idx + 1] as usize;
        &self.neighbors[start..end]
    }

    /// Number of neighbors of a cell (0 for unknown cells)
    pub fn degree(&self, cell: CellId) -> usize {
        self.neighbors(cell).len()
    }

    /// Whether the map has an entry for the cell
    pub fn contains(&self, cell: CellId) -> bool {
        self.index.contains_key(&cell)
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let neighbors = self.neighbors.capacity() * mem::size_of::<CellId>();
        let ids = self.cell_ids.capacity() * mem::size_of::<CellId>();
        let index = self.index.capacity() * (mem::size_of::<CellId>() + mem::size_of::<u32>());

        base + offsets + neighbors + ids + index
    }
}

impl NeighborProvider for CompressedNeighborMap {
    fn neighbors(&self, cell: CellId) -> &[CellId] {
        match self.index.get(&cell) {
            Some(&idx) => self.neighbors_at(idx as usize),
            None => &[],
        }
    }

    fn are_neighbors(&self, a: CellId, b: CellId) -> bool {
        // Lists are sorted by the builder
        self.neighbors(a).binary_search(&b).is_ok()
    }
}
