//! Neighbor map construction module

use std::collections::HashMap;
use crate::cell::CellId;
use crate::geometry::CompressedNeighborMap;

/// Builder for incrementally constructing a CompressedNeighborMap
pub struct NeighborMapBuilder {
    /// Mapping from detector identifiers to internal indices
    id_to_index: HashMap<CellId, u32>,

    /// Detector identifiers in insertion order
    cell_ids: Vec<CellId>,

    /// Adjacency lists for each cell
    adjacency_lists: Vec<Vec<CellId>>,
}

impl NeighborMapBuilder {
    /// Create a new builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            cell_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    /// Get or create the internal index of a cell
    pub fn get_or_create_cell(&mut self, id: CellId) -> u32 {
        if let Some(&idx) = self.id_to_index.get(&id) {
            return idx;
        }

        let idx = self.cell_ids.len() as u32;
        self.id_to_index.insert(id, idx);
        self.cell_ids.push(id);
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Record that `cell` lists each of `neighbors` as adjacent (one direction only)
    pub fn add_neighbors(&mut self, cell: CellId, neighbors: &[CellId]) {
        let idx = self.get_or_create_cell(cell);
        self.adjacency_lists[idx as usize].extend(neighbors.iter().copied().filter(|&n| n != cell));
    }

    /// Add a symmetric adjacency between two cells
    pub fn add_link(&mut self, a: CellId, b: CellId) {
        if a == b {
            return;
        }
        self.add_neighbors(a, &[b]);
        self.add_neighbors(b, &[a]);
    }

    /// Build the compressed map; neighbor lists are sorted and deduplicated
    pub fn build(mut self) -> CompressedNeighborMap {
        let link_count: usize = self.adjacency_lists.iter()
            .map(|list| list.len())
            .sum();

        let mut offsets = Vec::with_capacity(self.cell_ids.len() + 1);
        let mut neighbors = Vec::with_capacity(link_count);
        offsets.push(0);

        for list in &mut self.adjacency_lists {
            // Sorted order is the enumeration order seen by the clustering
            list.sort_unstable();
            list.dedup();
            neighbors.extend_from_slice(list);
            offsets.push(neighbors.len() as u32);
        }

        CompressedNeighborMap::from_parts(self.cell_ids, offsets, neighbors)
    }
}

impl Default for NeighborMapBuilder {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
