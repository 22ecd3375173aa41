//! JSON readers for trigger cells and neighbor maps

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use crate::cell::{CellId, TriggerCell};
use crate::geometry::{CompressedNeighborMap, NeighborMapBuilder};

/// One adjacency record of a neighbor map file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEntry {
    pub cell: CellId,
    pub neighbors: Vec<CellId>,
}

/// Read a JSON array of trigger cells
pub fn load_trigger_cells(path: &Path) -> Result<Vec<TriggerCell>> {
    log::info!("Reading trigger cells from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("opening trigger cell file {}", path.display()))?;
    let cells: Vec<TriggerCell> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing trigger cell file {}", path.display()))?;

    log::info!("Loaded {} trigger cells", cells.len());

    Ok(cells)
}

/// Read a JSON array of `{ "cell": id, "neighbors": [ids] }` records.
///
/// Entries are taken as written; a symmetric geometry must list both directions.
pub fn load_neighbor_map(path: impl AsRef<Path>) -> Result<CompressedNeighborMap> {
    let path = path.as_ref();
    log::info!("Reading neighbor map from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("opening neighbor map {}", path.display()))?;
    let entries: Vec<NeighborEntry> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing neighbor map {}", path.display()))?;

    Ok(build_neighbor_map(&entries))
}

/// Compress adjacency records into a neighbor map
pub fn build_neighbor_map(entries: &[NeighborEntry]) -> CompressedNeighborMap {
    let mut builder = NeighborMapBuilder::with_capacity(entries.len());
    for entry in entries {
        builder.add_neighbors(entry.cell, &entry.neighbors);
    }

    let map = builder.build();
    log::info!(
        "Built neighbor map with {} cells and {} links ({} bytes)",
        map.cell_count,
        map.neighbors.len(),
        map.memory_usage()
    );

    map
}
