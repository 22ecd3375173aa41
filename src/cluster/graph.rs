//! Nearest-neighbor (NN) graph clustering

use std::collections::{HashMap, HashSet};
use crate::cell::{CellId, TriggerCell};
use crate::cluster::{Cluster, Constituent};
use crate::cluster::seeding::SeedClassifier;
use crate::error::ClusteringError;
use crate::geometry::NeighborProvider;

/// Cluster the cells of one side/layer partition by adjacency.
///
/// Growth attaches each cell to the cluster of its first already-clustered
/// neighbor. Clusters touching each other's halo are then merged, and only
/// clusters holding at least one seed-qualifying cell are returned.
pub fn clusterize_nn<G: NeighborProvider + ?Sized>(
    cells: &[TriggerCell],
    classifier: &SeedClassifier,
    geometry: &G,
) -> Result<Vec<Cluster>, ClusteringError> {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut cluster_of: HashMap<CellId, usize> = HashMap::with_capacity(cells.len());

    grow_clusters(cells, classifier, geometry, &mut clusters, &mut cluster_of)?;
    let grown = clusters.len();

    merge_clusters(&mut clusters, geometry);

    // Only keep clusters that contain a cell above the seed threshold
    let kept: Vec<Cluster> = clusters
        .into_iter()
        .filter(|cluster| cluster.is_active())
        .filter(|cluster| {
            cluster.constituents().iter().any(|c| classifier.is_seed(&c.cell))
        })
        .collect();

    log::debug!("NN clustering grew {} clusters, kept {} after merging", grown, kept.len());

    Ok(kept)
}

/// Attach every above-threshold cell to a neighbor's cluster or start a new one
fn grow_clusters<G: NeighborProvider + ?Sized>(
    cells: &[TriggerCell],
    classifier: &SeedClassifier,
    geometry: &G,
    clusters: &mut Vec<Cluster>,
    cluster_of: &mut HashMap<CellId, usize>,
) -> Result<(), ClusteringError> {
    for cell in cells {
        if !classifier.passes_clustering_threshold(cell) {
            continue;
        }

        let mut joined = false;
        for &neighbor in geometry.neighbors(cell.id) {
            if let Some(&idx) = cluster_of.get(&neighbor) {
                let len = clusters.len();
                let cluster = clusters.get_mut(idx).ok_or(ClusteringError::UnknownClusterIndex {
                    cell: neighbor,
                    index: idx,
                    len,
                })?;
                cluster.add_constituent(cell, 1.0);
                cluster_of.entry(cell.id).or_insert(idx);
                joined = true;
                break;
            }
        }

        if !joined {
            clusters.push(Cluster::new(cell));
            cluster_of.entry(cell.id).or_insert(clusters.len() - 1);
        }
    }

    Ok(())
}

/// Add the constituents and all their neighbors to a halo set
fn extend_halo<G: NeighborProvider + ?Sized>(
    halo: &mut HashSet<CellId>,
    constituents: &[Constituent],
    geometry: &G,
) {
    for constituent in constituents {
        halo.insert(constituent.cell.id);
        halo.extend(geometry.neighbors(constituent.cell.id).iter().copied());
    }
}

/// Fold every active cluster touching another cluster's halo into it.
///
/// The other clusters are rescanned until a full pass absorbs nothing, so a
/// halo grown by a late absorption still reaches clusters scanned earlier.
/// Absorbed clusters are only marked merged, never removed, so indices stay stable.
fn merge_clusters<G: NeighborProvider + ?Sized>(clusters: &mut [Cluster], geometry: &G) {
    let mut halo: HashSet<CellId> = HashSet::new();

    for main in 0..clusters.len() {
        if !clusters[main].is_active() {
            continue;
        }

        halo.clear();
        extend_halo(&mut halo, clusters[main].constituents(), geometry);

        loop {
            let mut absorbed_any = false;

            for other in 0..clusters.len() {
                if other == main || !clusters[other].is_active() {
                    continue;
                }

                let touches = clusters[other]
                    .constituents()
                    .iter()
                    .any(|c| halo.contains(&c.cell.id));
                if !touches {
                    continue;
                }

                let absorbed = clusters[other].constituents().to_vec();
                for constituent in &absorbed {
                    clusters[main].add_constituent(&constituent.cell, constituent.fraction);
                }
                extend_halo(&mut halo, &absorbed, geometry);
                clusters[other].mark_merged();
                absorbed_any = true;
            }

            if !absorbed_any {
                break;
            }
        }
    }
}
