//! Hybrid DR-NN clustering with fractional energy sharing

use itertools::Itertools;
use crate::cell::{CellId, TriggerCell};
use crate::cluster::Cluster;
use crate::cluster::seeding::SeedClassifier;
use crate::geometry::NeighborProvider;

/// Seeds surviving neighbor suppression, with the seed mark of every cell
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSelection {
    /// Indices into the input cells, in acceptance order
    pub seeds: Vec<usize>,

    /// Cells treated as seeds by the assignment pass, including retracted ones
    pub is_seed: Vec<bool>,
}

/// Pick cluster seeds, suppressing seeds that are close geometric neighbors.
///
/// A candidate is appended to the accepted list, then compared with every seed
/// accepted before it. Each earlier seed that lies within `dr` and is listed as
/// a neighbor of the candidate pops the last accepted entry: the first hit
/// rejects the candidate, further hits retract the most recent accepted seeds.
/// Retracted seeds keep their seed mark, so they are neither cluster origins
/// nor shared as ordinary cells. The outcome depends on input order.
pub fn select_seeds<G: NeighborProvider + ?Sized>(
    cells: &[TriggerCell],
    classifier: &SeedClassifier,
    geometry: &G,
    dr: f64,
) -> SeedSelection {
    let mut is_seed = vec![false; cells.len()];
    let mut seeds: Vec<usize> = Vec::with_capacity(cells.len());

    for (idx, cell) in cells.iter().enumerate() {
        if !classifier.is_seed(cell) {
            continue;
        }
        is_seed[idx] = true;

        let conflicts = seeds
            .iter()
            .filter(|&&pos| {
                let other = &cells[pos];
                cell.position.distance(&other.position) < dr
                    && geometry.are_neighbors(cell.id, other.id)
            })
            .count();

        seeds.push(idx);
        if conflicts > 0 {
            is_seed[idx] = false;
            seeds.truncate(seeds.len().saturating_sub(conflicts));
        }
    }

    SeedSelection { seeds, is_seed }
}

/// Cluster one side/layer partition with the DR-NN scheme.
///
/// Every surviving seed starts a cluster. Each remaining above-threshold cell
/// joins all clusters it is pertinent to; a cell pertinent to several clusters
/// is shared in proportion to their seed energies. Clusters are then pruned of
/// cells not connected to their seed.
pub fn clusterize_dr_nn<G: NeighborProvider + ?Sized>(
    cells: &[TriggerCell],
    classifier: &SeedClassifier,
    geometry: &G,
    dr: f64,
) -> Vec<Cluster> {
    let selection = select_seeds(cells, classifier, geometry, dr);

    let mut clusters: Vec<Cluster> = selection
        .seeds
        .iter()
        .map(|&pos| Cluster::new(&cells[pos]))
        .collect();

    let mut pertinent: Vec<usize> = Vec::new();
    let mut shared = 0usize;

    for (idx, cell) in cells.iter().enumerate() {
        if !classifier.passes_clustering_threshold(cell) || selection.is_seed[idx] {
            continue;
        }

        pertinent.clear();
        pertinent.extend(
            clusters
                .iter()
                .enumerate()
                .filter(|(_, cluster)| cluster.is_pertinent(cell, dr))
                .map(|(i, _)| i),
        );

        match pertinent.as_slice() {
            [] => {}
            [only] => {
                clusters[*only].add_constituent(cell, 1.0);
            }
            several => {
                let total: f64 = several.iter().map(|&i| clusters[i].seed_mip_pt).sum();
                for &i in several {
                    let fraction = clusters[i].seed_mip_pt / total;
                    clusters[i].add_constituent(cell, fraction);
                }
                shared += 1;
            }
        }
    }

    for cluster in &mut clusters {
        prune_unconnected(cluster, geometry);
    }

    log::debug!(
        "DR-NN clustering formed {} clusters from {} cells ({} shared cells)",
        clusters.len(),
        cells.len(),
        shared
    );

    clusters
}

/// Remove constituents not reachable from the seed.
///
/// Constituents are visited by increasing distance to the seed (insertion order
/// on ties, so the seed comes first). A constituent is kept only if it lists an
/// already kept constituent as a neighbor. This is a greedy approximation of
/// connectivity: a cell connected only through a farther cell is removed.
pub fn prune_unconnected<G: NeighborProvider + ?Sized>(cluster: &mut Cluster, geometry: &G) {
    let seed_position = cluster.seed_position;

    // sorted_by is stable
    let ordered: Vec<(CellId, f64)> = cluster
        .constituents()
        .iter()
        .map(|c| (c.cell.id, seed_position.distance(&c.cell.position)))
        .sorted_by(|a, b| a.1.total_cmp(&b.1))
        .collect();

    let mut kept: Vec<CellId> = Vec::with_capacity(ordered.len());
    let mut removed: Vec<CellId> = Vec::new();

    for (rank, &(id, _)) in ordered.iter().enumerate() {
        if rank == 0 || kept.iter().any(|&k| geometry.are_neighbors(id, k)) {
            kept.push(id);
        } else {
            removed.push(id);
        }
    }

    for id in removed {
        cluster.remove_constituent(id);
    }
}
