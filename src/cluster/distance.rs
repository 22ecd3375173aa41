//! Distance-based (DR) clustering

use crate::cell::TriggerCell;
use crate::cluster::Cluster;
use crate::cluster::seeding::SeedClassifier;

/// Sequential single-pass clustering by distance to the cluster seeds.
///
/// Cells are visited once, in input order. A cell above its clustering threshold
/// joins the nearest pertinent cluster created so far (first one on ties), or
/// starts a new cluster if it is a seed. Otherwise it is dropped: a seed that
/// arrives later cannot claim cells that were already visited.
pub fn clusterize_dr(
    cells: &[TriggerCell],
    classifier: &SeedClassifier,
    dr: f64,
) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();

    for cell in cells {
        if !classifier.passes_clustering_threshold(cell) {
            continue;
        }

        let mut min_dist = dr;
        let mut target: Option<usize> = None;

        for (idx, cluster) in clusters.iter().enumerate() {
            if !cluster.is_pertinent(cell, dr) {
                continue;
            }

            let d = cluster.distance(cell);
            if d < min_dist {
                min_dist = d;
                target = Some(idx);
            }
        }

        match target {
            Some(idx) => {
                clusters[idx].add_constituent(cell, 1.0);
            }
            None if classifier.is_seed(cell) => clusters.push(Cluster::new(cell)),
            None => {}
        }
    }

    log::debug!("DR clustering formed {} clusters from {} cells", clusters.len(), cells.len());

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::test_support::cell;

    fn classifier() -> SeedClassifier {
        SeedClassifier::new(5.0, 5.0, 2.0, 2.0)
    }

    #[test]
    fn test_close_seeds_share_one_cluster() {
        let cells = vec![cell(1, 0.0, 0.0, 10.0, 1), cell(2, 0.5, 0.0, 8.0, 1)];

        let clusters = clusterize_dr(&cells, &classifier(), 1.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].id, 1);
        assert_eq!(clusters[0].len(), 2);

        let clusters = clusterize_dr(&cells, &classifier(), 0.1);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_cell_joins_nearest_cluster() {
        let cells = vec![
            cell(1, 0.0, 0.0, 10.0, 1),
            cell(2, 4.0, 0.0, 10.0, 1),
            cell(3, 2.5, 0.0, 3.0, 1),
        ];

        let clusters = clusterize_dr(&cells, &classifier(), 3.0);
        assert_eq!(clusters.len(), 2);
        assert!(clusters[1].contains(3));
        assert!(!clusters[0].contains(3));
    }

    #[test]
    fn test_equidistant_cell_goes_to_first_cluster() {
        let cells = vec![
            cell(1, 0.0, 0.0, 10.0, 1),
            cell(2, 4.0, 0.0, 10.0, 1),
            cell(3, 2.0, 0.0, 3.0, 1),
        ];

        let clusters = clusterize_dr(&cells, &classifier(), 3.0);
        assert!(clusters[0].contains(3));
        assert!(!clusters[1].contains(3));
    }

    #[test]
    fn test_non_seed_before_its_seed_is_dropped() {
        let cells = vec![cell(1, 0.5, 0.0, 3.0, 1), cell(2, 0.0, 0.0, 10.0, 1)];

        let clusters = clusterize_dr(&cells, &classifier(), 1.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 1);
        assert_eq!(clusters[0].id, 2);
    }

    #[test]
    fn test_below_threshold_cells_are_ignored() {
        let cells = vec![cell(1, 0.0, 0.0, 10.0, 1), cell(2, 0.1, 0.0, 1.0, 1)];

        let clusters = clusterize_dr(&cells, &classifier(), 1.0);
        assert_eq!(clusters.len(), 1);
        assert!(!clusters[0].contains(2));
    }

    #[test]
    fn test_layers_are_kept_apart() {
        let cells = vec![cell(1, 0.0, 0.0, 10.0, 1), cell(2, 0.0, 0.0, 3.0, 2)];

        let clusters = clusterize_dr(&cells, &classifier(), 1.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 1);
    }
}
