//! Clustering engine driving one bunch crossing through the selected algorithm

use std::collections::BTreeMap;
use rayon::prelude::*;
use crate::cell::{Side, TriggerCell};
use crate::cluster::calibration::Calibrator;
use crate::cluster::distance::clusterize_dr;
use crate::cluster::graph::clusterize_nn;
use crate::cluster::hybrid::clusterize_dr_nn;
use crate::cluster::seeding::SeedClassifier;
use crate::cluster::{Cluster, ClusterBxCollection};
use crate::config::{ClusterType, ClusteringConfig};
use crate::error::ClusteringError;
use crate::geometry::NeighborProvider;

/// Bunch crossing tag of every produced collection
pub const BX: i32 = 0;

/// Key of an independent clustering partition
pub type PartitionKey = (Side, u32);

/// Group cells by detector side and layer, keeping input order inside each group.
///
/// Partitions are ordered by side (minus first) then by ascending layer.
pub fn partition_cells(cells: &[TriggerCell]) -> Vec<(PartitionKey, Vec<TriggerCell>)> {
    let mut partitions: BTreeMap<PartitionKey, Vec<TriggerCell>> = BTreeMap::new();

    for cell in cells {
        partitions.entry((cell.side, cell.layer)).or_default().push(*cell);
    }

    partitions.into_iter().collect()
}

/// Turns the trigger cells of one bunch crossing into calibrated 2D clusters
#[derive(Debug, Clone)]
pub struct ClusteringEngine {
    config: ClusteringConfig,
    classifier: SeedClassifier,
    calibrator: Calibrator,
}

impl ClusteringEngine {
    /// Validate the configuration and build the engine
    pub fn new(config: ClusteringConfig) -> Result<Self, ClusteringError> {
        config.validate()?;

        log::info!("C2d clustering algorithm selected: {}", config.cluster_type);
        log::info!("C2d silicon seeding threshold: {}", config.seeding_threshold_silicon);
        log::info!("C2d silicon clustering threshold: {}", config.clustering_threshold_silicon);
        log::info!("C2d scintillator seeding threshold: {}", config.seeding_threshold_scintillator);
        log::info!("C2d scintillator clustering threshold: {}", config.clustering_threshold_scintillator);
        if config.apply_layer_calibration {
            log::info!("C2d per-layer calibration with {} weights", config.layer_weights.len());
        } else {
            log::info!("C2d global calibration factor: {}", config.calib_sf_cluster);
        }

        Ok(Self {
            classifier: SeedClassifier::from_config(&config),
            calibrator: Calibrator::from_config(&config),
            config,
        })
    }

    /// Validated configuration driving the engine
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Threshold policy derived from the configuration
    pub fn classifier(&self) -> &SeedClassifier {
        &self.classifier
    }

    /// Cluster the trigger cells of one bunch crossing.
    ///
    /// Any error aborts the whole crossing; no partial collection is returned.
    pub fn run<G: NeighborProvider + ?Sized>(
        &self,
        cells: &[TriggerCell],
        geometry: &G,
    ) -> Result<ClusterBxCollection, ClusteringError> {
        let clusters = match self.config.cluster_type {
            ClusterType::Dr => {
                let mut clusters = clusterize_dr(cells, &self.classifier, self.config.dr_cluster);
                for cluster in &mut clusters {
                    self.calibrator.calibrate(cluster)?;
                }
                clusters
            }
            ClusterType::Nn | ClusterType::DrNn => self.run_partitioned(cells, geometry)?,
        };

        log::debug!(
            "Clustered {} trigger cells into {} clusters with {}",
            cells.len(),
            clusters.len(),
            self.config.cluster_type
        );

        let mut collection = ClusterBxCollection::new(BX);
        collection.clusters = clusters;
        Ok(collection)
    }

    /// Run the graph-based algorithms independently on every side/layer partition
    fn run_partitioned<G: NeighborProvider + ?Sized>(
        &self,
        cells: &[TriggerCell],
        geometry: &G,
    ) -> Result<Vec<Cluster>, ClusteringError> {
        let partitions = partition_cells(cells);

        // Results stay in partition order, so the first error is deterministic
        let results: Vec<Result<Vec<Cluster>, ClusteringError>> = if self.config.parallel_partitions {
            partitions
                .par_iter()
                .map(|(key, part)| self.cluster_partition(*key, part, geometry))
                .collect()
        } else {
            partitions
                .iter()
                .map(|(key, part)| self.cluster_partition(*key, part, geometry))
                .collect()
        };

        let mut clusters = Vec::new();
        for result in results {
            clusters.extend(result?);
        }
        Ok(clusters)
    }

    fn cluster_partition<G: NeighborProvider + ?Sized>(
        &self,
        (side, layer): PartitionKey,
        cells: &[TriggerCell],
        geometry: &G,
    ) -> Result<Vec<Cluster>, ClusteringError> {
        let mut clusters = match self.config.cluster_type {
            ClusterType::Nn => clusterize_nn(cells, &self.classifier, geometry)?,
            _ => clusterize_dr_nn(cells, &self.classifier, geometry, self.config.dr_cluster),
        };

        for cluster in &mut clusters {
            self.calibrator.calibrate(cluster)?;
        }

        log::debug!(
            "Partition side {} layer {}: {} cells, {} clusters",
            side.sign(),
            layer,
            cells.len(),
            clusters.len()
        );

        Ok(clusters)
    }
}
