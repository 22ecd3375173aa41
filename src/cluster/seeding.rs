//! Seed and clustering threshold policy

use crate::cell::{Subdetector, TriggerCell};
use crate::config::ClusteringConfig;

/// Per-subdetector energy thresholds deciding which cells take part in
/// clustering and which may originate a cluster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedClassifier {
    seed_silicon: f64,
    seed_scintillator: f64,
    clustering_silicon: f64,
    clustering_scintillator: f64,
}

impl SeedClassifier {
    /// Classifier with explicit seed and clustering thresholds per subdetector
    pub fn new(
        seed_silicon: f64,
        seed_scintillator: f64,
        clustering_silicon: f64,
        clustering_scintillator: f64,
    ) -> Self {
        Self {
            seed_silicon,
            seed_scintillator,
            clustering_silicon,
            clustering_scintillator,
        }
    }

    /// Thresholds taken from the clustering configuration
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self::new(
            config.seeding_threshold_silicon,
            config.seeding_threshold_scintillator,
            config.clustering_threshold_silicon,
            config.clustering_threshold_scintillator,
        )
    }

    /// Energy a cell must exceed to seed a cluster
    pub fn seed_threshold(&self, subdet: Subdetector) -> f64 {
        match subdet {
            Subdetector::Silicon => self.seed_silicon,
            Subdetector::Scintillator => self.seed_scintillator,
        }
    }

    /// Energy below which a cell is ignored by clustering
    pub fn clustering_threshold(&self, subdet: Subdetector) -> f64 {
        match subdet {
            Subdetector::Silicon => self.clustering_silicon,
            Subdetector::Scintillator => self.clustering_scintillator,
        }
    }

    /// Strictly above the seed threshold of its subdetector
    pub fn is_seed(&self, cell: &TriggerCell) -> bool {
        cell.mip_pt > self.seed_threshold(cell.subdet)
    }

    /// Not below the clustering threshold; a cell exactly at the threshold participates
    pub fn passes_clustering_threshold(&self, cell: &TriggerCell) -> bool {
        !(cell.mip_pt < self.clustering_threshold(cell.subdet))
    }
}
