//! Configuration management for the trigger cell clustering

use crate::error::ClusteringError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Clustering algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterType {
    /// Distance-based sequential clustering
    #[serde(rename = "DR")]
    Dr,

    /// Nearest-neighbor graph clustering
    #[serde(rename = "NN")]
    Nn,

    /// Seed suppression with fractional sharing and connectivity pruning
    #[serde(rename = "DR-NN")]
    DrNn,
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterType::Dr => write!(f, "DR"),
            ClusterType::Nn => write!(f, "NN"),
            ClusterType::DrNn => write!(f, "DR-NN"),
        }
    }
}

impl FromStr for ClusterType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DR" => Ok(ClusterType::Dr),
            "NN" => Ok(ClusterType::Nn),
            "DR-NN" => Ok(ClusterType::DrNn),
            other => Err(format!("unknown cluster type `{}` (expected DR, NN or DR-NN)", other)),
        }
    }
}

/// Parameters of the 2D clustering step.
///
/// Thresholds, radius, algorithm and scale factor are required when loading
/// from JSON; unknown keys are rejected so a misspelled key cannot fall back
/// to a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusteringConfig {
    /// Seed threshold for silicon cells (transverse MIP)
    pub seeding_threshold_silicon: f64,

    /// Seed threshold for scintillator cells
    pub seeding_threshold_scintillator: f64,

    /// Minimum silicon cell energy to take part in clustering
    pub clustering_threshold_silicon: f64,

    /// Minimum scintillator cell energy to take part in clustering
    pub clustering_threshold_scintillator: f64,

    /// Radius of the pertinence test used by DR and DR-NN
    #[serde(rename = "dR_cluster")]
    pub dr_cluster: f64,

    /// Algorithm to run
    #[serde(rename = "clusterType")]
    pub cluster_type: ClusterType,

    /// Global calibration scale factor
    #[serde(rename = "calibSF_cluster")]
    pub calib_sf_cluster: f64,

    /// Per-layer calibration weights, indexed by layer
    #[serde(rename = "layerWeights", default)]
    pub layer_weights: Vec<f64>,

    /// Use the per-layer weights instead of the global factor
    #[serde(rename = "applyLayerCalibration", default)]
    pub apply_layer_calibration: bool,

    /// Run independent side/layer partitions on the rayon pool
    #[serde(rename = "parallelPartitions", default = "default_parallel_partitions")]
    pub parallel_partitions: bool,
}

fn default_parallel_partitions() -> bool {
    true
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seeding_threshold_silicon: 5.0,
            seeding_threshold_scintillator: 5.0,
            clustering_threshold_silicon: 2.0,
            clustering_threshold_scintillator: 2.0,
            dr_cluster: 3.0,
            cluster_type: ClusterType::Nn,
            calib_sf_cluster: 1.0,
            layer_weights: Vec::new(),
            apply_layer_calibration: false,
            parallel_partitions: default_parallel_partitions(),
        }
    }
}

impl ClusteringConfig {
    /// Create a new configuration with custom thresholds and algorithm
    pub fn new(
        seeding_threshold_silicon: f64,
        seeding_threshold_scintillator: f64,
        clustering_threshold_silicon: f64,
        clustering_threshold_scintillator: f64,
        dr_cluster: f64,
        cluster_type: ClusterType,
    ) -> Self {
        Self {
            seeding_threshold_silicon,
            seeding_threshold_scintillator,
            clustering_threshold_silicon,
            clustering_threshold_scintillator,
            dr_cluster,
            cluster_type,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        Ok(config)
    }

    /// Check that the parameters can drive a clustering pass
    pub fn validate(&self) -> std::result::Result<(), ClusteringError> {
        let thresholds = [
            ("seeding_threshold_silicon", self.seeding_threshold_silicon),
            ("seeding_threshold_scintillator", self.seeding_threshold_scintillator),
            ("clustering_threshold_silicon", self.clustering_threshold_silicon),
            ("clustering_threshold_scintillator", self.clustering_threshold_scintillator),
            ("calibSF_cluster", self.calib_sf_cluster),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(ClusteringError::InvalidParameter {
                    name,
                    reason: format!("{} is not a finite number", value),
                });
            }
        }

        if !(self.dr_cluster.is_finite() && self.dr_cluster > 0.0) {
            return Err(ClusteringError::InvalidParameter {
                name: "dR_cluster",
                reason: format!("{} is not a positive finite radius", self.dr_cluster),
            });
        }

        // Zero weights are only fatal for layers that actually produce clusters
        if self.apply_layer_calibration && self.layer_weights.is_empty() {
            return Err(ClusteringError::InvalidParameter {
                name: "layerWeights",
                reason: "layer calibration is enabled but no weights are configured".to_string(),
            });
        }

        Ok(())
    }
}
