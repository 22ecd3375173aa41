//! Post-hoc cluster energy calibration

use crate::cluster::Cluster;
use crate::config::ClusteringConfig;
use crate::error::ClusteringError;

/// How a cluster's transverse momentum is rescaled
#[derive(Debug, Clone, PartialEq)]
pub enum Calibrator {
    /// `weights[layer] * mip_pt`
    LayerWeights(Vec<f64>),

    /// `scale * pt`
    Global(f64),
}

impl Calibrator {
    /// Per-layer weights when layer calibration is enabled, else the global factor
    pub fn from_config(config: &ClusteringConfig) -> Self {
        if config.apply_layer_calibration {
            Calibrator::LayerWeights(config.layer_weights.clone())
        } else {
            Calibrator::Global(config.calib_sf_cluster)
        }
    }

    /// Replace the cluster pt with its calibrated value
    pub fn calibrate(&self, cluster: &mut Cluster) -> Result<(), ClusteringError> {
        let calibrated = match self {
            Calibrator::LayerWeights(weights) => {
                let weight = *weights.get(cluster.layer as usize).ok_or(
                    ClusteringError::MissingLayerWeight {
                        layer: cluster.layer,
                        available: weights.len(),
                    },
                )?;
                if weight == 0.0 {
                    return Err(ClusteringError::ZeroLayerWeight { layer: cluster.layer });
                }
                weight * cluster.mip_pt()
            }
            Calibrator::Global(scale) => cluster.kinematics().pt * scale,
        };

        cluster.set_calibrated_pt(calibrated);
        Ok(())
    }
}
