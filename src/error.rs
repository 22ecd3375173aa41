//! Error types for the clustering core

use crate::cell::CellId;
use thiserror::Error;

/// Broad classification of a clustering failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration cannot produce meaningful clusters
    Configuration,

    /// Algorithm bookkeeping was found in an impossible state
    InternalConsistency,
}

/// Fatal failures of a clustering pass. Both kinds abort the current time slot.
#[derive(Debug, Error, PartialEq)]
pub enum ClusteringError {
    #[error(
        "2D cluster energy forced to 0 by the calibration weight of layer {layer}; \
         discarded layers must be declared as disconnected in the geometry, not with a zero weight"
    )]
    ZeroLayerWeight { layer: u32 },

    #[error("no calibration weight configured for layer {layer} ({available} weights available)")]
    MissingLayerWeight { layer: u32, available: usize },

    #[error("invalid configuration parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(
        "trigger cell {cell} is mapped to cluster index {index}, but only {len} clusters exist"
    )]
    UnknownClusterIndex { cell: CellId, index: usize, len: usize },
}

impl ClusteringError {
    /// Category of the failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClusteringError::ZeroLayerWeight { .. }
            | ClusteringError::MissingLayerWeight { .. }
            | ClusteringError::InvalidParameter { .. } => ErrorKind::Configuration,
            ClusteringError::UnknownClusterIndex { .. } => ErrorKind::InternalConsistency,
        }
    }
}
