//! Core library functions for two-dimensional trigger cell clustering

pub mod cell;
pub mod config;
pub mod error;
pub mod geometry;
pub mod cluster;
pub mod data;
pub mod storage;

pub use anyhow::{Result, anyhow};
pub use cell::{CellId, Position, Side, Subdetector, TriggerCell};
pub use cluster::{Cluster, ClusterBxCollection};
pub use cluster::engine::ClusteringEngine;
pub use config::{ClusterType, ClusteringConfig};
pub use error::{ClusteringError, ErrorKind};
pub use geometry::{CompressedNeighborMap, NeighborMapBuilder, NeighborProvider};
