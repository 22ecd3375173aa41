//! Two-dimensional trigger cell clustering module

pub mod seeding;
pub mod distance;
pub mod graph;
pub mod hybrid;
pub mod calibration;
pub mod engine;

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::cell::{CellId, Position, Side, Subdetector, TriggerCell};

/// Bookkeeping state of a cluster inside an algorithm's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClusterState {
    /// Still owns its constituents
    #[default]
    Active,

    /// Absorbed into another cluster during graph merging
    Merged,
}

/// A trigger cell attached to a cluster with its share of energy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    pub cell: TriggerCell,

    /// Fraction of the cell energy owned by the cluster, in (0, 1]
    pub fraction: f64,
}

/// Direction and transverse momentum of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
}

/// Energy-weighted group of trigger cells in a single layer and side.
///
/// The seed is always the first constituent, with fraction 1.0, and gives the
/// cluster its identifier, layer, subdetector and side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Identifier of the seed cell
    pub id: CellId,

    pub layer: u32,

    pub side: Side,

    pub subdet: Subdetector,

    /// Position of the seed cell, reference point of the pertinence test
    pub seed_position: Position,

    /// Energy of the seed cell
    pub seed_mip_pt: f64,

    /// Constituents in insertion order
    constituents: Vec<Constituent>,

    /// Fraction-weighted sum of constituent mip_pt
    mip_pt: f64,

    /// Fraction-weighted sum of constituent pt
    pt: f64,

    /// Energy-weighted barycentre
    centre: Position,

    /// Kinematics; pt is replaced by calibration
    kinematics: Kinematics,

    #[serde(skip)]
    state: ClusterState,

    #[serde(skip)]
    weighted_position: Position,

    /// Constituent identifier to position in `constituents`
    #[serde(skip)]
    index: HashMap<CellId, usize>,
}

impl Cluster {
    /// Start a cluster from its seed cell
    pub fn new(seed: &TriggerCell) -> Self {
        let mut cluster = Self {
            id: seed.id,
            layer: seed.layer,
            side: seed.side,
            subdet: seed.subdet,
            seed_position: seed.position,
            seed_mip_pt: seed.mip_pt,
            constituents: Vec::with_capacity(8),
            mip_pt: 0.0,
            pt: 0.0,
            centre: seed.position,
            kinematics: Kinematics::default(),
            state: ClusterState::Active,
            weighted_position: Position::default(),
            index: HashMap::with_capacity(8),
        };
        cluster.add_constituent(seed, 1.0);
        cluster
    }

    /// Attach a cell with the given energy fraction.
    ///
    /// Returns false, leaving the cluster untouched, if the cell is already a constituent.
    pub fn add_constituent(&mut self, cell: &TriggerCell, fraction: f64) -> bool {
        if self.contains(cell.id) {
            return false;
        }

        self.index.insert(cell.id, self.constituents.len());
        self.constituents.push(Constituent { cell: *cell, fraction });
        self.accumulate(cell, fraction);
        self.update_derived();
        true
    }

    /// Detach a cell; aggregates are recomputed from the remaining constituents
    pub fn remove_constituent(&mut self, id: CellId) -> Option<Constituent> {
        let pos = self.index.remove(&id)?;
        let removed = self.constituents.remove(pos);

        self.mip_pt = 0.0;
        self.pt = 0.0;
        self.weighted_position = Position::default();
        for i in 0..self.constituents.len() {
            let Constituent { cell, fraction } = self.constituents[i];
            self.accumulate(&cell, fraction);
            if i >= pos {
                self.index.insert(cell.id, i);
            }
        }
        self.update_derived();

        Some(removed)
    }

    fn accumulate(&mut self, cell: &TriggerCell, fraction: f64) {
        let energy = cell.mip_pt * fraction;
        self.mip_pt += energy;
        self.pt += cell.pt * fraction;
        self.weighted_position.x += cell.position.x * energy;
        self.weighted_position.y += cell.position.y * energy;
        self.weighted_position.z += cell.position.z * energy;
    }

    fn update_derived(&mut self) {
        self.centre = if self.mip_pt > 0.0 {
            Position::new(
                self.weighted_position.x / self.mip_pt,
                self.weighted_position.y / self.mip_pt,
                self.weighted_position.z / self.mip_pt,
            )
        } else {
            self.seed_position
        };
        self.kinematics = Kinematics {
            pt: self.pt,
            eta: self.centre.eta(),
            phi: self.centre.phi(),
        };
    }

    /// Whether the cell is already a constituent
    pub fn contains(&self, id: CellId) -> bool {
        self.index.contains_key(&id)
    }

    /// Constituents in insertion order, seed first
    pub fn constituents(&self) -> &[Constituent] {
        &self.constituents
    }

    /// (constituent identifier, fraction) pairs in insertion order
    pub fn constituent_fractions(&self) -> impl Iterator<Item = (CellId, f64)> + '_ {
        self.constituents.iter().map(|c| (c.cell.id, c.fraction))
    }

    /// Fraction of a cell owned by this cluster, if it is a constituent
    pub fn fraction_of(&self, id: CellId) -> Option<f64> {
        self.index.get(&id).map(|&pos| self.constituents[pos].fraction)
    }

    /// Number of constituents, seed included
    pub fn len(&self) -> usize {
        self.constituents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }

    /// Fraction-weighted energy in transverse MIP units
    pub fn mip_pt(&self) -> f64 {
        self.mip_pt
    }

    /// Uncalibrated transverse momentum
    pub fn pt(&self) -> f64 {
        self.pt
    }

    /// Energy-weighted barycentre, or the seed position for a zero-energy cluster
    pub fn centre(&self) -> Position {
        self.centre
    }

    /// Calibrated pt with the direction of the barycentre
    pub fn kinematics(&self) -> Kinematics {
        self.kinematics
    }

    /// Replace the transverse momentum, keeping the direction
    pub fn set_calibrated_pt(&mut self, pt: f64) {
        self.kinematics.pt = pt;
    }

    /// Arena state, `Merged` once absorbed by graph merging
    pub fn state(&self) -> ClusterState {
        self.state
    }

    /// Not yet absorbed by another cluster
    pub fn is_active(&self) -> bool {
        self.state == ClusterState::Active
    }

    pub(crate) fn mark_merged(&mut self) {
        self.state = ClusterState::Merged;
    }

    /// Distance between a cell and the seed
    pub fn distance(&self, cell: &TriggerCell) -> f64 {
        self.seed_position.distance(&cell.position)
    }

    /// Pertinence test shared by the DR and DR-NN algorithms: same layer,
    /// subdetector and side, and closer than `dr` to the seed.
    pub fn is_pertinent(&self, cell: &TriggerCell, dr: f64) -> bool {
        if cell.layer != self.layer || cell.subdet != self.subdet || cell.side != self.side {
            return false;
        }
        self.distance(cell) < dr
    }
}

/// Clusters produced for one bunch crossing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterBxCollection {
    /// Bunch crossing tag shared by all clusters
    pub bx: i32,

    pub clusters: Vec<Cluster>,
}

impl ClusterBxCollection {
    /// Empty collection for a bunch crossing
    pub fn new(bx: i32) -> Self {
        Self { bx, clusters: Vec::new() }
    }

    pub fn push(&mut self, cluster: Cluster) {
        self.clusters.push(cluster);
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::cell;

    #[test]
    fn test_seed_is_first_constituent() {
        let seed = cell(7, 1.0, 2.0, 10.0, 3);
        let cluster = Cluster::new(&seed);

        assert_eq!(cluster.id, 7);
        assert_eq!(cluster.layer, 3);
        assert_eq!(cluster.len(), 1);
        assert_eq!(cluster.fraction_of(7), Some(1.0));
        assert_eq!(cluster.mip_pt(), 10.0);
        assert_eq!(cluster.centre(), seed.position);
    }

    #[test]
    fn test_fractional_add_and_remove_update_aggregates() {
        let mut cluster = Cluster::new(&cell(1, 0.0, 0.0, 6.0, 1));
        assert!(cluster.add_constituent(&cell(2, 4.0, 0.0, 4.0, 1), 0.5));
        assert!(!cluster.add_constituent(&cell(2, 4.0, 0.0, 4.0, 1), 0.5));

        assert_eq!(cluster.len(), 2);
        assert!((cluster.mip_pt() - 8.0).abs() < 1e-12);
        // (0*6 + 4*2) / 8
        assert!((cluster.centre().x - 1.0).abs() < 1e-12);

        let removed = cluster.remove_constituent(2).unwrap();
        assert_eq!(removed.fraction, 0.5);
        assert!((cluster.mip_pt() - 6.0).abs() < 1e-12);
        assert!(cluster.centre().x.abs() < 1e-12);
        assert!(cluster.remove_constituent(2).is_none());
    }

    #[test]
    fn test_removal_keeps_lookup_in_step_with_order() {
        let mut cluster = Cluster::new(&cell(1, 0.0, 0.0, 6.0, 1));
        for id in 2..=5 {
            cluster.add_constituent(&cell(id, id as f64, 0.0, 1.0, 1), 0.25 * (id - 1) as f64);
        }

        cluster.remove_constituent(3);
        let ids: Vec<CellId> = cluster.constituent_fractions().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
        assert!(!cluster.contains(3));
        assert_eq!(cluster.fraction_of(4), Some(0.75));
        assert_eq!(cluster.fraction_of(5), Some(1.0));

        // A removed cell can be attached again, at the end
        assert!(cluster.add_constituent(&cell(3, 3.0, 0.0, 1.0, 1), 0.5));
        assert_eq!(cluster.constituents().last().map(|c| c.cell.id), Some(3));
        assert_eq!(cluster.fraction_of(3), Some(0.5));
        assert!(!cluster.add_constituent(&cell(5, 5.0, 0.0, 1.0, 1), 1.0));
    }

    #[test]
    fn test_pertinence_requires_same_layer_subdet_and_side() {
        let cluster = Cluster::new(&cell(1, 0.0, 0.0, 6.0, 1));

        assert!(cluster.is_pertinent(&cell(2, 0.5, 0.0, 1.0, 1), 1.0));
        assert!(!cluster.is_pertinent(&cell(2, 1.0, 0.0, 1.0, 1), 1.0));
        assert!(!cluster.is_pertinent(&cell(2, 0.5, 0.0, 1.0, 2), 1.0));

        let mut other_side = cell(2, 0.5, 0.0, 1.0, 1);
        other_side.side = Side::Minus;
        assert!(!cluster.is_pertinent(&other_side, 1.0));

        let mut scintillator = cell(2, 0.5, 0.0, 1.0, 1);
        scintillator.subdet = Subdetector::Scintillator;
        assert!(!cluster.is_pertinent(&scintillator, 1.0));
    }

    #[test]
    fn test_calibration_keeps_direction() {
        let mut cluster = Cluster::new(&cell(1, 30.0, 40.0, 6.0, 1));
        let before = cluster.kinematics();
        cluster.set_calibrated_pt(12.0);

        let after = cluster.kinematics();
        assert_eq!(after.pt, 12.0);
        assert_eq!(after.eta, before.eta);
        assert_eq!(after.phi, before.phi);
        assert_eq!(cluster.pt(), 6.0);
    }
}
