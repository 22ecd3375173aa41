//! Trigger cell representation

use serde::{Serialize, Deserialize};
use std::fmt;

/// Detector cell identifier
pub type CellId = u32;

/// Calorimeter technology a trigger cell belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subdetector {
    /// Silicon sensors (electromagnetic and front hadronic sections)
    Silicon,

    /// Scintillator tiles (back hadronic section)
    Scintillator,
}

impl fmt::Display for Subdetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subdetector::Silicon => write!(f, "silicon"),
            Subdetector::Scintillator => write!(f, "scintillator"),
        }
    }
}

/// Detector half along the beam axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Side {
    Minus,
    Plus,
}

impl Side {
    /// Signed representation (-1 or +1)
    pub fn sign(self) -> i8 {
        match self {
            Side::Minus => -1,
            Side::Plus => 1,
        }
    }
}

impl TryFrom<i8> for Side {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Side::Minus),
            1 => Ok(Side::Plus),
            other => Err(format!("invalid detector side {}, expected -1 or +1", other)),
        }
    }
}

impl From<Side> for i8 {
    fn from(side: Side) -> Self {
        side.sign()
    }
}

/// Cartesian position in detector coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Position from cartesian coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Pseudorapidity of the direction from the origin
    pub fn eta(&self) -> f64 {
        let r = self.x.hypot(self.y);
        if r == 0.0 {
            return 0.0;
        }
        (self.z / r).asinh()
    }

    /// Azimuthal angle
    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

/// A basic readout unit with an energy deposit, as produced by the digitization step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerCell {
    /// Unique detector cell identifier
    pub id: CellId,

    /// Cell centre
    pub position: Position,

    /// Energy in transverse minimum-ionizing-particle units, used for thresholds
    pub mip_pt: f64,

    /// Transverse momentum carried by the cell
    pub pt: f64,

    /// Technology the cell belongs to
    pub subdet: Subdetector,

    /// Layer index, unique across the whole detector stack
    pub layer: u32,

    /// Detector half
    pub side: Side,
}
