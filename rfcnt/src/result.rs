//! Owned result bundle of a counting run.
//!
//! Everything is fully owned by the bundle; nothing references engine
//! internals after the run returns. The bundle serializes as-is so
//! external plotting/reporting collaborators can consume runs as JSON.

use serde::Serialize;

use crate::counts::{LevelCrossingHistogram, RainflowMatrix, RangePairHistogram};
use crate::residue::TurningPoint;

/// Assembled statistics of one counting run.
#[derive(Debug, Clone, Serialize)]
pub struct CountingResults {
    /// Rainflow matrix (from-class × to-class).
    pub rfm: RainflowMatrix,
    /// Range-pair histogram over |Δclass|.
    pub rp: RangePairHistogram,
    /// Level-crossing histogram.
    pub lc: LevelCrossingHistogram,
    /// Turning-point sequence with per-point damage attribution.
    pub tp: Vec<TurningPoint>,
    /// Residue values in stack order.
    pub res: Vec<f64>,
    /// Per-sample damage history, same length as the input.
    pub dh: Vec<f64>,
    /// Total accumulated damage.
    pub damage: f64,
}

impl CountingResults {
    /// Turning points as `(value, sample_index, damage)` rows.
    pub fn tp_rows(&self) -> Vec<[f64; 3]> {
        self.tp
            .iter()
            .map(|tp| [tp.value, tp.sample_index as f64, tp.damage])
            .collect()
    }

    /// Damage attributed to turning points, summed.
    pub fn tp_damage_sum(&self) -> f64 {
        self.tp.iter().map(|tp| tp.damage).sum()
    }
}
