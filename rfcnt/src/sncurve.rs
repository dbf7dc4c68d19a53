//! S-N (Wöhler) curve and Miner-rule damage.
//!
//! Two-slope curve in log-log space, anchored at the knee `(sd, nd)`:
//! ```text
//! N(S) = nd · (S / sd)^(−k)    for S ≥ sd
//! N(S) = nd · (S / sd)^(−k2)   for S < sd, second slope present
//! N(S) = ∞                     for S < sd, no second slope
//! ```
//! `S` is the cycle range (twice the stress amplitude). Damage per cycle is
//! `count / N(S)` (Miner's rule); infinite endurance contributes zero.

use serde::{Deserialize, Serialize};

use crate::error::RfcError;

/// S-N curve parameters.
///
/// `k` and `k2` are slope magnitudes (positive). A missing `k2` means
/// infinite life below the knee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WoehlerCurve {
    /// Knee stress range (fatigue strength).
    pub sd: f64,
    /// Cycles to failure at the knee.
    pub nd: f64,
    /// Slope above the knee.
    pub k: f64,
    /// Optional second slope below the knee.
    #[serde(default)]
    pub k2: Option<f64>,
}

impl Default for WoehlerCurve {
    fn default() -> Self {
        Self {
            sd: 1e3,
            nd: 1e7,
            k: 5.0,
            k2: Some(5.0),
        }
    }
}

impl WoehlerCurve {
    /// Single-slope curve (infinite life below the knee).
    pub fn new(sd: f64, nd: f64, k: f64) -> Self {
        Self {
            sd,
            nd,
            k,
            k2: None,
        }
    }

    /// Adds the second slope below the knee.
    pub fn with_k2(mut self, k2: f64) -> Self {
        self.k2 = Some(k2);
        self
    }

    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), RfcError> {
        if !(self.sd.is_finite() && self.sd > 0.0) {
            return Err(RfcError::invalid("wl.sd", format!("must be finite and > 0, got {}", self.sd)));
        }
        if !(self.nd.is_finite() && self.nd > 0.0) {
            return Err(RfcError::invalid("wl.nd", format!("must be finite and > 0, got {}", self.nd)));
        }
        if !(self.k.is_finite() && self.k > 0.0) {
            return Err(RfcError::invalid("wl.k", format!("must be finite and > 0, got {}", self.k)));
        }
        if let Some(k2) = self.k2 {
            if !(k2.is_finite() && k2 > 0.0) {
                return Err(RfcError::invalid("wl.k2", format!("must be finite and > 0, got {k2}")));
            }
        }
        Ok(())
    }

    /// Endurance `N(range)`. Returns `f64::INFINITY` below the knee when no
    /// second slope is configured, and for non-positive ranges.
    #[inline]
    pub fn cycles_at(&self, range: f64) -> f64 {
        if range <= 0.0 {
            return f64::INFINITY;
        }
        if range >= self.sd {
            self.nd * (range / self.sd).powf(-self.k)
        } else {
            match self.k2 {
                Some(k2) => self.nd * (range / self.sd).powf(-k2),
                None => f64::INFINITY,
            }
        }
    }

    /// Damage of `count` cycles at the given range: `count / N(range)`.
    #[inline]
    pub fn damage(&self, range: f64, count: f64) -> f64 {
        let n = self.cycles_at(range);
        if n.is_finite() { count / n } else { 0.0 }
    }

    /// Damage of one full cycle at the given stress amplitude (`range / 2`).
    #[inline]
    pub fn damage_at_amplitude(&self, amplitude: f64) -> f64 {
        self.damage(2.0 * amplitude, 1.0)
    }
}
