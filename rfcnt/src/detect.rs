//! Cycle detectors.
//!
//! Three stack disciplines identify closeable pairs in the turning-point
//! stream: the default four-point rule, the ASTM E1049 three-point variant
//! and the HCM two-pointer variant. All of them emit [`CycleEvent`]s and
//! keep their unclosed turning points available as the residue.

pub mod astm;
pub mod fourpoint;
pub mod hcm;

pub use astm::AstmDetector;
pub use fourpoint::FourPointDetector;
pub use hcm::HcmDetector;

use crate::residue::TurningPoint;

/// One counted cycle (full or half).
///
/// `from`/`to` are the pair's turning points in encounter order; `damage`
/// is filled by the damage stage after detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleEvent {
    /// Earlier turning point of the counted pair (P2).
    pub from: TurningPoint,
    /// Later turning point of the counted pair (P3).
    pub to: TurningPoint,
    /// Cycle weight: 1.0 for closed cycles, 0.5 for half cycles.
    pub count: f64,
    /// Damage contribution of this event (Miner's rule).
    pub damage: f64,
    /// Sample index of the turning point following P3, when one exists
    /// (P4 for hot-loop closures, the residue successor for finalization).
    pub next_tp_sample: Option<u64>,
}

impl CycleEvent {
    /// Build an event with no damage assigned yet.
    pub fn new(from: TurningPoint, to: TurningPoint, count: f64, next_tp_sample: Option<u64>) -> Self {
        Self {
            from,
            to,
            count,
            damage: 0.0,
            next_tp_sample,
        }
    }

    /// Class distance `|from - to|` of the counted pair.
    #[inline]
    pub fn class_distance(&self) -> u32 {
        self.from.class_index.abs_diff(self.to.class_index)
    }
}

/// Detector dispatch over the closed set of stack disciplines.
#[derive(Debug, Clone)]
pub enum CycleDetector {
    /// Default four-point rule.
    FourPoint(FourPointDetector),
    /// ASTM E1049 three-point rule.
    Astm(AstmDetector),
    /// HCM (Clormann-Seeger) two-pointer rule.
    Hcm(HcmDetector),
}

impl CycleDetector {
    /// Select the detector for the configured variant flags. The flags are
    /// mutually exclusive (validated by the configuration layer).
    pub fn select(use_hcm: bool, use_astm: bool) -> Self {
        if use_hcm {
            Self::Hcm(HcmDetector::new())
        } else if use_astm {
            Self::Astm(AstmDetector::new())
        } else {
            Self::FourPoint(FourPointDetector::new())
        }
    }

    /// Push a turning point and append any events it closes.
    #[inline]
    pub fn push(&mut self, tp: TurningPoint, events: &mut Vec<CycleEvent>) {
        match self {
            Self::FourPoint(d) => d.push(tp, events),
            Self::Astm(d) => d.push(tp, events),
            Self::Hcm(d) => d.push(tp, events),
        }
    }

    /// Current residue, bottom to top.
    pub fn residue(&self) -> &[TurningPoint] {
        match self {
            Self::FourPoint(d) => d.residue(),
            Self::Astm(d) => d.residue(),
            Self::Hcm(d) => d.residue(),
        }
    }

    /// Shift recorded class indices after a downward auto-resize.
    pub fn shift_classes(&mut self, shift: u32) {
        match self {
            Self::FourPoint(d) => d.shift_classes(shift),
            Self::Astm(d) => d.shift_classes(shift),
            Self::Hcm(d) => d.shift_classes(shift),
        }
    }

    /// Drop the residue (DISCARD finalization).
    pub fn clear_residue(&mut self) {
        match self {
            Self::FourPoint(d) => d.clear_residue(),
            Self::Astm(d) => d.clear_residue(),
            Self::Hcm(d) => d.clear_residue(),
        }
    }
}
