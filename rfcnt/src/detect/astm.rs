//! ASTM E1049 rainflow detector.
//!
//! Three-point discipline over the most recent ranges: with the last three
//! stack entries forming ranges `Y` (older) and `X` (newer), `X ≥ Y` closes
//! `Y`. A closed range that contains the starting point counts as a half
//! cycle and discards only the starting point; otherwise it counts as a
//! full cycle and both of its points are removed. The standard's final step
//! (remaining ranges count as half cycles) is expressed by running the
//! `HALFCYCLES` residual policy.

use crate::detect::CycleEvent;
use crate::residue::{ResidueStack, TurningPoint};

/// ASTM E1049 detector.
#[derive(Debug, Clone, Default)]
pub struct AstmDetector {
    residue: ResidueStack,
}

impl AstmDetector {
    /// Empty detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a turning point and count every range it closes.
    pub fn push(&mut self, tp: TurningPoint, events: &mut Vec<CycleEvent>) {
        self.residue.push(tp);

        loop {
            let n = self.residue.len();
            if n < 3 {
                break;
            }
            let s = self.residue.entries();
            let y = (s[n - 3].value - s[n - 2].value).abs();
            let x = (s[n - 2].value - s[n - 1].value).abs();
            if x < y {
                break;
            }
            let next_tp_sample = Some(s[n - 1].sample_index);
            if n == 3 {
                // Y contains the starting point: half cycle, the starting
                // point moves to Y's second point.
                let from = self.residue.remove_front();
                let to = self.residue.entries()[0];
                events.push(CycleEvent::new(from, to, 0.5, next_tp_sample));
            } else {
                let (from, to) = self.residue.remove_inner_pair();
                events.push(CycleEvent::new(from, to, 1.0, next_tp_sample));
            }
        }
    }

    /// Unclosed turning points, bottom to top.
    pub fn residue(&self) -> &[TurningPoint] {
        self.residue.entries()
    }

    /// Shift recorded class indices after a downward auto-resize.
    pub fn shift_classes(&mut self, shift: u32) {
        self.residue.shift_classes(shift);
    }

    /// Drop the residue.
    pub fn clear_residue(&mut self) {
        self.residue.clear();
    }
}
