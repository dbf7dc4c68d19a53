//! Four-point rainflow rule (default detector).
//!
//! After every push, the top four residue entries `P1..P4` are tested:
//! the inner pair `(P2, P3)` closes iff its range is no greater than both
//! neighbor ranges (non-strict, so exact ties still close). Closed pairs
//! are removed and the test repeats until it fails or fewer than four
//! entries remain.

use crate::detect::CycleEvent;
use crate::residue::{ResidueStack, TurningPoint};

/// Default rainflow detector.
#[derive(Debug, Clone, Default)]
pub struct FourPointDetector {
    residue: ResidueStack,
}

impl FourPointDetector {
    /// Empty detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a turning point and pop every cycle it closes.
    pub fn push(&mut self, tp: TurningPoint, events: &mut Vec<CycleEvent>) {
        self.residue.push(tp);

        while let Some((p1, p2, p3, p4)) = self.residue.top4() {
            let r23 = (p2.value - p3.value).abs();
            let r12 = (p1.value - p2.value).abs();
            let r34 = (p3.value - p4.value).abs();
            if r23 > r12 || r23 > r34 {
                break;
            }
            let next_tp_sample = Some(p4.sample_index);
            let (from, to) = self.residue.remove_inner_pair();
            events.push(CycleEvent::new(from, to, 1.0, next_tp_sample));
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
