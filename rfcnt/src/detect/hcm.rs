//! HCM (Clormann-Seeger) rainflow detector.
//!
//! Two-pointer stack discipline: `iz` is the stack top, `ir` marks the
//! boundary below which entries belong to the residue. A new extremum
//! closes the pair beneath it when the newest range reaches the previous
//! one (`Δ1 ≥ Δ2`). Interior pairs pop as full cycles; pairs sitting on the
//! residue boundary advance `ir` instead and stay on the stack, so residual
//! finalization sees them in HCM's native ordering.

use crate::detect::CycleEvent;
use crate::residue::{ResidueStack, TurningPoint};

/// HCM detector.
#[derive(Debug, Clone)]
pub struct HcmDetector {
    stack: ResidueStack,
    /// Residue boundary pointer (1-based, as in the published algorithm).
    ir: usize,
}

impl Default for HcmDetector {
    fn default() -> Self {
        Self {
            stack: ResidueStack::new(),
            ir: 1,
        }
    }
}

impl HcmDetector {
    /// Empty detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a turning point and pop every interior cycle it closes.
    pub fn push(&mut self, tp: TurningPoint, events: &mut Vec<CycleEvent>) {
        self.stack.push(tp);

        loop {
            let iz = self.stack.len();
            if iz < self.ir + 2 {
                break;
            }
            let s = self.stack.entries();
            let d1 = (s[iz - 1].value - s[iz - 2].value).abs();
            let d2 = (s[iz - 2].value - s[iz - 3].value).abs();
            if d1 < d2 {
                break;
            }
            if iz - 2 == self.ir {
                // The closed range hangs on the residue boundary ("memory
                // 2"): it stays on the stack for residual finalization.
                self.ir += 1;
                continue;
            }
            let next_tp_sample = Some(s[iz - 1].sample_index);
            let (from, to) = self.stack.remove_inner_pair();
            events.push(CycleEvent::new(from, to, 1.0, next_tp_sample));
        }
    }

    /// Remaining stack in HCM's native ordering.
    pub fn residue(&self) -> &[TurningPoint] {
        self.stack.entries()
    }

    /// Shift recorded class indices after a downward auto-resize.
    pub fn shift_classes(&mut self, shift: u32) {
        self.stack.shift_classes(shift);
    }

    /// Drop the residue.
    pub fn clear_residue(&mut self) {
        self.stack.clear();
        self.ir = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::FourPointDetector;

    fn feed(values: &[f64]) -> (Vec<CycleEvent>, Vec<f64>) {
        let mut d = HcmDetector::new();
        let mut events = Vec::new();
        for (i, &v) in values.iter().enumerate() {
            d.push(TurningPoint::new(v, i as u64, v as u32), &mut events);
        }
        let res = d.residue().iter().map(|tp| tp.value).collect();
        (events, res)
    }

    #[test]
    fn closes_interior_cycle() {
        let (events, res) = feed(&[1.0, 3.0, 2.0, 4.0]);
        assert_eq!(events.len(), 1);
        assert_eq!((events[0].from.value, events[0].to.value), (3.0, 2.0));
        assert_eq!(res, vec![1.0, 4.0]);
    }

    #[test]
    fn boundary_pairs_stay_on_stack() {
        // (2,6) closes against (6,2) only across the residue boundary; HCM
        // keeps the points and advances ir instead of counting.
        let (events, res) = feed(&[2.0, 6.0, 2.0]);
        assert!(events.is_empty());
        assert_eq!(res, vec![2.0, 6.0, 2.0]);
    }

    #[test]
    fn closed_cycles_are_a_subset_of_the_four_point_set() {
        let seq = [
            2.0, 5.0, 3.0, 6.0, 2.0, 4.0, 1.0, 6.0, 1.0, 4.0, 1.0, 5.0, 3.0,
            6.0, 3.0, 6.0, 1.0, 5.0, 2.0,
        ];
        let (hcm_events, _) = feed(&seq);

        let mut fp = FourPointDetector::new();
        let mut fp_events = Vec::new();
        for (i, &v) in seq.iter().enumerate() {
            fp.push(TurningPoint::new(v, i as u64, v as u32), &mut fp_events);
        }

        let mut fp_pairs: Vec<(f64, f64)> = fp_events
            .iter()
            .map(|e| (e.from.value, e.to.value))
            .collect();
        for e in &hcm_events {
            let pair = (e.from.value, e.to.value);
            let pos = fp_pairs.iter().position(|&p| p == pair);
            assert!(pos.is_some(), "HCM closed {pair:?} unknown to four-point");
            fp_pairs.remove(pos.unwrap());
        }
    }

    #[test]
    fn mixed_sequence_full_cycles() {
        let seq = [
            2.0, 5.0, 3.0, 6.0, 2.0, 4.0, 1.0, 6.0, 1.0, 4.0, 1.0, 5.0, 3.0,
            6.0, 3.0, 6.0, 1.0, 5.0, 2.0,
        ];
        let (events, res) = feed(&seq);
        let pairs: Vec<(f64, f64)> = events
            .iter()
            .map(|e| (e.from.value, e.to.value))
            .collect();
        assert_eq!(
            pairs,
            vec![(5.0, 3.0), (2.0, 4.0), (1.0, 4.0), (5.0, 3.0), (6.0, 3.0)]
        );
        // Standing loops remain on the stack in native order.
        assert_eq!(
            res,
            vec![2.0, 6.0, 1.0, 6.0, 1.0, 6.0, 1.0, 5.0, 2.0]
        );
    }
}
