//! Residual finalization.
//!
//! After the hot loop the detector holds the unclosed residue. The
//! configured policy turns it into further cycle events: weighted
//! adjacent pairs, a re-feed of the repeated history, or range-pair
//! matching per DIN 45667. Every produced event flows through the same
//! accumulator path as hot-loop closures.

use tracing::debug;

use crate::config::ResidualMethod;
use crate::detect::{CycleDetector, CycleEvent};
use crate::residue::TurningPoint;

/// Result of applying a residual policy.
#[derive(Debug, Clone)]
pub(crate) struct FinalizeOutcome {
    /// Events to count (damage not yet assigned).
    pub events: Vec<CycleEvent>,
    /// Replacement residue, when the policy rewrites it.
    pub residue: Option<Vec<TurningPoint>>,
}

impl FinalizeOutcome {
    fn unchanged() -> Self {
        Self {
            events: Vec::new(),
            residue: None,
        }
    }
}

/// Apply `method` to the detector's residue.
pub(crate) fn finalize_residue(
    method: ResidualMethod,
    detector: &CycleDetector,
    hysteresis: f64,
) -> FinalizeOutcome {
    let residue = detector.residue();
    debug!(
        method = ?method,
        residue_len = residue.len(),
        "finalizing residue"
    );

    match method {
        ResidualMethod::None | ResidualMethod::Ignore | ResidualMethod::NoFinalize => {
            FinalizeOutcome::unchanged()
        }
        ResidualMethod::Discard => FinalizeOutcome {
            events: Vec::new(),
            residue: Some(Vec::new()),
        },
        ResidualMethod::HalfCycles => weighted_pairs(residue, 0.5),
        ResidualMethod::FullCycles => weighted_pairs(residue, 1.0),
        ResidualMethod::Repeated => refeed(detector, hysteresis, 1.0),
        ResidualMethod::ClormannSeeger => refeed(detector, hysteresis, 0.5),
        ResidualMethod::Din45667 => din45667_pairs(residue),
    }
}

/// One event per adjacent residue pair, with the given weight.
fn weighted_pairs(residue: &[TurningPoint], count: f64) -> FinalizeOutcome {
    let mut events = Vec::new();
    for window in residue.windows(2) {
        let next = residue
            .iter()
            .find(|tp| tp.sample_index > window[1].sample_index)
            .map(|tp| tp.sample_index);
        events.push(CycleEvent::new(window[0], window[1], count, next));
    }
    FinalizeOutcome {
        events,
        residue: None,
    }
}

/// Re-feed one copy of the residue through a fresh detector of the same
/// variant, as if the load history repeated. Closures there are the cycles
/// the residue contributes per period; `weight` scales their counts (1.0
/// for REPEATED, 0.5 for the Clormann-Seeger reduction).
fn refeed(detector: &CycleDetector, hysteresis: f64, weight: f64) -> FinalizeOutcome {
    let residue = detector.residue();
    if residue.len() < 2 {
        return FinalizeOutcome::unchanged();
    }

    let mut doubled = Vec::with_capacity(residue.len() * 2);
    doubled.extend_from_slice(residue);
    doubled.extend_from_slice(residue);
    let stream = refilter(&doubled, hysteresis);

    let mut fresh = match detector {
        CycleDetector::FourPoint(_) => CycleDetector::select(false, false),
        CycleDetector::Astm(_) => CycleDetector::select(false, true),
        CycleDetector::Hcm(_) => CycleDetector::select(true, false),
    };
    let mut events = Vec::new();
    for tp in stream {
        fresh.push(tp, &mut events);
    }
    for ev in &mut events {
        ev.count *= weight;
    }
    FinalizeOutcome {
        events,
        residue: Some(fresh.residue().to_vec()),
    }
}

/// Re-apply alternation and hysteresis over a turning-point sequence. The
/// residue itself already satisfies both; this only straightens the seam a
/// duplication introduces (plateaus, continued slopes, sub-hysteresis
/// reversals).
fn refilter(tps: &[TurningPoint], hysteresis: f64) -> Vec<TurningPoint> {
    let mut out: Vec<TurningPoint> = Vec::new();
    for &tp in tps {
        match out.len() {
            0 => out.push(tp),
            1 => {
                if (tp.value - out[0].value).abs() > hysteresis {
                    out.push(tp);
                }
            }
            n => {
                let prev = out[n - 2].value;
                let top = out[n - 1].value;
                let rising = top > prev;
                if (rising && tp.value > top) || (!rising && tp.value < top) {
                    // Continues the running slope.
                    out[n - 1] = tp;
                } else if (tp.value - top).abs() > hysteresis {
                    out.push(tp);
                }
            }
        }
    }
    out
}

/// DIN 45667 range-pair matching: rising and falling residue slopes are
/// sorted by descending range and paired largest-with-largest; each pair
/// counts one cycle on the smaller slope's endpoints. Unpaired slopes stay
/// uncounted.
fn din45667_pairs(residue: &[TurningPoint]) -> FinalizeOutcome {
    let mut rising: Vec<(f64, usize)> = Vec::new();
    let mut falling: Vec<(f64, usize)> = Vec::new();
    for (i, window) in residue.windows(2).enumerate() {
        let range = (window[1].value - window[0].value).abs();
        if window[1].value > window[0].value {
            rising.push((range, i));
        } else {
            falling.push((range, i));
        }
    }
    rising.sort_by(|a, b| b.0.total_cmp(&a.0));
    falling.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut events = Vec::new();
    for (up, down) in rising.iter().zip(falling.iter()) {
        let slope_start = if up.0 <= down.0 { up.1 } else { down.1 };
        let from = residue[slope_start];
        let to = residue[slope_start + 1];
        let next = residue.get(slope_start + 2).map(|tp| tp.sample_index);
        events.push(CycleEvent::new(from, to, 1.0, next));
    }
    FinalizeOutcome {
        events,
        residue: None,
    }
}
