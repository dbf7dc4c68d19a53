//! Single-pass counting engine.
//!
//! One run streams the input once: every sample flows through the
//! hysteresis filter; each confirmed turning point is classified (growing
//! the class range under auto-resize), recorded, fed to the level-crossing
//! counter and pushed into the cycle detector; every closed cycle updates
//! the rainflow matrix, the range-pair histogram, the damage total and the
//! damage history in one place. Residual finalization reuses the same
//! event path, so the statistics stay coherent by construction.

use tracing::{debug, trace, warn};

use crate::classify::Classifier;
use crate::config::{CountingParams, ResolvedParams};
use crate::counts::{LevelCrossingHistogram, RainflowMatrix, RangePairHistogram};
use crate::damage::{DamageSpreader, event_damage};
use crate::detect::{CycleDetector, CycleEvent};
use crate::error::RfcError;
use crate::filter::{Extremum, TurningPointFilter};
use crate::finalize::finalize_residue;
use crate::flags::CountingFlags;
use crate::residue::TurningPoint;
use crate::result::CountingResults;

/// Run a rainflow count over `data` with the given parameters.
///
/// Empty input is not an error: the bundle comes back all-zero with an
/// empty residue and a zero-length damage history.
pub fn rfc(data: &[f64], params: &CountingParams) -> Result<CountingResults, RfcError> {
    let resolved = params.resolve(data)?;
    let mut engine = Engine::new(data, resolved)?;
    engine.run()?;
    Ok(engine.into_results())
}

struct Engine<'a> {
    data: &'a [f64],
    params: ResolvedParams,
    classifier: Classifier,
    filter: TurningPointFilter,
    detector: CycleDetector,
    spreader: DamageSpreader,
    rfm: RainflowMatrix,
    rp: RangePairHistogram,
    lc: LevelCrossingHistogram,
    tps: Vec<TurningPoint>,
    dh: Vec<f64>,
    damage: f64,
    last_tp_class: Option<u32>,
    residue_override: Option<Vec<TurningPoint>>,
    events_scratch: Vec<CycleEvent>,
}

impl<'a> Engine<'a> {
    fn new(data: &'a [f64], params: ResolvedParams) -> Result<Self, RfcError> {
        let classifier = Classifier::new(
            params.class_count,
            params.class_offset,
            params.class_width,
        )?;
        debug!(
            class_count = params.class_count,
            class_width = params.class_width,
            class_offset = params.class_offset,
            hysteresis = params.hysteresis,
            samples = data.len(),
            "starting counting run"
        );
        Ok(Self {
            data,
            params,
            classifier,
            filter: TurningPointFilter::new(params.hysteresis, params.enforce_margin),
            detector: CycleDetector::select(params.use_hcm, params.use_astm),
            spreader: DamageSpreader::new(params.spread_damage, params.wl),
            rfm: RainflowMatrix::new(params.class_count),
            rp: RangePairHistogram::new(params.class_count, params.class_width),
            lc: LevelCrossingHistogram::new(params.class_count, params.lc_method),
            tps: Vec::new(),
            dh: vec![0.0; data.len()],
            damage: 0.0,
            last_tp_class: None,
            residue_override: None,
            events_scratch: Vec::new(),
        })
    }

    fn run(&mut self) -> Result<(), RfcError> {
        let data = self.data;
        for (i, &x) in data.iter().enumerate() {
            if !x.is_finite() {
                return Err(RfcError::NonFinite {
                    sample_index: i as u64,
                    value: x,
                });
            }
            if let Some(extremum) = self.filter.feed(i as u64, x) {
                self.accept(extremum)?;
            }
        }
        for extremum in self.filter.finish() {
            self.accept(extremum)?;
        }

        let outcome = finalize_residue(
            self.params.residual_method,
            &self.detector,
            self.params.hysteresis,
        );
        for mut event in outcome.events {
            self.count_event(&mut event);
        }
        self.residue_override = outcome.residue;

        debug!(
            turning_points = self.tps.len(),
            rfm_total = self.rfm.sum(),
            damage = self.damage,
            "counting run finished"
        );
        Ok(())
    }

    /// Classify a confirmed extremum and feed it through the counters.
    fn accept(&mut self, extremum: Extremum) -> Result<(), RfcError> {
        let class_index = match self.classifier.classify(extremum.value) {
            Some(c) => c,
            None if self.params.auto_resize => {
                let step = self.classifier.grow_to(extremum.value);
                warn!(
                    value = extremum.value,
                    new_count = step.new_count,
                    shift = step.shift,
                    "auto-resize grew the class range"
                );
                self.apply_resize(step.new_count, step.shift);
                self.classifier.classify(extremum.value).ok_or_else(|| {
                    RfcError::Internal(format!(
                        "value {} still unclassified after resize",
                        extremum.value
                    ))
                })?
            }
            None => {
                return Err(RfcError::OutOfRange {
                    sample_index: extremum.sample_index,
                    value: extremum.value,
                    lower: self.classifier.offset(),
                    upper: self.classifier.upper_limit(),
                });
            }
        };

        let tp = TurningPoint::new(extremum.value, extremum.sample_index, class_index);
        if let Some(prev) = self.last_tp_class {
            self.lc.record(prev, class_index);
        }
        self.last_tp_class = Some(class_index);
        self.tps.push(tp);

        let mut events = std::mem::take(&mut self.events_scratch);
        self.detector.push(tp, &mut events);
        for mut event in events.drain(..) {
            self.count_event(&mut event);
        }
        self.events_scratch = events;
        Ok(())
    }

    /// Accumulate one counted cycle into every statistic.
    fn count_event(&mut self, event: &mut CycleEvent) {
        event.damage = event_damage(&self.params.wl, self.params.class_width, event);
        trace!(
            from_class = event.from.class_index,
            to_class = event.to.class_index,
            count = event.count,
            damage = event.damage,
            "cycle counted"
        );
        self.rfm
            .add(event.from.class_index, event.to.class_index, event.count);
        self.rp.add(event.class_distance(), event.count);
        self.damage += event.damage;
        self.spreader
            .spread(event, self.data, &mut self.dh, &mut self.tps);
    }

    /// Propagate an auto-resize step into every class-indexed structure.
    fn apply_resize(&mut self, new_count: u32, shift: u32) {
        self.rfm.resize(new_count, shift);
        self.rp.resize(new_count);
        self.lc.resize(new_count, shift);
        self.detector.shift_classes(shift);
        if shift > 0 {
            for tp in &mut self.tps {
                tp.class_index += shift;
            }
            if let Some(prev) = self.last_tp_class.as_mut() {
                *prev += shift;
            }
        }
    }

    /// Assemble the owned bundle, honoring the statistic-selection flags.
    fn into_results(self) -> CountingResults {
        let flags = self.params.flags;
        let class_count = self.classifier.count();
        let res: Vec<f64> = match &self.residue_override {
            Some(residue) => residue.iter().map(|tp| tp.value).collect(),
            None => self.detector.residue().iter().map(|tp| tp.value).collect(),
        };

        CountingResults {
            rfm: if flags.contains(CountingFlags::RFM) {
                self.rfm
            } else {
                RainflowMatrix::new(class_count)
            },
            rp: if flags.contains(CountingFlags::RP) {
                self.rp
            } else {
                RangePairHistogram::new(class_count, self.params.class_width)
            },
            lc: if flags.contains(CountingFlags::LC) {
                self.lc
            } else {
                LevelCrossingHistogram::new(class_count, self.params.lc_method)
            },
            tp: if flags.contains(CountingFlags::TP) {
                self.tps
            } else {
                Vec::new()
            },
            res,
            dh: if flags.contains(CountingFlags::DH) {
                self.dh
            } else {
                vec![0.0; self.data.len()]
            },
            damage: if flags.contains(CountingFlags::DAMAGE) {
                self.damage
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResidualMethod, SdMethod};

    fn params_n(class_count: u32) -> CountingParams {
        CountingParams {
            class_count,
            residual_method: ResidualMethod::None,
            spread_damage: SdMethod::None,
            ..Default::default()
        }
    }

    #[test]
    fn single_up_cycle() {
        let mut p = params_n(4);
        p.hysteresis = Some(0.99);
        let r = rfc(&[1.0, 3.0, 2.0, 4.0], &p).unwrap();
        assert_eq!(r.rfm.sum(), 1.0);
        assert_eq!(r.rfm.at(2, 1), 1.0);
        assert_eq!(r.res, vec![1.0, 4.0]);
    }

    #[test]
    fn non_finite_sample_aborts_with_index() {
        let p = CountingParams {
            class_width: Some(1.0),
            class_offset: Some(0.0),
            hysteresis: Some(0.5),
            class_count: 10,
            ..Default::default()
        };
        let err = rfc(&[1.0, 2.0, f64::INFINITY], &p).unwrap_err();
        assert!(matches!(err, RfcError::NonFinite { sample_index: 2, .. }));
    }

    #[test]
    fn out_of_range_without_auto_resize() {
        let p = CountingParams {
            class_count: 4,
            class_width: Some(1.0),
            class_offset: Some(0.0),
            hysteresis: Some(0.5),
            residual_method: ResidualMethod::None,
            ..Default::default()
        };
        let err = rfc(&[1.0, 9.0, 1.0, 9.0], &p).unwrap_err();
        assert!(matches!(err, RfcError::OutOfRange { .. }));
    }

    #[test]
    fn auto_resize_grows_and_keeps_counts() {
        let mut p = params_n(4);
        p.class_width = Some(1.0);
        p.class_offset = Some(0.0);
        p.hysteresis = Some(0.5);
        p.auto_resize = true;
        // 9.5 exceeds the range upward, -2.5 downward.
        let r = rfc(&[1.0, 9.5, -2.5, 9.5, 1.0, 9.5], &p).unwrap();
        // classes after growth: offset -3, width 1, count 13
        assert!(r.rfm.sum() >= 1.0);
        assert_eq!(r.lc.counts().len(), 13);
        assert_eq!(r.rfm.class_count(), 13);
    }

    #[test]
    fn flags_suppress_individual_outputs() {
        let mut p = params_n(6);
        p.flags = CountingFlags::ALL & !CountingFlags::RFM & !CountingFlags::TP;
        let data = [2.0, 5.0, 3.0, 6.0, 2.0, 4.0, 1.0, 6.0, 1.0];
        let r = rfc(&data, &p).unwrap();
        assert_eq!(r.rfm.sum(), 0.0);
        assert!(r.tp.is_empty());
        // Unaffected statistics are still produced.
        assert!(r.lc.sum() > 0.0);
        assert_eq!(r.dh.len(), data.len());
    }

    #[test]
    fn empty_input_yields_empty_bundle() {
        let p = params_n(100);
        let r = rfc(&[], &p).unwrap();
        assert_eq!(r.rfm.sum(), 0.0);
        assert!(r.res.is_empty());
        assert!(r.dh.is_empty());
        assert_eq!(r.damage, 0.0);
    }
}
