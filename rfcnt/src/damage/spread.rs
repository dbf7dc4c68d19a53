//! Damage-history writer.
//!
//! Spreads each event's damage increment over a range of input samples and
//! attributes every written increment to the latest turning point at or
//! before that sample. Each policy's raw weights are normalized so the
//! event's spread sums exactly to its damage contribution, which keeps
//! `sum(dh) == damage` under naive floating-point summation.
//!
//! Supports use the event's turning points: `i2`/`i3` are the counted
//! pair's sample indices, `i4` the sample index of the turning point
//! following P3 (when the event carries one). Events whose pair is not in
//! ascending sample order (seam closures during residue re-feeding) fall
//! back to half-at-each-endpoint regardless of policy.

use crate::config::SdMethod;
use crate::detect::CycleEvent;
use crate::residue::TurningPoint;
use crate::sncurve::WoehlerCurve;

/// Per-event damage spreading.
#[derive(Debug, Clone, Copy)]
pub struct DamageSpreader {
    method: SdMethod,
    wl: WoehlerCurve,
}

impl DamageSpreader {
    /// Spreader for the configured policy.
    pub fn new(method: SdMethod, wl: WoehlerCurve) -> Self {
        Self { method, wl }
    }

    /// Configured policy.
    #[inline]
    pub fn method(&self) -> SdMethod {
        self.method
    }

    /// Spread `event.damage` into `dh` and onto `tps`.
    pub fn spread(
        &self,
        event: &CycleEvent,
        data: &[f64],
        dh: &mut [f64],
        tps: &mut [TurningPoint],
    ) {
        if self.method == SdMethod::None || event.damage == 0.0 || dh.is_empty() {
            return;
        }

        let i2 = event.from.sample_index as usize;
        let i3 = event.to.sample_index as usize;
        if i2 > i3 || i3 >= data.len() {
            // Out-of-order pair from a seam closure: endpoints only.
            self.deposit_endpoints(event, dh, tps);
            return;
        }
        let i4 = event
            .next_tp_sample
            .map(|i| (i as usize).clamp(i3, data.len() - 1))
            .unwrap_or(i3);

        let weights = self.weights(event, data, i2, i3, i4);
        match weights {
            Some(w) if !w.is_empty() => {
                deposit(&w, event.damage, dh, tps);
            }
            _ => self.deposit_endpoints(event, dh, tps),
        }
    }

    /// Raw (sample, weight) pairs for the configured policy, or `None` when
    /// the support degenerates.
    fn weights(
        &self,
        event: &CycleEvent,
        data: &[f64],
        i2: usize,
        i3: usize,
        i4: usize,
    ) -> Option<Vec<(usize, f64)>> {
        match self.method {
            SdMethod::None => None,
            SdMethod::Half23 => Some(vec![(i2, 0.5), (i3, 0.5)]),
            SdMethod::FullP2 => Some(vec![(i2, 1.0)]),
            SdMethod::FullP3 => Some(vec![(i3, 1.0)]),
            SdMethod::RampAmplitude23 => ramp_amplitude(data, i2, i3, 1.0),
            SdMethod::RampDamage23 => ramp_uniform(i2, i3),
            SdMethod::RampAmplitude24 => ramp_amplitude(data, i2, i4, self.wl.k),
            SdMethod::RampDamage24 => ramp_uniform(i2, i4),
            SdMethod::Transient23 => {
                self.transient_branch(data, i2, i3, event.from.value, branch_amplitude(event))
            }
            SdMethod::Transient23c => self.transient_closed(event, data, i2, i3, i4),
        }
    }

    /// Transient partition along one hysteresis branch: the weight of each
    /// sample is the growth of the per-cycle damage at the amplitude the
    /// branch has reached so far.
    fn transient_branch(
        &self,
        data: &[f64],
        start: usize,
        end: usize,
        origin: f64,
        full_amplitude: f64,
    ) -> Option<Vec<(usize, f64)>> {
        if end <= start {
            return None;
        }
        let mut weights = Vec::with_capacity(end - start);
        let mut amplitude = 0.0_f64;
        let mut damage_so_far = 0.0_f64;
        for k in (start + 1)..=end {
            amplitude = amplitude.max(((data[k] - origin) / 2.0).abs());
            let d = self.wl.damage_at_amplitude(amplitude.min(full_amplitude));
            weights.push((k, (d - damage_so_far).max(0.0)));
            damage_so_far = damage_so_far.max(d);
        }
        if weights.iter().map(|w| w.1).sum::<f64>() <= 0.0 {
            // The whole branch sits below the fatigue strength; spread the
            // increment uniformly instead.
            return ramp_uniform(start, end);
        }
        Some(weights)
    }

    /// Transient partition over both branches of the closed loop, truncated
    /// at the sample where the counter-branch reaches the cycle range.
    fn transient_closed(
        &self,
        event: &CycleEvent,
        data: &[f64],
        i2: usize,
        i3: usize,
        i4: usize,
    ) -> Option<Vec<(usize, f64)>> {
        let amplitude = branch_amplitude(event);
        let range = (event.from.value - event.to.value).abs();

        // Closing sample: first excursion from P3 reaching the cycle range.
        let mut close = i4;
        for k in (i3 + 1)..=i4 {
            if (data[k] - event.to.value).abs() >= range {
                close = k;
                break;
            }
        }

        let mut weights = self
            .transient_branch(data, i2, i3, event.from.value, amplitude)
            .map(|w| scale(w, 0.5))
            .unwrap_or_else(|| vec![(i3.min(i2), 0.5)]);
        let back = self
            .transient_branch(data, i3, close, event.to.value, amplitude)
            .map(|w| scale(w, 0.5))
            .unwrap_or_else(|| vec![(i3, 0.5)]);
        weights.extend(back);
        Some(weights)
    }

    /// Endpoint fallback: half of the increment at each of the pair's
    /// samples.
    fn deposit_endpoints(&self, event: &CycleEvent, dh: &mut [f64], tps: &mut [TurningPoint]) {
        let last = dh.len() - 1;
        let i2 = (event.from.sample_index as usize).min(last);
        let i3 = (event.to.sample_index as usize).min(last);
        deposit(&[(i2, 0.5), (i3, 0.5)], event.damage, dh, tps);
    }
}

/// Stress amplitude of the counted pair, from real turning-point values.
#[inline]
fn branch_amplitude(event: &CycleEvent) -> f64 {
    (event.from.value - event.to.value).abs() / 2.0
}

/// Uniform weights over `(start..=end]`.
fn ramp_uniform(start: usize, end: usize) -> Option<Vec<(usize, f64)>> {
    if end <= start {
        return None;
    }
    Some(((start + 1)..=end).map(|k| (k, 1.0)).collect())
}

/// Weights proportional to `|x_k − x_{k−1}|^exponent` over `(start..=end]`.
fn ramp_amplitude(
    data: &[f64],
    start: usize,
    end: usize,
    exponent: f64,
) -> Option<Vec<(usize, f64)>> {
    if end <= start {
        return None;
    }
    let weights: Vec<(usize, f64)> = ((start + 1)..=end)
        .map(|k| (k, (data[k] - data[k - 1]).abs().powf(exponent)))
        .collect();
    if weights.iter().map(|w| w.1).sum::<f64>() <= 0.0 {
        return ramp_uniform(start, end);
    }
    Some(weights)
}

fn scale(weights: Vec<(usize, f64)>, factor: f64) -> Vec<(usize, f64)> {
    let total: f64 = weights.iter().map(|w| w.1).sum();
    if total <= 0.0 {
        // Degenerate branch: place the whole share on its last sample.
        let last = weights.last().map(|w| w.0).unwrap_or(0);
        return vec![(last, factor)];
    }
    weights
        .into_iter()
        .map(|(k, w)| (k, w / total * factor))
        .collect()
}

/// Normalize `weights` to `total_damage` and write into `dh`, attributing
/// each increment to the latest turning point at or before its sample.
fn deposit(weights: &[(usize, f64)], total_damage: f64, dh: &mut [f64], tps: &mut [TurningPoint]) {
    let total: f64 = weights.iter().map(|w| w.1).sum();
    if total <= 0.0 {
        return;
    }
    let factor = total_damage / total;
    for &(k, w) in weights {
        let delta = w * factor;
        if delta == 0.0 {
            continue;
        }
        dh[k] += delta;
        let pos = tps.partition_point(|tp| tp.sample_index <= k as u64);
        if pos > 0 {
            tps[pos - 1].damage += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residue::TurningPoint;

    fn event(data: &[f64], i2: usize, i3: usize, i4: Option<usize>, damage: f64) -> CycleEvent {
        let mut ev = CycleEvent::new(
            TurningPoint::new(data[i2], i2 as u64, 0),
            TurningPoint::new(data[i3], i3 as u64, 0),
            1.0,
            i4.map(|i| i as u64),
        );
        ev.damage = damage;
        ev
    }

    fn tps_at(data: &[f64], indices: &[usize]) -> Vec<TurningPoint> {
        indices
            .iter()
            .map(|&i| TurningPoint::new(data[i], i as u64, 0))
            .collect()
    }

    fn run(method: SdMethod, data: &[f64], ev: &CycleEvent) -> (Vec<f64>, Vec<TurningPoint>) {
        let mut dh = vec![0.0; data.len()];
        let mut tps = tps_at(data, &[0, 1, 2, 3]);
        let spreader = DamageSpreader::new(method, WoehlerCurve::default());
        spreader.spread(ev, data, &mut dh, &mut tps);
        (dh, tps)
    }

    const DATA: [f64; 5] = [1.0, 3.0, 2.0, 4.0, 1.5];

    #[test]
    fn none_writes_nothing() {
        let ev = event(&DATA, 1, 2, Some(3), 1e-3);
        let (dh, tps) = run(SdMethod::None, &DATA, &ev);
        assert!(dh.iter().all(|&d| d == 0.0));
        assert!(tps.iter().all(|tp| tp.damage == 0.0));
    }

    #[test]
    fn half_23_splits_between_endpoints() {
        let ev = event(&DATA, 1, 2, Some(3), 1e-3);
        let (dh, tps) = run(SdMethod::Half23, &DATA, &ev);
        assert!((dh[1] - 5e-4).abs() < 1e-18);
        assert!((dh[2] - 5e-4).abs() < 1e-18);
        assert!((tps[1].damage - 5e-4).abs() < 1e-18);
        assert!((tps[2].damage - 5e-4).abs() < 1e-18);
    }

    #[test]
    fn full_policies_deposit_at_one_sample() {
        let ev = event(&DATA, 1, 2, Some(3), 1e-3);
        let (dh, _) = run(SdMethod::FullP2, &DATA, &ev);
        assert_eq!(dh[1], 1e-3);
        let (dh, _) = run(SdMethod::FullP3, &DATA, &ev);
        assert_eq!(dh[2], 1e-3);
    }

    #[test]
    fn ramps_preserve_the_total() {
        for method in [
            SdMethod::RampAmplitude23,
            SdMethod::RampDamage23,
            SdMethod::RampAmplitude24,
            SdMethod::RampDamage24,
            SdMethod::Transient23,
            SdMethod::Transient23c,
        ] {
            let ev = event(&DATA, 0, 3, Some(4), 1e-3);
            let (dh, tps) = run(method, &DATA, &ev);
            let dh_sum: f64 = dh.iter().sum();
            let tp_sum: f64 = tps.iter().map(|tp| tp.damage).sum();
            assert!(
                (dh_sum / 1e-3 - 1.0).abs() < 1e-12,
                "{method:?}: dh sum {dh_sum}"
            );
            assert!(
                (tp_sum / 1e-3 - 1.0).abs() < 1e-12,
                "{method:?}: tp sum {tp_sum}"
            );
        }
    }

    #[test]
    fn ramp_amplitude_weights_follow_increments() {
        let data = [0.0, 1.0, 4.0, 4.5];
        let ev = event(&data, 0, 3, None, 1.0);
        let mut dh = vec![0.0; data.len()];
        let mut tps = tps_at(&data, &[0, 3]);
        DamageSpreader::new(SdMethod::RampAmplitude23, WoehlerCurve::default())
            .spread(&ev, &data, &mut dh, &mut tps);
        // increments 1.0, 3.0, 0.5 over samples 1..=3
        assert!((dh[1] - 1.0 / 4.5).abs() < 1e-12);
        assert!((dh[2] - 3.0 / 4.5).abs() < 1e-12);
        assert!((dh[3] - 0.5 / 4.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_support_falls_back_to_endpoints() {
        // i2 == i3: the ramp has no interior samples.
        let ev = event(&DATA, 2, 2, None, 1e-3);
        let (dh, _) = run(SdMethod::RampDamage23, &DATA, &ev);
        assert!((dh[2] - 1e-3).abs() < 1e-18);
    }

    #[test]
    fn out_of_order_pair_uses_endpoints() {
        let mut ev = CycleEvent::new(
            TurningPoint::new(4.0, 3, 0),
            TurningPoint::new(3.0, 1, 0),
            1.0,
            None,
        );
        ev.damage = 2e-3;
        let (dh, _) = run(SdMethod::Transient23c, &DATA, &ev);
        assert!((dh[3] - 1e-3).abs() < 1e-18);
        assert!((dh[1] - 1e-3).abs() < 1e-18);
    }

    #[test]
    fn transient_23c_truncates_at_closure() {
        // P2 at 0 (value 1), P3 at 3 (value 4); the return branch reaches
        // the cycle range at sample 4 (|1.5 - 4| = 2.5 < 3 -> no closure,
        // support extends to i4).
        let ev = event(&DATA, 0, 3, Some(4), 1e-3);
        let (dh, _) = run(SdMethod::Transient23c, &DATA, &ev);
        let first_half: f64 = dh[..=3].iter().sum();
        assert!(first_half > 0.0);
        let total: f64 = dh.iter().sum();
        assert!((total / 1e-3 - 1.0).abs() < 1e-12);
    }
}
