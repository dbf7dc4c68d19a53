//! Damage from a finished range-pair histogram.
//!
//! Pure post-processing: given the histogram and S-N parameters, evaluates
//! Miner's rule under one of the classic accumulation variants. For the
//! DEFAULT method over a residual-free run this reproduces the engine's own
//! damage total, since both evaluate the same class-center ranges.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::counts::RangePairHistogram;
use crate::error::RfcError;
use crate::sncurve::WoehlerCurve;

/// Miner accumulation variant for [`damage_from_rp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum RpDamageCalcMethod {
    /// Use the curve parameters as configured.
    #[serde(rename = "DEFAULT")]
    Default = 0,
    /// Miner elementar: slope `k` everywhere, no knee.
    #[serde(rename = "MINER_ELEMENTAR")]
    MinerElementar = 1,
    /// Miner modified: `k` above the knee, `k2` below (Haibach's
    /// `2k − 1` when the curve carries no second slope).
    #[serde(rename = "MINER_MODIFIED")]
    MinerModified = 2,
    /// Consistent Miner: the knee slides along the primary slope to the
    /// largest occurring amplitude before evaluation.
    #[serde(rename = "MINER_CONSISTENT")]
    MinerConsistent = 3,
}

impl RpDamageCalcMethod {
    /// Stable integer value.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for RpDamageCalcMethod {
    type Error = RfcError;

    fn try_from(v: i32) -> Result<Self, RfcError> {
        Ok(match v {
            0 => Self::Default,
            1 => Self::MinerElementar,
            2 => Self::MinerModified,
            3 => Self::MinerConsistent,
            _ => return Err(RfcError::invalid("rp_method", format!("unknown value {v}"))),
        })
    }
}

const_assert_eq!(RpDamageCalcMethod::Default as i32, 0);
const_assert_eq!(RpDamageCalcMethod::MinerElementar as i32, 1);
const_assert_eq!(RpDamageCalcMethod::MinerModified as i32, 2);
const_assert_eq!(RpDamageCalcMethod::MinerConsistent as i32, 3);

/// Total damage of a range-pair histogram under the chosen variant.
pub fn damage_from_rp(
    rp: &RangePairHistogram,
    wl: &WoehlerCurve,
    method: RpDamageCalcMethod,
) -> Result<f64, RfcError> {
    wl.validate()?;

    let curve = match method {
        RpDamageCalcMethod::Default => *wl,
        RpDamageCalcMethod::MinerElementar => wl.with_k2(wl.k),
        RpDamageCalcMethod::MinerModified => {
            wl.with_k2(wl.k2.unwrap_or(2.0 * wl.k - 1.0))
        }
        RpDamageCalcMethod::MinerConsistent => {
            let max_range = rp
                .counts()
                .iter()
                .enumerate()
                .rev()
                .find(|&(_, &c)| c > 0.0)
                .map(|(d, _)| d as f64 * rp.class_width())
                .unwrap_or(0.0);
            if max_range > 0.0 {
                WoehlerCurve {
                    sd: max_range,
                    nd: wl.nd * (max_range / wl.sd).powf(-wl.k),
                    k: wl.k,
                    k2: wl.k2,
                }
            } else {
                *wl
            }
        }
    };

    let mut total = 0.0;
    for (d, &count) in rp.counts().iter().enumerate() {
        if count > 0.0 && d > 0 {
            let range = d as f64 * rp.class_width();
            total += curve.damage(range, count);
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram() -> RangePairHistogram {
        let mut rp = RangePairHistogram::new(100, 50.0);
        rp.add(10, 3.0); // range 500, below the default knee
        rp.add(40, 2.0); // range 2000
        rp.add(60, 0.5); // range 3000
        rp
    }

    #[test]
    fn default_uses_curve_as_configured() {
        let wl = WoehlerCurve::new(1e3, 1e7, 5.0); // no second slope
        let d = damage_from_rp(&histogram(), &wl, RpDamageCalcMethod::Default).unwrap();
        // Only the two ranges above the knee contribute.
        let expected = 2.0 / (1e7 * (2.0_f64).powf(-5.0)) + 0.5 / (1e7 * (3.0_f64).powf(-5.0));
        assert!((d / expected - 1.0).abs() < 1e-12);
    }

    #[test]
    fn elementar_ignores_the_knee() {
        let wl = WoehlerCurve::new(1e3, 1e7, 5.0).with_k2(9.0);
        let d = damage_from_rp(&histogram(), &wl, RpDamageCalcMethod::MinerElementar).unwrap();
        let below = 3.0 / (1e7 * (0.5_f64).powf(-5.0));
        let above = 2.0 / (1e7 * (2.0_f64).powf(-5.0)) + 0.5 / (1e7 * (3.0_f64).powf(-5.0));
        assert!((d / (below + above) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn modified_supplies_haibach_slope() {
        let wl = WoehlerCurve::new(1e3, 1e7, 5.0);
        let d = damage_from_rp(&histogram(), &wl, RpDamageCalcMethod::MinerModified).unwrap();
        // k2 = 2k - 1 = 9 below the knee
        let below = 3.0 / (1e7 * (0.5_f64).powf(-9.0));
        let above = 2.0 / (1e7 * (2.0_f64).powf(-5.0)) + 0.5 / (1e7 * (3.0_f64).powf(-5.0));
        assert!((d / (below + above) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn consistent_slides_the_knee_to_the_largest_range() {
        let wl = WoehlerCurve::new(1e3, 1e7, 5.0).with_k2(9.0);
        let d = damage_from_rp(&histogram(), &wl, RpDamageCalcMethod::MinerConsistent).unwrap();
        // Knee at range 3000, nd' = 1e7 * 3^-5; the largest range stays on
        // the primary slope, everything beneath uses k2 from the new knee.
        let nd2 = 1e7 * (3.0_f64).powf(-5.0);
        let expected = 0.5 / nd2
            + 2.0 / (nd2 * (2000.0_f64 / 3000.0).powf(-9.0))
            + 3.0 / (nd2 * (500.0_f64 / 3000.0).powf(-9.0));
        assert!((d / expected - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_histogram_is_zero() {
        let rp = RangePairHistogram::new(10, 1.0);
        let d = damage_from_rp(&rp, &WoehlerCurve::default(), RpDamageCalcMethod::Default).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn invalid_curve_is_rejected() {
        let wl = WoehlerCurve::new(-1.0, 1e7, 5.0);
        assert!(damage_from_rp(&histogram(), &wl, RpDamageCalcMethod::Default).is_err());
    }

    #[test]
    fn integer_values_are_stable() {
        assert_eq!(RpDamageCalcMethod::try_from(3).unwrap(), RpDamageCalcMethod::MinerConsistent);
        assert!(RpDamageCalcMethod::try_from(4).is_err());
        assert_eq!(RpDamageCalcMethod::MinerModified.as_i32(), 2);
    }
}
