//! Miner-rule damage accumulation.
//!
//! Cycle damage is evaluated on class-center ranges: a counted pair at
//! class distance `d` has range `d · class_width` (twice the stress
//! amplitude), and contributes `count / N(range)` with `N` from the
//! configured S-N curve. Spreading the per-event increment back onto the
//! sample timeline lives in [`spread`]; post-processing a finished
//! range-pair histogram lives in [`from_rp`].

pub mod from_rp;
pub mod spread;

pub use from_rp::{RpDamageCalcMethod, damage_from_rp};
pub use spread::DamageSpreader;

use crate::detect::CycleEvent;
use crate::sncurve::WoehlerCurve;

/// Damage contribution of one counted event.
#[inline]
pub fn event_damage(wl: &WoehlerCurve, class_width: f64, event: &CycleEvent) -> f64 {
    let range = class_width * event.class_distance() as f64;
    wl.damage(range, event.count)
}
