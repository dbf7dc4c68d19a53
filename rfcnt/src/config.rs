//! Counting parameters, method enumerations and TOML loading.
//!
//! `CountingParams` carries every knob of a counting run. Class geometry
//! (`class_width`, `class_offset`, `hysteresis`) is optional and derives
//! from the data when unset. Loading from TOML validates before anything
//! reaches the engine; a rejected configuration never produces a partial
//! run.
//!
//! The method enumerations carry stable integer values used by external
//! tooling; they are pinned at compile time at the bottom of this module.

use std::path::Path;

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::error::RfcError;
use crate::flags::CountingFlags;
use crate::sncurve::WoehlerCurve;

// ─── Method Enumerations ────────────────────────────────────────────

/// How the residue left after the hot loop is turned into counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResidualMethod {
    /// No further events; residue returned as-is.
    #[serde(rename = "NONE")]
    None = 0,
    /// Internal: behaves like `NONE`.
    #[serde(rename = "IGNORE")]
    Ignore = 1,
    /// Internal: skip finalization entirely.
    #[serde(rename = "NO_FINALIZE")]
    NoFinalize = 2,
    /// Drop the residue without counting.
    #[serde(rename = "DISCARD")]
    Discard = 3,
    /// Count every adjacent residue pair as a half cycle.
    #[serde(rename = "HALFCYCLES")]
    HalfCycles = 4,
    /// Count every adjacent residue pair as a full cycle.
    #[serde(rename = "FULLCYCLES")]
    FullCycles = 5,
    /// Clormann-Seeger residue reduction.
    #[serde(rename = "CLORMANN_SEEGER")]
    ClormannSeeger = 6,
    /// Re-feed the residue as if the history repeated (default).
    #[serde(rename = "REPEATED")]
    Repeated = 7,
    /// DIN 45667 range-pair residue rules.
    #[serde(rename = "DIN45667")]
    Din45667 = 8,
}

impl ResidualMethod {
    /// Stable integer value.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for ResidualMethod {
    type Error = RfcError;

    fn try_from(v: i32) -> Result<Self, RfcError> {
        Ok(match v {
            0 => Self::None,
            1 => Self::Ignore,
            2 => Self::NoFinalize,
            3 => Self::Discard,
            4 => Self::HalfCycles,
            5 => Self::FullCycles,
            6 => Self::ClormannSeeger,
            7 => Self::Repeated,
            8 => Self::Din45667,
            _ => return Err(RfcError::invalid("residual_method", format!("unknown value {v}"))),
        })
    }
}

impl Default for ResidualMethod {
    fn default() -> Self {
        Self::Repeated
    }
}

/// How a cycle's damage increment is spread back onto the sample timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum SdMethod {
    /// No damage-history writes.
    #[serde(rename = "NONE")]
    None = -1,
    /// Half of the increment at P2 and P3 each.
    #[serde(rename = "HALF_23")]
    Half23 = 0,
    /// Ramp over `(i2..i3]`, weighted by absolute sample increments.
    #[serde(rename = "RAMP_AMPLITUDE_23")]
    RampAmplitude23 = 1,
    /// Ramp over `(i2..i3]`, uniform.
    #[serde(rename = "RAMP_DAMAGE_23")]
    RampDamage23 = 2,
    /// Ramp over `(i2..i4]`, weighted by `|Δx|^k`.
    #[serde(rename = "RAMP_AMPLITUDE_24")]
    RampAmplitude24 = 3,
    /// Ramp over `(i2..i4]`, uniform.
    #[serde(rename = "RAMP_DAMAGE_24")]
    RampDamage24 = 4,
    /// Entire increment at P2.
    #[serde(rename = "FULL_P2")]
    FullP2 = 5,
    /// Entire increment at P3.
    #[serde(rename = "FULL_P3")]
    FullP3 = 6,
    /// Transient partition along the rising branch `(i2..i3]`.
    #[serde(rename = "TRANSIENT_23")]
    Transient23 = 7,
    /// Transient partition over both branches, truncated at cycle closure
    /// (default).
    #[serde(rename = "TRANSIENT_23c")]
    Transient23c = 8,
}

impl SdMethod {
    /// Stable integer value.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for SdMethod {
    type Error = RfcError;

    fn try_from(v: i32) -> Result<Self, RfcError> {
        Ok(match v {
            -1 => Self::None,
            0 => Self::Half23,
            1 => Self::RampAmplitude23,
            2 => Self::RampDamage23,
            3 => Self::RampAmplitude24,
            4 => Self::RampDamage24,
            5 => Self::FullP2,
            6 => Self::FullP3,
            7 => Self::Transient23,
            8 => Self::Transient23c,
            _ => return Err(RfcError::invalid("spread_damage", format!("unknown value {v}"))),
        })
    }
}

impl Default for SdMethod {
    fn default() -> Self {
        Self::Transient23c
    }
}

/// Which slopes contribute to the level-crossing histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum LcMethod {
    /// Count rising slopes only (default).
    #[serde(rename = "SLOPES_UP")]
    SlopesUp = 0,
    /// Count falling slopes only.
    #[serde(rename = "SLOPES_DOWN")]
    SlopesDown = 1,
    /// Count rising and falling slopes.
    #[serde(rename = "SLOPES_ALL")]
    SlopesAll = 3,
}

impl LcMethod {
    /// Stable integer value.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for LcMethod {
    type Error = RfcError;

    fn try_from(v: i32) -> Result<Self, RfcError> {
        Ok(match v {
            0 => Self::SlopesUp,
            1 => Self::SlopesDown,
            3 => Self::SlopesAll,
            _ => return Err(RfcError::invalid("lc_method", format!("unknown value {v}"))),
        })
    }
}

impl Default for LcMethod {
    fn default() -> Self {
        Self::SlopesUp
    }
}

// ─── Counting Parameters ────────────────────────────────────────────

/// Full parameter set of a counting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountingParams {
    /// Number of classes (>= 2).
    pub class_count: u32,
    /// Class width; derived as `ptp / (class_count - 1)` when unset.
    pub class_width: Option<f64>,
    /// Lower bound of class 0; derived as `min - width/2` when unset.
    pub class_offset: Option<f64>,
    /// Hysteresis threshold; derived as `class_width` when unset.
    pub hysteresis: Option<f64>,
    /// Residue handling after the hot loop.
    pub residual_method: ResidualMethod,
    /// Damage spreading policy.
    pub spread_damage: SdMethod,
    /// Level-crossing slope policy.
    pub lc_method: LcMethod,
    /// Run the HCM (Clormann-Seeger two-pointer) detector.
    pub use_hcm: bool,
    /// Run the ASTM E1049 three-point detector.
    pub use_astm: bool,
    /// Force first and last input samples into the turning-point stream.
    pub enforce_margin: bool,
    /// Grow the class range instead of failing on out-of-range values.
    pub auto_resize: bool,
    /// S-N curve for damage accumulation.
    pub wl: WoehlerCurve,
    /// Which statistics to produce.
    #[serde(skip)]
    pub flags: CountingFlags,
}

impl Default for CountingParams {
    fn default() -> Self {
        Self {
            class_count: 100,
            class_width: None,
            class_offset: None,
            hysteresis: None,
            residual_method: ResidualMethod::default(),
            spread_damage: SdMethod::default(),
            lc_method: LcMethod::default(),
            use_hcm: false,
            use_astm: false,
            enforce_margin: false,
            auto_resize: false,
            wl: WoehlerCurve::default(),
            flags: CountingFlags::default(),
        }
    }
}

impl CountingParams {
    /// Parse and validate parameters from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RfcError> {
        let params: Self = toml::from_str(toml_str)
            .map_err(|e| RfcError::invalid("toml", e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate parameters from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, RfcError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RfcError::invalid("toml", format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Data-independent validation. `resolve` repeats these checks after
    /// filling derived values.
    pub fn validate(&self) -> Result<(), RfcError> {
        if self.class_count < 2 {
            return Err(RfcError::invalid(
                "class_count",
                format!("must be >= 2, got {}", self.class_count),
            ));
        }
        if let Some(w) = self.class_width {
            if !(w.is_finite() && w > 0.0) {
                return Err(RfcError::invalid("class_width", format!("must be finite and > 0, got {w}")));
            }
        }
        if let Some(o) = self.class_offset {
            if !o.is_finite() {
                return Err(RfcError::invalid("class_offset", format!("must be finite, got {o}")));
            }
        }
        if let Some(h) = self.hysteresis {
            if !(h.is_finite() && h >= 0.0) {
                return Err(RfcError::invalid("hysteresis", format!("must be finite and >= 0, got {h}")));
            }
        }
        if self.use_hcm && self.use_astm {
            return Err(RfcError::invalid(
                "use_hcm",
                "use_hcm and use_astm are mutually exclusive",
            ));
        }
        self.wl.validate()?;
        Ok(())
    }

    /// Fill derived class geometry from the data and produce the concrete
    /// parameter set the engine runs with.
    ///
    /// Degenerate inputs (empty or constant data) fall back to width 1.0 so
    /// valid data can never derive an invalid configuration.
    pub(crate) fn resolve(&self, data: &[f64]) -> Result<ResolvedParams, RfcError> {
        self.validate()?;

        let needs_scan =
            self.class_width.is_none() || self.class_offset.is_none();
        let (min, max) = if needs_scan && !data.is_empty() {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for (i, &x) in data.iter().enumerate() {
                if !x.is_finite() {
                    return Err(RfcError::NonFinite {
                        sample_index: i as u64,
                        value: x,
                    });
                }
                min = min.min(x);
                max = max.max(x);
            }
            (min, max)
        } else {
            (0.0, 0.0)
        };

        let class_width = match self.class_width {
            Some(w) => w,
            None => {
                let ptp = max - min;
                if data.is_empty() || ptp <= 0.0 {
                    1.0
                } else {
                    ptp / (self.class_count - 1) as f64
                }
            }
        };
        let class_offset = match self.class_offset {
            Some(o) => o,
            None if data.is_empty() => 0.0,
            None => min - class_width / 2.0,
        };
        let hysteresis = self.hysteresis.unwrap_or(class_width);
        if !(hysteresis.is_finite() && hysteresis >= 0.0) {
            return Err(RfcError::invalid(
                "hysteresis",
                format!("must be finite and >= 0, got {hysteresis}"),
            ));
        }

        Ok(ResolvedParams {
            class_count: self.class_count,
            class_width,
            class_offset,
            hysteresis,
            residual_method: self.residual_method,
            spread_damage: self.spread_damage,
            lc_method: self.lc_method,
            use_hcm: self.use_hcm,
            use_astm: self.use_astm,
            enforce_margin: self.enforce_margin,
            auto_resize: self.auto_resize,
            wl: self.wl,
            flags: self.flags,
        })
    }
}

/// Concrete parameters after derivation, consumed by the engine.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedParams {
    pub class_count: u32,
    pub class_width: f64,
    pub class_offset: f64,
    pub hysteresis: f64,
    pub residual_method: ResidualMethod,
    pub spread_damage: SdMethod,
    pub lc_method: LcMethod,
    pub use_hcm: bool,
    pub use_astm: bool,
    pub enforce_margin: bool,
    pub auto_resize: bool,
    pub wl: WoehlerCurve,
    pub flags: CountingFlags,
}

// ─── Stable Integer Pins ────────────────────────────────────────────

const_assert_eq!(ResidualMethod::None as i32, 0);
const_assert_eq!(ResidualMethod::Ignore as i32, 1);
const_assert_eq!(ResidualMethod::NoFinalize as i32, 2);
const_assert_eq!(ResidualMethod::Discard as i32, 3);
const_assert_eq!(ResidualMethod::HalfCycles as i32, 4);
const_assert_eq!(ResidualMethod::FullCycles as i32, 5);
const_assert_eq!(ResidualMethod::ClormannSeeger as i32, 6);
const_assert_eq!(ResidualMethod::Repeated as i32, 7);
const_assert_eq!(ResidualMethod::Din45667 as i32, 8);

const_assert_eq!(SdMethod::None as i32, -1);
const_assert_eq!(SdMethod::Half23 as i32, 0);
const_assert_eq!(SdMethod::RampAmplitude23 as i32, 1);
const_assert_eq!(SdMethod::RampDamage23 as i32, 2);
const_assert_eq!(SdMethod::RampAmplitude24 as i32, 3);
const_assert_eq!(SdMethod::RampDamage24 as i32, 4);
const_assert_eq!(SdMethod::FullP2 as i32, 5);
const_assert_eq!(SdMethod::FullP3 as i32, 6);
const_assert_eq!(SdMethod::Transient23 as i32, 7);
const_assert_eq!(SdMethod::Transient23c as i32, 8);

const_assert_eq!(LcMethod::SlopesUp as i32, 0);
const_assert_eq!(LcMethod::SlopesDown as i32, 1);
const_assert_eq!(LcMethod::SlopesAll as i32, 3);
