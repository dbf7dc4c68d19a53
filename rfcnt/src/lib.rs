//! # Rainflow Cycle Counting Engine
//!
//! Identifies closed hysteresis cycles in one-dimensional load histories
//! with the four-point rainflow rule (plus ASTM E1049 and HCM variants),
//! accumulates fatigue damage via an S-N curve under Miner's rule, and
//! keeps a set of discrete statistics coherent in a single streaming pass:
//! rainflow matrix, range-pair histogram, level-crossing histogram,
//! turning-point sequence, per-sample damage history and the unclosed
//! residue.
//!
//! ## Pipeline
//!
//! 1. [`filter`] — hysteresis filter confirms turning points
//! 2. [`classify`] — value to class index (optionally auto-resizing)
//! 3. [`detect`] — stack discipline pops closed cycles
//! 4. [`counts`] / [`damage`] — accumulators consume cycle events
//! 5. residual finalization reconciles the remaining residue
//!
//! ## Usage
//!
//! ```rust
//! use rfcnt::{rfc, CountingParams, ResidualMethod, SdMethod};
//!
//! let data = [1.0, 3.0, 2.0, 4.0];
//! let params = CountingParams {
//!     class_count: 4,
//!     hysteresis: Some(0.99),
//!     residual_method: ResidualMethod::None,
//!     spread_damage: SdMethod::None,
//!     ..Default::default()
//! };
//! let results = rfc(&data, &params).expect("counting run");
//! assert_eq!(results.rfm.sum(), 1.0);
//! ```
//!
//! The engine is single-threaded and synchronous; every run owns its
//! state exclusively and returns a fully owned result bundle.

pub mod classify;
pub mod config;
pub mod counts;
pub mod damage;
pub mod detect;
pub mod engine;
pub mod error;
pub mod filter;
mod finalize;
pub mod flags;
pub mod residue;
pub mod result;
pub mod sncurve;

pub use config::{CountingParams, LcMethod, ResidualMethod, SdMethod};
pub use counts::{LevelCrossingHistogram, RainflowMatrix, RangePairHistogram};
pub use damage::{RpDamageCalcMethod, damage_from_rp};
pub use engine::rfc;
pub use error::RfcError;
pub use flags::CountingFlags;
pub use residue::TurningPoint;
pub use result::CountingResults;
pub use sncurve::WoehlerCurve;
