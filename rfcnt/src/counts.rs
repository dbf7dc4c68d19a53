//! Count statistics kept coherent during a run.
//!
//! Three discrete accumulators consume the turning-point/cycle stream: the
//! rainflow matrix, the range-pair histogram and the level-crossing
//! histogram. All of them support the class-index shift that a downward
//! auto-resize applies mid-run.

pub mod level_crossing;
pub mod range_pair;
pub mod rfm;

pub use level_crossing::LevelCrossingHistogram;
pub use range_pair::RangePairHistogram;
pub use rfm::RainflowMatrix;
