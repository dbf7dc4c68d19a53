//! Statistic-selection bitflags.
//!
//! A counting run maintains several statistics side by side. Callers that
//! only need a subset (e.g. a damage total without the full matrix) clear
//! the flags they do not want; the corresponding result fields then stay
//! empty/zero. Clearing a flag never changes the values of the others.

use bitflags::bitflags;

bitflags! {
    /// Selects which statistics a counting run produces.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CountingFlags: u32 {
        /// Rainflow matrix (from-class × to-class counts).
        const RFM    = 0x0001;
        /// Range-pair histogram over |Δclass|.
        const RP     = 0x0002;
        /// Level-crossing histogram.
        const LC     = 0x0004;
        /// Turning-point sequence.
        const TP     = 0x0008;
        /// Per-sample damage history.
        const DH     = 0x0010;
        /// Cumulative damage scalar.
        const DAMAGE = 0x0020;

        /// Every statistic (default).
        const ALL = Self::RFM.bits()
            | Self::RP.bits()
            | Self::LC.bits()
            | Self::TP.bits()
            | Self::DH.bits()
            | Self::DAMAGE.bits();
    }
}

impl Default for CountingFlags {
    fn default() -> Self {
        Self::ALL
    }
}
