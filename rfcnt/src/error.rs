//! Error type for counting runs.
//!
//! Every failure aborts the current run; nothing is retried and no partial
//! result bundle is returned. Errors carry the offending sample index or
//! configuration field so callers can report precisely.

use thiserror::Error;

/// Error type for rainflow counting operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RfcError {
    /// A configuration parameter failed validation.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// Name of the offending parameter.
        field: &'static str,
        /// Human-readable rejection reason.
        reason: String,
    },

    /// An input sample was NaN or infinite.
    #[error("non-finite value {value} at sample {sample_index}")]
    NonFinite {
        /// Index of the offending sample.
        sample_index: u64,
        /// The offending value.
        value: f64,
    },

    /// A sample fell outside the class range and `auto_resize` is off.
    #[error("value {value} at sample {sample_index} outside class range [{lower}, {upper})")]
    OutOfRange {
        /// Index of the offending sample.
        sample_index: u64,
        /// The offending value.
        value: f64,
        /// Lower bound of the class range (inclusive).
        lower: f64,
        /// Upper bound of the class range (exclusive).
        upper: f64,
    },

    /// Internal invariant violation. Indicates a bug, not bad input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RfcError {
    /// Shorthand for an [`RfcError::InvalidConfig`] with a formatted reason.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
