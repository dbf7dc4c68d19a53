//! Hysteresis filter / turning-point extractor.
//!
//! Streams raw samples and emits only confirmed local extrema whose
//! excursion from the previous extremum exceeds the hysteresis threshold
//! (strict `>`). Emitted extrema alternate strictly in slope direction.
//!
//! The tentative extremum ("reference") starts at the first sample and does
//! not move until a slope direction is established; the first emitted
//! turning point is therefore the first input sample whenever any direction
//! resolves. At end-of-stream a reference with a known direction is always
//! flushed (it is the extremum of the final, unterminated slope). Margin
//! enforcement additionally forces the first/last input samples into the
//! stream when the rules above would drop them.

/// A confirmed extremum, before classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    /// Signal value at the extremum.
    pub value: f64,
    /// Index into the input series.
    pub sample_index: u64,
}

/// Slope direction of the running branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slope {
    Unknown,
    Up,
    Down,
}

/// Streaming turning-point filter.
#[derive(Debug, Clone)]
pub struct TurningPointFilter {
    hysteresis: f64,
    enforce_margin: bool,
    slope: Slope,
    reference: Option<Extremum>,
    last: Option<Extremum>,
}

impl TurningPointFilter {
    /// Create a filter. `hysteresis` must be non-negative (validated by the
    /// configuration layer).
    pub fn new(hysteresis: f64, enforce_margin: bool) -> Self {
        Self {
            hysteresis,
            enforce_margin,
            slope: Slope::Unknown,
            reference: None,
            last: None,
        }
    }

    /// Feed one sample; returns a confirmed turning point when the sample
    /// establishes or reverses the slope direction.
    #[inline]
    pub fn feed(&mut self, sample_index: u64, value: f64) -> Option<Extremum> {
        let sample = Extremum {
            value,
            sample_index,
        };
        self.last = Some(sample);

        let Some(reference) = self.reference else {
            self.reference = Some(sample);
            return None;
        };

        match self.slope {
            Slope::Unknown => {
                if (value - reference.value).abs() > self.hysteresis {
                    self.slope = if value > reference.value {
                        Slope::Up
                    } else {
                        Slope::Down
                    };
                    self.reference = Some(sample);
                    Some(reference)
                } else {
                    None
                }
            }
            Slope::Up => {
                if value > reference.value {
                    self.reference = Some(sample);
                    None
                } else if value < reference.value - self.hysteresis {
                    self.slope = Slope::Down;
                    self.reference = Some(sample);
                    Some(reference)
                } else {
                    None
                }
            }
            Slope::Down => {
                if value < reference.value {
                    self.reference = Some(sample);
                    None
                } else if value > reference.value + self.hysteresis {
                    self.slope = Slope::Up;
                    self.reference = Some(sample);
                    Some(reference)
                } else {
                    None
                }
            }
        }
    }

    /// Flush pending state at end-of-stream. Returns zero, one or two final
    /// turning points (extremum of the last branch, then the forced last
    /// sample under margin enforcement).
    pub fn finish(&mut self) -> Vec<Extremum> {
        let mut out = Vec::new();
        let (Some(reference), Some(last)) = (self.reference, self.last) else {
            return out;
        };

        match self.slope {
            Slope::Unknown => {
                // No direction ever resolved; only margin enforcement can
                // turn the endpoints into turning points.
                if self.enforce_margin {
                    out.push(reference);
                    if last.sample_index != reference.sample_index {
                        out.push(last);
                    }
                }
            }
            Slope::Up | Slope::Down => {
                out.push(reference);
                if self.enforce_margin && last.sample_index != reference.sample_index {
                    out.push(last);
                }
            }
        }
        self.reference = None;
        out
    }
}
