//! Distance newtype wrapper.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// A non-negative elastic distance value.
///
/// Squared-cost families (DTW, WDTW, ERP) are reported without a final
/// square root, so values compare directly with their lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Distance(f64);

impl Distance {
    /// Infinite distance, used when no admissible alignment exists.
    pub const INFINITY: Self = Self(f64::INFINITY);

    /// Zero distance.
    pub const ZERO: Self = Self(0.0);

    /// Wrap a raw distance value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw distance value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Return true if no admissible alignment was found.
    #[must_use]
    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
