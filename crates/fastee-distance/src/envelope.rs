//! Sliding-window envelopes and the envelope lookup used by the bound stages.

use std::collections::VecDeque;

use crate::constraint::BandConstraint;
use crate::extrema::SeriesExtrema;
use crate::series::TimeSeriesView;

/// Materialized upper and lower envelope of one series for one window.
///
/// For each time step `i`, `upper[i]` is the maximum of `series[j]` where `|i - j| <= radius`,
/// and `lower[i]` is the minimum. For the unconstrained window, the envelopes are the global
/// max/min repeated.
#[derive(Debug, Clone)]
pub struct SeriesEnvelope {
    constraint: BandConstraint,
    upper: Vec<f64>,
    lower: Vec<f64>,
}

impl SeriesEnvelope {
    /// Compute upper and lower envelopes for a series under the given constraint.
    ///
    /// Uses an O(n) sliding-window min/max algorithm with [`VecDeque`]. Series that
    /// are not part of a training collection (test queries) get their envelope this
    /// way; collection members go through [`crate::EnvelopeCache`].
    #[must_use]
    pub fn compute(series: TimeSeriesView<'_>, constraint: BandConstraint) -> Self {
        let data = series.as_slice();
        let n = data.len();
        let radius = constraint.radius(n);

        let mut upper = vec![0.0_f64; n];
        let mut lower = vec![0.0_f64; n];

        // Both deques hold indices in increasing order. Values decrease from
        // the front of `max_deque` and increase from the front of `min_deque`,
        // so each front is the extremum of the current window.
        let mut max_deque: VecDeque<usize> = VecDeque::new();
        let mut min_deque: VecDeque<usize> = VecDeque::new();
        let mut next_to_add: usize = 0;

        for i in 0..n {
            let hi = i.saturating_add(radius).min(n - 1);

            while next_to_add <= hi {
                let value = data[next_to_add];
                while max_deque.back().is_some_and(|&back| data[back] <= value) {
                    max_deque.pop_back();
                }
                max_deque.push_back(next_to_add);

                while min_deque.back().is_some_and(|&back| data[back] >= value) {
                    min_deque.pop_back();
                }
                min_deque.push_back(next_to_add);

                next_to_add += 1;
            }

            let lo = i.saturating_sub(radius);
            while max_deque.front().is_some_and(|&front| front < lo) {
                max_deque.pop_front();
            }
            while min_deque.front().is_some_and(|&front| front < lo) {
                min_deque.pop_front();
            }

            // Element `i` itself is always inside its window, so both fronts exist.
            upper[i] = max_deque.front().map_or(data[i], |&j| data[j]);
            lower[i] = min_deque.front().map_or(data[i], |&j| data[j]);
        }

        Self {
            constraint,
            upper,
            lower,
        }
    }

    /// Return the window this envelope was computed for.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Return the upper envelope values.
    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Return the lower envelope values.
    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Return the length of the envelope (same as the original series).
    #[must_use]
    pub fn len(&self) -> usize {
        self.upper.len()
    }

    /// Return true if the envelope is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }
}

/// Where the envelope of a reference series comes from.
#[derive(Debug, Clone, Copy)]
pub enum EnvelopeSource<'a> {
    /// Range extrema from the envelope cache; any window is answered in O(1).
    Cached(&'a SeriesExtrema),
    /// A materialized envelope, valid for the single window it was computed with.
    Fixed(&'a SeriesEnvelope),
}

impl EnvelopeSource<'_> {
    /// Return `(lower, upper)` of the window around `offset`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if a [`EnvelopeSource::Fixed`] envelope is asked
    /// for a window other than its own.
    #[must_use]
    pub fn bounds(&self, constraint: BandConstraint, offset: usize) -> (f64, f64) {
        match self {
            Self::Cached(extrema) => extrema.window(constraint, offset),
            Self::Fixed(envelope) => {
                debug_assert_eq!(envelope.constraint, constraint);
                (envelope.lower[offset], envelope.upper[offset])
            }
        }
    }

    /// Return the length of the underlying series.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Cached(extrema) => extrema.len(),
            Self::Fixed(envelope) => envelope.len(),
        }
    }

    /// Return true if the underlying series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Distance from `value` to the interval `[lower, upper]`, zero inside it.
#[must_use]
pub fn interval_gap(value: f64, lower: f64, upper: f64) -> f64 {
    if value > upper {
        value - upper
    } else if value < lower {
        lower - value
    } else {
        0.0
    }
}
