//! Sparse tables of range minima and maxima.

use crate::constraint::BandConstraint;

/// Range-extrema table for one series.
///
/// Level `k` stores the min and max of every run of `2^k` consecutive samples,
/// so the extrema of any inclusive range are the combination of two
/// overlapping runs. Building costs O(n log n); each query is O(1).
#[derive(Debug, Clone)]
pub struct SeriesExtrema {
    len: usize,
    minima: Vec<Vec<f64>>,
    maxima: Vec<Vec<f64>>,
}

impl SeriesExtrema {
    /// Build the table for `data`.
    #[must_use]
    pub fn new(data: &[f64]) -> Self {
        let len = data.len();
        let mut minima = vec![data.to_vec()];
        let mut maxima = vec![data.to_vec()];

        let mut span = 1;
        while span * 2 <= len {
            let prev_min = &minima[minima.len() - 1];
            let prev_max = &maxima[maxima.len() - 1];
            let runs = len - span * 2 + 1;
            let next_min: Vec<f64> = (0..runs).map(|i| prev_min[i].min(prev_min[i + span])).collect();
            let next_max: Vec<f64> = (0..runs).map(|i| prev_max[i].max(prev_max[i + span])).collect();
            minima.push(next_min);
            maxima.push(next_max);
            span *= 2;
        }

        Self {
            len,
            minima,
            maxima,
        }
    }

    /// Return `(min, max)` of `data[lo..=hi]`.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi` or `hi >= len`.
    #[must_use]
    pub fn range(&self, lo: usize, hi: usize) -> (f64, f64) {
        assert!(lo <= hi && hi < self.len, "range {lo}..={hi} out of bounds for length {}", self.len);
        let width = hi - lo + 1;
        let level = width.ilog2() as usize;
        let second = hi + 1 - (1 << level);
        (
            self.minima[level][lo].min(self.minima[level][second]),
            self.maxima[level][lo].max(self.maxima[level][second]),
        )
    }

    /// Return `(lower, upper)` of the window of `constraint` centred on `offset`,
    /// clipped to the series.
    #[must_use]
    pub fn window(&self, constraint: BandConstraint, offset: usize) -> (f64, f64) {
        let radius = constraint.radius(self.len);
        let lo = offset.saturating_sub(radius).min(self.len - 1);
        let hi = offset.saturating_add(radius).min(self.len - 1);
        self.range(lo, hi)
    }

    /// Return the series length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if the table was built from an empty slice.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
