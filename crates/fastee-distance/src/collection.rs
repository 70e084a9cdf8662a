//! Labelled training collections.

use crate::error::DistanceError;
use crate::series::{SeriesStats, TimeSeries, TimeSeriesView};

/// A labelled set of series with class indices in `0..n_classes`.
///
/// Series may differ in length. The collection is immutable once built.
#[derive(Debug, Clone)]
pub struct SeriesCollection {
    series: Vec<TimeSeries>,
    labels: Vec<usize>,
    n_classes: usize,
}

impl SeriesCollection {
    /// Assemble a collection, validating labels against `n_classes`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::EmptyCollection`] | `series` is empty |
    /// | [`DistanceError::LabelCountMismatch`] | `labels.len() != series.len()` |
    /// | [`DistanceError::LabelOutOfRange`] | A label is `>= n_classes` |
    pub fn new(
        series: Vec<TimeSeries>,
        labels: Vec<usize>,
        n_classes: usize,
    ) -> Result<Self, DistanceError> {
        if series.is_empty() {
            return Err(DistanceError::EmptyCollection);
        }
        if series.len() != labels.len() {
            return Err(DistanceError::LabelCountMismatch {
                series: series.len(),
                labels: labels.len(),
            });
        }
        if let Some((index, &label)) = labels.iter().enumerate().find(|&(_, &l)| l >= n_classes) {
            return Err(DistanceError::LabelOutOfRange {
                index,
                label,
                n_classes,
            });
        }
        Ok(Self {
            series,
            labels,
            n_classes,
        })
    }

    /// Return the number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Always false for a validated collection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Borrow series `i`.
    #[must_use]
    pub fn series(&self, i: usize) -> TimeSeriesView<'_> {
        self.series[i].as_view()
    }

    /// Return the length of series `i`.
    #[must_use]
    pub fn series_len(&self, i: usize) -> usize {
        self.series[i].len()
    }

    /// Return the class index of series `i`.
    #[must_use]
    pub fn label(&self, i: usize) -> usize {
        self.labels[i]
    }

    /// Return all class indices in series order.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the owned series in order.
    #[must_use]
    pub fn all_series(&self) -> &[TimeSeries] {
        &self.series
    }

    /// Return the length of the longest series.
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.series.iter().map(TimeSeries::len).max().unwrap_or(0)
    }

    /// Return the length of the shortest series.
    #[must_use]
    pub fn min_len(&self) -> usize {
        self.series.iter().map(TimeSeries::len).min().unwrap_or(0)
    }

    /// Return the mean and population standard deviation of every sample in
    /// the collection, pooled across series.
    #[must_use]
    pub fn pooled_stats(&self) -> (f64, f64) {
        let (count, sum, sum_sq) = self.series.iter().fold((0usize, 0.0, 0.0), |acc, s| {
            let stats = SeriesStats::of(s.as_slice());
            (acc.0 + s.len(), acc.1 + stats.sum, acc.2 + stats.sum_sq)
        });
        let n = count as f64;
        let mean = sum / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);
        (mean, variance.sqrt())
    }

    /// Return a collection whose series are `f` applied to each series, with
    /// labels unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map_series<F>(&self, f: F) -> Result<Self, DistanceError>
    where
        F: Fn(&TimeSeries) -> Result<TimeSeries, DistanceError>,
    {
        let series = self.series.iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Self::new(series, self.labels.clone(), self.n_classes)
    }
}
