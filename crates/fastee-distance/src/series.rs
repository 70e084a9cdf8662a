//! Validated series: owned samples, borrowed views, and one-pass summaries.

use crate::error::DistanceError;

/// Reject empty input and the first non-finite sample.
fn check_samples(samples: &[f64]) -> Result<(), DistanceError> {
    if samples.is_empty() {
        return Err(DistanceError::EmptySeries);
    }
    match samples.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(DistanceError::NonFiniteValue { index }),
        None => Ok(()),
    }
}

/// An owned series of at least one finite sample.
///
/// Every distance family relies on this: alignments never see NaN and never
/// index an empty row.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    /// Take ownership of `values` after validating them.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::EmptySeries`] | `values` is empty |
    /// | [`DistanceError::NonFiniteValue`] | A sample is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, DistanceError> {
        check_samples(&values)?;
        Ok(Self(values))
    }

    /// Borrow the series as a view.
    #[must_use]
    pub fn as_view(&self) -> TimeSeriesView<'_> {
        TimeSeriesView(&self.0)
    }

    /// Return the samples.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a new series from `f` applied to every sample.
    ///
    /// # Errors
    ///
    /// [`DistanceError::NonFiniteValue`] if `f` yields NaN or infinity.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Result<Self, DistanceError> {
        Self::new(self.0.iter().copied().map(f).collect())
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Sum and sum of squares of a run of samples.
///
/// Feeds the pooled standard deviation that scales the ERP and LCSS grids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    /// Sum of the samples.
    pub sum: f64,
    /// Sum of the squared samples.
    pub sum_sq: f64,
}

impl SeriesStats {
    const EMPTY: Self = Self { sum: 0.0, sum_sq: 0.0 };

    /// Summarize `data` in one pass.
    #[must_use]
    pub fn of(data: &[f64]) -> Self {
        data.iter().fold(Self::EMPTY, |acc, &v| Self {
            sum: acc.sum + v,
            sum_sq: acc.sum_sq + v * v,
        })
    }
}

/// A borrowed series with the same guarantees as [`TimeSeries`].
///
/// Queries handed to a fitted classifier arrive as views, so test series can
/// be classified without copying.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesView<'a>(&'a [f64]);

impl<'a> TimeSeriesView<'a> {
    /// Borrow `slice` after validating it.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::EmptySeries`] | `slice` is empty |
    /// | [`DistanceError::NonFiniteValue`] | A sample is NaN or infinite |
    pub fn new(slice: &'a [f64]) -> Result<Self, DistanceError> {
        check_samples(slice)?;
        Ok(Self(slice))
    }

    /// Return the samples, tied to the underlying storage.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.0
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[f64]> for TimeSeriesView<'_> {
    fn as_ref(&self) -> &[f64] {
        self.0
    }
}
