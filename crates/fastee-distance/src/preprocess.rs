//! Time series preprocessing: z-normalization and the derivative transform.

use serde::Serialize;

use crate::collection::SeriesCollection;
use crate::error::DistanceError;
use crate::series::TimeSeries;

/// Z-normalize a time series to zero mean and unit variance.
///
/// Uses population standard deviation (divides by n, not n-1).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DistanceError::ConstantSeries`] | All values are identical (zero variance) |
#[must_use = "returns a new normalized series; the original is unchanged"]
pub fn z_normalize(series: &TimeSeries) -> Result<TimeSeries, DistanceError> {
    let data = series.as_slice();
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    if std == 0.0 {
        return Err(DistanceError::ConstantSeries {
            n: data.len(),
            value: data[0],
        });
    }

    series.map(|x| (x - mean) / std)
}

/// Z-normalize every series of a collection independently.
///
/// # Errors
///
/// Returns the first [`DistanceError::ConstantSeries`] encountered.
pub fn z_normalize_collection(
    collection: &SeriesCollection,
) -> Result<SeriesCollection, DistanceError> {
    collection.try_map_series(z_normalize)
}

/// Compute the Keogh-Pazzani first derivative of a time series.
///
/// For interior points (1..n-1): `d[i] = ((x[i] - x[i-1]) + (x[i+1] - x[i-1]) / 2) / 2`
/// Output length is `n - 2` (drops first and last points).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DistanceError::TooShort`] | Series has fewer than 3 elements |
#[must_use = "returns a new derivative series; the original is unchanged"]
pub fn derivative(series: &TimeSeries) -> Result<TimeSeries, DistanceError> {
    let data = series.as_slice();
    let n = data.len();

    if n < 3 {
        return Err(DistanceError::TooShort { len: n });
    }

    let deriv: Vec<f64> = (1..n - 1)
        .map(|i| ((data[i] - data[i - 1]) + (data[i + 1] - data[i - 1]) / 2.0) / 2.0)
        .collect();
    TimeSeries::new(deriv)
}

/// Transform applied to every series before distances are computed.
///
/// `Derivative` turns each family into its derivative variant (DDTW, WDDTW, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesTransform {
    /// Use the series as loaded.
    #[default]
    Raw,
    /// Replace each series by its Keogh-Pazzani derivative.
    Derivative,
}

impl SeriesTransform {
    /// Apply the transform to one series.
    ///
    /// # Errors
    ///
    /// [`DistanceError::TooShort`] for the derivative of a series shorter than 3.
    pub fn apply(self, series: &TimeSeries) -> Result<TimeSeries, DistanceError> {
        match self {
            Self::Raw => Ok(series.clone()),
            Self::Derivative => derivative(series),
        }
    }

    /// Apply the transform to every series of a collection.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`SeriesTransform::apply`].
    pub fn apply_collection(
        self,
        collection: &SeriesCollection,
    ) -> Result<SeriesCollection, DistanceError> {
        match self {
            Self::Raw => Ok(collection.clone()),
            Self::Derivative => collection.try_map_series(derivative),
        }
    }
}
