//! Error types for series validation, collections, preprocessing, and grids.

/// Errors from series construction, collection assembly, preprocessing and
/// distance family construction.
#[derive(Debug, thiserror::Error)]
pub enum DistanceError {
    /// Returned when an empty slice is provided as a time series.
    #[error("time series must be non-empty")]
    EmptySeries,

    /// Returned when a time series contains NaN, infinity, or negative infinity.
    #[error("time series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when a collection is built from zero series.
    #[error("series collection must contain at least one series")]
    EmptyCollection,

    /// Returned when the number of labels differs from the number of series.
    #[error("got {labels} labels for {series} series")]
    LabelCountMismatch {
        /// Number of series supplied.
        series: usize,
        /// Number of labels supplied.
        labels: usize,
    },

    /// Returned when a class index is not below the declared class count.
    #[error("label {label} of series {index} is out of range for {n_classes} classes")]
    LabelOutOfRange {
        /// Series position carrying the bad label.
        index: usize,
        /// The offending class index.
        label: usize,
        /// Declared number of classes.
        n_classes: usize,
    },

    /// Returned when a distance family is built with an unusable parameter grid.
    #[error("invalid parameter grid: {reason}")]
    InvalidGrid {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Returned when a family name does not match any known distance family.
    #[error("unknown distance family {name:?} (expected one of dtw, wdtw, erp, lcss, msm, twe)")]
    UnknownFamily {
        /// The rejected name.
        name: String,
    },

    /// Returned when z-normalizing a series whose values are all identical.
    #[error("cannot z-normalize constant series of length {n} (value {value})")]
    ConstantSeries {
        /// Length of the series.
        n: usize,
        /// The repeated value.
        value: f64,
    },

    /// Returned when the derivative transform receives fewer than 3 points.
    #[error("derivative requires at least 3 points, got {len}")]
    TooShort {
        /// Length of the rejected series.
        len: usize,
    },
}
