//! Elastic time series distances for nearest-neighbour parameter search.
//!
//! Pure math library, zero I/O. Provides validated series and labelled
//! collections, sliding-window envelopes with an O(1)-per-query envelope
//! cache, and six elastic distance families (DTW, WDTW, ERP, LCSS, MSM, TWE)
//! behind the [`DistanceFamily`] contract: a discretized parameter grid,
//! staged lower bounds, a cached upper bound, and an early-abandoning
//! alignment that reports how far down the grid its result stays exact.

mod cache;
mod collection;
mod constraint;
mod distance;
mod envelope;
mod error;
mod extrema;
mod family;
mod grid;
mod matrix;
mod preprocess;
mod series;

pub use cache::EnvelopeCache;
pub use collection::SeriesCollection;
pub use constraint::BandConstraint;
pub use distance::Distance;
pub use envelope::{EnvelopeSource, SeriesEnvelope, interval_gap};
pub use error::DistanceError;
pub use extrema::SeriesExtrema;
pub use family::{
    Alignment, BoundStage, DistanceFamily, DtwFamily, ErpFamily, Family, FamilyKind, FamilyOptions,
    LcssFamily, MsmFamily, TweFamily, WdtwFamily,
};
pub use grid::{ParameterGrid, ParameterValue, window_floor};
pub use matrix::DistanceMatrix;
pub use preprocess::{SeriesTransform, derivative, z_normalize, z_normalize_collection};
pub use series::{SeriesStats, TimeSeries, TimeSeriesView};
