//! Per-collection envelope cache.

use tracing::debug;

use crate::collection::SeriesCollection;
use crate::constraint::BandConstraint;
use crate::envelope::EnvelopeSource;
use crate::extrema::SeriesExtrema;

/// Envelopes of every series in a collection.
///
/// Built once per training call and read-only afterwards. The envelope of any
/// series at any window is an O(1) lookup after an O(n log n) build per
/// series, so the sweep never materializes an envelope per parameter value.
#[derive(Debug, Clone)]
pub struct EnvelopeCache {
    extrema: Vec<SeriesExtrema>,
}

impl EnvelopeCache {
    /// Precompute range extrema for every series of `collection`.
    #[must_use]
    pub fn new(collection: &SeriesCollection) -> Self {
        let extrema = collection
            .all_series()
            .iter()
            .map(|s| SeriesExtrema::new(s.as_slice()))
            .collect();
        debug!(series = collection.len(), "built envelope cache");
        Self { extrema }
    }

    /// Return the number of cached series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extrema.len()
    }

    /// Return true if the cache holds no series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extrema.is_empty()
    }

    /// Return the envelope source of series `i`.
    #[must_use]
    pub fn source(&self, i: usize) -> EnvelopeSource<'_> {
        EnvelopeSource::Cached(&self.extrema[i])
    }

    /// Return the maximum of series `i` over the window around `offset`.
    #[must_use]
    pub fn upper(&self, i: usize, window: BandConstraint, offset: usize) -> f64 {
        self.extrema[i].window(window, offset).1
    }

    /// Return the minimum of series `i` over the window around `offset`.
    #[must_use]
    pub fn lower(&self, i: usize, window: BandConstraint, offset: usize) -> f64 {
        self.extrema[i].window(window, offset).0
    }
}
