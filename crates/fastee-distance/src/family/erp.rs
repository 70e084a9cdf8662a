//! Edit distance with real penalty.

use tracing::debug;

use super::cell::{Cell, squared};
use super::{
    Alignment, BoundStage, DistanceFamily, FamilyKind, check_axis, fractional_bands, scaled_thresholds,
};
use crate::collection::SeriesCollection;
use crate::constraint::BandConstraint;
use crate::envelope::interval_gap;
use crate::error::DistanceError;
use crate::grid::{ParameterGrid, ParameterValue, window_floor};

/// ERP over gap values (groups) times bands (steps).
///
/// Matching `a_i` with `b_j` costs `(a_i - b_j)^2`; aligning a sample with a
/// gap costs `(x - g)^2`. Alignments may stray at most `band` cells from the
/// diagonal.
#[derive(Debug, Clone)]
pub struct ErpFamily {
    grid: ParameterGrid,
    gaps: Vec<f64>,
    bands: Vec<usize>,
}

impl ErpFamily {
    /// Create the family from explicit gap values and bands.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if either list is empty or `bands` is not
    /// ascending.
    pub fn new(gaps: Vec<f64>, bands: Vec<usize>) -> Result<Self, DistanceError> {
        check_axis("ERP band", &bands, true)?;
        let grid = ParameterGrid::new(gaps.len(), bands.len())?;
        Ok(Self { grid, gaps, bands })
    }

    /// Create the default 10 x 10 grid: gap values spread over `[0.2, 1]`
    /// times the pooled standard deviation and bands up to a quarter of the
    /// longest series.
    ///
    /// # Errors
    ///
    /// Never fails for a valid collection.
    pub fn from_collection(collection: &SeriesCollection) -> Result<Self, DistanceError> {
        let (_, std) = collection.pooled_stats();
        let gaps = scaled_thresholds(std, 10);
        let bands = fractional_bands(collection.max_len(), 0.25, 10);
        debug!(std, max_band = bands[bands.len() - 1], "built ERP grid");
        Self::new(gaps, bands)
    }

    /// Return `(gap value, band)` at `id`.
    #[must_use]
    pub fn params(&self, id: usize) -> (f64, usize) {
        self.grid.check(id);
        (self.gaps[self.grid.group_of(id)], self.bands[self.grid.step_of(id)])
    }
}

impl DistanceFamily for ErpFamily {
    fn kind(&self) -> FamilyKind {
        FamilyKind::Erp
    }

    fn grid(&self) -> ParameterGrid {
        self.grid
    }

    fn describe(&self, id: usize) -> ParameterValue {
        let (gap, band) = self.params(id);
        ParameterValue::GapBand { gap, band }
    }

    fn bound_stages(&self) -> &'static [BoundStage] {
        &[BoundStage::QueryEnvelope, BoundStage::ReferenceEnvelope]
    }

    fn envelope_window(&self, id: usize) -> BandConstraint {
        BandConstraint::SakoeChibaRadius(self.params(id).1)
    }

    // A sample is either matched inside the window or with the gap value, so
    // the envelope is widened to include g.
    fn envelope_term(&self, value: f64, lower: f64, upper: f64, id: usize) -> f64 {
        let gap = self.params(id).0;
        squared(interval_gap(value, lower.min(gap), upper.max(gap)))
    }

    fn upper_bound(&self, query: &[f64], reference: &[f64], _id: usize) -> f64 {
        if query.len() != reference.len() {
            return f64::INFINITY;
        }
        query
            .iter()
            .zip(reference)
            .fold(0.0, |acc, (&q, &r)| acc + squared(q - r))
    }

    fn align(&self, query: &[f64], reference: &[f64], id: usize, cutoff: f64) -> Alignment {
        let (gap, band) = self.params(id);
        let constraint = BandConstraint::SakoeChibaRadius(band);
        let n = query.len();
        let m = reference.len();

        // Row i and column j of the padded (n+1) x (m+1) matrix; index 0 is
        // the empty prefix. Stale cells outside the band are never read.
        let mut prev = vec![Cell::UNREACHABLE; m + 1];
        let mut curr = vec![Cell::UNREACHABLE; m + 1];
        let mut prev_range = 0..0;

        for i in 0..=n {
            let col_range = constraint.column_range(i, m + 1);
            let mut row_min = f64::INFINITY;

            for j in col_range.clone() {
                let deviation = i.abs_diff(j);
                let cell = if i == 0 && j == 0 {
                    Cell::ORIGIN
                } else {
                    let diag = if i > 0 && j > 0 && prev_range.contains(&(j - 1)) {
                        prev[j - 1].widen(squared(query[i - 1] - reference[j - 1]), deviation)
                    } else {
                        Cell::UNREACHABLE
                    };
                    let above = if i > 0 && prev_range.contains(&j) {
                        prev[j].widen(squared(query[i - 1] - gap), deviation)
                    } else {
                        Cell::UNREACHABLE
                    };
                    let left = if j > col_range.start {
                        curr[j - 1].widen(squared(reference[j - 1] - gap), deviation)
                    } else {
                        Cell::UNREACHABLE
                    };
                    Cell::cheapest(diag, above, left)
                };
                curr[j] = cell;
                row_min = row_min.min(cell.cost);
            }

            if i < n && row_min > cutoff {
                return Alignment::Abandoned { lower_bound: row_min };
            }

            prev_range = col_range;
            std::mem::swap(&mut prev, &mut curr);
        }

        if !prev_range.contains(&m) || prev[m].cost.is_infinite() {
            return Alignment::Complete {
                distance: f64::INFINITY,
                floor: id,
            };
        }
        let last = prev[m];
        Alignment::Complete {
            distance: last.cost,
            floor: window_floor(self.grid.group_start(id), &self.bands, last.summary),
        }
    }
}
