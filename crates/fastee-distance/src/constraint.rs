//! Diagonal bands limiting how far an alignment may warp.

use std::ops::Range;

/// Band around the diagonal of an alignment matrix.
///
/// DTW windows, ERP bands and the envelope windows of every family are all
/// expressed as a band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// Every cell is reachable.
    #[default]
    Unconstrained,

    /// Only cells with `|row - col| <= radius` are reachable.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Reachable columns of `row` in a matrix with `n_cols` columns.
    ///
    /// Empty once a narrow band has run past the last column.
    #[must_use]
    pub fn column_range(&self, row: usize, n_cols: usize) -> Range<usize> {
        let Self::SakoeChibaRadius(r) = *self else {
            return 0..n_cols;
        };
        row.saturating_sub(r).min(n_cols)..row.saturating_add(r).saturating_add(1).min(n_cols)
    }

    /// Most columns any row can reach, for sizing rolling buffers.
    #[must_use]
    pub fn band_width(&self, n_cols: usize) -> usize {
        match *self {
            Self::Unconstrained => n_cols,
            Self::SakoeChibaRadius(r) => r.saturating_mul(2).saturating_add(1).min(n_cols),
        }
    }

    /// Window radius, with the unconstrained band reported as `len`.
    #[must_use]
    pub fn radius(&self, len: usize) -> usize {
        match *self {
            Self::Unconstrained => len,
            Self::SakoeChibaRadius(r) => r,
        }
    }
}
