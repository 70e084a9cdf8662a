//! Dynamic time warping swept over the Sakoe-Chiba window.

use tracing::debug;

use super::cell::{Cell, squared};
use super::{Alignment, BoundStage, DistanceFamily, FamilyKind};
use crate::collection::SeriesCollection;
use crate::constraint::BandConstraint;
use crate::error::DistanceError;
use crate::grid::{ParameterGrid, ParameterValue, window_floor};

/// DTW over `steps` windows from 0 to `max_window`.
///
/// Costs are squared differences summed along the path, without a final
/// square root. Step `k` uses window `ceil(k * max_window / (steps - 1))`.
#[derive(Debug, Clone)]
pub struct DtwFamily {
    grid: ParameterGrid,
    windows: Vec<usize>,
}

impl DtwFamily {
    /// Create the family with `steps` windows spanning `0..=max_window`.
    ///
    /// A single step uses `max_window` alone.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if `steps` is zero.
    pub fn new(max_window: usize, steps: usize) -> Result<Self, DistanceError> {
        let grid = ParameterGrid::new(1, steps)?;
        let windows = if steps == 1 {
            vec![max_window]
        } else {
            (0..steps).map(|k| (k * max_window).div_ceil(steps - 1)).collect()
        };
        Ok(Self { grid, windows })
    }

    /// Create the family for a collection, spanning windows up to its
    /// longest series.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if `steps` is zero.
    pub fn from_collection(collection: &SeriesCollection, steps: usize) -> Result<Self, DistanceError> {
        let family = Self::new(collection.max_len(), steps)?;
        debug!(max_len = collection.max_len(), steps, "built DTW grid");
        Ok(family)
    }

    /// Return the window radius at `id`.
    #[must_use]
    pub fn window(&self, id: usize) -> usize {
        self.grid.check(id);
        self.windows[id]
    }

    /// Return the band constraint at `id`.
    #[must_use]
    pub fn constraint(&self, id: usize) -> BandConstraint {
        BandConstraint::SakoeChibaRadius(self.window(id))
    }
}

impl DistanceFamily for DtwFamily {
    fn kind(&self) -> FamilyKind {
        FamilyKind::Dtw
    }

    fn grid(&self) -> ParameterGrid {
        self.grid
    }

    fn describe(&self, id: usize) -> ParameterValue {
        ParameterValue::Window {
            window: self.window(id),
        }
    }

    fn bound_stages(&self) -> &'static [BoundStage] {
        &[BoundStage::Kim, BoundStage::QueryEnvelope, BoundStage::ReferenceEnvelope]
    }

    fn kim_bound(&self, query: &[f64], reference: &[f64], _id: usize) -> f64 {
        endpoint_cost(query, reference)
    }

    fn envelope_window(&self, id: usize) -> BandConstraint {
        self.constraint(id)
    }

    fn envelope_term(&self, value: f64, lower: f64, upper: f64, _id: usize) -> f64 {
        squared(crate::envelope::interval_gap(value, lower, upper))
    }

    fn upper_bound(&self, query: &[f64], reference: &[f64], _id: usize) -> f64 {
        diagonal_cost(query, reference, |_| 1.0)
    }

    fn align(&self, query: &[f64], reference: &[f64], id: usize, cutoff: f64) -> Alignment {
        let constraint = self.constraint(id);
        match warp(query, reference, constraint, cutoff, |i, j| {
            squared(query[i] - reference[j])
        }) {
            Err(lower_bound) => Alignment::Abandoned { lower_bound },
            Ok(cell) if cell.cost.is_infinite() => Alignment::Complete {
                distance: f64::INFINITY,
                floor: id,
            },
            Ok(cell) => Alignment::Complete {
                distance: cell.cost,
                floor: window_floor(0, &self.windows, cell.summary),
            },
        }
    }
}

/// Squared cost of the first and last cells, which every warping path visits.
pub(super) fn endpoint_cost(query: &[f64], reference: &[f64]) -> f64 {
    let first = squared(query[0] - reference[0]);
    if query.len() == 1 && reference.len() == 1 {
        first
    } else {
        first + squared(query[query.len() - 1] - reference[reference.len() - 1])
    }
}

/// Cost of the diagonal path, or infinity when the lengths differ.
///
/// Accumulates in the same order as [`warp`] so the result is never below the
/// optimal warping cost.
pub(super) fn diagonal_cost(query: &[f64], reference: &[f64], weight: impl Fn(usize) -> f64) -> f64 {
    if query.len() != reference.len() {
        return f64::INFINITY;
    }
    query
        .iter()
        .zip(reference)
        .fold(0.0, |acc, (&q, &r)| acc + weight(0) * squared(q - r))
}

/// Rolling banded warping DP with early abandoning.
///
/// Each row buffer has `bw + 2` slots. Index 0 is the left sentinel and
/// active columns occupy `1..=bw`; column `j` of a row starting at `start`
/// lives at `j - start + 1`. Cells carry the largest `|i - j|` of their
/// cheapest path.
///
/// Returns the cost of the cheapest cell of the first non-final row that
/// exceeds `cutoff` as `Err`. Otherwise returns the final cell, unreachable
/// when the band never meets `(n-1, m-1)`.
pub(super) fn warp<F>(
    query: &[f64],
    reference: &[f64],
    constraint: BandConstraint,
    cutoff: f64,
    cost: F,
) -> Result<Cell, f64>
where
    F: Fn(usize, usize) -> f64,
{
    let n = query.len();
    let m = reference.len();

    let bw = constraint.band_width(m);
    let buf_width = bw + 2;

    let mut prev = vec![Cell::UNREACHABLE; buf_width];
    let mut curr = vec![Cell::UNREACHABLE; buf_width];
    let mut prev_range = 0..0;

    for i in 0..n {
        curr.fill(Cell::UNREACHABLE);

        let col_range = constraint.column_range(i, m);
        let curr_start = col_range.start;
        let mut row_min = f64::INFINITY;

        for j in col_range.clone() {
            let cj = j - curr_start + 1;
            let step = cost(i, j);
            let deviation = i.abs_diff(j);

            let cell = if i == 0 && j == 0 {
                Cell::ORIGIN.widen(step, 0)
            } else {
                let left = curr[cj - 1];
                let above = if prev_range.contains(&j) {
                    prev[j - prev_range.start + 1]
                } else {
                    Cell::UNREACHABLE
                };
                let diag = if j > 0 && prev_range.contains(&(j - 1)) {
                    prev[j - prev_range.start]
                } else {
                    Cell::UNREACHABLE
                };
                Cell::cheapest(diag, above, left).widen(step, deviation)
            };

            curr[cj] = cell;
            row_min = row_min.min(cell.cost);
        }

        // Every path crosses every row, so the cheapest cell of a row bounds
        // the final cost from below. The last row is exempt because the path
        // must end at (n-1, m-1) specifically.
        if i + 1 < n && row_min > cutoff {
            return Err(row_min);
        }

        prev_range = col_range;
        std::mem::swap(&mut prev, &mut curr);
    }

    if prev_range.contains(&(m - 1)) {
        Ok(prev[m - 1 - prev_range.start + 1])
    } else {
        Ok(Cell::UNREACHABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(family: &DtwFamily, a: &[f64], b: &[f64], id: usize) -> (f64, usize) {
        match family.align(a, b, id, f64::INFINITY) {
            Alignment::Complete { distance, floor } => (distance, floor),
            Alignment::Abandoned { .. } => panic!("unbounded alignment abandoned"),
        }
    }

    /// Textbook full-matrix DTW, squared costs.
    fn naive_dtw(a: &[f64], b: &[f64], window: usize) -> f64 {
        let (n, m) = (a.len(), b.len());
        let mut d = vec![vec![f64::INFINITY; m + 1]; n + 1];
        d[0][0] = 0.0;
        for i in 1..=n {
            for j in 1..=m {
                if i.abs_diff(j) > window {
                    continue;
                }
                let best = d[i - 1][j - 1].min(d[i - 1][j]).min(d[i][j - 1]);
                d[i][j] = squared(a[i - 1] - b[j - 1]) + best;
            }
        }
        d[n][m]
    }

    #[test]
    fn windows_span_zero_to_max() {
        let family = DtwFamily::new(4, 5).unwrap();
        let windows: Vec<_> = (0..5).map(|id| family.window(id)).collect();
        assert_eq!(windows, vec![0, 1, 2, 3, 4]);

        let coarse = DtwFamily::new(10, 4).unwrap();
        assert_eq!(coarse.window(1), 4);
        assert_eq!(coarse.window(3), 10);
    }

    #[test]
    fn hand_computed_2x2() {
        let family = DtwFamily::new(1, 2).unwrap();
        // Squared cost matrix [[0,4],[1,1]]; best path 0 -> 1 -> 1 = 1 via (1,0).
        let (d, _) = full(&family, &[0.0, 1.0], &[0.0, 2.0], 1);
        assert!((d - 1.0).abs() < 1e-12, "got {d}");
        // Window 0 forces the diagonal: 0 + 1 = 1 as well.
        let (d0, _) = full(&family, &[0.0, 1.0], &[0.0, 2.0], 0);
        assert!((d0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matches_naive_for_every_window() {
        let a = [0.0, 2.0, 1.0, 3.0, -1.0, 0.5, 2.0];
        let b = [1.0, 0.0, 2.5, 1.0, 3.0, -2.0, 0.0];
        let family = DtwFamily::new(6, 7).unwrap();
        for id in 0..7 {
            let (d, _) = full(&family, &a, &b, id);
            let expected = naive_dtw(&a, &b, family.window(id));
            assert!((d - expected).abs() < 1e-9, "window {id}: {d} vs {expected}");
        }
    }

    #[test]
    fn unequal_lengths_outside_band_are_infinite() {
        let family = DtwFamily::new(4, 5).unwrap();
        let (d, floor) = full(&family, &[1.0, 2.0, 3.0, 4.0], &[1.0], 1);
        assert!(d.is_infinite());
        assert_eq!(floor, 1);
        let (d, _) = full(&family, &[1.0, 2.0, 3.0, 4.0], &[1.0], 3);
        assert!((d - (0.0 + 1.0 + 4.0 + 9.0)).abs() < 1e-12);
    }

    #[test]
    fn floor_distance_equals_computed_distance() {
        let a = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        let b = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let family = DtwFamily::new(5, 6).unwrap();
        let (d, floor) = full(&family, &a, &b, 5);
        assert_eq!(floor, 1, "a shift of one needs window 1");
        assert_eq!(d, 0.0);
        let (at_floor, _) = full(&family, &a, &b, floor);
        assert_eq!(at_floor, d);
        let (below, _) = full(&family, &a, &b, 0);
        assert!(below > d);
    }

    #[test]
    fn abandon_only_above_cutoff() {
        let a = [0.0, 5.0, 0.0, 5.0];
        let b = [5.0, 0.0, 5.0, 0.0];
        let family = DtwFamily::new(3, 4).unwrap();
        let (d, _) = full(&family, &a, &b, 3);
        // The first row already costs 25 on every path.
        assert_eq!(family.align(&a, &b, 3, 1.0), Alignment::Abandoned { lower_bound: 25.0 });
        assert!(matches!(
            family.align(&a, &b, 3, d),
            Alignment::Complete { distance, .. } if distance == d
        ));
    }

    #[test]
    fn bounds_sandwich_distance() {
        let a = [1.0, 3.0, 2.0, 5.0, 4.0];
        let b = [2.0, 1.0, 4.0, 3.0, 6.0];
        let family = DtwFamily::new(4, 5).unwrap();
        for id in 0..5 {
            let (d, _) = full(&family, &a, &b, id);
            assert!(family.kim_bound(&a, &b, id) <= d + 1e-12);
            assert!(family.upper_bound(&a, &b, id) >= d);
        }
    }
}
