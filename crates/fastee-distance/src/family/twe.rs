//! Time warp edit distance.

use super::cell::Cell;
use super::{Alignment, BoundStage, DistanceFamily, FamilyKind, check_axis};
use crate::error::DistanceError;
use crate::grid::{ParameterGrid, ParameterValue};

const DEFAULT_STIFFNESS: [f64; 10] = [1e-5, 1e-4, 5e-4, 1e-3, 5e-3, 0.01, 0.05, 0.1, 0.5, 1.0];

/// TWE over stiffness `nu` (groups) times deletion penalty `lambda` (steps,
/// largest first).
///
/// Both series are prefixed with a zero sample and time-stamped by index.
/// A match of `(i, j)` costs `|a_i - b_j| + |a_{i-1} - b_{j-1}| + 2 nu |i - j|`;
/// deleting `a_i` costs `|a_i - a_{i-1}| + nu + lambda`.
#[derive(Debug, Clone)]
pub struct TweFamily {
    grid: ParameterGrid,
    stiffness: Vec<f64>,
    penalties: Vec<f64>,
}

impl TweFamily {
    /// Create the default 10 x 10 grid: ten stiffness values from 1e-5 to 1
    /// and penalties `i / 90` for `i` in `0..10`.
    ///
    /// # Errors
    ///
    /// Never fails for the default grid.
    pub fn new() -> Result<Self, DistanceError> {
        let penalties = (0..10).rev().map(|i| i as f64 / 90.0).collect();
        Self::with_params(DEFAULT_STIFFNESS.to_vec(), penalties)
    }

    /// Create the family from explicit stiffness values and penalties,
    /// penalties strictest (largest) first.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if either list is empty or the penalties
    /// are not descending.
    pub fn with_params(stiffness: Vec<f64>, penalties: Vec<f64>) -> Result<Self, DistanceError> {
        check_axis("TWE lambda", &penalties, false)?;
        let grid = ParameterGrid::new(stiffness.len(), penalties.len())?;
        Ok(Self {
            grid,
            stiffness,
            penalties,
        })
    }

    /// Return `(nu, lambda)` at `id`.
    #[must_use]
    pub fn params(&self, id: usize) -> (f64, f64) {
        self.grid.check(id);
        (self.stiffness[self.grid.group_of(id)], self.penalties[self.grid.step_of(id)])
    }
}

/// Sample `i` of a zero-prefixed series.
#[inline]
fn padded(series: &[f64], i: usize) -> f64 {
    if i == 0 { 0.0 } else { series[i - 1] }
}

#[inline]
fn match_cost(query: &[f64], reference: &[f64], i: usize, j: usize, nu: f64) -> f64 {
    (padded(query, i) - padded(reference, j)).abs()
        + (padded(query, i - 1) - padded(reference, j - 1)).abs()
        + nu * (2 * i.abs_diff(j)) as f64
}

#[inline]
fn delete_cost(series: &[f64], i: usize, nu: f64, lambda: f64) -> f64 {
    (padded(series, i) - padded(series, i - 1)).abs() + nu + lambda
}

impl DistanceFamily for TweFamily {
    fn kind(&self) -> FamilyKind {
        FamilyKind::Twe
    }

    fn grid(&self) -> ParameterGrid {
        self.grid
    }

    fn describe(&self, id: usize) -> ParameterValue {
        let (nu, lambda) = self.params(id);
        ParameterValue::StiffnessPenalty { nu, lambda }
    }

    fn bound_stages(&self) -> &'static [BoundStage] {
        &[]
    }

    fn upper_bound(&self, query: &[f64], reference: &[f64], id: usize) -> f64 {
        if query.len() != reference.len() {
            return f64::INFINITY;
        }
        let (nu, _) = self.params(id);
        (1..=query.len()).fold(0.0, |acc, i| acc + match_cost(query, reference, i, i, nu))
    }

    fn align(&self, query: &[f64], reference: &[f64], id: usize, cutoff: f64) -> Alignment {
        let (nu, lambda) = self.params(id);
        let n = query.len();
        let m = reference.len();

        let mut prev = vec![Cell::UNREACHABLE; m + 1];
        let mut curr = vec![Cell::UNREACHABLE; m + 1];

        for i in 0..=n {
            let mut row_min = f64::INFINITY;
            for j in 0..=m {
                let cell = match (i, j) {
                    (0, 0) => Cell::ORIGIN,
                    (_, 0) => prev[0].count(delete_cost(query, i, nu, lambda), true),
                    (0, _) => curr[j - 1].count(delete_cost(reference, j, nu, lambda), true),
                    _ => Cell::cheapest(
                        prev[j - 1].count(match_cost(query, reference, i, j, nu), false),
                        prev[j].count(delete_cost(query, i, nu, lambda), true),
                        curr[j - 1].count(delete_cost(reference, j, nu, lambda), true),
                    ),
                };
                curr[j] = cell;
                row_min = row_min.min(cell.cost);
            }

            if i < n && row_min > cutoff {
                return Alignment::Abandoned { lower_bound: row_min };
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        let last = prev[m];
        Alignment::Complete {
            distance: last.cost,
            floor: if last.summary == 0 { self.grid.group_start(id) } else { id },
        }
    }
}
