//! Move-split-merge distance.

use super::cell::Cell;
use super::{Alignment, BoundStage, DistanceFamily, FamilyKind, check_axis};
use crate::error::DistanceError;
use crate::grid::{ParameterGrid, ParameterValue};

/// MSM over split/merge costs ordered from the largest (strictest) to the
/// smallest.
///
/// A move costs `|a_i - b_j|`. Splitting or merging a value costs `c` when the
/// new value lies between its two neighbours and `c` plus the distance to
/// the nearer neighbour otherwise.
#[derive(Debug, Clone)]
pub struct MsmFamily {
    grid: ParameterGrid,
    costs: Vec<f64>,
}

impl MsmFamily {
    /// Create the default 100-cost family: 0.01 followed by evenly spaced
    /// costs through the decades starting at 0.01, 0.1, 1 and 10, up to 96.4.
    ///
    /// # Errors
    ///
    /// Never fails for the default costs.
    pub fn new() -> Result<Self, DistanceError> {
        let mut costs: Vec<f64> = std::iter::once(0.01)
            .chain([0.01, 0.1, 1.0, 10.0].into_iter().flat_map(|start| {
                let step = start * 9.0 / 25.0;
                (1..=25).map(move |k| start + k as f64 * step)
            }))
            .take(100)
            .collect();
        costs.reverse();
        Self::with_costs(costs)
    }

    /// Create the family from explicit costs, strictest (largest) first.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if `costs` is empty, not descending, or
    /// holds a negative value.
    pub fn with_costs(costs: Vec<f64>) -> Result<Self, DistanceError> {
        check_axis("MSM cost", &costs, false)?;
        if let Some(&c) = costs.iter().find(|&&c| !(c >= 0.0 && c.is_finite())) {
            return Err(DistanceError::InvalidGrid {
                reason: format!("MSM costs must be finite and non-negative, got {c}"),
            });
        }
        let grid = ParameterGrid::new(1, costs.len())?;
        Ok(Self { grid, costs })
    }

    /// Return the split/merge cost at `id`.
    #[must_use]
    pub fn cost(&self, id: usize) -> f64 {
        self.grid.check(id);
        self.costs[id]
    }
}

/// Cost of inserting `new` next to `x` when the other side is `y`.
fn split_merge(new: f64, x: f64, y: f64, c: f64) -> f64 {
    if (x <= new && new <= y) || (y <= new && new <= x) {
        c
    } else {
        c + (new - x).abs().min((new - y).abs())
    }
}

impl DistanceFamily for MsmFamily {
    fn kind(&self) -> FamilyKind {
        FamilyKind::Msm
    }

    fn grid(&self) -> ParameterGrid {
        self.grid
    }

    fn describe(&self, id: usize) -> ParameterValue {
        ParameterValue::Cost { cost: self.cost(id) }
    }

    fn bound_stages(&self) -> &'static [BoundStage] {
        &[BoundStage::Kim]
    }

    fn kim_bound(&self, query: &[f64], reference: &[f64], _id: usize) -> f64 {
        (query[0] - reference[0]).abs()
    }

    fn upper_bound(&self, query: &[f64], reference: &[f64], _id: usize) -> f64 {
        if query.len() != reference.len() {
            return f64::INFINITY;
        }
        query
            .iter()
            .zip(reference)
            .fold(0.0, |acc, (&q, &r)| acc + (q - r).abs())
    }

    fn align(&self, query: &[f64], reference: &[f64], id: usize, cutoff: f64) -> Alignment {
        let c = self.cost(id);
        let n = query.len();
        let m = reference.len();

        let mut prev = vec![Cell::UNREACHABLE; m];
        let mut curr = vec![Cell::UNREACHABLE; m];

        for i in 0..n {
            let a = query[i];
            let mut row_min = f64::INFINITY;
            for j in 0..m {
                let b = reference[j];
                let cell = match (i, j) {
                    (0, 0) => Cell::ORIGIN.count((a - b).abs(), false),
                    (_, 0) => prev[0].count(split_merge(a, query[i - 1], b, c), true),
                    (0, _) => curr[j - 1].count(split_merge(b, a, reference[j - 1], c), true),
                    _ => Cell::cheapest(
                        prev[j - 1].count((a - b).abs(), false),
                        prev[j].count(split_merge(a, query[i - 1], b, c), true),
                        curr[j - 1].count(split_merge(b, a, reference[j - 1], c), true),
                    ),
                };
                curr[j] = cell;
                row_min = row_min.min(cell.cost);
            }

            if i + 1 < n && row_min > cutoff {
                return Alignment::Abandoned { lower_bound: row_min };
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        let last = prev[m - 1];
        Alignment::Complete {
            distance: last.cost,
            floor: if last.summary == 0 { self.grid.group_start(id) } else { id },
        }
    }
}
