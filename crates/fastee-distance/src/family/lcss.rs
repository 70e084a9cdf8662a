//! Longest common subsequence distance.

use tracing::debug;

use super::{
    Alignment, BoundStage, DistanceFamily, FamilyKind, check_axis, fractional_bands, scaled_thresholds,
};
use crate::collection::SeriesCollection;
use crate::constraint::BandConstraint;
use crate::error::DistanceError;
use crate::grid::{ParameterGrid, ParameterValue, window_floor};

/// LCSS over value tolerances epsilon (groups) times index tolerances delta
/// (steps).
///
/// `a_i` and `b_j` match when `|a_i - b_j| <= epsilon` and `|i - j| <= delta`.
/// The distance is `1 - lcss / min(n, m)`.
#[derive(Debug, Clone)]
pub struct LcssFamily {
    grid: ParameterGrid,
    epsilons: Vec<f64>,
    deltas: Vec<usize>,
}

/// Best subsequence of a prefix pair: its length and the largest `|i - j|`
/// among its matched pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Subsequence {
    len: usize,
    deviation: usize,
}

impl Subsequence {
    fn longer(self, other: Self) -> Self {
        if other.len > self.len || (other.len == self.len && other.deviation < self.deviation) {
            other
        } else {
            self
        }
    }
}

impl LcssFamily {
    /// Create the family from explicit epsilon and delta lists.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if either list is empty or `deltas` is
    /// not ascending.
    pub fn new(epsilons: Vec<f64>, deltas: Vec<usize>) -> Result<Self, DistanceError> {
        check_axis("LCSS delta", &deltas, true)?;
        let grid = ParameterGrid::new(epsilons.len(), deltas.len())?;
        Ok(Self {
            grid,
            epsilons,
            deltas,
        })
    }

    /// Create the default 10 x 10 grid scaled by the pooled standard
    /// deviation and the longest series.
    ///
    /// # Errors
    ///
    /// Never fails for a valid collection.
    pub fn from_collection(collection: &SeriesCollection) -> Result<Self, DistanceError> {
        let (_, std) = collection.pooled_stats();
        let epsilons = scaled_thresholds(std, 10);
        let deltas = fractional_bands(collection.max_len(), 0.25, 10);
        debug!(std, max_delta = deltas[deltas.len() - 1], "built LCSS grid");
        Self::new(epsilons, deltas)
    }

    /// Return `(epsilon, delta)` at `id`.
    #[must_use]
    pub fn params(&self, id: usize) -> (f64, usize) {
        self.grid.check(id);
        (self.epsilons[self.grid.group_of(id)], self.deltas[self.grid.step_of(id)])
    }
}

fn to_distance(matches: usize, n: usize, m: usize) -> f64 {
    1.0 - matches as f64 / n.min(m) as f64
}

impl DistanceFamily for LcssFamily {
    fn kind(&self) -> FamilyKind {
        FamilyKind::Lcss
    }

    fn grid(&self) -> ParameterGrid {
        self.grid
    }

    fn describe(&self, id: usize) -> ParameterValue {
        let (epsilon, delta) = self.params(id);
        ParameterValue::EpsilonDelta { epsilon, delta }
    }

    fn bound_stages(&self) -> &'static [BoundStage] {
        &[BoundStage::QueryEnvelope, BoundStage::ReferenceEnvelope]
    }

    fn envelope_window(&self, id: usize) -> BandConstraint {
        BandConstraint::SakoeChibaRadius(self.params(id).1)
    }

    // A sample farther than epsilon from the whole window can never match.
    fn envelope_term(&self, value: f64, lower: f64, upper: f64, id: usize) -> f64 {
        let epsilon = self.params(id).0;
        if value > upper + epsilon || value < lower - epsilon {
            1.0
        } else {
            0.0
        }
    }

    fn bound_from_partial(&self, partial: f64, len: usize) -> f64 {
        partial / len as f64
    }

    fn upper_bound(&self, query: &[f64], reference: &[f64], id: usize) -> f64 {
        let epsilon = self.params(id).0;
        let matches = query
            .iter()
            .zip(reference)
            .filter(|&(&q, &r)| (q - r).abs() <= epsilon)
            .count();
        to_distance(matches, query.len(), reference.len())
    }

    fn upper_bound_key(&self, id: usize) -> usize {
        self.grid.group_of(id)
    }

    fn align(&self, query: &[f64], reference: &[f64], id: usize, cutoff: f64) -> Alignment {
        let (epsilon, delta) = self.params(id);
        let n = query.len();
        let m = reference.len();
        let shortest = n.min(m);

        let mut prev = vec![Subsequence::default(); m + 1];
        let mut curr = vec![Subsequence::default(); m + 1];

        for i in 1..=n {
            curr[0] = Subsequence::default();
            let mut row_best = 0;
            for j in 1..=m {
                let mut best = prev[j].longer(curr[j - 1]);
                let deviation = i.abs_diff(j);
                if deviation <= delta && (query[i - 1] - reference[j - 1]).abs() <= epsilon {
                    let diag = prev[j - 1];
                    best = best.longer(Subsequence {
                        len: diag.len + 1,
                        deviation: diag.deviation.max(deviation),
                    });
                }
                curr[j] = best;
                row_best = row_best.max(best.len);
            }

            // Each remaining row adds at most one match.
            if i < n {
                let reachable = (row_best + (n - i)).min(shortest);
                let lower_bound = to_distance(reachable, n, m);
                if lower_bound > cutoff {
                    return Alignment::Abandoned { lower_bound };
                }
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        let last = prev[m];
        Alignment::Complete {
            distance: to_distance(last.len, n, m),
            floor: window_floor(self.grid.group_start(id), &self.deltas, last.deviation),
        }
    }
}
