//! Weighted DTW: warping cost scaled by a logistic penalty on `|i - j|`.

use super::cell::squared;
use super::dtw::{diagonal_cost, endpoint_cost, warp};
use super::{Alignment, BoundStage, DistanceFamily, FamilyKind};
use crate::collection::SeriesCollection;
use crate::constraint::BandConstraint;
use crate::envelope::interval_gap;
use crate::error::DistanceError;
use crate::grid::{ParameterGrid, ParameterValue};

const DEFAULT_WEIGHTS: usize = 100;

/// WDTW over penalty steepness `g = k / 100` for `k` in `0..100`.
///
/// The cost of matching `i` with `j` is `w(|i - j|) * (a_i - b_j)^2` with
/// `w(k) = 1 / (1 + exp(-g * (k - L / 2)))`, `L` the longest series length.
/// The weight is not monotone in `g` across pairs, so every id is its own
/// group.
#[derive(Debug, Clone)]
pub struct WdtwFamily {
    grid: ParameterGrid,
    steepness: Vec<f64>,
    half_len: f64,
    weights: Vec<Vec<f64>>,
}

impl WdtwFamily {
    /// Create the family for series of length up to `max_len` with the given
    /// steepness values.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if `steepness` is empty or negative.
    pub fn new(max_len: usize, steepness: Vec<f64>) -> Result<Self, DistanceError> {
        if let Some(&g) = steepness.iter().find(|&&g| !(g >= 0.0 && g.is_finite())) {
            return Err(DistanceError::InvalidGrid {
                reason: format!("WDTW steepness must be finite and non-negative, got {g}"),
            });
        }
        let grid = ParameterGrid::new(steepness.len(), 1)?;
        let half_len = max_len as f64 / 2.0;
        let weights = steepness
            .iter()
            .map(|&g| (0..max_len).map(|gap| logistic(g, gap, half_len)).collect())
            .collect();
        Ok(Self {
            grid,
            steepness,
            half_len,
            weights,
        })
    }

    /// Create the default 100-value family for a collection.
    ///
    /// # Errors
    ///
    /// Never fails for the default grid; kept fallible to match the other
    /// constructors.
    pub fn from_collection(collection: &SeriesCollection) -> Result<Self, DistanceError> {
        let steepness = (0..DEFAULT_WEIGHTS).map(|k| k as f64 / 100.0).collect();
        Self::new(collection.max_len(), steepness)
    }

    /// Return the penalty weight at `id` for a warping distance of `gap`.
    #[must_use]
    pub fn weight(&self, id: usize, gap: usize) -> f64 {
        match self.weights[id].get(gap) {
            Some(&w) => w,
            None => logistic(self.steepness[id], gap, self.half_len),
        }
    }
}

fn logistic(g: f64, gap: usize, half_len: f64) -> f64 {
    1.0 / (1.0 + (-g * (gap as f64 - half_len)).exp())
}

impl DistanceFamily for WdtwFamily {
    fn kind(&self) -> FamilyKind {
        FamilyKind::Wdtw
    }

    fn grid(&self) -> ParameterGrid {
        self.grid
    }

    fn describe(&self, id: usize) -> ParameterValue {
        self.grid.check(id);
        ParameterValue::Weight {
            g: self.steepness[id],
        }
    }

    fn bound_stages(&self) -> &'static [BoundStage] {
        &[BoundStage::Kim, BoundStage::QueryEnvelope, BoundStage::ReferenceEnvelope]
    }

    fn kim_bound(&self, query: &[f64], reference: &[f64], id: usize) -> f64 {
        self.weight(id, 0) * endpoint_cost(query, reference)
    }

    // Any sample may be matched anywhere, so the envelope is the global one
    // and every term is scaled by the smallest weight.
    fn envelope_window(&self, _id: usize) -> BandConstraint {
        BandConstraint::Unconstrained
    }

    fn envelope_term(&self, value: f64, lower: f64, upper: f64, id: usize) -> f64 {
        self.weight(id, 0) * squared(interval_gap(value, lower, upper))
    }

    fn upper_bound(&self, query: &[f64], reference: &[f64], id: usize) -> f64 {
        diagonal_cost(query, reference, |gap| self.weight(id, gap))
    }

    fn upper_bound_key(&self, id: usize) -> usize {
        id
    }

    fn align(&self, query: &[f64], reference: &[f64], id: usize, cutoff: f64) -> Alignment {
        self.grid.check(id);
        let cost = |i: usize, j: usize| self.weight(id, i.abs_diff(j)) * squared(query[i] - reference[j]);
        match warp(query, reference, BandConstraint::Unconstrained, cutoff, cost) {
            Err(lower_bound) => Alignment::Abandoned { lower_bound },
            Ok(cell) => Alignment::Complete {
                distance: cell.cost,
                floor: id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::family::dtw::DtwFamily;

    fn default_family(len: usize) -> WdtwFamily {
        WdtwFamily::new(len, (0..DEFAULT_WEIGHTS).map(|k| k as f64 / 100.0).collect()).unwrap()
    }

    fn distance(family: &impl DistanceFamily, a: &[f64], b: &[f64], id: usize) -> f64 {
        match family.align(a, b, id, f64::INFINITY) {
            Alignment::Complete { distance, .. } => distance,
            Alignment::Abandoned { .. } => panic!("unbounded alignment abandoned"),
        }
    }

    #[test]
    fn zero_steepness_is_half_dtw() {
        let a = [0.0, 2.0, 1.0, 3.0];
        let b = [1.0, 0.0, 2.5, 1.0];
        let wdtw = WdtwFamily::new(4, vec![0.0]).unwrap();
        let dtw = DtwFamily::new(4, 1).unwrap();
        let weighted = distance(&wdtw, &a, &b, 0);
        let plain = distance(&dtw, &a, &b, 0);
        assert!((weighted - 0.5 * plain).abs() < 1e-12, "{weighted} vs {plain}");
    }

    #[test]
    fn weights_increase_with_gap() {
        let family = WdtwFamily::new(10, vec![0.0, 0.5]).unwrap();
        assert_eq!(family.weight(0, 0), 0.5);
        for gap in 1..15 {
            assert!(family.weight(1, gap) > family.weight(1, gap - 1));
        }
    }

    #[test]
    fn every_id_is_its_own_floor() {
        let family = WdtwFamily::new(3, vec![0.1, 0.2, 0.3]).unwrap();
        for id in 0..3 {
            assert!(matches!(
                family.align(&[0.0, 1.0, 0.0], &[1.0, 0.0, 0.0], id, f64::INFINITY),
                Alignment::Complete { floor, .. } if floor == id
            ));
        }
        assert!(!family.grid().is_monotone());
    }

    #[test]
    fn bounds_sandwich_distance() {
        let a = [1.0, 3.0, 2.0, 5.0, 4.0];
        let b = [2.0, 1.0, 4.0, 3.0, 6.0];
        let family = default_family(5);
        for id in [0, 10, 50, 99] {
            let d = distance(&family, &a, &b, id);
            assert!(family.kim_bound(&a, &b, id) <= d + 1e-12);
            assert!(family.upper_bound(&a, &b, id) >= d);
        }
    }

    #[test]
    fn rejects_negative_steepness() {
        assert!(WdtwFamily::new(4, vec![-0.1]).is_err());
        assert!(WdtwFamily::new(4, vec![]).is_err());
    }
}
