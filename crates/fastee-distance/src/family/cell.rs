//! Dynamic-programming cell shared by the minimizing families.

/// Accumulated cost of a cell plus a summary of the cheapest path reaching it.
///
/// The summary is either the largest `|i - j|` along the path or the number of
/// penalized operations on it, depending on the family. Among equally cheap
/// predecessors the smaller summary wins, which yields the loosest validity
/// floor an optimal path can justify.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cell {
    pub(crate) cost: f64,
    pub(crate) summary: usize,
}

impl Cell {
    pub(crate) const ORIGIN: Self = Self {
        cost: 0.0,
        summary: 0,
    };

    pub(crate) const UNREACHABLE: Self = Self {
        cost: f64::INFINITY,
        summary: 0,
    };

    /// Extend the path with a step of `cost` at diagonal deviation `deviation`.
    #[inline]
    pub(crate) fn widen(self, cost: f64, deviation: usize) -> Self {
        Self {
            cost: self.cost + cost,
            summary: self.summary.max(deviation),
        }
    }

    /// Extend the path with a step of `cost`, counting it if `penalized`.
    #[inline]
    pub(crate) fn count(self, cost: f64, penalized: bool) -> Self {
        Self {
            cost: self.cost + cost,
            summary: self.summary + usize::from(penalized),
        }
    }

    #[inline]
    fn beats(&self, other: &Self) -> bool {
        self.cost < other.cost || (self.cost == other.cost && self.summary < other.summary)
    }

    /// Return the cheapest of three candidates.
    #[inline]
    pub(crate) fn cheapest(diag: Self, above: Self, left: Self) -> Self {
        let mut best = diag;
        if above.beats(&best) {
            best = above;
        }
        if left.beats(&best) {
            best = left;
        }
        best
    }
}

#[inline]
pub(crate) fn squared(x: f64) -> f64 {
    x * x
}
