//! Nearest-neighbour table over every parameter id.

use crate::candidate::{CandidateSlot, SlotStatus};

/// `n_params x n_series` candidate slots, stored parameter-major.
///
/// Allocated once per training call, mutated only by a training strategy
/// and read by the parameter selector.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborTable {
    n_params: usize,
    n_series: usize,
    slots: Vec<CandidateSlot>,
}

impl NeighborTable {
    /// Create a table of unresolved slots.
    #[must_use]
    pub fn new(n_params: usize, n_series: usize, n_classes: usize) -> Self {
        Self {
            n_params,
            n_series,
            slots: vec![CandidateSlot::new(n_classes); n_params * n_series],
        }
    }

    /// Return the number of parameter ids.
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.n_params
    }

    /// Return the number of series.
    #[must_use]
    pub fn n_series(&self) -> usize {
        self.n_series
    }

    /// Return the slot of `series` at `param`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[must_use]
    pub fn slot(&self, param: usize, series: usize) -> &CandidateSlot {
        &self.slots[self.index(param, series)]
    }

    /// Return the slot of `series` at `param` for modification.
    pub fn slot_mut(&mut self, param: usize, series: usize) -> &mut CandidateSlot {
        let index = self.index(param, series);
        &mut self.slots[index]
    }

    /// Return every slot at `param`, indexed by series.
    #[must_use]
    pub fn row(&self, param: usize) -> &[CandidateSlot] {
        assert!(param < self.n_params, "parameter {param} out of range for {} ids", self.n_params);
        &self.slots[param * self.n_series..(param + 1) * self.n_series]
    }

    /// Return true if every slot is confirmed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(CandidateSlot::is_confirmed)
    }

    /// Return the number of slots in `status`.
    #[must_use]
    pub fn count_status(&self, status: SlotStatus) -> usize {
        self.slots.iter().filter(|s| s.status() == status).count()
    }

    /// Copy the slot of `series` at `from` into `to`.
    pub(crate) fn copy_slot(&mut self, series: usize, from: usize, to: usize) {
        let source = self.slot(from, series).clone();
        *self.slot_mut(to, series) = source;
    }

    fn index(&self, param: usize, series: usize) -> usize {
        assert!(param < self.n_params, "parameter {param} out of range for {} ids", self.n_params);
        assert!(series < self.n_series, "series {series} out of range for {} series", self.n_series);
        param * self.n_series + series
    }
}
