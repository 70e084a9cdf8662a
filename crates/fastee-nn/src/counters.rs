//! Diagnostic counters threaded through a table build.

use std::ops::AddAssign;

use serde::Serialize;

/// How often each pruning stage fired and how much work was done.
///
/// Passed by `&mut` through the assessor and the sweep; never global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchCounters {
    /// Pairs pruned by the endpoint bound.
    pub kim_prunes: u64,
    /// Pairs pruned while scanning the query against the reference envelope.
    pub query_envelope_prunes: u64,
    /// Pairs pruned while scanning the reference against the query envelope.
    pub reference_envelope_prunes: u64,
    /// Pairs pruned by a bound or abandonment carried over from an earlier call.
    pub known_bound_prunes: u64,
    /// Full alignments abandoned before the last row.
    pub early_abandons: u64,
    /// Full alignments that ran to completion.
    pub full_distances: u64,
    /// Exact distances answered from a still-valid earlier alignment.
    pub exact_reuses: u64,
    /// Upper bounds computed (cached ones are not counted).
    pub upper_bounds: u64,
    /// Slots filled by copying a result down to its validity floor.
    pub propagated_slots: u64,
}

impl SearchCounters {
    /// Total number of pairs rejected without a completed alignment.
    #[must_use]
    pub fn prunes(&self) -> u64 {
        self.kim_prunes
            + self.query_envelope_prunes
            + self.reference_envelope_prunes
            + self.known_bound_prunes
            + self.early_abandons
    }
}

impl AddAssign for SearchCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.kim_prunes += rhs.kim_prunes;
        self.query_envelope_prunes += rhs.query_envelope_prunes;
        self.reference_envelope_prunes += rhs.reference_envelope_prunes;
        self.known_bound_prunes += rhs.known_bound_prunes;
        self.early_abandons += rhs.early_abandons;
        self.full_distances += rhs.full_distances;
        self.exact_reuses += rhs.exact_reuses;
        self.upper_bounds += rhs.upper_bounds;
        self.propagated_slots += rhs.propagated_slots;
    }
}
