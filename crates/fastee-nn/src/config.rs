//! Configuration for the parameter sweep.

use serde::Serialize;

/// Order in which challengers are assessed at one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengerOrder {
    /// Closest challengers first by their own nearest-neighbour distance,
    /// then by the lower bound already known for the pair (default).
    #[default]
    OwnNeighborDistance,
    /// Smallest known lower bound first, then own nearest-neighbour distance.
    LowerBound,
}

/// Configuration for [`ParameterSweep`](crate::ParameterSweep).
///
/// None of the options change the resulting table, only how much work is
/// needed to build it.
///
/// # Defaults
///
/// | Parameter             | Default                                  |
/// |-----------------------|------------------------------------------|
/// | `challenger_order`    | `ChallengerOrder::OwnNeighborDistance`   |
/// | `upper_bound_seeding` | true                                     |
/// | `neighbor_first`      | true                                     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepConfig {
    pub(crate) challenger_order: ChallengerOrder,
    pub(crate) upper_bound_seeding: bool,
    pub(crate) neighbor_first: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepConfig {
    /// Create a configuration with the defaults above.
    #[must_use]
    pub fn new() -> Self {
        Self {
            challenger_order: ChallengerOrder::OwnNeighborDistance,
            upper_bound_seeding: true,
            neighbor_first: true,
        }
    }

    /// Set the order in which challengers are assessed.
    #[must_use]
    pub fn with_challenger_order(mut self, challenger_order: ChallengerOrder) -> Self {
        self.challenger_order = challenger_order;
        self
    }

    /// Seed the score to beat with the smallest upper bound over all
    /// challengers before the scan.
    #[must_use]
    pub fn with_upper_bound_seeding(mut self, upper_bound_seeding: bool) -> Self {
        self.upper_bound_seeding = upper_bound_seeding;
        self
    }

    /// Assess the neighbour found at the adjacent looser parameter first.
    #[must_use]
    pub fn with_neighbor_first(mut self, neighbor_first: bool) -> Self {
        self.neighbor_first = neighbor_first;
        self
    }

    /// Return the challenger order.
    #[must_use]
    pub fn challenger_order(&self) -> ChallengerOrder {
        self.challenger_order
    }

    /// Return whether upper-bound seeding is enabled.
    #[must_use]
    pub fn upper_bound_seeding(&self) -> bool {
        self.upper_bound_seeding
    }

    /// Return whether the previous neighbour is assessed first.
    #[must_use]
    pub fn neighbor_first(&self) -> bool {
        self.neighbor_first
    }
}
