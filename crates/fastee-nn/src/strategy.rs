//! Training strategies that fill a nearest-neighbour table.

use fastee_distance::{DistanceFamily, EnvelopeCache, SeriesCollection};

use crate::brute::BruteForceLoocv;
use crate::counters::SearchCounters;
use crate::sweep::ParameterSweep;
use crate::table::NeighborTable;

/// Builds the leave-one-out nearest-neighbour table of a collection for every
/// parameter id of a family.
///
/// Every strategy produces the same distances and tied neighbour sets; they
/// differ only in the work needed.
pub trait TrainingStrategy {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Build the table. A collection of fewer than two series yields a table
    /// of unresolved slots.
    fn build_table<F: DistanceFamily + ?Sized>(
        &self,
        family: &F,
        collection: &SeriesCollection,
        cache: &EnvelopeCache,
        counters: &mut SearchCounters,
    ) -> NeighborTable;
}

/// A strategy chosen at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Pruning-driven incremental sweep.
    Sweep(ParameterSweep),
    /// Full pairwise matrices at every parameter.
    BruteForce(BruteForceLoocv),
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Sweep(ParameterSweep::default())
    }
}

impl TrainingStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Self::Sweep(s) => s.name(),
            Self::BruteForce(s) => s.name(),
        }
    }

    fn build_table<F: DistanceFamily + ?Sized>(
        &self,
        family: &F,
        collection: &SeriesCollection,
        cache: &EnvelopeCache,
        counters: &mut SearchCounters,
    ) -> NeighborTable {
        match self {
            Self::Sweep(s) => s.build_table(family, collection, cache, counters),
            Self::BruteForce(s) => s.build_table(family, collection, cache, counters),
        }
    }
}
