//! Leave-one-out nearest-neighbour parameter search over elastic distances.
//!
//! Builds, for every parameter id of a [`DistanceFamily`](fastee_distance::DistanceFamily),
//! the exact nearest neighbours of every training series, then picks the
//! parameter with the best leave-one-out accuracy. The default
//! [`ParameterSweep`] reaches the brute-force table while skipping most full
//! alignments: staged lower bounds with early abandonment, results copied
//! down to their validity floor, and pair state resumed across parameters.

mod assessor;
mod brute;
mod candidate;
mod classifier;
mod config;
mod confusion;
mod counters;
mod error;
mod selector;
mod strategy;
mod sweep;
mod table;

pub use assessor::{
    AssessState, BOUND_TOLERANCE, ExactDistance, PairAssessor, PairContext, Stage, Verdict, advance,
};
pub use brute::BruteForceLoocv;
pub use candidate::{CandidateSlot, SlotStatus, VoteTally};
pub use classifier::{ElasticNn, Evaluation, TrainingReport};
pub use config::{ChallengerOrder, SweepConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use counters::SearchCounters;
pub use error::NnError;
pub use selector::ParameterSelection;
pub use strategy::{Strategy, TrainingStrategy};
pub use sweep::ParameterSweep;
pub use table::NeighborTable;
