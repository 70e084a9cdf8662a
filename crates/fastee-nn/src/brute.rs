//! Brute-force leave-one-out table.

use fastee_distance::{DistanceFamily, DistanceMatrix, EnvelopeCache, SeriesCollection};
use tracing::{debug, instrument, warn};

use crate::counters::SearchCounters;
use crate::strategy::TrainingStrategy;
use crate::table::NeighborTable;

/// Computes every pairwise distance at every parameter id.
///
/// Pairwise matrices are computed in parallel. Each slot is exact at its own
/// id only, so validity floors equal the id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BruteForceLoocv;

impl TrainingStrategy for BruteForceLoocv {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    #[instrument(skip_all, fields(family = %family.kind(), n = collection.len()))]
    fn build_table<F: DistanceFamily + ?Sized>(
        &self,
        family: &F,
        collection: &SeriesCollection,
        _cache: &EnvelopeCache,
        counters: &mut SearchCounters,
    ) -> NeighborTable {
        let n = collection.len();
        let n_params = family.grid().len();
        let mut table = NeighborTable::new(n_params, n, collection.n_classes());
        if n < 2 {
            warn!(n_series = n, "leave-one-out needs at least two series, table left unresolved");
            return table;
        }

        for param in 0..n_params {
            let matrix = DistanceMatrix::compute(family, collection.all_series(), param);
            counters.full_distances += (n * (n - 1) / 2) as u64;
            for i in 0..n {
                let slot = table.slot_mut(param, i);
                for j in (0..n).filter(|&j| j != i) {
                    slot.offer(j, collection.label(j), matrix.get(i, j).value(), param);
                }
                slot.confirm();
            }
            debug!(param, "filled parameter row");
        }
        table
    }
}
