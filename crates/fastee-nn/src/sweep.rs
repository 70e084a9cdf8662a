//! Incremental, pruning-driven construction of the nearest-neighbour table.
//!
//! Series are inserted one at a time. While series `current` is inserted it
//! is compared with every earlier series, once for its own slot and once,
//! reciprocally, for the earlier series' slot. Parameters are visited from
//! the highest id down, so every group runs from its loosest value to its
//! strictest, and a resolved slot is copied down to its validity floor
//! without any further distance computation.

use fastee_distance::{DistanceFamily, EnvelopeCache, ParameterGrid, SeriesCollection};
use tracing::{debug, info, instrument, warn};

use crate::assessor::{PairAssessor, PairContext, Verdict};
use crate::config::{ChallengerOrder, SweepConfig};
use crate::counters::SearchCounters;
use crate::strategy::TrainingStrategy;
use crate::table::NeighborTable;

/// The loosest-first sweep driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterSweep {
    config: SweepConfig,
}

/// Per-insertion-round state: one assessor and one context per earlier series.
struct Round<'a, F: ?Sized> {
    current: usize,
    contexts: Vec<PairContext<'a, F>>,
    assessors: Vec<PairAssessor>,
}

impl ParameterSweep {
    /// Create a sweep with `config`.
    #[must_use]
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Return the sweep configuration.
    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Earlier series in the order they are assessed at `param`.
    fn challenger_order<F: ?Sized>(
        &self,
        table: &NeighborTable,
        round: &Round<'_, F>,
        grid: ParameterGrid,
        param: usize,
    ) -> Vec<usize> {
        let keys: Vec<(f64, f64)> = round
            .assessors
            .iter()
            .enumerate()
            .map(|(prev, assessor)| {
                (table.slot(param, prev).distance(), assessor.lower_bound_at(grid, param))
            })
            .collect();

        let mut order: Vec<usize> = (0..round.current).collect();
        match self.config.challenger_order {
            ChallengerOrder::OwnNeighborDistance => order.sort_by(|&a, &b| {
                keys[a].0.total_cmp(&keys[b].0).then(keys[a].1.total_cmp(&keys[b].1)).then(a.cmp(&b))
            }),
            ChallengerOrder::LowerBound => order.sort_by(|&a, &b| {
                keys[a].1.total_cmp(&keys[b].1).then(keys[a].0.total_cmp(&keys[b].0)).then(a.cmp(&b))
            }),
        }

        if self.config.neighbor_first {
            let previous = grid
                .looser(param)
                .and_then(|looser| table.slot(looser, round.current).neighbor());
            if let Some(pos) = previous.and_then(|nb| order.iter().position(|&j| j == nb)) {
                let nb = order.remove(pos);
                order.insert(0, nb);
            }
        }
        order
    }

    /// Resolve the slot of `round.current` at `param` against every earlier
    /// series, updating their slots reciprocally.
    fn resolve<F: DistanceFamily + ?Sized>(
        &self,
        table: &mut NeighborTable,
        round: &mut Round<'_, F>,
        collection: &SeriesCollection,
        grid: ParameterGrid,
        param: usize,
        counters: &mut SearchCounters,
    ) {
        let current = round.current;
        let order = self.challenger_order(table, round, grid, param);
        let confirmed = table.slot(param, current).is_confirmed();

        let mut seed = f64::INFINITY;
        if !confirmed && self.config.upper_bound_seeding {
            for &prev in &order {
                let bound = round.assessors[prev].upper_bound(&round.contexts[prev], param, counters);
                seed = seed.min(bound);
            }
        }

        for &prev in &order {
            let ctx = &round.contexts[prev];
            let assessor = &mut round.assessors[prev];
            let reciprocal = table.slot(param, prev).distance();

            // Aligning up to the reciprocal score lets the second question
            // reuse the first alignment, so each pair aligns at most once per id.
            if !confirmed {
                let score = seed.min(table.slot(param, current).distance());
                let verdict = assessor.try_to_beat_aligning_to(ctx, score, reciprocal, param, counters);
                if verdict == Verdict::NewBest {
                    offer(table, assessor, param, current, prev, collection.label(prev));
                }
            }

            if assessor.try_to_beat(ctx, reciprocal, param, counters) == Verdict::NewBest {
                offer(table, assessor, param, prev, current, collection.label(current));
            }
        }

        if !confirmed {
            table.slot_mut(param, current).confirm();
            propagate(table, grid, current, param, counters);
        }
    }
}

/// Offer the exact distance held by `assessor` to the slot of `owner`.
fn offer(
    table: &mut NeighborTable,
    assessor: &PairAssessor,
    param: usize,
    owner: usize,
    neighbor: usize,
    class: usize,
) {
    if let (Some(distance), Some(floor)) = (assessor.distance(), assessor.validity_floor()) {
        table.slot_mut(param, owner).offer(neighbor, class, distance, floor);
    }
}

/// Copy the confirmed slot of `series` at `param` to every stricter id of its
/// group down to the slot's validity floor.
fn propagate(
    table: &mut NeighborTable,
    grid: ParameterGrid,
    series: usize,
    param: usize,
    counters: &mut SearchCounters,
) {
    if !grid.is_monotone() {
        return;
    }
    let floor = table.slot(param, series).validity_floor().max(grid.group_start(param));
    for id in floor..param {
        table.copy_slot(series, param, id);
        counters.propagated_slots += 1;
    }
}

impl TrainingStrategy for ParameterSweep {
    fn name(&self) -> &'static str {
        "sweep"
    }

    #[instrument(skip_all, fields(family = %family.kind(), n = collection.len()))]
    fn build_table<F: DistanceFamily + ?Sized>(
        &self,
        family: &F,
        collection: &SeriesCollection,
        cache: &EnvelopeCache,
        counters: &mut SearchCounters,
    ) -> NeighborTable {
        let grid = family.grid();
        let n = collection.len();
        let mut table = NeighborTable::new(grid.len(), n, collection.n_classes());
        if n < 2 {
            warn!(n_series = n, "leave-one-out needs at least two series, table left unresolved");
            return table;
        }

        for param in 0..grid.len() {
            table.slot_mut(param, 0).confirm();
        }

        for current in 1..n {
            let query = collection.series(current).as_slice();
            let mut round = Round {
                current,
                contexts: (0..current)
                    .map(|prev| {
                        PairContext::new(
                            family,
                            query,
                            collection.series(prev).as_slice(),
                            cache.source(current),
                            cache.source(prev),
                        )
                    })
                    .collect(),
                assessors: vec![PairAssessor::new(); current],
            };

            let before = *counters;
            for param in (0..grid.len()).rev() {
                self.resolve(&mut table, &mut round, collection, grid, param, counters);
            }
            debug!(
                current,
                full_distances = counters.full_distances - before.full_distances,
                propagated = counters.propagated_slots - before.propagated_slots,
                "inserted series"
            );
        }

        info!(
            params = grid.len(),
            full_distances = counters.full_distances,
            prunes = counters.prunes(),
            propagated = counters.propagated_slots,
            "sweep complete"
        );
        table
    }
}
