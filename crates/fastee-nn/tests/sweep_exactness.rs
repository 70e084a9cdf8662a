//! Property tests: the pruning sweep must reproduce the brute-force table.
//!
//! Small integer-valued series make exact ties frequent, so tie votes and
//! validity floors are exercised as much as the distances themselves.

use fastee_distance::{
    DistanceFamily, EnvelopeCache, Family, FamilyKind, FamilyOptions, SeriesCollection, TimeSeries,
};
use fastee_nn::{
    BruteForceLoocv, ChallengerOrder, NeighborTable, ParameterSelection, ParameterSweep,
    SearchCounters, SweepConfig, TrainingStrategy,
};
use proptest::prelude::*;

fn collection_strategy(equal_lengths: bool) -> impl Strategy<Value = SeriesCollection> {
    (3usize..=6).prop_flat_map(move |len| {
        let lengths = if equal_lengths { len..=len } else { 3..=6 };
        prop::collection::vec(
            (prop::collection::vec(-4i32..=4, lengths), 0usize..3),
            2..=6,
        )
    })
    .prop_map(|rows| {
        let series = rows
            .iter()
            .map(|(values, _)| TimeSeries::new(values.iter().map(|&v| f64::from(v) * 0.5).collect()).unwrap())
            .collect();
        let labels = rows.iter().map(|&(_, label)| label).collect();
        SeriesCollection::new(series, labels, 3).unwrap()
    })
}

fn tables(kind: FamilyKind, c: &SeriesCollection, config: SweepConfig) -> (Family, NeighborTable, NeighborTable) {
    let family = Family::build(kind, c, FamilyOptions { window_steps: 6 }).unwrap();
    let cache = EnvelopeCache::new(c);
    let sweep = ParameterSweep::new(config).build_table(&family, c, &cache, &mut SearchCounters::default());
    let brute = BruteForceLoocv.build_table(&family, c, &cache, &mut SearchCounters::default());
    (family, sweep, brute)
}

fn check_exact(kind: FamilyKind, c: &SeriesCollection, config: SweepConfig) -> Result<(), TestCaseError> {
    let (family, sweep, brute) = tables(kind, c, config);
    let grid = family.grid();
    prop_assert!(sweep.is_complete());
    for param in 0..grid.len() {
        for i in 0..c.len() {
            let (s, b) = (sweep.slot(param, i), brute.slot(param, i));
            prop_assert_eq!(s.distance(), b.distance(), "{} param {} series {}", kind, param, i);
            prop_assert_eq!(s.votes(), b.votes(), "{} param {} series {}", kind, param, i);
            prop_assert!(s.validity_floor() >= grid.group_start(param));
            prop_assert!(s.validity_floor() <= param);
        }
    }

    let from_sweep = ParameterSelection::from_table(&sweep, c.labels()).unwrap();
    let from_brute = ParameterSelection::from_table(&brute, c.labels()).unwrap();
    prop_assert_eq!(from_sweep.accuracy_curve(), from_brute.accuracy_curve());
    prop_assert_eq!(from_sweep.best_param(), from_brute.best_param());
    Ok(())
}

fn check_monotone(kind: FamilyKind, c: &SeriesCollection) -> Result<(), TestCaseError> {
    let (family, sweep, _) = tables(kind, c, SweepConfig::default());
    let grid = family.grid();
    for param in 0..grid.len() {
        if let Some(looser) = grid.looser(param) {
            for i in 0..c.len() {
                prop_assert!(sweep.slot(param, i).distance() >= sweep.slot(looser, i).distance());
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 24, ..ProptestConfig::default() })]

    #[test]
    fn dtw_sweep_is_exact(c in collection_strategy(false)) {
        check_exact(FamilyKind::Dtw, &c, SweepConfig::default())?;
    }

    #[test]
    fn wdtw_sweep_is_exact(c in collection_strategy(true)) {
        check_exact(FamilyKind::Wdtw, &c, SweepConfig::default())?;
    }

    #[test]
    fn erp_sweep_is_exact(c in collection_strategy(false)) {
        check_exact(FamilyKind::Erp, &c, SweepConfig::default())?;
    }

    #[test]
    fn lcss_sweep_is_exact(c in collection_strategy(false)) {
        check_exact(FamilyKind::Lcss, &c, SweepConfig::default())?;
    }

    #[test]
    fn msm_sweep_is_exact(c in collection_strategy(true)) {
        check_exact(FamilyKind::Msm, &c, SweepConfig::default())?;
    }

    #[test]
    fn twe_sweep_is_exact(c in collection_strategy(false)) {
        check_exact(FamilyKind::Twe, &c, SweepConfig::default())?;
    }

    #[test]
    fn lower_bound_order_without_seeding_is_exact(c in collection_strategy(true)) {
        let config = SweepConfig::new()
            .with_challenger_order(ChallengerOrder::LowerBound)
            .with_upper_bound_seeding(false)
            .with_neighbor_first(false);
        check_exact(FamilyKind::Dtw, &c, config)?;
        check_exact(FamilyKind::Lcss, &c, config)?;
    }

    #[test]
    fn neighbour_distance_is_monotone_within_groups(c in collection_strategy(true)) {
        for kind in [FamilyKind::Dtw, FamilyKind::Erp, FamilyKind::Lcss, FamilyKind::Msm, FamilyKind::Twe] {
            check_monotone(kind, &c)?;
        }
    }

    #[test]
    fn builds_are_deterministic(c in collection_strategy(false)) {
        let family = Family::build(FamilyKind::Erp, &c, FamilyOptions::default()).unwrap();
        let cache = EnvelopeCache::new(&c);
        let sweep = ParameterSweep::default();
        let mut first = SearchCounters::default();
        let mut second = SearchCounters::default();
        let a = sweep.build_table(&family, &c, &cache, &mut first);
        let b = sweep.build_table(&family, &c, &cache, &mut second);
        prop_assert_eq!(a, b);
        prop_assert_eq!(first, second);
    }
}
