//! Hand-computed leave-one-out scenarios for fastee-nn.
//!
//! Four series of length 5 in two classes: a positive and a negative bump,
//! each shifted by one sample. Costs are squared differences, so a bump of
//! height 2 matched against zero costs 4.

use fastee_distance::{
    DistanceFamily, DistanceMatrix, DtwFamily, EnvelopeCache, ErpFamily, LcssFamily, MsmFamily,
    SeriesCollection, TimeSeries, TweFamily,
};
use fastee_nn::{
    BruteForceLoocv, ElasticNn, NeighborTable, ParameterSelection, ParameterSweep, SearchCounters,
    SlotStatus, TrainingStrategy,
};

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn collection(rows: &[(&[f64], usize)]) -> SeriesCollection {
    let series = rows.iter().map(|(r, _)| TimeSeries::new(r.to_vec()).unwrap()).collect();
    let labels = rows.iter().map(|&(_, l)| l).collect();
    SeriesCollection::new(series, labels, 2).unwrap()
}

fn shifted_bumps() -> SeriesCollection {
    collection(&[
        (&[0.0, 2.0, 0.0, 0.0, 0.0], 0),
        (&[0.0, 0.0, 2.0, 0.0, 0.0], 0),
        (&[0.0, -2.0, 0.0, 0.0, 0.0], 1),
        (&[0.0, 0.0, -2.0, 0.0, 0.0], 1),
    ])
}

/// Windows 0, 1, 2, 3, 4.
fn family() -> DtwFamily {
    DtwFamily::new(4, 5).unwrap()
}

fn sweep_table(c: &SeriesCollection) -> (NeighborTable, SearchCounters) {
    let cache = EnvelopeCache::new(c);
    let mut counters = SearchCounters::default();
    let table = ParameterSweep::default().build_table(&family(), c, &cache, &mut counters);
    (table, counters)
}

// ---------------------------------------------------------------------------
// a) pairwise distances at the widest window
// ---------------------------------------------------------------------------

#[test]
fn widest_window_matches_hand_computed_distances() {
    let c = shifted_bumps();
    let matrix = DistanceMatrix::compute(&family(), c.all_series(), 4);
    let expected = [((1, 0), 0.0), ((2, 0), 8.0), ((2, 1), 8.0), ((3, 0), 8.0), ((3, 1), 8.0), ((3, 2), 0.0)];
    for ((i, j), d) in expected {
        assert_eq!(matrix.get(i, j).value(), d, "pair ({i}, {j})");
    }
}

// ---------------------------------------------------------------------------
// b) neighbours at the widest window
// ---------------------------------------------------------------------------

#[test]
fn widest_window_neighbours() {
    let c = shifted_bumps();
    let (table, _) = sweep_table(&c);
    let expected = [(0, 1), (1, 0), (2, 3), (3, 2)];
    for (series, neighbour) in expected {
        let slot = table.slot(4, series);
        assert_eq!(slot.neighbor(), Some(neighbour), "series {series}");
        assert_eq!(slot.distance(), 0.0);
        assert_eq!(slot.votes().total(), 1);
        assert_eq!(slot.status(), SlotStatus::ConfirmedNn);
    }
    // The matching bump is one sample away: exact from window 1 upwards.
    assert_eq!(table.slot(4, 1).validity_floor(), 1);
}

// ---------------------------------------------------------------------------
// c) accuracy curve
// ---------------------------------------------------------------------------

#[test]
fn accuracy_curve_rises_once_warping_helps() {
    let c = shifted_bumps();
    let (table, _) = sweep_table(&c);
    let selection = ParameterSelection::from_table(&table, c.labels()).unwrap();

    // Window 0: series 2 and 3 tie between classes and fall back to class 0.
    assert_eq!(selection.predictions(0), &[0, 0, 0, 0]);
    assert_eq!(selection.accuracy_curve(), &[0.5, 1.0, 1.0, 1.0, 1.0]);
    assert!(selection.accuracy_curve().windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(selection.best_param(), 1);
}

// ---------------------------------------------------------------------------
// d) ties
// ---------------------------------------------------------------------------

#[test]
fn equidistant_neighbours_both_vote() {
    let c = collection(&[(&[0.0, 0.0], 1), (&[2.0, 0.0], 0), (&[1.0, 0.0], 1)]);
    let (table, _) = sweep_table(&c);
    for param in 0..5 {
        let slot = table.slot(param, 2);
        assert_eq!(slot.distance(), 1.0);
        assert_eq!(slot.votes().as_slice(), &[1, 1]);
        assert_eq!(slot.votes().majority(), Some(0));
    }
}

// ---------------------------------------------------------------------------
// e) strategy equivalence and work saved
// ---------------------------------------------------------------------------

#[test]
fn sweep_equals_brute_force_with_less_work() {
    let c = shifted_bumps();
    let cache = EnvelopeCache::new(&c);
    let (sweep, counters) = sweep_table(&c);
    let mut brute_counters = SearchCounters::default();
    let brute = BruteForceLoocv.build_table(&family(), &c, &cache, &mut brute_counters);

    for param in 0..5 {
        for i in 0..4 {
            assert_eq!(sweep.slot(param, i).distance(), brute.slot(param, i).distance());
            assert_eq!(sweep.slot(param, i).votes(), brute.slot(param, i).votes());
        }
    }
    assert_eq!(brute_counters.full_distances, 30);
    assert!(counters.full_distances < brute_counters.full_distances);
    assert!(counters.propagated_slots > 0);
}

#[test]
fn classifier_picks_first_perfect_window() {
    let (model, report) = ElasticNn::fit(family(), shifted_bumps(), &ParameterSweep::default()).unwrap();
    assert_eq!(report.best_param, 1);
    assert_eq!(model.family().window(model.param()), 1);
    assert!((report.loocv_accuracy - 1.0).abs() < f64::EPSILON);

    let late = TimeSeries::new(vec![0.0, 0.0, 0.0, -2.0, 0.0]).unwrap();
    assert_eq!(model.predict(late.as_view()).unwrap(), 1);
}

// ---------------------------------------------------------------------------
// f) work saved by every family with a monotone axis
// ---------------------------------------------------------------------------

/// Two identical pairs and a loner, far apart in value. Each twin is its
/// sibling's neighbour at distance 0 along the diagonal, exact down to the
/// strictest id of every group.
fn twins() -> SeriesCollection {
    let series = |offset: f64| [0.0, 1.0, 2.0, 1.0, 0.0].map(|v| v + offset);
    let (a, b, c) = (series(0.0), series(5.0), series(-5.0));
    collection(&[(&a, 0), (&b, 1), (&a, 0), (&b, 1), (&c, 0)])
}

fn assert_sweep_saves_work<F: DistanceFamily>(family: &F) {
    let c = twins();
    let cache = EnvelopeCache::new(&c);
    let mut counters = SearchCounters::default();
    let sweep = ParameterSweep::default().build_table(family, &c, &cache, &mut counters);
    let mut brute_counters = SearchCounters::default();
    let brute = BruteForceLoocv.build_table(family, &c, &cache, &mut brute_counters);

    let kind = family.kind();
    for param in 0..family.grid().len() {
        for i in 0..c.len() {
            assert_eq!(sweep.slot(param, i).distance(), brute.slot(param, i).distance(), "{kind} {param} {i}");
            assert_eq!(sweep.slot(param, i).votes(), brute.slot(param, i).votes(), "{kind} {param} {i}");
        }
    }
    assert!(
        counters.full_distances < brute_counters.full_distances,
        "{kind}: {} full distances, brute force {}",
        counters.full_distances,
        brute_counters.full_distances
    );
    assert!(counters.propagated_slots > 0, "{kind}: nothing propagated");
}

#[test]
fn every_monotone_family_propagates_and_saves_distances() {
    assert_sweep_saves_work(&DtwFamily::new(4, 5).unwrap());
    assert_sweep_saves_work(&ErpFamily::new(vec![0.0, 1.0], vec![0, 1, 2]).unwrap());
    assert_sweep_saves_work(&LcssFamily::new(vec![0.25, 1.0], vec![0, 1, 2]).unwrap());
    assert_sweep_saves_work(&MsmFamily::with_costs(vec![2.0, 1.0, 0.5]).unwrap());
    assert_sweep_saves_work(&TweFamily::with_params(vec![0.001, 0.1], vec![0.5, 0.1, 0.0]).unwrap());
}
