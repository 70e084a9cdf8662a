//! Contract tests shared by every distance family.
//!
//! These pin the properties the nearest-neighbour search relies on: bounds
//! never exceed the distance, upper bounds never fall below it, validity
//! floors reproduce the distance exactly, distances never increase towards
//! the looser end of a group, and the bound left by an abandoned alignment
//! holds at every stricter id.

use fastee_distance::{
    Alignment, BoundStage, DistanceFamily, Family, FamilyKind, FamilyOptions, SeriesCollection,
    SeriesEnvelope, TimeSeries,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(values: Vec<f64>) -> TimeSeries {
    TimeSeries::new(values).expect("valid test series")
}

fn full(family: &Family, a: &[f64], b: &[f64], id: usize) -> (f64, usize) {
    match family.align(a, b, id, f64::INFINITY) {
        Alignment::Complete { distance, floor } => (distance, floor),
        Alignment::Abandoned { .. } => panic!("alignment without cutoff abandoned"),
    }
}

fn envelope_bound(family: &Family, query: &TimeSeries, reference: &TimeSeries, id: usize) -> f64 {
    let window = family.envelope_window(id);
    let envelope = SeriesEnvelope::compute(reference.as_view(), window);
    let partial: f64 = query
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, &v)| family.envelope_term(v, envelope.lower()[i], envelope.upper()[i], id))
        .sum();
    family.bound_from_partial(partial, query.len())
}

fn tolerance(d: f64) -> f64 {
    1e-9 * (1.0 + d.abs())
}

fn series_pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..10, 0usize..3).prop_flat_map(|(len, extra)| {
        // Quarter steps make exact ties between alignments common.
        let values = (-12i32..12).prop_map(|v| f64::from(v) / 4.0);
        (
            prop::collection::vec(values.clone(), len),
            prop::collection::vec(values, len + extra),
        )
    })
}

fn check_family(kind: FamilyKind, a: Vec<f64>, b: Vec<f64>) -> Result<(), TestCaseError> {
    let (a, b) = (ts(a), ts(b));
    let collection = SeriesCollection::new(vec![a.clone(), b.clone()], vec![0, 1], 2)
        .expect("valid collection");
    let family = Family::build(kind, &collection, FamilyOptions { window_steps: 6 })
        .expect("default grid");
    let grid = family.grid();
    let equal_lengths = a.len() == b.len();

    for id in 0..grid.len() {
        let (d, floor) = full(&family, a.as_slice(), b.as_slice(), id);
        prop_assert!(d >= 0.0, "{kind} id {id}: negative distance {d}");

        prop_assert!(floor <= id && grid.same_group(floor, id), "{kind} id {id}: floor {floor}");
        let (at_floor, _) = full(&family, a.as_slice(), b.as_slice(), floor);
        prop_assert_eq!(at_floor, d, "{} id {}: floor {} changes the distance", kind, id, floor);

        if let Some(looser) = grid.looser(id) {
            let (loose, _) = full(&family, a.as_slice(), b.as_slice(), looser);
            prop_assert!(loose <= d, "{kind} id {id}: looser id gives {loose} > {d}");
        }

        prop_assert!(family.upper_bound(a.as_slice(), b.as_slice(), id) >= d);

        for stage in family.bound_stages() {
            let bound = match stage {
                BoundStage::Kim => family.kim_bound(a.as_slice(), b.as_slice(), id),
                BoundStage::QueryEnvelope if equal_lengths => envelope_bound(&family, &a, &b, id),
                BoundStage::ReferenceEnvelope if equal_lengths => envelope_bound(&family, &b, &a, id),
                _ => continue,
            };
            prop_assert!(
                bound <= d + tolerance(d),
                "{kind} id {id}: {stage:?} bound {bound} exceeds distance {d}"
            );
        }

        match family.align(a.as_slice(), b.as_slice(), id, d) {
            Alignment::Complete { distance, .. } => prop_assert_eq!(distance, d),
            Alignment::Abandoned { .. } => {
                prop_assert!(false, "{kind} id {id}: abandoned at its own distance")
            }
        }
        if d > 0.0 && d.is_finite() {
            match family.align(a.as_slice(), b.as_slice(), id, d / 2.0) {
                Alignment::Complete { distance, .. } => prop_assert_eq!(distance, d),
                Alignment::Abandoned { lower_bound } => {
                    prop_assert!(
                        lower_bound > d / 2.0 && lower_bound <= d,
                        "{kind} id {id}: abandoned with bound {lower_bound}, distance {d}"
                    );
                    for stricter in grid.group_start(id)..id {
                        let (strict, _) = full(&family, a.as_slice(), b.as_slice(), stricter);
                        prop_assert!(lower_bound <= strict, "{kind} id {stricter}: {strict} below bound {lower_bound}");
                    }
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// a) property tests, one per family
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    #[test]
    fn dtw_contract((a, b) in series_pair()) {
        check_family(FamilyKind::Dtw, a, b)?;
    }

    #[test]
    fn wdtw_contract((a, b) in series_pair()) {
        check_family(FamilyKind::Wdtw, a, b)?;
    }

    #[test]
    fn erp_contract((a, b) in series_pair()) {
        check_family(FamilyKind::Erp, a, b)?;
    }

    #[test]
    fn lcss_contract((a, b) in series_pair()) {
        check_family(FamilyKind::Lcss, a, b)?;
    }

    #[test]
    fn msm_contract((a, b) in series_pair()) {
        check_family(FamilyKind::Msm, a, b)?;
    }

    #[test]
    fn twe_contract((a, b) in series_pair()) {
        check_family(FamilyKind::Twe, a, b)?;
    }
}

// ---------------------------------------------------------------------------
// b) known values
// ---------------------------------------------------------------------------

/// Unconstrained DTW on short pairs, squared costs without a root.
#[test]
fn dtw_distances_match_known_values() {
    let pairs = [
        (vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0], 3.0),
        (vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 0.0], 1.0),
        (vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0], 0.0),
        (vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0], 8.0),
        (vec![1.0], vec![5.0], 16.0),
        (vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 0.0], 2.0),
    ];
    let collection = SeriesCollection::new(
        vec![ts(vec![0.0, 1.0, 2.0]), ts(vec![2.0, 1.0, 0.0, 1.0])],
        vec![0, 1],
        2,
    )
    .expect("valid collection");
    let family = Family::build(FamilyKind::Dtw, &collection, FamilyOptions { window_steps: 5 })
        .expect("default grid");
    let loosest = family.grid().len() - 1;

    for (i, (a, b, expected)) in pairs.iter().enumerate() {
        let d = family.distance(ts(a.clone()).as_view(), ts(b.clone()).as_view(), loosest);
        assert!((d.value() - expected).abs() < 1e-10, "pair {i}: got {d}, expected {expected}");
    }
}
