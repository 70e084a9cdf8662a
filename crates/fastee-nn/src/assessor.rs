//! Progressive, resumable distance assessment of one series pair.
//!
//! An assessor walks the bound stages its family supports, cheapest first,
//! and only pays for a full alignment when no bound rules the pair out. Its
//! state survives between calls: a later call with a larger score to beat
//! resumes an interrupted envelope scan, and a call at a stricter parameter
//! of the same group reuses every bound, every abandonment and, down to its
//! validity floor, the exact distance.

use fastee_distance::{Alignment, BoundStage, DistanceFamily, EnvelopeSource, ParameterGrid};

use crate::counters::SearchCounters;

/// Relative slack added to the score to beat before a bound may prune.
///
/// Envelope and endpoint bounds are summed in a different order from the
/// alignment and may overshoot an exact tie by a rounding error.
pub const BOUND_TOLERANCE: f64 = 1e-9;

/// Largest bound that must not prune against `score`.
fn prune_threshold(score: f64) -> f64 {
    score + score.abs() * BOUND_TOLERANCE
}

/// Result of [`PairAssessor::try_to_beat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A lower bound exceeds the score to beat.
    PrunedByBound,
    /// An interrupted envelope scan or alignment exceeds the score to beat.
    PrunedByPartialDistance,
    /// The exact distance is known and does not exceed the score to beat.
    NewBest,
}

/// A completed alignment and the ids it stays exact for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactDistance {
    /// Exact distance.
    pub distance: f64,
    /// Id the alignment ran at.
    pub computed_at: usize,
    /// Strictest id of the same group with the same distance.
    pub floor: usize,
}

impl ExactDistance {
    /// Return true if the distance is exact at `param`.
    #[must_use]
    pub fn covers(&self, param: usize) -> bool {
        self.floor <= param && param <= self.computed_at
    }
}

/// Furthest stage an assessment has reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    /// Nothing computed yet.
    Fresh,
    /// Endpoint bound pending.
    Kim,
    /// Query against the reference envelope, `scanned` samples summed into
    /// `partial`.
    QueryEnvelope {
        /// Samples already summed.
        scanned: usize,
        /// Sum of their envelope terms.
        partial: f64,
    },
    /// Reference against the query envelope.
    ReferenceEnvelope {
        /// Samples already summed.
        scanned: usize,
        /// Sum of their envelope terms.
        partial: f64,
    },
    /// Only the full alignment is left.
    Full,
}

impl From<BoundStage> for Stage {
    fn from(stage: BoundStage) -> Self {
        match stage {
            BoundStage::Kim => Self::Kim,
            BoundStage::QueryEnvelope => Self::QueryEnvelope {
                scanned: 0,
                partial: 0.0,
            },
            BoundStage::ReferenceEnvelope => Self::ReferenceEnvelope {
                scanned: 0,
                partial: 0.0,
            },
        }
    }
}

impl Stage {
    fn bound_stage(self) -> Option<BoundStage> {
        match self {
            Self::Kim => Some(BoundStage::Kim),
            Self::QueryEnvelope { .. } => Some(BoundStage::QueryEnvelope),
            Self::ReferenceEnvelope { .. } => Some(BoundStage::ReferenceEnvelope),
            Self::Fresh | Self::Full => None,
        }
    }
}

/// Everything known about one pair at one parameter id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessState {
    /// Parameter the state refers to, `None` before the first call.
    pub param: Option<usize>,
    /// Furthest stage reached.
    pub cursor: Stage,
    /// Best lower bound valid at `param`, including the bound left by an
    /// abandoned alignment.
    pub lower_bound: f64,
    /// Exact distance, if one is valid at `param`.
    pub exact: Option<ExactDistance>,
    /// Cached upper bound and the key it was computed for.
    pub upper_bound: Option<(usize, f64)>,
}

impl Default for AssessState {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            param: None,
            cursor: Stage::Fresh,
            lower_bound: 0.0,
            exact: None,
            upper_bound: None,
        }
    }

    /// Move the state to `param`.
    ///
    /// A stricter id of the same group keeps every bound and the cursor; an
    /// exact distance below its floor turns into a lower bound. Anything else
    /// starts over, keeping only the cached upper bound.
    #[must_use]
    pub fn rebase(self, grid: ParameterGrid, param: usize) -> Self {
        match self.param {
            Some(prev) if prev == param => self,
            Some(prev) if param < prev && grid.same_group(param, prev) => {
                let mut state = Self {
                    param: Some(param),
                    ..self
                };
                if let Some(exact) = state.exact.filter(|e| !e.covers(param)) {
                    state.lower_bound = state.lower_bound.max(exact.distance);
                    state.exact = None;
                }
                state
            }
            _ => Self {
                param: Some(param),
                upper_bound: self.upper_bound,
                ..Self::new()
            },
        }
    }

    /// Return the best known lower bound, or the exact distance if known.
    #[must_use]
    pub fn best_lower_bound(&self) -> f64 {
        self.exact.map_or(self.lower_bound, |e| e.distance)
    }
}

/// The pair being assessed and the envelopes of both series.
///
/// The query is always the first argument to the family.
#[derive(Debug, Clone, Copy)]
pub struct PairContext<'a, F: ?Sized> {
    /// Distance family.
    pub family: &'a F,
    /// Query samples.
    pub query: &'a [f64],
    /// Reference samples.
    pub reference: &'a [f64],
    /// Envelope of the query.
    pub query_envelope: EnvelopeSource<'a>,
    /// Envelope of the reference.
    pub reference_envelope: EnvelopeSource<'a>,
}

impl<'a, F: DistanceFamily + ?Sized> PairContext<'a, F> {
    /// Bundle a pair with its envelopes.
    #[must_use]
    pub fn new(
        family: &'a F,
        query: &'a [f64],
        reference: &'a [f64],
        query_envelope: EnvelopeSource<'a>,
        reference_envelope: EnvelopeSource<'a>,
    ) -> Self {
        Self {
            family,
            query,
            reference,
            query_envelope,
            reference_envelope,
        }
    }

    /// Stage following `done`, skipping envelope stages for unequal lengths.
    fn stage_after(&self, done: Option<BoundStage>) -> Stage {
        let stages = self.family.bound_stages();
        let start = done
            .and_then(|d| stages.iter().position(|&s| s == d))
            .map_or(0, |p| p + 1);
        let envelopes = self.query.len() == self.reference.len();
        stages[start..]
            .iter()
            .find(|&&s| envelopes || s == BoundStage::Kim)
            .map_or(Stage::Full, |&s| Stage::from(s))
    }

    /// Sum envelope terms of `series` against `envelope` from `scanned` on,
    /// stopping once the bound exceeds `threshold`.
    ///
    /// Returns the new `(scanned, partial)`.
    fn scan_envelope(
        &self,
        series: &[f64],
        envelope: EnvelopeSource<'_>,
        param: usize,
        mut scanned: usize,
        mut partial: f64,
        threshold: f64,
    ) -> (usize, f64) {
        let window = self.family.envelope_window(param);
        let len = series.len();
        while scanned < len {
            let (lower, upper) = envelope.bounds(window, scanned);
            partial += self.family.envelope_term(series[scanned], lower, upper, param);
            scanned += 1;
            if self.family.bound_from_partial(partial, len) > threshold {
                break;
            }
        }
        (scanned, partial)
    }
}

/// Advance `state` at `param` until the pair is pruned or its exact distance
/// is known not to exceed `score_to_beat`.
///
/// Bound stages prune against `score_to_beat`. A full alignment only
/// abandons above `align_score` when that is larger, so a single alignment
/// also settles a later call at `align_score` at the same id.
///
/// Ties are [`Verdict::NewBest`], so every neighbour tied with the best one
/// is reported.
pub fn advance<F: DistanceFamily + ?Sized>(
    state: AssessState,
    ctx: &PairContext<'_, F>,
    score_to_beat: f64,
    align_score: f64,
    param: usize,
    counters: &mut SearchCounters,
) -> (AssessState, Verdict) {
    let family = ctx.family;
    let threshold = prune_threshold(score_to_beat);
    let mut state = state.rebase(family.grid(), param);

    if let Some(exact) = state.exact {
        counters.exact_reuses += 1;
        let verdict = if exact.distance <= score_to_beat {
            Verdict::NewBest
        } else {
            Verdict::PrunedByBound
        };
        return (state, verdict);
    }

    loop {
        if state.lower_bound > threshold {
            counters.known_bound_prunes += 1;
            return (state, Verdict::PrunedByBound);
        }

        match state.cursor {
            Stage::Fresh => state.cursor = ctx.stage_after(None),
            Stage::Kim => {
                let bound = family.kim_bound(ctx.query, ctx.reference, param);
                state.lower_bound = state.lower_bound.max(bound);
                state.cursor = ctx.stage_after(Some(BoundStage::Kim));
                if bound > threshold {
                    counters.kim_prunes += 1;
                    return (state, Verdict::PrunedByBound);
                }
            }
            Stage::QueryEnvelope { scanned, partial } | Stage::ReferenceEnvelope { scanned, partial } => {
                let query_side = matches!(state.cursor, Stage::QueryEnvelope { .. });
                let (series, envelope) = if query_side {
                    (ctx.query, ctx.reference_envelope)
                } else {
                    (ctx.reference, ctx.query_envelope)
                };
                let (scanned, partial) =
                    ctx.scan_envelope(series, envelope, param, scanned, partial, threshold);
                let bound = family.bound_from_partial(partial, series.len());
                state.lower_bound = state.lower_bound.max(bound);

                let complete = scanned == series.len();
                state.cursor = match (complete, query_side) {
                    (true, _) => ctx.stage_after(state.cursor.bound_stage()),
                    (false, true) => Stage::QueryEnvelope { scanned, partial },
                    (false, false) => Stage::ReferenceEnvelope { scanned, partial },
                };
                if bound > threshold {
                    if query_side {
                        counters.query_envelope_prunes += 1;
                    } else {
                        counters.reference_envelope_prunes += 1;
                    }
                    let verdict = if complete {
                        Verdict::PrunedByBound
                    } else {
                        Verdict::PrunedByPartialDistance
                    };
                    return (state, verdict);
                }
            }
            Stage::Full => {
                let cutoff = prune_threshold(align_score.max(score_to_beat));
                return match family.align(ctx.query, ctx.reference, param, cutoff) {
                    Alignment::Complete { distance, floor } => {
                        counters.full_distances += 1;
                        state.exact = Some(ExactDistance {
                            distance,
                            computed_at: param,
                            floor,
                        });
                        let verdict = if distance <= score_to_beat {
                            Verdict::NewBest
                        } else {
                            Verdict::PrunedByPartialDistance
                        };
                        (state, verdict)
                    }
                    Alignment::Abandoned { lower_bound } => {
                        counters.early_abandons += 1;
                        state.lower_bound = state.lower_bound.max(lower_bound);
                        (state, Verdict::PrunedByPartialDistance)
                    }
                };
            }
        }
    }
}

/// Resumable assessment of one `(query, reference)` pair.
#[derive(Debug, Clone, Default)]
pub struct PairAssessor {
    state: AssessState,
}

impl PairAssessor {
    /// Create an assessor with nothing computed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether the pair's distance at `param` beats or ties
    /// `score_to_beat`.
    ///
    /// After [`Verdict::NewBest`], [`distance`](Self::distance) and
    /// [`validity_floor`](Self::validity_floor) return the exact result.
    pub fn try_to_beat<F: DistanceFamily + ?Sized>(
        &mut self,
        ctx: &PairContext<'_, F>,
        score_to_beat: f64,
        param: usize,
        counters: &mut SearchCounters,
    ) -> Verdict {
        self.try_to_beat_aligning_to(ctx, score_to_beat, score_to_beat, param, counters)
    }

    /// Like [`try_to_beat`](Self::try_to_beat), but a full alignment runs
    /// until it exceeds `align_score` rather than `score_to_beat`.
    ///
    /// Used when the same pair will be asked about `align_score` next, so
    /// the second question never pays for another alignment.
    pub fn try_to_beat_aligning_to<F: DistanceFamily + ?Sized>(
        &mut self,
        ctx: &PairContext<'_, F>,
        score_to_beat: f64,
        align_score: f64,
        param: usize,
        counters: &mut SearchCounters,
    ) -> Verdict {
        let (state, verdict) = advance(self.state, ctx, score_to_beat, align_score, param, counters);
        self.state = state;
        verdict
    }

    /// Return the pair's upper bound at `param`, computing it at most once per
    /// upper-bound key.
    pub fn upper_bound<F: DistanceFamily + ?Sized>(
        &mut self,
        ctx: &PairContext<'_, F>,
        param: usize,
        counters: &mut SearchCounters,
    ) -> f64 {
        let key = ctx.family.upper_bound_key(param);
        if let Some((_, value)) = self.state.upper_bound.filter(|&(cached, _)| cached == key) {
            return value;
        }
        counters.upper_bounds += 1;
        let value = ctx.family.upper_bound(ctx.query, ctx.reference, param);
        self.state.upper_bound = Some((key, value));
        value
    }

    /// Return the best lower bound that would hold at `param`.
    #[must_use]
    pub fn lower_bound_at(&self, grid: ParameterGrid, param: usize) -> f64 {
        self.state.rebase(grid, param).best_lower_bound()
    }

    /// Return the exact distance at the last assessed parameter, if known.
    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        self.state.exact.map(|e| e.distance)
    }

    /// Return the strictest id at which [`distance`](Self::distance) holds.
    #[must_use]
    pub fn validity_floor(&self) -> Option<usize> {
        self.state.exact.map(|e| e.floor)
    }

    /// Return the current state.
    #[must_use]
    pub fn state(&self) -> &AssessState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use fastee_distance::{DtwFamily, LcssFamily, SeriesExtrema, TimeSeries};

    struct Pair {
        query: Vec<f64>,
        reference: Vec<f64>,
        query_extrema: SeriesExtrema,
        reference_extrema: SeriesExtrema,
    }

    impl Pair {
        fn new(query: &[f64], reference: &[f64]) -> Self {
            Self {
                query: query.to_vec(),
                reference: reference.to_vec(),
                query_extrema: SeriesExtrema::new(query),
                reference_extrema: SeriesExtrema::new(reference),
            }
        }

        fn ctx<'a, F: DistanceFamily>(&'a self, family: &'a F) -> PairContext<'a, F> {
            PairContext::new(
                family,
                &self.query,
                &self.reference,
                EnvelopeSource::Cached(&self.query_extrema),
                EnvelopeSource::Cached(&self.reference_extrema),
            )
        }
    }

    fn exact<F: DistanceFamily>(family: &F, pair: &Pair, id: usize) -> f64 {
        family
            .distance(
                TimeSeries::new(pair.query.clone()).unwrap().as_view(),
                TimeSeries::new(pair.reference.clone()).unwrap().as_view(),
                id,
            )
            .value()
    }

    fn shifted_pair() -> Pair {
        Pair::new(&[0.0, 0.0, 1.0, 3.0, 1.0, 0.0, 0.0], &[0.0, 1.0, 3.0, 1.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn unbounded_score_yields_exact_distance() {
        let family = DtwFamily::new(6, 7).unwrap();
        let pair = shifted_pair();
        let mut counters = SearchCounters::default();
        for id in 0..7 {
            let mut assessor = PairAssessor::new();
            let verdict = assessor.try_to_beat(&pair.ctx(&family), f64::INFINITY, id, &mut counters);
            assert_eq!(verdict, Verdict::NewBest);
            assert_eq!(assessor.distance(), Some(exact(&family, &pair, id)));
        }
        assert_eq!(counters.full_distances, 7);
    }

    #[test]
    fn tie_is_new_best() {
        let family = DtwFamily::new(6, 7).unwrap();
        let pair = shifted_pair();
        let d = exact(&family, &pair, 0);
        let mut assessor = PairAssessor::new();
        let verdict = assessor.try_to_beat(&pair.ctx(&family), d, 0, &mut SearchCounters::default());
        assert_eq!(verdict, Verdict::NewBest);
        assert_eq!(assessor.distance(), Some(d));
    }

    #[test]
    fn kim_prunes_distant_endpoints() {
        let family = DtwFamily::new(2, 3).unwrap();
        let pair = Pair::new(&[10.0, 0.0, 10.0], &[0.0, 0.0, 0.0]);
        let mut counters = SearchCounters::default();
        let mut assessor = PairAssessor::new();
        let verdict = assessor.try_to_beat(&pair.ctx(&family), 1.0, 2, &mut counters);
        assert_eq!(verdict, Verdict::PrunedByBound);
        assert_eq!(counters.kim_prunes, 1);
        assert_eq!(counters.full_distances, 0);
        assert!(assessor.state().lower_bound >= 200.0);
    }

    #[test]
    fn envelope_scan_resumes_with_larger_score() {
        let family = DtwFamily::new(1, 2).unwrap();
        let pair = Pair::new(&[0.0, 5.0, 5.0, 5.0, 0.0], &[0.0, 0.0, 0.0, 0.0, 0.0]);
        let mut counters = SearchCounters::default();
        let mut assessor = PairAssessor::new();
        let ctx = pair.ctx(&family);

        let verdict = assessor.try_to_beat(&ctx, 10.0, 1, &mut counters);
        assert_eq!(verdict, Verdict::PrunedByPartialDistance);
        assert_eq!(counters.query_envelope_prunes, 1);
        assert!(matches!(assessor.state().cursor, Stage::QueryEnvelope { scanned: 2, .. }));

        let verdict = assessor.try_to_beat(&ctx, f64::INFINITY, 1, &mut counters);
        assert_eq!(verdict, Verdict::NewBest);
        assert_eq!(assessor.distance(), Some(exact(&family, &pair, 1)));
    }

    #[test]
    fn stricter_parameter_reuses_exact_distance_down_to_floor() {
        let family = DtwFamily::new(6, 7).unwrap();
        let pair = shifted_pair();
        let ctx = pair.ctx(&family);
        let mut counters = SearchCounters::default();
        let mut assessor = PairAssessor::new();

        assessor.try_to_beat(&ctx, f64::INFINITY, 6, &mut counters);
        let floor = assessor.validity_floor().unwrap();
        assert_eq!(floor, 1);
        assert_eq!(assessor.try_to_beat(&ctx, f64::INFINITY, 1, &mut counters), Verdict::NewBest);
        assert_eq!(counters.full_distances, 1);
        assert_eq!(counters.exact_reuses, 1);

        assert_eq!(assessor.try_to_beat(&ctx, f64::INFINITY, 0, &mut counters), Verdict::NewBest);
        assert_eq!(counters.full_distances, 2);
        assert_eq!(assessor.distance(), Some(exact(&family, &pair, 0)));
    }

    #[test]
    fn abandonment_carries_to_stricter_parameter() {
        let family = DtwFamily::new(6, 7).unwrap();
        let pair = shifted_pair();
        let ctx = pair.ctx(&family);
        let mut counters = SearchCounters::default();
        let mut assessor = PairAssessor::new();

        let d0 = exact(&family, &pair, 0);
        assert!(d0 > 0.5);
        let first = assessor.try_to_beat(&ctx, 0.5, 0, &mut counters);
        assert_ne!(first, Verdict::NewBest);

        assessor.try_to_beat(&ctx, f64::INFINITY, 0, &mut counters);
        assert_eq!(assessor.distance(), Some(d0));
    }

    #[test]
    fn abandoned_alignment_leaves_lower_bound() {
        // Unequal lengths skip the envelopes; Kim is 0, so the alignment runs.
        // Every path costs at least 1 from the second row on, and d = 1.
        let family = DtwFamily::new(3, 4).unwrap();
        let pair = Pair::new(&[0.0, 1.0, 2.0, 1.0], &[0.0, 2.0, 1.0]);
        let ctx = pair.ctx(&family);
        let mut counters = SearchCounters::default();
        let mut assessor = PairAssessor::new();

        assert_eq!(assessor.try_to_beat(&ctx, 0.5, 3, &mut counters), Verdict::PrunedByPartialDistance);
        assert_eq!(counters.early_abandons, 1);
        assert_eq!(assessor.state().lower_bound, 1.0);

        assert_eq!(assessor.try_to_beat(&ctx, 0.9, 3, &mut counters), Verdict::PrunedByBound);
        assert_eq!(counters.early_abandons, 1);
        assert_eq!(counters.known_bound_prunes, 1);

        assert_eq!(assessor.try_to_beat(&ctx, 1.0, 3, &mut counters), Verdict::NewBest);
        assert_eq!(assessor.distance(), Some(1.0));
        assert_eq!(counters.full_distances, 1);
    }

    #[test]
    fn one_alignment_answers_both_scores() {
        let family = DtwFamily::new(3, 4).unwrap();
        let pair = Pair::new(&[0.0, 1.0, 2.0, 1.0], &[0.0, 2.0, 1.0]);
        let ctx = pair.ctx(&family);
        let mut counters = SearchCounters::default();
        let mut assessor = PairAssessor::new();

        let verdict = assessor.try_to_beat_aligning_to(&ctx, 0.5, 2.0, 3, &mut counters);
        assert_eq!(verdict, Verdict::PrunedByPartialDistance);
        assert_eq!(counters.early_abandons, 0);
        assert_eq!(counters.full_distances, 1);

        assert_eq!(assessor.try_to_beat(&ctx, 2.0, 3, &mut counters), Verdict::NewBest);
        assert_eq!(assessor.distance(), Some(1.0));
        assert_eq!(counters.full_distances, 1);
        assert_eq!(counters.exact_reuses, 1);
    }

    #[test]
    fn group_change_resets_but_keeps_matching_upper_bound() {
        let family = LcssFamily::new(vec![0.1, 0.5], vec![0, 2]).unwrap();
        let pair = Pair::new(&[0.0, 1.0, 2.0, 3.0], &[0.2, 1.4, 2.0, 3.0]);
        let ctx = pair.ctx(&family);
        let mut counters = SearchCounters::default();
        let mut assessor = PairAssessor::new();

        let ub = assessor.upper_bound(&ctx, 3, &mut counters);
        assert_eq!(ub, assessor.upper_bound(&ctx, 2, &mut counters));
        assert_eq!(counters.upper_bounds, 1);

        assessor.try_to_beat(&ctx, f64::INFINITY, 2, &mut counters);
        assert!(assessor.distance().unwrap() <= ub);
        assessor.try_to_beat(&ctx, f64::INFINITY, 1, &mut counters);
        assert_eq!(assessor.state().param, Some(1));
        assert!(assessor.upper_bound(&ctx, 1, &mut counters) >= assessor.distance().unwrap());
        assert_eq!(counters.upper_bounds, 2);
    }

    #[test]
    fn unequal_lengths_skip_envelopes() {
        let family = DtwFamily::new(3, 4).unwrap();
        let pair = Pair::new(&[0.0, 1.0, 2.0, 1.0], &[0.0, 2.0, 1.0]);
        let mut counters = SearchCounters::default();
        let mut assessor = PairAssessor::new();
        let verdict = assessor.try_to_beat(&pair.ctx(&family), f64::INFINITY, 3, &mut counters);
        assert_eq!(verdict, Verdict::NewBest);
        assert_eq!(counters.query_envelope_prunes + counters.reference_envelope_prunes, 0);
        assert_eq!(assessor.distance(), Some(exact(&family, &pair, 3)));
    }
}
