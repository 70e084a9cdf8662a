//! One-nearest-neighbour classifier with a parameter chosen by leave-one-out.

use std::time::Instant;

use fastee_distance::{
    DistanceFamily, EnvelopeCache, EnvelopeSource, FamilyKind, ParameterValue, SeriesCollection,
    SeriesEnvelope, TimeSeriesView,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::assessor::{PairAssessor, PairContext, Verdict};
use crate::candidate::CandidateSlot;
use crate::confusion::ConfusionMatrix;
use crate::counters::SearchCounters;
use crate::error::NnError;
use crate::selector::ParameterSelection;
use crate::strategy::TrainingStrategy;

/// Outcome of [`ElasticNn::fit`].
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    /// Distance family searched.
    pub family: FamilyKind,
    /// Strategy that built the table.
    pub strategy: &'static str,
    /// Number of training series.
    pub n_series: usize,
    /// Chosen parameter id.
    pub best_param: usize,
    /// Value behind `best_param`.
    pub best_value: ParameterValue,
    /// Leave-one-out accuracy at `best_param`.
    pub loocv_accuracy: f64,
    /// Leave-one-out accuracy of every parameter id.
    pub accuracy_curve: Vec<f64>,
    /// Leave-one-out prediction of every training series at `best_param`.
    pub predictions: Vec<usize>,
    /// Work done while building the table.
    pub counters: SearchCounters,
    /// Wall-clock training time in seconds.
    pub elapsed_secs: f64,
}

/// Outcome of [`ElasticNn::evaluate`].
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Fraction of test series classified correctly.
    pub accuracy: f64,
    /// Predicted class of every test series.
    pub predictions: Vec<usize>,
    /// Confusion matrix of the predictions.
    pub confusion: ConfusionMatrix,
    /// Work done while classifying.
    pub counters: SearchCounters,
}

/// A fitted 1-NN classifier.
///
/// Keeps the training collection, its envelope cache and the table row of the
/// chosen parameter.
#[derive(Debug, Clone)]
pub struct ElasticNn<F> {
    family: F,
    collection: SeriesCollection,
    cache: EnvelopeCache,
    param: usize,
    training_slots: Vec<CandidateSlot>,
}

impl<F: DistanceFamily> ElasticNn<F> {
    /// Search every parameter of `family` by leave-one-out on `collection`
    /// with `strategy` and keep the best one.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`NnError::TooFewSeries`] | `collection` holds fewer than 2 series |
    /// | [`NnError::UnresolvedSlot`] | The strategy left a slot without a neighbour |
    #[instrument(skip_all, fields(family = %family.kind(), strategy = strategy.name(), n = collection.len()))]
    pub fn fit<S: TrainingStrategy>(
        family: F,
        collection: SeriesCollection,
        strategy: &S,
    ) -> Result<(Self, TrainingReport), NnError> {
        if collection.len() < 2 {
            return Err(NnError::TooFewSeries {
                n_series: collection.len(),
            });
        }
        let start = Instant::now();
        let cache = EnvelopeCache::new(&collection);
        let mut counters = SearchCounters::default();
        let table = strategy.build_table(&family, &collection, &cache, &mut counters);
        let selection = ParameterSelection::from_table(&table, collection.labels())?;
        let param = selection.best_param();

        let report = TrainingReport {
            family: family.kind(),
            strategy: strategy.name(),
            n_series: collection.len(),
            best_param: param,
            best_value: family.describe(param),
            loocv_accuracy: selection.best_accuracy(),
            accuracy_curve: selection.accuracy_curve().to_vec(),
            predictions: selection.best_predictions().to_vec(),
            counters,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        info!(
            best_param = param,
            best_value = %report.best_value,
            accuracy = report.loocv_accuracy,
            elapsed_secs = report.elapsed_secs,
            "training complete"
        );

        let model = Self {
            training_slots: table.row(param).to_vec(),
            family,
            collection,
            cache,
            param,
        };
        Ok((model, report))
    }

    /// Find every training series tied nearest to `query` at the chosen
    /// parameter.
    pub fn nearest(&self, query: TimeSeriesView<'_>, counters: &mut SearchCounters) -> CandidateSlot {
        let envelope = SeriesEnvelope::compute(query, self.family.envelope_window(self.param));
        let contexts: Vec<_> = (0..self.collection.len())
            .map(|j| {
                PairContext::new(
                    &self.family,
                    query.as_slice(),
                    self.collection.series(j).as_slice(),
                    EnvelopeSource::Fixed(&envelope),
                    self.cache.source(j),
                )
            })
            .collect();
        let mut assessors = vec![PairAssessor::new(); contexts.len()];

        let seed = contexts
            .iter()
            .zip(assessors.iter_mut())
            .map(|(ctx, assessor)| assessor.upper_bound(ctx, self.param, counters))
            .fold(f64::INFINITY, f64::min);

        let mut slot = CandidateSlot::new(self.collection.n_classes());
        for (j, (ctx, assessor)) in contexts.iter().zip(assessors.iter_mut()).enumerate() {
            let score = seed.min(slot.distance());
            if assessor.try_to_beat(ctx, score, self.param, counters) == Verdict::NewBest {
                if let (Some(distance), Some(floor)) = (assessor.distance(), assessor.validity_floor()) {
                    slot.offer(j, self.collection.label(j), distance, floor);
                }
            }
        }
        slot.confirm();
        slot
    }

    /// Predict the class of `query`: the majority class of its tied nearest
    /// training neighbours, the lowest class on ties.
    ///
    /// # Errors
    ///
    /// [`NnError::TooFewSeries`] if no training neighbour was found.
    pub fn predict(&self, query: TimeSeriesView<'_>) -> Result<usize, NnError> {
        self.predict_counted(query, &mut SearchCounters::default())
    }

    fn predict_counted(&self, query: TimeSeriesView<'_>, counters: &mut SearchCounters) -> Result<usize, NnError> {
        self.nearest(query, counters)
            .votes()
            .majority()
            .ok_or(NnError::TooFewSeries {
                n_series: self.collection.len(),
            })
    }

    /// Classify every series of `test` and score the predictions.
    ///
    /// # Errors
    ///
    /// [`NnError::EmptyTestSet`] if `test` holds no series.
    #[instrument(skip_all, fields(n_test = test.len(), param = self.param))]
    pub fn evaluate(&self, test: &SeriesCollection) -> Result<Evaluation, NnError> {
        let mut counters = SearchCounters::default();
        let predictions = (0..test.len())
            .map(|i| self.predict_counted(test.series(i), &mut counters))
            .collect::<Result<Vec<_>, _>>()?;
        let n_classes = self.collection.n_classes().max(test.n_classes());
        let confusion = ConfusionMatrix::from_predictions(test.labels(), &predictions, n_classes)?;
        let accuracy = confusion.accuracy();
        info!(accuracy, correct = confusion.correct(), total = confusion.total(), "evaluation complete");
        Ok(Evaluation {
            accuracy,
            predictions,
            confusion,
            counters,
        })
    }

    /// Return the chosen parameter id.
    #[must_use]
    pub fn param(&self) -> usize {
        self.param
    }

    /// Return the value behind the chosen parameter id.
    #[must_use]
    pub fn param_value(&self) -> ParameterValue {
        self.family.describe(self.param)
    }

    /// Return the distance family.
    #[must_use]
    pub fn family(&self) -> &F {
        &self.family
    }

    /// Return the leave-one-out slots of the training series at the chosen
    /// parameter.
    #[must_use]
    pub fn training_slots(&self) -> &[CandidateSlot] {
        &self.training_slots
    }
}
