//! Leave-one-out accuracy per parameter and selection of the best one.

use tracing::{info, instrument};

use crate::error::NnError;
use crate::table::NeighborTable;

/// Leave-one-out predictions and accuracy for every parameter id.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSelection {
    best_param: usize,
    curve: Vec<f64>,
    predictions: Vec<Vec<usize>>,
}

impl ParameterSelection {
    /// Score every parameter of `table` against `labels`.
    ///
    /// Each series is predicted as the majority class of its tied nearest
    /// neighbours, the lowest class on ties. The best parameter is the first
    /// id with the highest accuracy.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`NnError::TooFewSeries`] | The table holds fewer than 2 series |
    /// | [`NnError::UnresolvedSlot`] | A slot has no neighbour |
    #[instrument(skip_all, fields(params = table.n_params(), n = table.n_series()))]
    pub fn from_table(table: &NeighborTable, labels: &[usize]) -> Result<Self, NnError> {
        let n = table.n_series();
        if n < 2 {
            return Err(NnError::TooFewSeries { n_series: n });
        }
        debug_assert_eq!(labels.len(), n);

        let mut curve = Vec::with_capacity(table.n_params());
        let mut predictions = Vec::with_capacity(table.n_params());
        for param in 0..table.n_params() {
            let predicted = table
                .row(param)
                .iter()
                .enumerate()
                .map(|(series, slot)| {
                    slot.votes()
                        .majority()
                        .ok_or(NnError::UnresolvedSlot { param, series })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let correct = predicted.iter().zip(labels).filter(|(p, l)| p == l).count();
            curve.push(correct as f64 / n as f64);
            predictions.push(predicted);
        }

        let mut best_param = 0;
        for (param, &accuracy) in curve.iter().enumerate() {
            if accuracy > curve[best_param] {
                best_param = param;
            }
        }
        info!(best_param, accuracy = curve[best_param], "selected parameter");

        Ok(Self {
            best_param,
            curve,
            predictions,
        })
    }

    /// Return the id with the best leave-one-out accuracy.
    #[must_use]
    pub fn best_param(&self) -> usize {
        self.best_param
    }

    /// Return the accuracy at [`best_param`](Self::best_param).
    #[must_use]
    pub fn best_accuracy(&self) -> f64 {
        self.curve[self.best_param]
    }

    /// Return the leave-one-out predictions at the best parameter.
    #[must_use]
    pub fn best_predictions(&self) -> &[usize] {
        &self.predictions[self.best_param]
    }

    /// Return the accuracy of every parameter id.
    #[must_use]
    pub fn accuracy_curve(&self) -> &[f64] {
        &self.curve
    }

    /// Return the leave-one-out predictions at `param`.
    ///
    /// # Panics
    ///
    /// Panics if `param` is outside the table.
    #[must_use]
    pub fn predictions(&self, param: usize) -> &[usize] {
        &self.predictions[param]
    }
}
