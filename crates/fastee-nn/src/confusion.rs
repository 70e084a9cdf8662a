//! Confusion matrix of a test-set evaluation.

use std::fmt;

use serde::Serialize;

use crate::error::NnError;

/// Counts of `(true class, predicted class)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    n_classes: usize,
    rows: Vec<Vec<usize>>,
}

/// Precision, recall and F1 of one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    /// Class index.
    pub class: usize,
    /// Correct predictions of the class over all predictions of it, 0 if none.
    pub precision: f64,
    /// Correct predictions of the class over its true samples, 0 if none.
    pub recall: f64,
    /// Harmonic mean of precision and recall, 0 if both are 0.
    pub f1: f64,
    /// Number of true samples of the class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Count every `(truth[i], predicted[i])` pair.
    ///
    /// # Errors
    ///
    /// [`NnError::EmptyTestSet`] if `truth` is empty.
    pub fn from_predictions(truth: &[usize], predicted: &[usize], n_classes: usize) -> Result<Self, NnError> {
        if truth.is_empty() {
            return Err(NnError::EmptyTestSet);
        }
        debug_assert_eq!(truth.len(), predicted.len());
        let mut rows = vec![vec![0; n_classes]; n_classes];
        for (&t, &p) in truth.iter().zip(predicted) {
            rows[t][p] += 1;
        }
        Ok(Self { n_classes, rows })
    }

    /// Return how often class `truth` was predicted as `predicted`.
    #[must_use]
    pub fn get(&self, truth: usize, predicted: usize) -> usize {
        self.rows[truth][predicted]
    }

    /// Return the number of evaluated series.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.iter().flatten().sum()
    }

    /// Return the number of correct predictions.
    #[must_use]
    pub fn correct(&self) -> usize {
        (0..self.n_classes).map(|c| self.rows[c][c]).sum()
    }

    /// Return the fraction of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct() as f64 / total as f64,
        }
    }

    /// Return per-class precision, recall, F1 and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        (0..self.n_classes)
            .map(|class| {
                let hits = self.rows[class][class];
                let predicted: usize = self.rows.iter().map(|row| row[class]).sum();
                let support: usize = self.rows[class].iter().sum();
                let precision = ratio(hits, predicted);
                let recall = ratio(hits, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for c in 0..self.n_classes {
            write!(f, " pred_{c:>3}")?;
        }
        writeln!(f)?;
        for (c, row) in self.rows.iter().enumerate() {
            write!(f, "true_{c:>3}")?;
            for count in row {
                write!(f, " {count:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
