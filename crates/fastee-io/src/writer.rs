//! JSON and CSV writers for search and evaluation outputs.

use std::fs;
use std::path::{Path, PathBuf};

use fastee_distance::DistanceFamily;
use fastee_nn::{ClassMetrics, ConfusionMatrix, Evaluation, SearchCounters, TrainingReport};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ClassMap, ExperimentName};

/// Writes parameter-search and evaluation results.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_search.json`,
/// `{experiment}_curve.csv` and `{experiment}_evaluate.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the experiment name.
    #[must_use]
    pub fn experiment(&self) -> &ExperimentName {
        &self.experiment
    }

    /// Write a training report to `{experiment}_search.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_search(&self, report: &TrainingReport, classes: &ClassMap) -> Result<PathBuf, IoError> {
        let path = self.file("search.json");
        let artifact = SearchArtifact {
            experiment: self.experiment.as_str(),
            class_labels: classes.labels(),
            report,
        };
        write_json(&path, &artifact)?;
        info!(path = %path.display(), "search result written");
        Ok(path)
    }

    /// Write the leave-one-out accuracy of every parameter id to
    /// `{experiment}_curve.csv`, with columns `param,description,accuracy`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteCsv`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_curve<F>(&self, report: &TrainingReport, family: &F) -> Result<PathBuf, IoError>
    where
        F: DistanceFamily + ?Sized,
    {
        let path = self.file("curve.csv");
        let csv_error = |e: csv::Error| IoError::WriteCsv {
            path: path.clone(),
            source: e,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_error)?;
        for (param, &accuracy) in report.accuracy_curve.iter().enumerate() {
            wtr.serialize(CurveRow {
                param,
                description: family.describe(param).to_string(),
                accuracy,
            })
            .map_err(csv_error)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), rows = report.accuracy_curve.len(), "accuracy curve written");
        Ok(path)
    }

    /// Write a test-set evaluation to `{experiment}_evaluate.json`.
    ///
    /// Predictions are written as raw labels through `classes`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_evaluation(&self, evaluation: &Evaluation, classes: &ClassMap) -> Result<PathBuf, IoError> {
        let path = self.file("evaluate.json");
        let predicted_labels = evaluation
            .predictions
            .iter()
            .map(|&class| classes.label(class).unwrap_or_default())
            .collect();

        let artifact = EvaluateArtifact {
            experiment: self.experiment.as_str(),
            n_test: evaluation.predictions.len(),
            accuracy: evaluation.accuracy,
            error_rate: 1.0 - evaluation.accuracy,
            class_labels: classes.labels(),
            confusion_matrix: &evaluation.confusion,
            class_metrics: evaluation.confusion.class_metrics(),
            predicted_labels,
            counters: &evaluation.counters,
        };
        write_json(&path, &artifact)?;
        info!(path = %path.display(), accuracy = evaluation.accuracy, "evaluation result written");
        Ok(path)
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| IoError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for serialization ---

#[derive(Serialize)]
struct SearchArtifact<'a> {
    experiment: &'a str,
    class_labels: &'a [String],
    #[serde(flatten)]
    report: &'a TrainingReport,
}

#[derive(Serialize)]
struct CurveRow {
    param: usize,
    description: String,
    accuracy: f64,
}

#[derive(Serialize)]
struct EvaluateArtifact<'a> {
    experiment: &'a str,
    n_test: usize,
    accuracy: f64,
    error_rate: f64,
    class_labels: &'a [String],
    confusion_matrix: &'a ConfusionMatrix,
    class_metrics: Vec<ClassMetrics>,
    predicted_labels: Vec<&'a str>,
    counters: &'a SearchCounters,
}
