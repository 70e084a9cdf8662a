//! I/O error types for fastee-io.

use std::path::PathBuf;

use fastee_distance::DistanceError;

/// Errors from dataset loading, label mapping, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the dataset file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the file holds no series.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the dataset file.
        path: PathBuf,
    },

    /// Returned when a row has a label but no samples.
    #[error("row {row_index} in {path} has no samples")]
    EmptyRow {
        /// Path to the dataset file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when a sample is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the dataset file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Zero-based sample index (excluding the label column).
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a test label was never seen in the training file.
    #[error("unknown class label \"{label}\" in {path} at row {row_index}")]
    UnknownLabel {
        /// Path to the dataset file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// The unmapped label.
        label: String,
    },

    /// Returned when the loaded rows do not form a valid collection.
    #[error("invalid dataset in {path}")]
    InvalidDataset {
        /// Path to the dataset file.
        path: PathBuf,
        /// Underlying validation error.
        source: DistanceError,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV result row cannot be written.
    #[error("cannot write CSV file {path}")]
    WriteCsv {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a result cannot be serialized to JSON.
    #[error("cannot serialize result for {path}")]
    Serialize {
        /// Destination of the result.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
}
