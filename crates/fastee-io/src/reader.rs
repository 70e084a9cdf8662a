//! UCR archive reader with full input validation.

use std::path::{Path, PathBuf};

use fastee_distance::{SeriesCollection, TimeSeries};
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ClassMap, Dataset};

/// Reads one split (`_TRAIN` or `_TEST`) of a UCR archive dataset.
///
/// Expected format, no header:
/// - one series per line, first field the class label, remaining fields the samples
/// - fields separated by commas, tabs, or runs of spaces, detected from the
///   first non-blank line
/// - series may differ in length; trailing `NaN` samples are padding and are
///   dropped
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed record |
/// | [`IoError::EmptyDataset`] | No data rows |
/// | [`IoError::EmptyRow`] | A row has a label but no samples |
/// | [`IoError::NonFiniteValue`] | Sample is unparseable, infinite, or an interior `NaN` |
/// | [`IoError::UnknownLabel`] | A label is missing from a non-empty [`ClassMap`] |
pub struct UcrReader {
    path: PathBuf,
}

/// Rows of a file before labels are resolved.
struct RawRows {
    labels: Vec<String>,
    series: Vec<TimeSeries>,
}

impl UcrReader {
    /// Create a new reader for the given file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the file, resolving labels against `classes`.
    ///
    /// An empty `classes` is filled from this file's labels, the way a
    /// training split defines the classes. A non-empty one is only looked up.
    #[instrument(skip(self, classes), fields(path = %self.path.display()))]
    pub fn read(&self, classes: &mut ClassMap) -> Result<Dataset, IoError> {
        let rows = self.read_rows()?;
        if classes.is_empty() {
            *classes = ClassMap::from_labels(rows.labels.iter().map(String::as_str));
            debug!(n_classes = classes.len(), "class map built");
        }

        let labels = rows
            .labels
            .iter()
            .enumerate()
            .map(|(row_index, label)| {
                classes.index_of(label).ok_or_else(|| IoError::UnknownLabel {
                    path: self.path.clone(),
                    row_index,
                    label: label.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let collection = SeriesCollection::new(rows.series, labels, classes.len()).map_err(|e| {
            IoError::InvalidDataset {
                path: self.path.clone(),
                source: e,
            }
        })?;

        info!(
            n_series = collection.len(),
            n_classes = classes.len(),
            min_len = collection.min_len(),
            max_len = collection.max_len(),
            "dataset loaded"
        );
        Ok(Dataset {
            collection,
            classes: classes.clone(),
        })
    }

    /// Read a training split, defining the classes from its labels.
    pub fn read_train(&self) -> Result<Dataset, IoError> {
        self.read(&mut ClassMap::new())
    }

    /// Read a test split against the classes of its training split.
    pub fn read_test(&self, classes: &ClassMap) -> Result<Dataset, IoError> {
        let mut classes = classes.clone();
        self.read(&mut classes)
    }

    fn read_rows(&self) -> Result<RawRows, IoError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let delimiter = detect_delimiter(&content);
        debug!(delimiter = %char::from(delimiter).escape_default(), "delimiter detected");

        // Rows are ragged by nature; length checks happen per series.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut labels = Vec::new();
        let mut series = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            // A run of spaces yields empty fields between the samples.
            let mut fields = record.iter().filter(|f| delimiter != b' ' || !f.is_empty());
            let Some(label) = fields.next() else {
                continue;
            };
            if label.is_empty() && record.len() == 1 {
                continue;
            }
            let row_index = labels.len();
            let values = self.parse_samples(row_index, fields)?;
            let ts = TimeSeries::new(values).map_err(|_| IoError::EmptyRow {
                path: self.path.clone(),
                row_index,
            })?;

            labels.push(label.to_string());
            series.push(ts);
        }

        if series.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        Ok(RawRows { labels, series })
    }

    /// Parse the samples of one row, dropping trailing `NaN` padding.
    fn parse_samples<'r>(
        &self,
        row_index: usize,
        fields: impl Iterator<Item = &'r str>,
    ) -> Result<Vec<f64>, IoError> {
        let raw: Vec<&str> = fields.collect();
        let mut values = Vec::with_capacity(raw.len());
        for (col_index, cell) in raw.iter().enumerate() {
            let value: f64 = cell.parse().map_err(|_| IoError::NonFiniteValue {
                path: self.path.clone(),
                row_index,
                col_index,
                raw: cell.to_string(),
            })?;
            values.push(value);
        }

        while values.last().is_some_and(|v| v.is_nan()) {
            values.pop();
        }
        if let Some(col_index) = values.iter().position(|v| !v.is_finite()) {
            return Err(IoError::NonFiniteValue {
                path: self.path.clone(),
                row_index,
                col_index,
                raw: raw[col_index].to_string(),
            });
        }
        Ok(values)
    }
}

/// Pick the field separator from the first non-blank line: comma, then tab,
/// then space.
fn detect_delimiter(content: &str) -> u8 {
    let first = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first.contains(',') {
        b','
    } else if first.contains('\t') {
        b'\t'
    } else {
        b' '
    }
}
