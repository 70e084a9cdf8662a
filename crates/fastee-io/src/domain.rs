//! Domain types for fastee-io.

use std::cmp::Ordering;

use fastee_distance::SeriesCollection;
use serde::Serialize;

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping between raw class labels and dense class indices `0..len`.
///
/// Built from the training labels. When every label parses as a number the
/// classes are ordered numerically and looked up by value, so `"1"` and
/// `"1.0"` name the same class. Otherwise labels are ordered
/// lexicographically and matched verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassMap {
    labels: Vec<String>,
    #[serde(skip)]
    numeric: Option<Vec<f64>>,
}

impl ClassMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from the raw labels of a training file.
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let raw: Vec<&str> = labels.into_iter().map(str::trim).collect();
        let parsed: Option<Vec<f64>> = raw.iter().map(|l| l.parse::<f64>().ok()).collect();

        match parsed {
            Some(values) => {
                let mut pairs: Vec<(f64, &str)> = values.into_iter().zip(raw).collect();
                pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
                pairs.dedup_by(|a, b| a.0.total_cmp(&b.0) == Ordering::Equal);
                Self {
                    labels: pairs.iter().map(|&(_, l)| l.to_string()).collect(),
                    numeric: Some(pairs.iter().map(|&(v, _)| v).collect()),
                }
            }
            None => {
                let mut labels: Vec<String> = raw.into_iter().map(str::to_string).collect();
                labels.sort();
                labels.dedup();
                Self {
                    labels,
                    numeric: None,
                }
            }
        }
    }

    /// Return the class index of `label`, if known.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        match &self.numeric {
            Some(values) => {
                let value = label.parse::<f64>().ok()?;
                values
                    .binary_search_by(|probe| probe.total_cmp(&value))
                    .ok()
            }
            None => self.labels.binary_search_by(|probe| probe.as_str().cmp(label)).ok(),
        }
    }

    /// Return the raw label of class `index`.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Return every raw label in class-index order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Return the number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Return true if no label has been mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A labelled dataset loaded from one UCR file.
///
/// Produced by [`UcrReader`](crate::UcrReader). Class indices of
/// `collection` refer to `classes`.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Validated series and their class indices, in file order.
    pub collection: SeriesCollection,
    /// Label mapping the class indices were resolved against.
    pub classes: ClassMap,
}
