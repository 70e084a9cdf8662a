//! Dataset loading, label mapping, and result serialization for fastee.
//!
//! Reads UCR archive splits into validated [`SeriesCollection`](fastee_distance::SeriesCollection)s
//! and writes training reports, accuracy curves, and evaluations.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{ClassMap, Dataset, ExperimentName};
pub use error::IoError;
pub use reader::UcrReader;
pub use writer::ResultWriter;
