/// Errors from nearest-neighbour training and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum NnError {
    /// Returned when leave-one-out needs more series than were provided.
    #[error("leave-one-out needs at least 2 training series, got {n_series}")]
    TooFewSeries {
        /// Number of training series provided.
        n_series: usize,
    },

    /// Returned when a table slot never received a neighbour.
    #[error("no neighbour recorded for series {series} at parameter {param}")]
    UnresolvedSlot {
        /// Parameter id of the slot.
        param: usize,
        /// Series index of the slot.
        series: usize,
    },

    /// Returned when evaluation is asked to score zero test series.
    #[error("test set is empty")]
    EmptyTestSet,
}
