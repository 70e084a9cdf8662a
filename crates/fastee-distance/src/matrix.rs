//! Lower-triangular matrix of pairwise distances.

use rayon::prelude::*;
use tracing::instrument;

use crate::distance::Distance;
use crate::family::DistanceFamily;
use crate::series::TimeSeries;

/// Symmetric distance matrix stored as a lower-triangular flat vector.
///
/// For `n` series, stores `n*(n-1)/2` distances. Access is symmetric:
/// `get(i, j) == get(j, i)`. Diagonal is always zero. Entry `(i, j)` with
/// `i > j` is the distance with series `i` as the query.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<Distance>,
}

impl DistanceMatrix {
    /// Create a new distance matrix from pre-computed lower-triangular data.
    ///
    /// `data` must contain exactly `n*(n-1)/2` elements, stored as
    /// `data[row*(row-1)/2 + col]` where `row > col`.
    pub(crate) fn from_raw(n: usize, data: Vec<Distance>) -> Self {
        debug_assert_eq!(data.len(), n * n.saturating_sub(1) / 2);
        Self { n, data }
    }

    /// Compute every pairwise distance of `series` at parameter `id`.
    ///
    /// Rows are computed in parallel with rayon; each pair is aligned with the
    /// later series as the query, never abandoned.
    #[must_use]
    #[instrument(skip(family, series), fields(n = series.len(), family = %family.kind()))]
    pub fn compute<F>(family: &F, series: &[TimeSeries], id: usize) -> Self
    where
        F: DistanceFamily + ?Sized,
    {
        let n = series.len();
        let distances: Vec<Distance> = (1..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                (0..i).map(move |j| family.distance(series[i].as_view(), series[j].as_view(), id))
            })
            .collect();
        Self::from_raw(n, distances)
    }

    /// Return the number of series in the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the matrix is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the distance between series `i` and series `j`.
    ///
    /// Returns zero distance for `i == j` (diagonal).
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Distance {
        assert!(i < self.n, "row index {i} out of bounds for matrix of size {}", self.n);
        assert!(j < self.n, "column index {j} out of bounds for matrix of size {}", self.n);
        if i == j {
            return Distance::ZERO;
        }
        let (row, col) = if i > j { (i, j) } else { (j, i) };
        self.data[row * (row - 1) / 2 + col]
    }
}
