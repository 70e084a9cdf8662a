//! Discretized parameter grids.

use std::fmt;

use serde::Serialize;

use crate::error::DistanceError;

/// `groups x steps` parameter ids, `id = group * steps + step`.
///
/// Within a group, step 0 is the strictest value and step `steps - 1` the most
/// permissive: raising the step never increases the optimal distance. Groups
/// are unrelated to each other. A family without a monotone axis uses one
/// step per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterGrid {
    groups: usize,
    steps: usize,
}

impl ParameterGrid {
    /// Create a grid.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if either dimension is zero.
    pub fn new(groups: usize, steps: usize) -> Result<Self, DistanceError> {
        if groups == 0 || steps == 0 {
            return Err(DistanceError::InvalidGrid {
                reason: format!("grid needs at least one group and one step, got {groups}x{steps}"),
            });
        }
        Ok(Self { groups, steps })
    }

    /// Return the number of groups.
    #[must_use]
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Return the number of steps per group.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Return the total number of parameter ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups * self.steps
    }

    /// Always false for a constructed grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return true if groups carry a monotone axis (more than one step).
    #[must_use]
    pub fn is_monotone(&self) -> bool {
        self.steps > 1
    }

    /// Return the group of `id`.
    #[must_use]
    pub fn group_of(&self, id: usize) -> usize {
        id / self.steps
    }

    /// Return the step of `id` within its group.
    #[must_use]
    pub fn step_of(&self, id: usize) -> usize {
        id % self.steps
    }

    /// Return the id at `(group, step)`.
    #[must_use]
    pub fn id(&self, group: usize, step: usize) -> usize {
        debug_assert!(group < self.groups && step < self.steps);
        group * self.steps + step
    }

    /// Return the strictest id of the group containing `id`.
    #[must_use]
    pub fn group_start(&self, id: usize) -> usize {
        id - self.step_of(id)
    }

    /// Return true if `a` and `b` belong to the same group.
    #[must_use]
    pub fn same_group(&self, a: usize, b: usize) -> bool {
        self.group_of(a) == self.group_of(b)
    }

    /// Return the next looser id in the same group, if any.
    #[must_use]
    pub fn looser(&self, id: usize) -> Option<usize> {
        (self.step_of(id) + 1 < self.steps).then_some(id + 1)
    }

    /// Panic unless `id` is inside the grid.
    ///
    /// # Panics
    ///
    /// Panics if `id >= len()`.
    pub fn check(&self, id: usize) {
        assert!(id < self.len(), "parameter id {id} outside grid of {} ids", self.len());
    }
}

/// Human-readable value of one parameter id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterValue {
    /// DTW warping window radius.
    Window {
        /// Radius in samples.
        window: usize,
    },
    /// WDTW logistic weight steepness.
    Weight {
        /// Penalty steepness `g`.
        g: f64,
    },
    /// ERP gap value and band.
    GapBand {
        /// Gap value.
        gap: f64,
        /// Band radius in samples.
        band: usize,
    },
    /// LCSS matching threshold and window.
    EpsilonDelta {
        /// Value tolerance.
        epsilon: f64,
        /// Index tolerance.
        delta: usize,
    },
    /// MSM split/merge cost.
    Cost {
        /// Split/merge cost `c`.
        cost: f64,
    },
    /// TWE stiffness and deletion penalty.
    StiffnessPenalty {
        /// Stiffness `nu`.
        nu: f64,
        /// Deletion penalty `lambda`.
        lambda: f64,
    },
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window { window } => write!(f, "window={window}"),
            Self::Weight { g } => write!(f, "g={g}"),
            Self::GapBand { gap, band } => write!(f, "gap={gap:.6} band={band}"),
            Self::EpsilonDelta { epsilon, delta } => write!(f, "epsilon={epsilon:.6} delta={delta}"),
            Self::Cost { cost } => write!(f, "c={cost:.4}"),
            Self::StiffnessPenalty { nu, lambda } => write!(f, "nu={nu} lambda={lambda:.6}"),
        }
    }
}

/// Return the id of the smallest step in `group_start..` whose axis value
/// covers `deviation`.
///
/// `axis` holds the step values of one group, non-decreasing. Used by the
/// windowed families to turn a path's maximum deviation into a validity floor.
#[must_use]
pub fn window_floor(group_start: usize, axis: &[usize], deviation: usize) -> usize {
    group_start + axis.partition_point(|&w| w < deviation)
}
