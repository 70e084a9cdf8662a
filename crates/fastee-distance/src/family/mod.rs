//! The distance family contract and its six implementations.
//!
//! A family owns its parameter grid and exposes, cheapest first, the bound
//! stages the progressive assessor walks through before paying for a full
//! alignment. Every `align` is a rolling two-row dynamic program that also
//! reports the validity floor of its result: the strictest parameter id of
//! the group at which the same distance is still optimal.

mod cell;
mod dtw;
mod erp;
mod lcss;
mod msm;
mod twe;
mod wdtw;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::collection::SeriesCollection;
use crate::constraint::BandConstraint;
use crate::distance::Distance;
use crate::error::DistanceError;
use crate::grid::{ParameterGrid, ParameterValue};
use crate::series::TimeSeriesView;

pub use dtw::DtwFamily;
pub use erp::ErpFamily;
pub use lcss::LcssFamily;
pub use msm::MsmFamily;
pub use twe::TweFamily;
pub use wdtw::WdtwFamily;

/// A lower-bound stage a family supports before the full alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundStage {
    /// O(1) bound from the series endpoints.
    Kim,
    /// Keogh-style bound of the query against the reference envelope.
    QueryEnvelope,
    /// Keogh-style bound of the reference against the query envelope.
    ReferenceEnvelope,
}

/// Outcome of an early-abandoning alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    /// The alignment finished.
    Complete {
        /// Exact distance at the requested parameter.
        distance: f64,
        /// Strictest id of the same group at which `distance` stays exact.
        floor: usize,
    },
    /// Every path was proven to cost more than the cutoff.
    Abandoned {
        /// Cost every path already exceeds, above the cutoff.
        lower_bound: f64,
    },
}

/// An elastic distance with a discretized hyper-parameter.
///
/// Parameter ids outside [`DistanceFamily::grid`] are a caller bug and panic.
/// The query is always the first series argument. Bound methods never
/// exceed the value `align` would return for the same arguments, up to
/// floating-point rounding.
pub trait DistanceFamily: Send + Sync {
    /// Return which family this is.
    fn kind(&self) -> FamilyKind;

    /// Return the parameter grid.
    fn grid(&self) -> ParameterGrid;

    /// Return the parameter value behind `id`.
    fn describe(&self, id: usize) -> ParameterValue;

    /// Return the supported bound stages, cheapest first.
    fn bound_stages(&self) -> &'static [BoundStage];

    /// O(1) endpoint lower bound.
    fn kim_bound(&self, _query: &[f64], _reference: &[f64], _id: usize) -> f64 {
        0.0
    }

    /// Window of the envelope consulted by the envelope stages at `id`.
    fn envelope_window(&self, _id: usize) -> BandConstraint {
        BandConstraint::Unconstrained
    }

    /// Contribution of one sample against the other series' envelope.
    fn envelope_term(&self, _value: f64, _lower: f64, _upper: f64, _id: usize) -> f64 {
        0.0
    }

    /// Convert a sum of envelope terms over a series of `len` samples into a
    /// distance lower bound.
    fn bound_from_partial(&self, partial: f64, _len: usize) -> f64 {
        partial
    }

    /// Cost of a cheap admissible alignment, an upper bound on the distance.
    fn upper_bound(&self, query: &[f64], reference: &[f64], id: usize) -> f64;

    /// Ids sharing a key share the same upper bound value.
    fn upper_bound_key(&self, _id: usize) -> usize {
        0
    }

    /// Align `query` with `reference` at `id`, abandoning once every path
    /// costs more than `cutoff`.
    ///
    /// An abandoned alignment reports a lower bound that also holds at every
    /// stricter id of the group.
    fn align(&self, query: &[f64], reference: &[f64], id: usize, cutoff: f64) -> Alignment;

    /// Exact distance at `id`, never abandoned.
    fn distance(&self, query: TimeSeriesView<'_>, reference: TimeSeriesView<'_>, id: usize) -> Distance {
        match self.align(query.as_slice(), reference.as_slice(), id, f64::INFINITY) {
            Alignment::Complete { distance, .. } => Distance::new(distance),
            Alignment::Abandoned { .. } => Distance::INFINITY,
        }
    }
}

/// Name of a distance family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    /// Dynamic time warping with a Sakoe-Chiba window.
    Dtw,
    /// Weighted DTW with a logistic penalty on warping distance.
    Wdtw,
    /// Edit distance with real penalty.
    Erp,
    /// Longest common subsequence.
    Lcss,
    /// Move-split-merge.
    Msm,
    /// Time warp edit distance.
    Twe,
}

impl FamilyKind {
    /// Every family, in display order.
    pub const ALL: [Self; 6] = [Self::Dtw, Self::Wdtw, Self::Erp, Self::Lcss, Self::Msm, Self::Twe];

    /// Return the lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dtw => "dtw",
            Self::Wdtw => "wdtw",
            Self::Erp => "erp",
            Self::Lcss => "lcss",
            Self::Msm => "msm",
            Self::Twe => "twe",
        }
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyKind {
    type Err = DistanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DistanceError::UnknownFamily { name: s.to_string() })
    }
}

/// Options for [`Family::build`].
///
/// | Field | Default | Used by |
/// |---|---|---|
/// | `window_steps` | 100 | DTW |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyOptions {
    /// Number of DTW windows between 0 and the longest series length.
    pub window_steps: usize,
}

impl Default for FamilyOptions {
    fn default() -> Self {
        Self { window_steps: 100 }
    }
}

/// Any of the six families, chosen at run time.
#[derive(Debug, Clone)]
pub enum Family {
    /// See [`DtwFamily`].
    Dtw(DtwFamily),
    /// See [`WdtwFamily`].
    Wdtw(WdtwFamily),
    /// See [`ErpFamily`].
    Erp(ErpFamily),
    /// See [`LcssFamily`].
    Lcss(LcssFamily),
    /// See [`MsmFamily`].
    Msm(MsmFamily),
    /// See [`TweFamily`].
    Twe(TweFamily),
}

impl Family {
    /// Build the default grid of `kind` for `collection`.
    ///
    /// DTW and WDTW scale with the longest series; ERP and LCSS also scale
    /// their value thresholds with the pooled standard deviation.
    ///
    /// # Errors
    ///
    /// [`DistanceError::InvalidGrid`] if the options describe an empty grid.
    pub fn build(
        kind: FamilyKind,
        collection: &SeriesCollection,
        options: FamilyOptions,
    ) -> Result<Self, DistanceError> {
        Ok(match kind {
            FamilyKind::Dtw => Self::Dtw(DtwFamily::from_collection(collection, options.window_steps)?),
            FamilyKind::Wdtw => Self::Wdtw(WdtwFamily::from_collection(collection)?),
            FamilyKind::Erp => Self::Erp(ErpFamily::from_collection(collection)?),
            FamilyKind::Lcss => Self::Lcss(LcssFamily::from_collection(collection)?),
            FamilyKind::Msm => Self::Msm(MsmFamily::new()?),
            FamilyKind::Twe => Self::Twe(TweFamily::new()?),
        })
    }
}

macro_rules! delegate {
    ($self:ident, $family:ident => $call:expr) => {
        match $self {
            Family::Dtw($family) => $call,
            Family::Wdtw($family) => $call,
            Family::Erp($family) => $call,
            Family::Lcss($family) => $call,
            Family::Msm($family) => $call,
            Family::Twe($family) => $call,
        }
    };
}

impl DistanceFamily for Family {
    fn kind(&self) -> FamilyKind {
        delegate!(self, f => f.kind())
    }

    fn grid(&self) -> ParameterGrid {
        delegate!(self, f => f.grid())
    }

    fn describe(&self, id: usize) -> ParameterValue {
        delegate!(self, f => f.describe(id))
    }

    fn bound_stages(&self) -> &'static [BoundStage] {
        delegate!(self, f => f.bound_stages())
    }

    fn kim_bound(&self, query: &[f64], reference: &[f64], id: usize) -> f64 {
        delegate!(self, f => f.kim_bound(query, reference, id))
    }

    fn envelope_window(&self, id: usize) -> BandConstraint {
        delegate!(self, f => f.envelope_window(id))
    }

    fn envelope_term(&self, value: f64, lower: f64, upper: f64, id: usize) -> f64 {
        delegate!(self, f => f.envelope_term(value, lower, upper, id))
    }

    fn bound_from_partial(&self, partial: f64, len: usize) -> f64 {
        delegate!(self, f => f.bound_from_partial(partial, len))
    }

    fn upper_bound(&self, query: &[f64], reference: &[f64], id: usize) -> f64 {
        delegate!(self, f => f.upper_bound(query, reference, id))
    }

    fn upper_bound_key(&self, id: usize) -> usize {
        delegate!(self, f => f.upper_bound_key(id))
    }

    fn align(&self, query: &[f64], reference: &[f64], id: usize, cutoff: f64) -> Alignment {
        delegate!(self, f => f.align(query, reference, id, cutoff))
    }
}

/// Evenly spaced thresholds `scale * (0.2 + 0.8 * i / (count - 1))`, shared by
/// the ERP gap values and LCSS epsilons.
pub(crate) fn scaled_thresholds(scale: f64, count: usize) -> Vec<f64> {
    let denom = count.saturating_sub(1).max(1) as f64;
    (0..count).map(|i| scale * (0.2 + 0.8 * i as f64 / denom)).collect()
}

/// Bands `ceil(fraction * len * j / (count - 1))` for `j` in `0..count`,
/// shared by ERP and LCSS.
pub(crate) fn fractional_bands(len: usize, fraction: f64, count: usize) -> Vec<usize> {
    let denom = count.saturating_sub(1).max(1) as f64;
    (0..count)
        .map(|j| (fraction * len as f64 * j as f64 / denom).ceil() as usize)
        .collect()
}

/// Reject empty axes and axes that are not ordered strict to loose.
pub(crate) fn check_axis<T: PartialOrd + fmt::Debug>(
    name: &str,
    values: &[T],
    ascending: bool,
) -> Result<(), DistanceError> {
    if values.is_empty() {
        return Err(DistanceError::InvalidGrid {
            reason: format!("{name} list is empty"),
        });
    }
    let ordered = values.windows(2).all(|w| {
        if ascending {
            w[0] <= w[1]
        } else {
            w[0] >= w[1]
        }
    });
    if !ordered {
        let order = if ascending { "ascending" } else { "descending" };
        return Err(DistanceError::InvalidGrid {
            reason: format!("{name} values must be {order}, got {values:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::series::TimeSeries;

    fn collection() -> SeriesCollection {
        let series = vec![
            TimeSeries::new(vec![0.0, 1.0, 2.0, 1.0, 0.0]).unwrap(),
            TimeSeries::new(vec![1.0, 1.0, 0.0, -1.0, 0.5]).unwrap(),
        ];
        SeriesCollection::new(series, vec![0, 1], 2).unwrap()
    }

    #[test]
    fn kind_round_trips_through_name() {
        for kind in FamilyKind::ALL {
            assert_eq!(kind.as_str().parse::<FamilyKind>().unwrap(), kind);
        }
        assert_eq!("DTW".parse::<FamilyKind>().unwrap(), FamilyKind::Dtw);
        assert!(matches!(
            "euclid".parse::<FamilyKind>(),
            Err(DistanceError::UnknownFamily { .. })
        ));
    }

    #[test]
    fn build_every_family() {
        let c = collection();
        for kind in FamilyKind::ALL {
            let family = Family::build(kind, &c, FamilyOptions::default()).unwrap();
            assert_eq!(family.kind(), kind);
            assert!(!family.grid().is_empty());
            let d = family.distance(c.series(0), c.series(1), family.grid().len() - 1);
            assert!(d.value().is_finite() && d.value() >= 0.0, "{kind}: {d}");
        }
    }

    #[test]
    fn thresholds_and_bands() {
        assert_eq!(scaled_thresholds(1.0, 2), vec![0.2, 1.0]);
        assert_eq!(fractional_bands(100, 0.25, 10)[9], 25);
        assert_eq!(fractional_bands(100, 0.25, 10)[0], 0);
    }

    #[test]
    fn check_axis_rejects_unordered() {
        assert!(check_axis("band", &[0, 2, 1], true).is_err());
        assert!(check_axis("cost", &[3.0, 2.0, 2.0], false).is_ok());
        assert!(check_axis::<usize>("band", &[], true).is_err());
    }
}
