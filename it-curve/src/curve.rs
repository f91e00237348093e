use crate::correlation::AlignedPoint;
use itertools::Itertools;
use itscan_common::Real;
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Eq, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    Positive,
    /// The supply reports leakage as a negative current.
    Negative,
}

impl Polarity {
    fn apply(self, current: Real) -> Real {
        match self {
            Polarity::Positive => current,
            Polarity::Negative => -current,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CurveParameters {
    /// Points whose current magnitude is strictly below this are dropped.
    pub leakage_threshold: Real,
    /// A drop between consecutive currents larger than this percentage ends the curve.
    pub max_drop_percent: Real,
    pub polarity: Polarity,
    /// Drop points whose current repeats an earlier one to 5 decimal places.
    pub dedup_currents: bool,
}

impl Default for CurveParameters {
    fn default() -> Self {
        Self {
            leakage_threshold: 0.01,
            max_drop_percent: 7.0,
            polarity: Polarity::Positive,
            dedup_currents: true,
        }
    }
}

/// Number of points removed by each filtering step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Removed {
    pub duplicate: usize,
    pub leakage: usize,
    pub monotonicity: usize,
}

impl Removed {
    pub fn total(&self) -> usize {
        self.duplicate + self.leakage + self.monotonicity
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Curve {
    pub channel: String,
    /// Ascending by current magnitude.
    pub points: Vec<AlignedPoint>,
    pub removed: Removed,
}

#[derive(Clone, Debug, Default)]
pub struct CurveFilter {
    parameters: CurveParameters,
}

impl CurveFilter {
    pub fn new(parameters: CurveParameters) -> Self {
        Self { parameters }
    }

    /// Length of the prefix of `points` that survives the monotonicity cutoff.
    fn monotone_prefix(&self, points: &[AlignedPoint]) -> usize {
        points
            .iter()
            .tuple_windows()
            .position(|(cur, next)| {
                if next.current >= cur.current {
                    return false;
                }
                let drop = if cur.current == 0.0 {
                    Real::INFINITY
                } else {
                    100.0 * (next.current - cur.current).abs() / cur.current.abs()
                };
                drop > self.parameters.max_drop_percent
            })
            .map_or(points.len(), |index| index + 1)
    }

    pub fn filter(&self, channel: &str, points: Vec<AlignedPoint>) -> Curve {
        let mut removed = Removed::default();
        let initial = points.len();

        let points = points.into_iter().map(|point| AlignedPoint {
            current: self.parameters.polarity.apply(point.current),
            ..point
        });
        let mut points: Vec<_> = if self.parameters.dedup_currents {
            points
                .unique_by(|point| (point.current * 1e5).round() as i64)
                .collect()
        } else {
            points.collect()
        };
        removed.duplicate = initial - points.len();

        let before_leakage = points.len();
        points.retain(|point| point.current.abs() >= self.parameters.leakage_threshold);
        removed.leakage = before_leakage - points.len();

        points.sort_by(|a, b| a.current.abs().total_cmp(&b.current.abs()));
        let keep = self.monotone_prefix(&points);
        removed.monotonicity = points.len() - keep;
        points.truncate(keep);

        if removed.total() > 0 {
            debug!(channel, ?removed, kept = points.len(), "Curve filtered");
        }
        Curve {
            channel: channel.to_owned(),
            points,
            removed,
        }
    }
}
