//! Detection of stable temperature plateaus.
//!
//! A scan usually holds the cooling plant at a set of fixed temperatures.
//! Each hold shows up in the temperature series as a run of samples that
//! stay close to the first sample of the run. The detector finds such runs,
//! and the merger cleans up the repeated short runs a plant produces when it
//! oscillates around its setpoint:
//! ```rust
//! # use it_curve::{PlateauFilter, OscillationMerger, MergeParameters, PlateauParameters, TimeSeries};
//! # let series = TimeSeries::default();
//! let candidates = series.plateaus(&PlateauParameters::default()).collect();
//! let plateaus = OscillationMerger::new(MergeParameters::default()).merge(candidates);
//! ```
mod detector;
mod merger;

pub use detector::{PlateauFilter, PlateauScan};
pub use merger::OscillationMerger;

use itscan_common::{Real, Seconds, format_time_of_day};
use serde::Serialize;
use std::fmt::Display;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlateauParameters {
    /// A sample belongs to the run while it is strictly closer than this to the anchor.
    pub max_delta: Real,
    /// Runs must contain more samples than this.
    pub min_run_length: usize,
    /// After a plateau, skip ahead at least this long before looking for the next one.
    pub leap: Seconds,
}

impl Default for PlateauParameters {
    fn default() -> Self {
        Self {
            max_delta: 0.3,
            min_run_length: 10,
            leap: 90,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeParameters {
    /// Plateaus whose means round to the same multiple of this are considered the same value.
    pub resolution: Real,
    /// Plateaus further apart than this are never merged.
    pub max_gap: Seconds,
    pub min_duration: Seconds,
}

impl Default for MergeParameters {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_gap: 600,
            min_duration: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Plateau {
    pub channel: String,
    /// The anchor sample's value.
    pub value: Real,
    pub mean: Real,
    pub start: Seconds,
    pub end: Seconds,
    pub duration: Seconds,
    pub samples: usize,
}

impl Plateau {
    pub(crate) fn merge_key(&self, resolution: Real) -> i64 {
        (self.mean / resolution).round() as i64
    }
}

impl Display for Plateau {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:.2} from {} to {} ({} samples)",
            self.channel,
            self.mean,
            format_time_of_day(self.start),
            format_time_of_day(self.end),
            self.samples
        )
    }
}

pub(crate) fn round_to_hundredths(value: Real) -> Real {
    (value * 100.0).round() / 100.0
}
