use it_curve::{ChannelOutcome, ChannelPipeline, CurveError, TimeSeries, TimeSeriesStore};
use itscan_common::{
    SensorInfo, channel_map,
    metrics::{
        channels_excluded::{self, ExclusionKind},
        names::{CHANNELS_EXCLUDED, CHANNELS_PROCESSED, PLATEAUS_DETECTED, POINTS_DROPPED},
        points_dropped::{self, DropKind},
    },
};
use metrics::counter;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// The curve of one sensor with the registry entry describing it.
#[derive(Debug, Serialize)]
pub(crate) struct ChannelResult {
    pub(crate) label: String,
    pub(crate) sensor: Option<&'static SensorInfo>,
    #[serde(flatten)]
    pub(crate) outcome: ChannelOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Exclusion {
    pub(crate) channel: String,
    pub(crate) reason: ExclusionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) detail: Option<String>,
}

impl Exclusion {
    fn new(channel: &str, reason: ExclusionKind) -> Self {
        counter!(CHANNELS_EXCLUDED, &[channels_excluded::get_label(reason)]).increment(1);
        Self {
            channel: channel.to_owned(),
            reason,
            detail: None,
        }
    }

    fn with_detail(self, detail: String) -> Self {
        Self {
            detail: Some(detail),
            ..self
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScanReport {
    pub(crate) results: BTreeMap<String, ChannelResult>,
    pub(crate) excluded: Vec<Exclusion>,
}

impl ScanReport {
    /// Sensors for which no plateau at all was found.
    pub(crate) fn without_plateaus(&self) -> Vec<&str> {
        self.excluded
            .iter()
            .filter(|exclusion| exclusion.reason == ExclusionKind::NoPlateaus)
            .map(|exclusion| exclusion.channel.as_str())
            .collect()
    }
}

/// Renames each current series from its hardware id to the label of the sensor it biases.
#[instrument(skip_all, fields(channels = currents.len()))]
pub(crate) fn resolve_currents(
    currents: TimeSeriesStore,
    excluded: &mut Vec<Exclusion>,
) -> TimeSeriesStore {
    currents
        .into_iter()
        .filter_map(|series| match channel_map::resolve(series.channel()) {
            Some(sensor) => {
                debug!("{} resolved to {}", series.channel(), sensor.label);
                Some(series.with_channel(sensor.label))
            }
            None => {
                warn!("Hardware channel {} is not registered", series.channel());
                excluded.push(Exclusion::new(series.channel(), ExclusionKind::Unregistered));
                None
            }
        })
        .collect()
}

/// Pairs every temperature sensor with its current series, skipping those that cannot be processed.
fn pair_channels<'a>(
    temperatures: &'a TimeSeriesStore,
    currents: &'a TimeSeriesStore,
    deny_list: &[String],
    excluded: &mut Vec<Exclusion>,
) -> Vec<(&'a TimeSeries, &'a TimeSeries)> {
    for label in currents.channels() {
        if temperatures.get(label).is_none() {
            debug!("No temperature series for {label}");
        }
    }

    temperatures
        .iter()
        .filter_map(|temperature| {
            let label = temperature.channel();
            if deny_list.iter().any(|denied| denied == label) {
                warn!("Skipping {label}, it is on the deny-list");
                excluded.push(Exclusion::new(label, ExclusionKind::DenyListed));
                return None;
            }
            let Some(current) = currents.get(label) else {
                warn!("No current series for {label}");
                excluded.push(Exclusion::new(label, ExclusionKind::NoCurrentSeries));
                return None;
            };
            Some((temperature, current))
        })
        .collect()
}

fn record_outcome_metrics(outcome: &ChannelOutcome) {
    counter!(CHANNELS_PROCESSED).increment(1);
    counter!(PLATEAUS_DETECTED).increment(outcome.plateaus.len() as u64);
    let removed = &outcome.curve.removed;
    for (kind, count) in [
        (DropKind::Duplicate, removed.duplicate),
        (DropKind::Leakage, removed.leakage),
        (DropKind::Monotonicity, removed.monotonicity),
    ] {
        if count > 0 {
            counter!(POINTS_DROPPED, &[points_dropped::get_label(kind)]).increment(count as u64);
        }
    }
}

/// Runs the pipeline over every sensor in parallel.
///
/// Sensors with no plateaus, or that fail, are reported as excluded rather than aborting the scan.
#[instrument(skip_all, fields(
    temperature_channels = temperatures.len(),
    current_channels = currents.len()
))]
pub(crate) fn process_channels(
    pipeline: &ChannelPipeline,
    temperatures: &TimeSeriesStore,
    currents: TimeSeriesStore,
    deny_list: &[String],
) -> ScanReport {
    let mut report = ScanReport::default();
    let currents = resolve_currents(currents, &mut report.excluded);
    let pairs = pair_channels(temperatures, &currents, deny_list, &mut report.excluded);

    let outcomes: Vec<_> = pairs
        .par_iter()
        .map(|(temperature, current)| (temperature.channel(), pipeline.run(temperature, current)))
        .collect();

    for (label, outcome) in outcomes {
        match outcome {
            Ok(outcome) => {
                record_outcome_metrics(&outcome);
                report.results.insert(
                    label.to_owned(),
                    ChannelResult {
                        label: label.to_owned(),
                        sensor: channel_map::by_label(label),
                        outcome,
                    },
                );
            }
            Err(e @ CurveError::NoPlateaus { .. }) => {
                warn!("{e}");
                report
                    .excluded
                    .push(Exclusion::new(label, ExclusionKind::NoPlateaus));
            }
            Err(e) => {
                warn!("{label}: {e}");
                report
                    .excluded
                    .push(Exclusion::new(label, ExclusionKind::Failed).with_detail(e.to_string()));
            }
        }
    }

    info!(
        "{} sensors processed, {} channels excluded",
        report.results.len(),
        report.excluded.len()
    );
    report
}
