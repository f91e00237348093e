use itscan_common::{Real, Seconds};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub time: Seconds,
    pub value: Real,
}

impl Sample {
    pub fn new(time: Seconds, value: Real) -> Self {
        Self { time, value }
    }
}

impl From<(Seconds, Real)> for Sample {
    fn from((time, value): (Seconds, Real)) -> Self {
        Self { time, value }
    }
}

/// The samples of one channel, ordered by non-decreasing time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeries {
    channel: String,
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Builds a series, stably sorting the samples by time if they are not already ordered.
    pub fn new(channel: impl Into<String>, mut samples: Vec<Sample>) -> Self {
        if !samples.is_sorted_by_key(|s| s.time) {
            samples.sort_by_key(|s| s.time);
        }
        Self {
            channel: channel.into(),
            samples,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the samples with `start <= time < end`.
    pub fn window(&self, start: Seconds, end: Seconds) -> &[Sample] {
        let lower = self.samples.partition_point(|s| s.time < start);
        let upper = self.samples.partition_point(|s| s.time < end).max(lower);
        self.samples.get(lower..upper).unwrap_or_default()
    }

    /// Renames the series, used when a hardware id is resolved to a sensor label.
    pub fn with_channel(self, channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..self
        }
    }
}

/// Channel-keyed collection of series, as produced by decoding one kind of input file.
#[derive(Clone, Debug, Default)]
pub struct TimeSeriesStore {
    series: BTreeMap<String, TimeSeries>,
}

impl TimeSeriesStore {
    pub fn insert(&mut self, series: TimeSeries) -> Option<TimeSeries> {
        self.series.insert(series.channel.clone(), series)
    }

    pub fn get(&self, channel: &str) -> Option<&TimeSeries> {
        self.series.get(channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSeries> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<TimeSeries> for TimeSeriesStore {
    fn from_iter<T: IntoIterator<Item = TimeSeries>>(iter: T) -> Self {
        Self {
            series: iter
                .into_iter()
                .map(|series| (series.channel.clone(), series))
                .collect(),
        }
    }
}

impl IntoIterator for TimeSeriesStore {
    type Item = TimeSeries;
    type IntoIter = std::collections::btree_map::IntoValues<String, TimeSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.into_values()
    }
}

#[cfg(test)]
pub(crate) fn series_from(channel: &str, data: &[(Seconds, Real)]) -> TimeSeries {
    TimeSeries::new(channel, data.iter().copied().map(Sample::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_samples_are_stably_sorted() {
        let series = series_from("VL01_CT", &[(20, 1.0), (10, 2.0), (10, 3.0), (5, 4.0)]);
        let values: Vec<_> = series.samples().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![4.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn window_is_half_open() {
        let series = series_from("ma00/ch00", &[(0, 1.0), (5, 2.0), (10, 3.0), (10, 4.0), (15, 5.0)]);
        let window = series.window(5, 15);
        assert_eq!(window.len(), 3);
        assert_eq!(window.first().map(|s| s.time), Some(5));
        assert_eq!(window.last().map(|s| s.time), Some(10));
    }

    #[test]
    fn window_outside_series_is_empty() {
        let series = series_from("ma00/ch00", &[(0, 1.0), (5, 2.0)]);
        assert!(series.window(6, 100).is_empty());
        assert!(series.window(10, 5).is_empty());
        assert!(TimeSeries::default().window(0, 10).is_empty());
    }

    #[test]
    fn store_is_ordered_by_channel() {
        let store: TimeSeriesStore = [
            series_from("VL02_CT", &[]),
            series_from("VL01_CT", &[]),
        ]
        .into_iter()
        .collect();
        assert_eq!(store.channels().collect::<Vec<_>>(), vec!["VL01_CT", "VL02_CT"]);
        assert!(store.get("VL01_CT").is_some());
        assert!(store.get("VL03_CT").is_none());
    }
}
