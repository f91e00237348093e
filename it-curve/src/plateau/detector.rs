use super::{Plateau, PlateauParameters, round_to_hundredths};
use crate::series::{Sample, TimeSeries};
use itscan_common::Real;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq)]
enum ScanState {
    Scanning { cursor: usize },
    Finished,
}

/// Iterator over the plateau candidates of one series.
///
/// Candidates are produced in time order and never overlap.
#[derive(Clone)]
pub struct PlateauScan<'a> {
    channel: &'a str,
    samples: &'a [Sample],
    parameters: PlateauParameters,
    state: ScanState,
}

impl<'a> PlateauScan<'a> {
    pub fn new(series: &'a TimeSeries, parameters: &PlateauParameters) -> Self {
        Self {
            channel: series.channel(),
            samples: series.samples(),
            parameters: parameters.clone(),
            state: ScanState::Scanning { cursor: 0 },
        }
    }

    /// Index one past the last sample within `max_delta` of the anchor at `cursor`.
    fn probe(&self, anchor: Real, cursor: usize) -> usize {
        let extent = self
            .samples
            .iter()
            .skip(cursor + 1)
            .take_while(|s| (s.value - anchor).abs() < self.parameters.max_delta)
            .count();
        cursor + 1 + extent
    }

    /// First index at or after `end` whose time is at least `leap` past the sample at `end`.
    fn leap_from(&self, end: usize) -> ScanState {
        let Some(breaking) = self.samples.get(end) else {
            return ScanState::Finished;
        };
        let target = breaking.time.saturating_add(self.parameters.leap);
        let offset = self
            .samples
            .iter()
            .skip(end)
            .position(|s| s.time >= target);
        match offset {
            Some(offset) => ScanState::Scanning {
                cursor: end + offset,
            },
            None => ScanState::Finished,
        }
    }

    fn make_plateau(&self, anchor: &Sample, run: &[Sample]) -> Option<Plateau> {
        let last = run.last()?;
        let mean = run.iter().map(|s| s.value).sum::<Real>() / run.len() as Real;
        Some(Plateau {
            channel: self.channel.to_owned(),
            value: round_to_hundredths(anchor.value),
            mean: round_to_hundredths(mean),
            start: anchor.time,
            end: last.time,
            duration: last.time.saturating_sub(anchor.time),
            samples: run.len(),
        })
    }
}

impl Iterator for PlateauScan<'_> {
    type Item = Plateau;

    fn next(&mut self) -> Option<Plateau> {
        loop {
            let ScanState::Scanning { cursor } = self.state else {
                return None;
            };
            let (Some(anchor), Some(following)) =
                (self.samples.get(cursor), self.samples.get(cursor + 1))
            else {
                self.state = ScanState::Finished;
                return None;
            };
            if (following.value - anchor.value).abs() >= self.parameters.max_delta {
                self.state = ScanState::Scanning { cursor: cursor + 1 };
                continue;
            }

            let end = self.probe(anchor.value, cursor);
            let run = self.samples.get(cursor..end).unwrap_or_default();
            if run.len() <= self.parameters.min_run_length {
                trace!(cursor, length = run.len(), "Run too short");
                self.state = ScanState::Scanning { cursor: cursor + 1 };
                continue;
            }

            self.state = self.leap_from(end);
            if let Some(plateau) = self.make_plateau(anchor, run) {
                trace!("Candidate {plateau}");
                return Some(plateau);
            }
        }
    }
}

pub trait PlateauFilter {
    fn plateaus(&self, parameters: &PlateauParameters) -> PlateauScan<'_>;
}

impl PlateauFilter for TimeSeries {
    fn plateaus(&self, parameters: &PlateauParameters) -> PlateauScan<'_> {
        PlateauScan::new(self, parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::series_from;
    use assert_approx_eq::assert_approx_eq;
    use itscan_common::parse_time_of_day;

    fn parameters(min_run_length: usize) -> PlateauParameters {
        PlateauParameters {
            max_delta: 0.3,
            min_run_length,
            leap: 90,
        }
    }

    #[test]
    fn zero_data() {
        let series = series_from("VL01_CT", &[]);
        assert_eq!(series.plateaus(&parameters(2)).next(), None);
    }

    #[test]
    fn single_sample() {
        let series = series_from("VL01_CT", &[(0, -30.0)]);
        assert_eq!(series.plateaus(&parameters(0)).next(), None);
    }

    #[test]
    fn hold_at_minus_thirty() {
        let data = [
            ("10:00:00", -30.0),
            ("10:00:05", -30.0),
            ("10:00:10", -30.0),
            ("10:05:00", -10.0),
        ]
        .map(|(t, v)| (parse_time_of_day(t).unwrap(), v));
        let series = series_from("VL01_CT", &data);

        let plateaus: Vec<_> = series.plateaus(&parameters(2)).collect();
        assert_eq!(plateaus.len(), 1);
        assert_approx_eq!(plateaus[0].mean, -30.0);
        assert_approx_eq!(plateaus[0].value, -30.0);
        assert_eq!(plateaus[0].start, parse_time_of_day("10:00:00").unwrap());
        assert_eq!(plateaus[0].end, parse_time_of_day("10:00:10").unwrap());
        assert_eq!(plateaus[0].duration, 10);
        assert_eq!(plateaus[0].samples, 3);
    }

    #[test]
    fn constant_series_is_one_plateau() {
        let data: Vec<_> = (0..20).map(|i| (i * 10, 5.0)).collect();
        let series = series_from("VL01_CT", &data);
        let plateaus: Vec<_> = series.plateaus(&parameters(10)).collect();
        assert_eq!(plateaus.len(), 1);
        assert_eq!(plateaus[0].start, 0);
        assert_eq!(plateaus[0].end, 190);
        assert_eq!(plateaus[0].samples, 20);
    }

    #[test]
    fn series_shorter_than_minimum() {
        let data: Vec<_> = (0..10).map(|i| (i * 10, 5.0)).collect();
        let series = series_from("VL01_CT", &data);
        assert_eq!(series.plateaus(&parameters(10)).count(), 0);
    }

    #[test]
    fn drift_is_measured_from_the_anchor() {
        // Each step is below max_delta but the fourth sample is 0.3 from the anchor.
        let series = series_from("VL01_CT", &[(0, 0.0), (1, 0.1), (2, 0.2), (3, 0.3), (4, 0.3)]);
        let plateaus: Vec<_> = series.plateaus(&parameters(2)).collect();
        assert_eq!(plateaus.len(), 1);
        assert_eq!(plateaus[0].end, 2);
        assert_approx_eq!(plateaus[0].mean, 0.1);
    }

    #[test]
    fn leap_skips_ahead_after_a_plateau() {
        let mut data: Vec<_> = (0..5).map(|i| (i * 10, -20.0)).collect();
        // Breaks the first run at t = 50; the sample at t = 100 is still within the leap.
        data.extend([(50, -10.0), (100, -10.0), (140, -10.0), (150, -10.0), (160, -10.0)]);
        data.extend([(170, -10.0), (180, -10.0)]);
        let series = series_from("VL01_CT", &data);
        let plateaus: Vec<_> = series.plateaus(&parameters(2)).collect();
        assert_eq!(plateaus.len(), 2);
        assert_eq!((plateaus[0].start, plateaus[0].end), (0, 40));
        assert_eq!((plateaus[1].start, plateaus[1].end), (140, 180));
    }

    #[test]
    fn leap_beyond_the_end_finishes() {
        let data = [(0, 1.0), (10, 1.0), (20, 1.0), (30, 5.0), (40, 5.0), (50, 5.0)];
        let series = series_from("VL01_CT", &data);
        assert_eq!(series.plateaus(&parameters(2)).count(), 1);
    }

    #[test]
    fn noisy_series_has_no_plateaus() {
        let data: Vec<_> = (0..50)
            .map(|i| (i, if i % 2 == 0 { 0.0 } else { 1.0 }))
            .collect();
        let series = series_from("VL01_CT", &data);
        assert_eq!(series.plateaus(&parameters(2)).count(), 0);
    }

    #[test]
    fn duplicate_timestamps() {
        let data = [(0, 1.0), (0, 1.0), (0, 1.1), (5, 1.0)];
        let series = series_from("VL01_CT", &data);
        let plateaus: Vec<_> = series.plateaus(&parameters(2)).collect();
        assert_eq!(plateaus.len(), 1);
        assert_eq!(plateaus[0].duration, 5);
    }
}
