use super::{DecodeError, DecodeResult};
use csv::StringRecord;
use it_curve::{Sample, TimeSeries};
use itscan_common::{MIDNIGHT_WRAP_THRESHOLD, Real, SECONDS_PER_DAY, Seconds, parse_time_of_day};
use std::{collections::BTreeMap, num::ParseFloatError, ops::Range, path::Path};
use tracing::warn;

const TIME_OF_DAY: Range<usize> = 11..19;
const SCAN_TAG: Range<usize> = 0..19;
const NULL_ENTRIES: [&str; 3] = ["", "0", "nan"];
const NEGLIGIBLE: Real = 1e-4;

/// Parses a data entry, returning `None` for the archive's null markers and negligible values.
pub(crate) fn parse_value(entry: &str) -> Result<Option<Real>, ParseFloatError> {
    let entry = entry.trim();
    if NULL_ENTRIES.contains(&entry) {
        return Ok(None);
    }
    let value: Real = entry.parse()?;
    Ok((value.is_finite() && value.abs() >= NEGLIGIBLE).then_some(value))
}

/// Turns the date-time column of the first data row into a file-name friendly tag.
pub(crate) fn scan_tag(date_time: &str) -> String {
    date_time
        .get(SCAN_TAG)
        .unwrap_or(date_time)
        .replace('/', ".")
        .replace(' ', "_")
}

/// Converts the time of day of each data row to seconds since midnight of the first day seen.
///
/// One clock is shared by every row of every file of a kind, so values from the same row
/// always get the same time, whichever channels are null.
#[derive(Debug, Default)]
pub(crate) struct ScanClock {
    day_offset: Seconds,
    first: Option<Seconds>,
    last: Option<Seconds>,
    out_of_order: usize,
}

impl ScanClock {
    pub(crate) fn elapsed(&mut self, time_of_day: Seconds) -> Seconds {
        let mut time = time_of_day + self.day_offset;
        if let Some(last) = self.last {
            if last.saturating_sub(time) > MIDNIGHT_WRAP_THRESHOLD {
                self.day_offset += SECONDS_PER_DAY;
                time += SECONDS_PER_DAY;
            } else if time < last {
                self.out_of_order += 1;
            }
        }
        self.first.get_or_insert(time);
        self.last = Some(self.last.map_or(time, |last| last.max(time)));
        time
    }

    /// Places a time of day on the timeline of the scan.
    ///
    /// A time more than half a day before the first row is taken to be on the following day.
    pub(crate) fn resolve(&self, time_of_day: Seconds) -> Seconds {
        match self.first {
            Some(first) if first.saturating_sub(time_of_day) > MIDNIGHT_WRAP_THRESHOLD => {
                time_of_day + SECONDS_PER_DAY
            }
            _ => time_of_day,
        }
    }

    pub(crate) fn out_of_order(&self) -> usize {
        self.out_of_order
    }
}

/// Collects the samples of one channel.
#[derive(Debug, Default)]
pub(crate) struct ChannelAccumulator {
    samples: Vec<Sample>,
}

impl ChannelAccumulator {
    pub(crate) fn record(&mut self, time: Seconds, value: Real) {
        self.samples.push(Sample::new(time, value));
    }

    pub(crate) fn into_series(self, channel: String) -> TimeSeries {
        if !self.samples.is_sorted_by_key(|s| s.time) {
            warn!(channel, "Out of order samples, series re-sorted");
        }
        TimeSeries::new(channel, self.samples)
    }
}

/// Decodes the data rows of one file into per-channel accumulators.
pub(crate) struct RowDecoder<'a> {
    pub(crate) path: &'a Path,
    pub(crate) channels: &'a [String],
    pub(crate) scan_start: Option<Seconds>,
}

impl RowDecoder<'_> {
    fn time_of_day(&self, record: &StringRecord, line: u64) -> DecodeResult<Seconds> {
        let entry = record.get(0).unwrap_or_default();
        let text = entry.get(TIME_OF_DAY).unwrap_or(entry);
        parse_time_of_day(text).map_err(|source| DecodeError::Timestamp {
            path: self.path.to_path_buf(),
            line,
            entry: entry.to_owned(),
            source,
        })
    }

    pub(crate) fn decode(
        &self,
        record: &StringRecord,
        clock: &mut ScanClock,
        accumulators: &mut BTreeMap<String, ChannelAccumulator>,
    ) -> DecodeResult<()> {
        let line = record.position().map_or(0, |position| position.line());
        let time = clock.elapsed(self.time_of_day(record, line)?);
        let before_start = self
            .scan_start
            .is_some_and(|start| time < clock.resolve(start));

        // The last column is left empty by the trailing separator.
        let values = record.len().saturating_sub(2);
        if values > self.channels.len() {
            return Err(DecodeError::ColumnMismatch {
                path: self.path.to_path_buf(),
                line,
                values,
                channels: self.channels.len(),
            });
        }

        for (channel, entry) in self.channels.iter().zip(record.iter().skip(1).take(values)) {
            let value = parse_value(entry).map_err(|source| DecodeError::Value {
                path: self.path.to_path_buf(),
                line,
                entry: entry.to_owned(),
                source,
            })?;
            if let Some(value) = value.filter(|_| !before_start) {
                accumulators
                    .entry(channel.clone())
                    .or_default()
                    .record(time, value);
            }
        }
        Ok(())
    }
}
