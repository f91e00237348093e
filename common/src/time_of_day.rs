use crate::{SECONDS_PER_DAY, Seconds};
use chrono::{NaiveTime, Timelike};
use thiserror::Error;

pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Error, PartialEq)]
pub enum TimeOfDayError {
    #[error("Cannot parse '{0}' as hh:mm:ss")]
    Malformed(String),
    #[error("Leap second in '{0}' is not supported")]
    LeapSecond(String),
}

/// Converts a wall-clock `hh:mm:ss` string to seconds since midnight, i.e. `H*3600 + M*60 + S`.
pub fn parse_time_of_day(text: &str) -> Result<Seconds, TimeOfDayError> {
    let time = NaiveTime::parse_from_str(text.trim(), TIME_OF_DAY_FORMAT)
        .map_err(|_| TimeOfDayError::Malformed(text.to_owned()))?;
    if time.nanosecond() >= 1_000_000_000 {
        return Err(TimeOfDayError::LeapSecond(text.to_owned()));
    }
    Ok(time.num_seconds_from_midnight())
}

/// Inverse of [parse_time_of_day]. Times carried past midnight are shown modulo one day.
pub fn format_time_of_day(seconds: Seconds) -> String {
    let seconds = seconds % SECONDS_PER_DAY;
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
