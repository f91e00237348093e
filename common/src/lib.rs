pub mod channel_map;
pub mod metrics;
pub mod time_of_day;
pub mod tracer;

pub use channel_map::{SensorInfo, SensorType};
pub use time_of_day::{TimeOfDayError, format_time_of_day, parse_time_of_day};

/// Scalar type of every sensor reading (°C or mA).
pub type Real = f64;

/// Seconds since midnight of the day the scan started.
pub type Seconds = u32;

pub const SECONDS_PER_DAY: Seconds = 86_400;

/// Two timestamps further apart than this, going backwards, are taken to straddle midnight.
pub const MIDNIGHT_WRAP_THRESHOLD: Seconds = SECONDS_PER_DAY / 2;
