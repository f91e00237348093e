use thiserror::Error;

pub type CurveResult<T> = Result<T, CurveError>;

#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("No plateaus found for channel {channel}")]
    NoPlateaus { channel: String },
    #[error("Temperature series {temperature} cannot be paired with current series {current}")]
    ChannelMismatch { temperature: String, current: String },
}
