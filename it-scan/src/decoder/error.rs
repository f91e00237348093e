use super::FileKind;
use glob::{GlobError, PatternError};
use itscan_common::TimeOfDayError;
use std::{num::ParseFloatError, path::PathBuf};
use thiserror::Error;

pub(crate) type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, strum::Display)]
pub(crate) enum HeaderRow {
    #[strum(to_string = "signature row")]
    Signature,
    #[strum(to_string = "channel row")]
    ChannelNames,
}

#[derive(Debug, Error)]
pub(crate) enum DecodeError {
    #[error("Data path {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("Glob Pattern Error: {0}")]
    GlobPattern(#[from] PatternError),
    #[error("Glob Error: {0}")]
    Glob(#[from] GlobError),
    #[error("Cannot convert data path to string: {0}")]
    CannotConvertPath(PathBuf),
    #[error("CSV Error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Missing {row} in {path}")]
    MissingHeader { path: PathBuf, row: HeaderRow },
    #[error("Entry '{entry}' of the {row} in {path} is too short to hold a channel name")]
    ShortChannelName {
        path: PathBuf,
        row: HeaderRow,
        entry: String,
    },
    #[error("{path} line {line}: {values} values for {channels} channels")]
    ColumnMismatch {
        path: PathBuf,
        line: u64,
        values: usize,
        channels: usize,
    },
    #[error("{path} line {line}: cannot read a time of day from '{entry}': {source}")]
    Timestamp {
        path: PathBuf,
        line: u64,
        entry: String,
        #[source]
        source: TimeOfDayError,
    },
    #[error("{path} line {line}: cannot parse '{entry}' as a number: {source}")]
    Value {
        path: PathBuf,
        line: u64,
        entry: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("No {0} files found")]
    NoFiles(FileKind),
}
