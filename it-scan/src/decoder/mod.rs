//! Decoding of the archive's CSV exports into time series.
//!
//! Each export starts with two header rows. The first identifies the kind of
//! data (temperature or HV current) and, for HV files, names the hardware
//! channels; the second names the temperature sensors. Every following row
//! holds a date-time and one value per channel, followed by a trailing
//! separator.
mod error;
mod header;
mod rows;

pub(crate) use error::{DecodeError, DecodeResult, HeaderRow};
pub(crate) use header::FileKind;

use it_curve::TimeSeriesStore;
use itscan_common::Seconds;
use csv::{ByteRecord, StringRecord};
use rows::{ChannelAccumulator, RowDecoder, ScanClock, scan_tag};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::{Span, debug, info, instrument};

#[derive(Clone, Debug)]
pub(crate) struct DecodeOptions {
    /// Glob pattern, relative to the data directory, selecting the files to read.
    pub(crate) pattern: String,
    /// Samples taken before this time of day are discarded.
    pub(crate) scan_start: Option<Seconds>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            pattern: "*".to_owned(),
            scan_start: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct DecodedScan {
    pub(crate) kind: FileKind,
    pub(crate) store: TimeSeriesStore,
    pub(crate) scan_tag: Option<String>,
    pub(crate) files: Vec<PathBuf>,
}

#[derive(Default)]
struct DirectoryDecoder {
    accumulators: BTreeMap<String, ChannelAccumulator>,
    clock: ScanClock,
    scan_tag: Option<String>,
    files: Vec<PathBuf>,
}

impl DirectoryDecoder {
    /// Reads one file if it is of the requested kind, returning whether it was.
    fn decode_file(&mut self, path: &Path, kind: FileKind, options: &DecodeOptions) -> DecodeResult<bool> {
        let csv_error = |source| DecodeError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        // Files that are not exports at all may not even be text.
        let mut signature_bytes = ByteRecord::new();
        if !reader
            .read_byte_record(&mut signature_bytes)
            .map_err(csv_error)?
        {
            debug!("Skipping empty file {}", path.display());
            return Ok(false);
        }
        let Ok(signature_row) = StringRecord::from_byte_record(signature_bytes) else {
            debug!("Skipping {}, not a text file", path.display());
            return Ok(false);
        };
        if FileKind::classify(&signature_row) != Some(kind) {
            debug!("Skipping {}, not a {kind} file", path.display());
            return Ok(false);
        }
        let mut records = reader.records();
        let names_row = records.next().transpose().map_err(csv_error)?;
        let channels = kind.channel_names(path, &signature_row, names_row.as_ref())?;
        debug!("{}: {} channels", path.display(), channels.len());

        let decoder = RowDecoder {
            path,
            channels: &channels,
            scan_start: options.scan_start,
        };
        for record in records {
            let record = record.map_err(csv_error)?;
            if self.scan_tag.is_none() {
                self.scan_tag = record.get(0).map(scan_tag);
            }
            decoder.decode(&record, &mut self.clock, &mut self.accumulators)?;
        }
        self.files.push(path.to_path_buf());
        Ok(true)
    }

    fn finish(self, kind: FileKind) -> DecodedScan {
        if self.clock.out_of_order() > 0 {
            debug!("{} rows earlier than the row before them", self.clock.out_of_order());
        }
        DecodedScan {
            kind,
            store: self
                .accumulators
                .into_iter()
                .map(|(channel, accumulator)| accumulator.into_series(channel))
                .collect(),
            scan_tag: self.scan_tag,
            files: self.files,
        }
    }
}

/// Decodes every file of the given kind in `data_path` matching the configured pattern.
///
/// Files are read in name order and channels spread over several files are concatenated.
#[instrument(skip_all, fields(
    kind = %kind,
    data_path = %data_path.display(),
    files,
    channels
))]
pub(crate) fn decode_directory(
    data_path: &Path,
    kind: FileKind,
    options: &DecodeOptions,
) -> DecodeResult<DecodedScan> {
    if !data_path.is_dir() {
        return Err(DecodeError::NotADirectory(data_path.to_path_buf()));
    }
    let directory = data_path
        .to_str()
        .ok_or_else(|| DecodeError::CannotConvertPath(data_path.to_path_buf()))?;
    let glob_pattern = format!("{}/{}", glob::Pattern::escape(directory), options.pattern);

    let mut decoder = DirectoryDecoder::default();
    for path in glob::glob(&glob_pattern)? {
        let path = path?;
        if path.is_file() {
            decoder.decode_file(&path, kind, options)?;
        }
    }
    if decoder.files.is_empty() {
        return Err(DecodeError::NoFiles(kind));
    }

    let scan = decoder.finish(kind);
    Span::current().record("files", scan.files.len());
    Span::current().record("channels", scan.store.len());
    info!(
        "Decoded {} {kind} channels from {} files",
        scan.store.len(),
        scan.files.len()
    );
    Ok(scan)
}
