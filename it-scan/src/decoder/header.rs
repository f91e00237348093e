use super::{DecodeError, DecodeResult, HeaderRow};
use csv::StringRecord;
use std::{ops::Range, path::Path};

/// The kind of archive export, recognised from the first header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub(crate) enum FileKind {
    #[strum(to_string = "temperature")]
    Temperature,
    #[strum(to_string = "HV current")]
    HvCurrent,
}

impl FileKind {
    fn signature(self) -> &'static str {
        match self {
            FileKind::Temperature => "VEDCSHV",
            FileKind::HvCurrent => "VEHV",
        }
    }

    /// The header row carrying the channel names.
    fn channel_row(self) -> HeaderRow {
        match self {
            FileKind::Temperature => HeaderRow::ChannelNames,
            FileKind::HvCurrent => HeaderRow::Signature,
        }
    }

    /// Position of the channel name inside a header entry.
    fn channel_range(self) -> Range<usize> {
        match self {
            FileKind::Temperature => 14..21,
            FileKind::HvCurrent => 23..32,
        }
    }

    /// Classifies a file by looking for a signature among the `:`-separated tokens of its first row.
    pub(crate) fn classify(signature_row: &StringRecord) -> Option<FileKind> {
        let has_signature = |kind: FileKind| {
            signature_row
                .iter()
                .filter(|entry| !entry.is_empty())
                .any(|entry| entry.split(':').any(|token| token == kind.signature()))
        };
        [FileKind::Temperature, FileKind::HvCurrent]
            .into_iter()
            .find(|&kind| has_signature(kind))
    }

    /// Extracts one channel name per non-empty entry of the relevant header row.
    pub(crate) fn channel_names(
        self,
        path: &Path,
        signature_row: &StringRecord,
        names_row: Option<&StringRecord>,
    ) -> DecodeResult<Vec<String>> {
        let row = match self.channel_row() {
            HeaderRow::Signature => signature_row,
            HeaderRow::ChannelNames => names_row.ok_or_else(|| DecodeError::MissingHeader {
                path: path.to_path_buf(),
                row: HeaderRow::ChannelNames,
            })?,
        };
        row.iter()
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .get(self.channel_range())
                    .map(ToOwned::to_owned)
                    .ok_or_else(|| DecodeError::ShortChannelName {
                        path: path.to_path_buf(),
                        row: self.channel_row(),
                        entry: entry.to_owned(),
                    })
            })
            .collect()
    }
}
