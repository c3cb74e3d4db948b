use crate::cue::error::CueError;
use std::path::PathBuf;
use thiserror::Error;

/// The four failure classes a split run distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The CUE sheet is unusable, nothing is written
    MalformedSheet,
    /// A source file's header is unusable, all of its tracks are skipped
    MalformedContainer,
    /// A track does not fit its source file, the track is skipped
    RangeError,
    /// Reading or writing failed, the track is skipped
    IoFailure,
}

#[derive(Debug, Error)]
pub enum DsfError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error("Invalid '{chunk}' chunk: {source}")]
    InvalidChunk {
        chunk: &'static str,
        #[source]
        source: binrw::Error,
    },

    #[error("Invalid DSD chunk size {0}, expected 28")]
    InvalidDsdChunkSize(u64),

    #[error("Invalid fmt chunk size {0}, expected at least 52")]
    InvalidFmtChunkSize(u64),

    #[error("Unsupported bits per sample: {0}, only 1 bit DSD is supported")]
    UnsupportedBitsPerSample(u32),

    #[error("Invalid stream parameters: {0}")]
    InvalidStreamParams(&'static str),

    #[error("Invalid data chunk size {0}, expected at least 12")]
    InvalidDataChunkSize(u64),

    #[error("Data chunk ends at byte {data_end} but the file is only {file_len} bytes long")]
    DataChunkExceedsFile { data_end: u64, file_len: u64 },

    #[error("Data length {data_len} is not a multiple of the {block_stride} byte block stride")]
    PartialTrailingBlock { data_len: u64, block_stride: u64 },

    #[error("Track starts at block {start_block} but the source only has {total_blocks} blocks")]
    StartBlockOutOfRange { start_block: u64, total_blocks: u64 },

    #[error("Track starts at block {start_block} and the next track at block {next_start_block}, no blocks are left for it")]
    EmptyTrackRange {
        start_block: u64,
        next_start_block: u64,
    },

    #[error("Source ended after {read} of {expected} bytes")]
    TruncatedSource { expected: u64, read: u64 },

    #[error("ID3v2 tag of {0} bytes exceeds the synchsafe size limit")]
    TagTooLarge(usize),

    #[error("Output file already exists, use --force to overwrite: {0}")]
    OutputFileAlreadyExists(PathBuf),

    #[error("Could not open source file {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: Box<DsfError>,
    },
}

impl DsfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DsfError::CueError(_) => ErrorKind::MalformedSheet,
            DsfError::InvalidChunk { .. }
            | DsfError::InvalidDsdChunkSize(_)
            | DsfError::InvalidFmtChunkSize(_)
            | DsfError::UnsupportedBitsPerSample(_)
            | DsfError::InvalidStreamParams(_)
            | DsfError::InvalidDataChunkSize(_)
            | DsfError::DataChunkExceedsFile { .. }
            | DsfError::PartialTrailingBlock { .. } => ErrorKind::MalformedContainer,
            DsfError::StartBlockOutOfRange { .. }
            | DsfError::EmptyTrackRange { .. } => ErrorKind::RangeError,
            DsfError::IoError(_)
            | DsfError::BinRWError(_)
            | DsfError::TagTooLarge(_)
            | DsfError::TruncatedSource { .. }
            | DsfError::OutputFileAlreadyExists(_) => ErrorKind::IoFailure,
            DsfError::SourceUnavailable { source, .. } => source.kind(),
        }
    }
}

pub type DsfResult<T> = Result<T, DsfError>;
