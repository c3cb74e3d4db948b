use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("CUE sheet is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),

    #[error("Line {line}: missing closing quote")]
    MissingQuoteError { line: usize },

    #[error("Line {line}: {directive} requires an argument")]
    MissingArgument { line: usize, directive: String },

    #[error("Line {line}: invalid track number: {value}")]
    InvalidTrackNumber { line: usize, value: String },

    #[error("Line {line}: invalid index number: {value}")]
    InvalidIndexNumber { line: usize, value: String },

    #[error("Line {line}: invalid MSF format: {value}")]
    InvalidMSFFormat { line: usize, value: String },

    #[error("Line {line}: TRACK {number} appears before any FILE")]
    TrackWithoutFile { line: usize, number: u32 },

    #[error("Line {line}: TRACK {number} does not follow TRACK {previous}")]
    TrackNumberNotIncreasing {
        line: usize,
        previous: u32,
        number: u32,
    },

    #[error("TRACK {number} (line {line}) has no INDEX 01")]
    MissingStartIndex { line: usize, number: u32 },

    #[error("TRACK {number} starts at {start}, which is not after the previous track at {previous}")]
    TimestampNotIncreasing {
        number: u32,
        start: String,
        previous: String,
    },

    #[error("No files are referenced in the CUE sheet")]
    NoFileReferencedInCueSheet,

    #[error("FILE \"{0}\" contains no tracks")]
    FileWithoutTracks(String),
}

pub type CueResult<T> = Result<T, CueError>;
