use clap::Parser;
use std::path::PathBuf;

/// Splits the DSF files referenced by a CUE sheet into one tagged DSF file per track.
///
/// Tracks are cut on DSD block boundaries, the audio data is copied without conversion.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct SplitCommand {
    /// CUE sheet, the DSF files it references must be in the same directory
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,

    /// Directory for the split tracks, defaults to the CUE sheet's directory
    #[arg(long, short = 'o', value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Force overwrite of output files that already exist
    #[arg(long, short = 'f', default_value_t = false)]
    pub force: bool,

    /// Reject source files whose audio data does not end on a block boundary
    #[arg(long, default_value_t = false)]
    pub strict_blocks: bool,
}

/// Prints the stream parameters of a DSF file.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct InspectCommand {
    /// Input DSF file path
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}
