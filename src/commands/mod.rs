use crate::commands::dsf::{InspectCommand, SplitCommand};
use clap::{Parser, Subcommand};

pub mod dsf;

/// CLI for splitting DSF images by CUE sheet without transcoding.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Split(SplitCommand),
    Inspect(InspectCommand),
}
