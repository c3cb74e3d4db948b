use crate::commands::dsf::SplitCommand;
use crate::commands::{Cli, Commands};
use crate::dsf::{SplitOptions, inspect_dsf, split_cue_file};
use anyhow::{Result, bail};
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::info;

mod commands;
mod cue;
mod dsf;

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let logger = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Split(cmd) => split(pb, cmd)?,
        Commands::Inspect(cmd) => {
            inspect_dsf(&cmd.input)?;
        }
    }

    Ok(())
}

fn split(pb: MultiProgress, cmd: SplitCommand) -> Result<()> {
    let options = SplitOptions {
        output_dir: cmd.output_dir,
        force: cmd.force,
        strict_blocks: cmd.strict_blocks,
    };

    let report = split_cue_file(pb, &cmd.input_cue, &options)?;

    info!(
        "Done! {} of {} tracks written",
        report.written(),
        report.outcomes.len()
    );

    if report.failed() > 0 {
        bail!("{} tracks could not be split", report.failed());
    }

    Ok(())
}
