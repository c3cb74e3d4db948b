use crate::cue::CueParser;
use crate::cue::models::{CueSheet, SheetMeta, Track};
use crate::dsf::error::{DsfError, DsfResult, ErrorKind};
use crate::dsf::models::DsfHeader;
use crate::dsf::reader::read_dsf_header;
use crate::dsf::resolver::{TrackRange, resolve_track_range};
use crate::dsf::writer::extract_track;
use crate::dsf::writer::id3::{OutputTag, append_tag, build_id3v2_tag};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use lazy_static::lazy_static;
use log::{debug, error, info, warn};
use regex::Regex;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

pub mod error;
pub mod models;
pub mod reader;
pub mod resolver;
pub mod writer;

lazy_static! {
    static ref UNSAFE_FILE_NAME_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
}

#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Where split tracks are written, defaults to the CUE sheet's directory
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing output files
    pub force: bool,

    /// Reject sources whose data does not end on a block boundary
    pub strict_blocks: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub output_path: PathBuf,
    pub range: TrackRange,
    pub duration_secs: f64,
    pub bytes_written: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackStatus {
    Written(TrackSummary),
    Failed { kind: ErrorKind, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackOutcome {
    pub track_number: u32,
    pub title: String,
    pub status: TrackStatus,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitReport {
    pub outcomes: Vec<TrackOutcome>,
}

impl SplitReport {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, TrackStatus::Written(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.written()
    }
}

/// Parses the CUE sheet at `cue_path` and splits every track it lists.
///
/// A sheet that cannot be parsed fails the whole run before anything is written. Failures of
/// single tracks are recorded in the returned report instead.
pub fn split_cue_file(
    pb: MultiProgress,
    cue_path: &Path,
    options: &SplitOptions,
) -> DsfResult<SplitReport> {
    debug!("Parsing CUE file: {:?}", cue_path);
    let sheet = CueParser::new(cue_path).parse()?;

    let base_dir = match cue_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    split_sheet(pb, &sheet, base_dir, options)
}

/// Splits an already parsed sheet whose `FILE` names are relative to `base_dir`.
pub fn split_sheet(
    pb: MultiProgress,
    sheet: &CueSheet,
    base_dir: &Path,
    options: &SplitOptions,
) -> DsfResult<SplitReport> {
    let output_dir = options.output_dir.as_deref().unwrap_or(base_dir);
    std::fs::create_dir_all(output_dir)?;

    let track_total = sheet.track_count();

    info!("Album:  {}", sheet.meta.title.as_deref().unwrap_or("?"));
    info!("Artist: {}", sheet.meta.performer.as_deref().unwrap_or("?"));
    info!("Tracks: {track_total}");

    let progress = pb.add(ProgressBar::new(track_total as u64));
    if let Ok(style) = ProgressStyle::with_template("[{bar:40}] {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("=> "));
    }

    let mut report = SplitReport::default();

    for file in &sheet.files {
        let source_path = base_dir.join(&file.filename);
        info!("Reading: {}", file.filename);

        // The source stays open for all of its tracks and is closed at the end of this block
        let mut source = match open_source(&source_path, options) {
            Ok(source) => source,
            Err(err) => {
                error!("{err}");
                for track in &file.tracks {
                    report.outcomes.push(TrackOutcome {
                        track_number: track.number,
                        title: track.display_title(),
                        status: TrackStatus::Failed {
                            kind: err.kind(),
                            reason: err.to_string(),
                        },
                    });
                    progress.inc(1);
                }
                continue;
            }
        };

        for (index, track) in file.tracks.iter().enumerate() {
            let title = track.display_title();
            progress.set_message(title.clone());
            info!("Track {:02}: {}", track.number, title);

            let job = TrackJob {
                tracks: &file.tracks,
                index,
                meta: &sheet.meta,
                track_total,
                output_dir,
                force: options.force,
            };

            let status = match job.run(&mut source.reader, &source.header) {
                Ok(summary) => {
                    info!(
                        "  OK: {} ({:.1}s, blocks {}-{})",
                        file_name(&summary.output_path),
                        summary.duration_secs,
                        summary.range.start_block,
                        summary.range.end_block
                    );
                    TrackStatus::Written(summary)
                }
                Err(err) => {
                    error!("  FAILED: {err}");
                    TrackStatus::Failed {
                        kind: err.kind(),
                        reason: err.to_string(),
                    }
                }
            };

            report.outcomes.push(TrackOutcome {
                track_number: track.number,
                title,
                status,
            });
            progress.inc(1);
        }
    }

    progress.finish_and_clear();

    Ok(report)
}

/// Reads and logs the header of a single DSF file.
pub fn inspect_dsf(path: &Path) -> DsfResult<DsfHeader> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = read_dsf_header(&mut reader)?;
    let params = &header.params;

    info!("File:            {}", path.display());
    info!("Channels:        {}", params.channel_count);
    info!("Sample rate:     {} Hz", params.sample_rate);
    info!("Block size:      {} bytes per channel", params.block_size_per_channel);
    info!("Samples:         {} per channel", header.fmt.sample_count);
    info!(
        "Data:            {} byte chunk, {} audio bytes at offset {}",
        header.data.chunk_size, params.data_len, params.data_offset
    );
    info!(
        "Blocks:          {} ({:.2} ms each)",
        params.total_blocks(),
        params.block_duration_secs() * 1000.0
    );
    info!("Duration:        {:.1}s", params.duration_secs());
    if params.has_partial_block() {
        warn!(
            "Data ends in a partial block of {} bytes",
            params.data_len % params.block_stride()
        );
    }
    if header.dsd.metadata_offset != 0 {
        info!("Metadata:        at offset {}", header.dsd.metadata_offset);
    }

    Ok(header)
}

/// Output file name for a track: `NN - Title.dsf`.
pub fn output_file_name(track: &Track) -> String {
    let title = track.display_title();
    let title = UNSAFE_FILE_NAME_CHARS.replace_all(&title, "_");
    format!("{:02} - {}.dsf", track.number, title)
}

struct OpenSource {
    reader: BufReader<File>,
    header: DsfHeader,
}

fn open_source(path: &Path, options: &SplitOptions) -> DsfResult<OpenSource> {
    let wrap = |source: DsfError| DsfError::SourceUnavailable {
        path: path.to_path_buf(),
        source: Box::new(source),
    };

    let file = File::open(path).map_err(|err| wrap(err.into()))?;
    let mut reader = BufReader::with_capacity(8 * 1024 * 1024, file); // 8 MB buffer
    let header = read_dsf_header(&mut reader).map_err(wrap)?;

    let params = &header.params;
    if params.has_partial_block() {
        if options.strict_blocks {
            return Err(wrap(DsfError::PartialTrailingBlock {
                data_len: params.data_len,
                block_stride: params.block_stride(),
            }));
        }
        warn!(
            "{}: trailing {} bytes do not fill a block and are left out",
            path.display(),
            params.data_len % params.block_stride()
        );
    }

    Ok(OpenSource { reader, header })
}

/// Everything needed to resolve, extract, tag and write one track.
struct TrackJob<'a> {
    tracks: &'a [Track],
    index: usize,
    meta: &'a SheetMeta,
    track_total: usize,
    output_dir: &'a Path,
    force: bool,
}

impl TrackJob<'_> {
    fn run<R: Read + Seek>(&self, source: &mut R, header: &DsfHeader) -> DsfResult<TrackSummary> {
        let track = &self.tracks[self.index];
        let range = resolve_track_range(self.tracks, self.index, &header.params)?;
        debug!(
            "Track {} starts at {}, blocks {}-{}",
            track.number, track.start, range.start_block, range.end_block
        );

        let output_path = self.output_dir.join(output_file_name(track));
        if !self.force && std::fs::metadata(&output_path).is_ok() {
            return Err(DsfError::OutputFileAlreadyExists(output_path));
        }

        let mut container = extract_track(source, header, &range)?;
        let tag = build_id3v2_tag(&OutputTag::for_track(self.meta, track, self.track_total))?;
        append_tag(&mut container, &tag);

        std::fs::write(&output_path, &container)?;

        Ok(TrackSummary {
            output_path,
            range,
            duration_secs: range.duration_secs(&header.params),
            bytes_written: container.len() as u64,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
