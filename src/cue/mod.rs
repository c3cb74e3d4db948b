use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueFile, CueSheet, MSF, SheetMeta, Track};
use std::path::{Path, PathBuf};

pub mod error;
pub mod models;

const BYTE_ORDER_MARK: char = '\u{feff}';

pub struct CueParser {
    cue_path: PathBuf,
}

/// One classified line of a CUE sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Rem { key: String, value: String },
    Performer(String),
    Title(String),
    File { filename: String },
    Track { number: u32 },
    Index { number: u32, position: MSF },
    Unknown,
}

#[derive(Debug)]
struct PendingTrack {
    line: usize,
    number: u32,
    title: Option<String>,
    performer: Option<String>,
    start: Option<MSF>,
}

impl CueParser {
    pub fn new(cue_path: impl AsRef<Path>) -> Self {
        Self {
            cue_path: cue_path.as_ref().to_path_buf(),
        }
    }

    pub fn parse(&self) -> CueResult<CueSheet> {
        let data = std::fs::read(&self.cue_path)?;
        let text = String::from_utf8(data)?;

        Self::parse_str(&text)
    }

    pub fn parse_str(text: &str) -> CueResult<CueSheet> {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

        let mut meta = SheetMeta::default();
        let mut files: Vec<CueFile> = Vec::new();
        let mut current_track: Option<PendingTrack> = None;
        let mut last_number: Option<u32> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let line = index + 1;

            match Self::classify(raw_line, line)? {
                Directive::Rem { key, value } => match key.as_str() {
                    "GENRE" => meta.genre = non_empty(value),
                    "DATE" => meta.date = non_empty(value),
                    _ => {}
                },
                Directive::File { filename } => {
                    Self::finish_track(&mut files, current_track.take())?;
                    files.push(CueFile {
                        filename,
                        tracks: Vec::new(),
                    });
                }
                Directive::Track { number } => {
                    Self::finish_track(&mut files, current_track.take())?;

                    if files.is_empty() {
                        return Err(CueError::TrackWithoutFile { line, number });
                    }
                    if let Some(previous) = last_number {
                        if number <= previous {
                            return Err(CueError::TrackNumberNotIncreasing {
                                line,
                                previous,
                                number,
                            });
                        }
                    }
                    last_number = Some(number);

                    current_track = Some(PendingTrack {
                        line,
                        number,
                        title: None,
                        performer: None,
                        start: None,
                    });
                }
                Directive::Title(title) => match &mut current_track {
                    Some(track) => track.title = Some(title),
                    None => meta.title = Some(title),
                },
                Directive::Performer(performer) => match &mut current_track {
                    Some(track) => track.performer = Some(performer),
                    None => meta.performer = Some(performer),
                },
                Directive::Index { number, position } => {
                    // Only INDEX 01 marks the start, pre-gaps are not split out
                    if number == 1 {
                        if let Some(track) = &mut current_track {
                            track.start = Some(position);
                        }
                    }
                }
                Directive::Unknown => {}
            }
        }

        Self::finish_track(&mut files, current_track)?;

        if files.is_empty() {
            return Err(CueError::NoFileReferencedInCueSheet);
        }
        if let Some(file) = files.iter().find(|file| file.tracks.is_empty()) {
            return Err(CueError::FileWithoutTracks(file.filename.clone()));
        }

        Ok(CueSheet { meta, files })
    }

    fn finish_track(files: &mut [CueFile], pending: Option<PendingTrack>) -> CueResult<()> {
        let Some(pending) = pending else {
            return Ok(());
        };

        let start = pending.start.ok_or(CueError::MissingStartIndex {
            line: pending.line,
            number: pending.number,
        })?;

        // TRACK before any FILE is rejected when the track starts
        let Some(file) = files.last_mut() else {
            return Ok(());
        };

        if let Some(previous) = file.tracks.last() {
            if start <= previous.start {
                return Err(CueError::TimestampNotIncreasing {
                    number: pending.number,
                    start: start.to_string(),
                    previous: previous.start.to_string(),
                });
            }
        }

        file.tracks.push(Track {
            number: pending.number,
            title: pending.title,
            performer: pending.performer,
            start,
        });

        Ok(())
    }

    fn classify(raw_line: &str, line: usize) -> CueResult<Directive> {
        let mut words = raw_line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(Directive::Unknown);
        };
        let keyword = keyword.to_ascii_uppercase();

        // Lines that are ignored anyway are never tokenized, a stray quote there is harmless
        let recognized = match keyword.as_str() {
            "REM" => words.next().is_some_and(|key| {
                key.eq_ignore_ascii_case("GENRE") || key.eq_ignore_ascii_case("DATE")
            }),
            "PERFORMER" | "TITLE" | "FILE" | "TRACK" | "INDEX" => true,
            _ => false,
        };
        if !recognized {
            return Ok(Directive::Unknown);
        }

        let tokens = Self::tokenize(raw_line, line)?;
        let argument = |position: usize| Self::argument(&tokens, position, line, &keyword);

        let directive = match keyword.as_str() {
            "REM" => match tokens.get(1) {
                Some(key) => Directive::Rem {
                    key: key.to_ascii_uppercase(),
                    value: tokens[2..].join(" "),
                },
                None => Directive::Unknown,
            },
            "PERFORMER" => Directive::Performer(argument(1)?.clone()),
            "TITLE" => Directive::Title(argument(1)?.clone()),
            "FILE" => Directive::File {
                filename: argument(1)?.clone(),
            },
            "TRACK" => {
                let value = argument(1)?;
                let number = value.parse().map_err(|_| CueError::InvalidTrackNumber {
                    line,
                    value: value.clone(),
                })?;
                Directive::Track { number }
            }
            "INDEX" => {
                let value = argument(1)?;
                let number = value.parse().map_err(|_| CueError::InvalidIndexNumber {
                    line,
                    value: value.clone(),
                })?;
                let position = Self::parse_msf(argument(2)?, line)?;
                Directive::Index { number, position }
            }
            _ => Directive::Unknown,
        };

        Ok(directive)
    }

    fn argument<'a>(
        tokens: &'a [String],
        position: usize,
        line: usize,
        directive: &str,
    ) -> CueResult<&'a String> {
        tokens.get(position).ok_or_else(|| CueError::MissingArgument {
            line,
            directive: directive.to_string(),
        })
    }

    /// Splits a line on whitespace, keeping double quoted runs together without the quotes.
    fn tokenize(raw_line: &str, line: usize) -> CueResult<Vec<String>> {
        let mut tokens = Vec::new();
        let mut chars = raw_line.trim().chars().peekable();

        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
                continue;
            }

            let mut token = String::new();
            if c == '"' {
                chars.next();
                let mut closed = false;
                for ch in chars.by_ref() {
                    if ch == '"' {
                        closed = true;
                        break;
                    }
                    token.push(ch);
                }
                if !closed {
                    return Err(CueError::MissingQuoteError { line });
                }
            } else {
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() {
                        break;
                    }
                    token.push(ch);
                    chars.next();
                }
            }

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn parse_msf(msf_str: &str, line: usize) -> CueResult<MSF> {
        let invalid = || CueError::InvalidMSFFormat {
            line,
            value: msf_str.to_string(),
        };

        let parts: Vec<&str> = msf_str.split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let minutes: u32 = parts[0].parse().map_err(|_| invalid())?;
        let seconds: u8 = parts[1].parse().map_err(|_| invalid())?;
        let frames: u8 = parts[2].parse().map_err(|_| invalid())?;

        if seconds >= 60 || frames as u64 >= MSF::FRAMES_PER_SECOND {
            return Err(invalid());
        }

        Ok(MSF::new(minutes, seconds, frames))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
