use std::fmt::{Display, Formatter};

/// A parsed CUE sheet: album level metadata plus the referenced source files in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueSheet {
    pub meta: SheetMeta,
    pub files: Vec<CueFile>,
}

impl CueSheet {
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.files.iter().flat_map(|file| file.tracks.iter())
    }

    pub fn track_count(&self) -> usize {
        self.files.iter().map(|file| file.tracks.len()).sum()
    }
}

/// Album level values. Never mutated once the sheet has been parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetMeta {
    pub title: Option<String>,
    pub performer: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueFile {
    /// Name as written in the sheet, relative to the sheet's directory
    pub filename: String,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub number: u32,
    pub title: Option<String>,
    /// Track level PERFORMER, overrides the album performer
    pub performer: Option<String>,
    /// INDEX 01, relative to the start of the owning file
    pub start: MSF,
}

impl Track {
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => format!("Track {:02}", self.number),
        }
    }
}

/// A CUE timestamp, `MM:SS:FF` with 75 frames per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct MSF {
    pub minutes: u32,
    pub seconds: u8,
    pub frames: u8,
}

impl MSF {
    pub const FRAMES_PER_SECOND: u64 = 75;

    pub fn new(minutes: u32, seconds: u8, frames: u8) -> Self {
        Self {
            minutes,
            seconds,
            frames,
        }
    }

    pub fn total_frames(&self) -> u64 {
        (self.minutes as u64 * 60 + self.seconds as u64) * Self::FRAMES_PER_SECOND
            + self.frames as u64
    }
}

impl Display for MSF {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.minutes, self.seconds, self.frames
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msf_total_frames_counts_75_per_second() {
        assert_eq!(MSF::new(0, 0, 0).total_frames(), 0);
        assert_eq!(MSF::new(0, 1, 0).total_frames(), 75);
        assert_eq!(MSF::new(3, 26, 15).total_frames(), 15_465);
    }

    #[test]
    fn msf_ordering_follows_time() {
        assert!(MSF::new(0, 59, 74) < MSF::new(1, 0, 0));
        assert!(MSF::new(1, 0, 1) > MSF::new(1, 0, 0));
    }

    #[test]
    fn untitled_track_falls_back_to_number() {
        let track = Track {
            number: 7,
            title: None,
            performer: None,
            start: MSF::default(),
        };
        assert_eq!(track.display_title(), "Track 07");
    }
}
