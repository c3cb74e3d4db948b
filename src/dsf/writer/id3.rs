use crate::cue::models::{SheetMeta, Track};
use crate::dsf::error::{DsfError, DsfResult};
use crate::dsf::models::{METADATA_OFFSET_OFFSET, TOTAL_FILE_SIZE_OFFSET};
use binrw::{BinRead, BinWrite, binrw};
use byteorder::{ByteOrder, LittleEndian};
use std::io::Cursor;

pub const ID3V2_HEADER_SIZE: usize = 10;

/// Largest value a 4 byte synchsafe integer can hold (28 bits).
const SYNCHSAFE_MAX: u32 = 0x0FFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(repr = u8)]
pub enum TextEncoding {
    Latin1 = 0,
    Utf16 = 1,
    Utf16Be = 2,
    Utf8 = 3,
}

/// The 10 byte ID3v2 tag header. `size` counts the frames only, not this header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big, magic = b"ID3")]
pub struct Id3v2Header {
    pub major_version: u8,
    pub revision: u8,
    pub flags: u8,
    #[br(map = decode_synchsafe)]
    #[bw(map = |size: &u32| encode_synchsafe(*size))]
    pub size: u32,
}

/// An ID3v2.3 text information frame (`T***`).
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFrame {
    pub id: [u8; 4],

    /// Frame size excluding the 10 byte frame header
    #[bw(calc = data.len() as u32 + 1)]
    #[br(temp)]
    size: u32,

    pub flags: u16,

    pub encoding: TextEncoding,

    #[br(count = size.saturating_sub(1))]
    pub data: Vec<u8>,
}

impl TextFrame {
    pub fn utf8(id: &[u8; 4], text: &str) -> Self {
        Self {
            id: *id,
            flags: 0,
            encoding: TextEncoding::Utf8,
            data: text.as_bytes().to_vec(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Tag values for one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTag {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track_number: u32,
    pub track_total: usize,
    pub genre: Option<String>,
    pub year: Option<String>,
}

impl OutputTag {
    pub fn for_track(meta: &SheetMeta, track: &Track, track_total: usize) -> Self {
        let artist = track
            .performer
            .as_ref()
            .filter(|performer| !performer.is_empty())
            .or(meta.performer.as_ref())
            .cloned();

        Self {
            title: track.display_title(),
            artist,
            album: meta.title.clone(),
            track_number: track.number,
            track_total,
            genre: meta.genre.clone(),
            year: meta.date.clone(),
        }
    }

    /// Frames in write order, fields without a value are left out.
    pub fn frames(&self) -> Vec<TextFrame> {
        let track = format!("{}/{}", self.track_number, self.track_total);

        [
            (b"TIT2", Some(&self.title)),
            (b"TPE1", self.artist.as_ref()),
            (b"TALB", self.album.as_ref()),
            (b"TRCK", Some(&track)),
            (b"TCON", self.genre.as_ref()),
            (b"TYER", self.year.as_ref()),
        ]
        .into_iter()
        .filter_map(|(id, value)| {
            value
                .filter(|value| !value.is_empty())
                .map(|value| TextFrame::utf8(id, value.as_str()))
        })
        .collect()
    }
}

/// Serializes `tag` as an ID3v2.3 tag. Returns an empty buffer when there is nothing to write.
pub fn build_id3v2_tag(tag: &OutputTag) -> DsfResult<Vec<u8>> {
    let frames = tag.frames();
    if frames.is_empty() {
        return Ok(Vec::new());
    }

    let mut frame_data = Cursor::new(Vec::new());
    for frame in &frames {
        frame.write(&mut frame_data)?;
    }
    let frame_data = frame_data.into_inner();

    if frame_data.len() > SYNCHSAFE_MAX as usize {
        return Err(DsfError::TagTooLarge(frame_data.len()));
    }

    let header = Id3v2Header {
        major_version: 3,
        revision: 0,
        flags: 0,
        size: frame_data.len() as u32,
    };

    let mut data = Cursor::new(Vec::with_capacity(ID3V2_HEADER_SIZE + frame_data.len()));
    header.write(&mut data)?;

    let mut data = data.into_inner();
    data.extend_from_slice(&frame_data);
    Ok(data)
}

/// Appends `tag` to a built DSF container and points the `DSD ` chunk at it.
pub fn append_tag(container: &mut Vec<u8>, tag: &[u8]) {
    if tag.is_empty() {
        return;
    }

    let metadata_offset = container.len() as u64;
    container.extend_from_slice(tag);
    let total_file_size = container.len() as u64;

    patch_dsd_chunk(container, total_file_size, metadata_offset);
}

/// Overwrites the total size and metadata pointer fields of the leading `DSD ` chunk.
pub fn patch_dsd_chunk(container: &mut [u8], total_file_size: u64, metadata_offset: u64) {
    LittleEndian::write_u64(
        &mut container[TOTAL_FILE_SIZE_OFFSET..TOTAL_FILE_SIZE_OFFSET + 8],
        total_file_size,
    );
    LittleEndian::write_u64(
        &mut container[METADATA_OFFSET_OFFSET..METADATA_OFFSET_OFFSET + 8],
        metadata_offset,
    );
}

fn encode_synchsafe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

fn decode_synchsafe(raw: [u8; 4]) -> u32 {
    raw.iter()
        .fold(0u32, |value, byte| (value << 7) | (*byte & 0x7F) as u32)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cue::models::MSF;
    use binrw::BinReaderExt;

    /// Reads back every frame of a tag produced by [`build_id3v2_tag`].
    pub(crate) fn read_frames(tag: &[u8]) -> Vec<TextFrame> {
        let mut cursor = Cursor::new(tag);
        let header = Id3v2Header::read(&mut cursor).unwrap();
        let end = ID3V2_HEADER_SIZE as u64 + header.size as u64;

        let mut frames = Vec::new();
        while cursor.position() < end {
            frames.push(cursor.read_be::<TextFrame>().unwrap());
        }
        assert_eq!(cursor.position(), end);
        frames
    }

    fn frame_ids(frames: &[TextFrame]) -> Vec<&str> {
        frames
            .iter()
            .map(|frame| std::str::from_utf8(&frame.id).unwrap())
            .collect()
    }

    fn meta() -> SheetMeta {
        SheetMeta {
            title: Some("Kind of Blue".to_string()),
            performer: Some("Miles Davis".to_string()),
            genre: None,
            date: None,
        }
    }

    fn track(performer: Option<&str>) -> Track {
        Track {
            number: 3,
            title: Some("Blue in Green".to_string()),
            performer: performer.map(str::to_string),
            start: MSF::default(),
        }
    }

    #[test]
    fn synchsafe_round_trip_and_layout() {
        assert_eq!(encode_synchsafe(0x7F), [0, 0, 0, 0x7F]);
        assert_eq!(encode_synchsafe(0x80), [0, 0, 1, 0]);
        assert_eq!(encode_synchsafe(SYNCHSAFE_MAX), [0x7F; 4]);
        assert_eq!(decode_synchsafe(encode_synchsafe(123_456)), 123_456);
    }

    #[test]
    fn header_and_frame_layout() {
        let tag = OutputTag {
            title: "So What".to_string(),
            artist: None,
            album: None,
            track_number: 1,
            track_total: 5,
            genre: None,
            year: None,
        };
        let bytes = build_id3v2_tag(&tag).unwrap();

        assert_eq!(&bytes[0..6], b"ID3\x03\x00\x00");
        // TIT2 + "So What" and TRCK + "1/5"
        let frames_len = (10 + 1 + 7) + (10 + 1 + 3);
        assert_eq!(&bytes[6..10], &encode_synchsafe(frames_len));
        assert_eq!(bytes.len(), ID3V2_HEADER_SIZE + frames_len as usize);

        assert_eq!(&bytes[10..14], b"TIT2");
        assert_eq!(&bytes[14..18], &8u32.to_be_bytes());
        assert_eq!(&bytes[18..20], &[0, 0]);
        assert_eq!(bytes[20], 3);
        assert_eq!(&bytes[21..28], b"So What");
    }

    #[test]
    fn genre_without_date_writes_no_year_frame() {
        let mut meta = meta();
        meta.genre = Some("Jazz".to_string());

        let tag = OutputTag::for_track(&meta, &track(None), 5);
        let frames = read_frames(&build_id3v2_tag(&tag).unwrap());

        assert_eq!(frame_ids(&frames), vec!["TIT2", "TPE1", "TALB", "TRCK", "TCON"]);
        assert_eq!(frames[4].text(), "Jazz");
    }

    #[test]
    fn track_performer_overrides_album_performer() {
        let tag = OutputTag::for_track(&meta(), &track(Some("Bill Evans")), 5);
        let frames = read_frames(&build_id3v2_tag(&tag).unwrap());

        let artist = frames.iter().find(|frame| &frame.id == b"TPE1").unwrap();
        assert_eq!(artist.text(), "Bill Evans");
        assert_eq!(artist.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn empty_track_performer_falls_back_to_album() {
        let tag = OutputTag::for_track(&meta(), &track(Some("")), 5);
        assert_eq!(tag.artist.as_deref(), Some("Miles Davis"));
    }

    #[test]
    fn track_number_is_rendered_against_sheet_total() {
        let tag = OutputTag::for_track(&meta(), &track(None), 12);
        let frames = read_frames(&build_id3v2_tag(&tag).unwrap());

        let trck = frames.iter().find(|frame| &frame.id == b"TRCK").unwrap();
        assert_eq!(trck.text(), "3/12");
    }

    #[test]
    fn non_ascii_text_is_written_as_utf8() {
        let mut track = track(None);
        track.title = Some("Für Elise".to_string());

        let tag = OutputTag::for_track(&SheetMeta::default(), &track, 1);
        let frames = read_frames(&build_id3v2_tag(&tag).unwrap());

        assert_eq!(frames[0].text(), "Für Elise");
        assert_eq!(frame_ids(&frames), vec!["TIT2", "TRCK"]);
    }

    #[test]
    fn append_patches_pointer_and_total_size() {
        let mut container = vec![0u8; 100];
        container[0..4].copy_from_slice(b"DSD ");
        let tag = build_id3v2_tag(&OutputTag::for_track(&meta(), &track(None), 5)).unwrap();

        append_tag(&mut container, &tag);

        assert_eq!(container.len(), 100 + tag.len());
        assert_eq!(LittleEndian::read_u64(&container[20..28]), 100);
        assert_eq!(
            LittleEndian::read_u64(&container[12..20]),
            container.len() as u64
        );
        assert_eq!(&container[100..103], b"ID3");
    }

    #[test]
    fn append_without_tag_leaves_container_untouched() {
        let mut container = vec![7u8; 40];
        append_tag(&mut container, &[]);
        assert_eq!(container, vec![7u8; 40]);
    }
}
