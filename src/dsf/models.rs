use binrw::{BinRead, BinWrite};

/// Size of the `DSD ` chunk, including its tag.
pub const DSD_CHUNK_SIZE: u64 = 28;

/// Size of a `fmt ` chunk without any trailing extension bytes.
pub const FMT_CHUNK_MIN_SIZE: u64 = 52;

/// Size of the `data` chunk header (tag + chunk size).
pub const DATA_CHUNK_HEADER_SIZE: u64 = 12;

/// Absolute offset of [`DsdChunk::total_file_size`].
pub const TOTAL_FILE_SIZE_OFFSET: usize = 12;

/// Absolute offset of [`DsdChunk::metadata_offset`].
pub const METADATA_OFFSET_OFFSET: usize = 20;

/// DSF only defines 1 bit samples.
pub const SUPPORTED_BITS_PER_SAMPLE: u32 = 1;

/// The leading chunk of every DSF file.
/// All DSF integers are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = b"DSD ")]
pub struct DsdChunk {
    /// Size of this chunk, always 28
    pub chunk_size: u64,

    /// Size of the whole file, including the trailing metadata
    pub total_file_size: u64,

    /// Absolute offset of the ID3v2 metadata chunk, 0 if there is none
    pub metadata_offset: u64,
}

/// Describes the DSD stream. Written back unchanged apart from the sample count.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = b"fmt ")]
#[br(import(file_len: u64))]
pub struct FmtChunk {
    /// Size of this chunk, usually 52
    #[br(assert(
        chunk_size <= file_len.saturating_sub(DSD_CHUNK_SIZE + DATA_CHUNK_HEADER_SIZE),
        "fmt chunk size {} does not fit a {} byte file",
        chunk_size,
        file_len
    ))]
    pub chunk_size: u64,

    /// Format version, 1
    pub format_version: u32,

    /// Format id, 0 for DSD raw
    pub format_id: u32,

    /// Channel type (1 = mono, 2 = stereo, ... 7 = 5.1)
    pub channel_type: u32,

    /// Number of interleaved channels
    pub channel_num: u32,

    /// Sampling frequency in Hz, e.g. 2822400 for DSD64
    pub sampling_frequency: u32,

    /// Bits per sample, 1
    pub bits_per_sample: u32,

    /// Samples per channel
    pub sample_count: u64,

    /// Bytes per channel in one block, 4096
    pub block_size_per_channel: u32,

    pub reserved: u32,

    /// Bytes beyond the standard 52, copied as-is
    #[br(count = chunk_size.saturating_sub(FMT_CHUNK_MIN_SIZE))]
    pub extra: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = b"data")]
pub struct DataChunkHeader {
    /// Size of the data chunk, including this 12 byte header
    pub chunk_size: u64,
}

impl DataChunkHeader {
    pub fn for_payload(payload_len: u64) -> Self {
        Self {
            chunk_size: DATA_CHUNK_HEADER_SIZE + payload_len,
        }
    }

    pub fn payload_len(&self) -> u64 {
        self.chunk_size.saturating_sub(DATA_CHUNK_HEADER_SIZE)
    }
}

/// Stream layout of one DSF source, everything the resolver and extractor need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParams {
    pub channel_count: u32,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    pub block_size_per_channel: u32,

    /// Absolute offset of the first audio byte
    pub data_offset: u64,

    /// Length of the audio payload in bytes
    pub data_len: u64,
}

impl StreamParams {
    /// Bytes in one interleaved block group (one block for every channel).
    pub fn block_stride(&self) -> u64 {
        self.block_size_per_channel as u64 * self.channel_count as u64
    }

    pub fn samples_per_block(&self) -> u64 {
        self.block_size_per_channel as u64 * 8 / self.bits_per_sample as u64
    }

    pub fn block_duration_secs(&self) -> f64 {
        self.samples_per_block() as f64 / self.sample_rate as f64
    }

    /// Number of complete blocks in the data chunk, a trailing partial block is not counted.
    pub fn total_blocks(&self) -> u64 {
        self.data_len / self.block_stride()
    }

    pub fn has_partial_block(&self) -> bool {
        self.data_len % self.block_stride() != 0
    }

    pub fn duration_secs(&self) -> f64 {
        (self.total_blocks() * self.samples_per_block()) as f64 / self.sample_rate as f64
    }
}

/// A parsed DSF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsfHeader {
    pub dsd: DsdChunk,
    pub fmt: FmtChunk,
    pub data: DataChunkHeader,
    pub params: StreamParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dsd64_stereo(data_len: u64) -> StreamParams {
        StreamParams {
            channel_count: 2,
            sample_rate: 2_822_400,
            bits_per_sample: 1,
            block_size_per_channel: 4096,
            data_offset: 92,
            data_len,
        }
    }

    #[test]
    fn derived_block_values() {
        let params = dsd64_stereo(8192 * 10);

        assert_eq!(params.block_stride(), 8192);
        assert_eq!(params.samples_per_block(), 32768);
        assert_eq!(params.total_blocks(), 10);
        assert!(!params.has_partial_block());
        assert!((params.block_duration_secs() - 32768.0 / 2_822_400.0).abs() < 1e-12);
    }

    #[test]
    fn partial_trailing_block_is_not_counted() {
        let params = dsd64_stereo(8192 * 3 + 100);

        assert_eq!(params.total_blocks(), 3);
        assert!(params.has_partial_block());
    }

    #[test]
    fn fmt_chunk_keeps_extension_bytes() {
        let fmt = FmtChunk {
            chunk_size: FMT_CHUNK_MIN_SIZE + 4,
            format_version: 1,
            format_id: 0,
            channel_type: 2,
            channel_num: 2,
            sampling_frequency: 2_822_400,
            bits_per_sample: 1,
            sample_count: 0,
            block_size_per_channel: 4096,
            reserved: 0,
            extra: vec![1, 2, 3, 4],
        };

        let mut bytes = Cursor::new(Vec::new());
        fmt.write(&mut bytes).unwrap();
        assert_eq!(bytes.get_ref().len() as u64, FMT_CHUNK_MIN_SIZE + 4);
        assert_eq!(&bytes.get_ref()[0..4], b"fmt ");

        bytes.set_position(0);
        assert_eq!(FmtChunk::read_args(&mut bytes, (1024,)).unwrap(), fmt);
    }

    #[test]
    fn dsd_chunk_field_offsets() {
        let dsd = DsdChunk {
            chunk_size: DSD_CHUNK_SIZE,
            total_file_size: 0x1122,
            metadata_offset: 0x3344,
        };

        let mut bytes = Cursor::new(Vec::new());
        dsd.write(&mut bytes).unwrap();
        let bytes = bytes.into_inner();

        assert_eq!(bytes.len() as u64, DSD_CHUNK_SIZE);
        assert_eq!(bytes[TOTAL_FILE_SIZE_OFFSET], 0x22);
        assert_eq!(bytes[METADATA_OFFSET_OFFSET], 0x44);
    }
}
