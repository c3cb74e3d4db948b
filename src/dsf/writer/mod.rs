pub mod id3;

use crate::dsf::error::{DsfError, DsfResult};
use crate::dsf::models::{
    DATA_CHUNK_HEADER_SIZE, DSD_CHUNK_SIZE, DataChunkHeader, DsdChunk, DsfHeader,
};
use crate::dsf::resolver::TrackRange;
use binrw::BinWrite;
use log::debug;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Copies the blocks of `range` out of `source` into a new, untagged DSF container.
///
/// The `fmt ` chunk is carried over as-is except for its sample count, the audio bytes are
/// copied verbatim.
pub fn extract_track<R: Read + Seek>(
    source: &mut R,
    header: &DsfHeader,
    range: &TrackRange,
) -> DsfResult<Vec<u8>> {
    let params = &header.params;
    let byte_range = range.byte_range(params);
    let payload_len = byte_range.end - byte_range.start;

    let mut fmt = header.fmt.clone();
    fmt.sample_count = track_sample_count(header, range);

    let data = DataChunkHeader::for_payload(payload_len);
    let total_file_size = DSD_CHUNK_SIZE + fmt.chunk_size + DATA_CHUNK_HEADER_SIZE + payload_len;

    let dsd = DsdChunk {
        chunk_size: DSD_CHUNK_SIZE,
        total_file_size,
        metadata_offset: 0,
    };

    let mut container = Cursor::new(Vec::with_capacity(total_file_size as usize));
    dsd.write(&mut container)?;
    fmt.write(&mut container)?;
    data.write(&mut container)?;
    let mut container = container.into_inner();

    debug!(
        "Copying {} bytes from source offset {}",
        payload_len,
        params.data_offset + byte_range.start
    );

    source.seek(SeekFrom::Start(params.data_offset + byte_range.start))?;
    let read = source
        .by_ref()
        .take(payload_len)
        .read_to_end(&mut container)? as u64;

    if read != payload_len {
        return Err(DsfError::TruncatedSource {
            expected: payload_len,
            read,
        });
    }

    Ok(container)
}

/// Samples per channel covered by `range`.
///
/// Capped by the source's own sample count so the last track does not claim the zero padding
/// of the final block.
fn track_sample_count(header: &DsfHeader, range: &TrackRange) -> u64 {
    let samples_per_block = header.params.samples_per_block();
    let capacity = range.block_count() * samples_per_block;
    let remaining = header
        .fmt
        .sample_count
        .saturating_sub(range.start_block * samples_per_block);

    if remaining == 0 {
        capacity
    } else {
        capacity.min(remaining)
    }
}
