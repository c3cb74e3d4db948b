use crate::dsf::error::{DsfError, DsfResult};
use crate::dsf::models::{
    DATA_CHUNK_HEADER_SIZE, DSD_CHUNK_SIZE, DataChunkHeader, DsdChunk, DsfHeader,
    FMT_CHUNK_MIN_SIZE, FmtChunk, SUPPORTED_BITS_PER_SAMPLE, StreamParams,
};
use binrw::BinRead;
use log::debug;
use std::io::{Read, Seek, SeekFrom};

/// Reads the `DSD `, `fmt ` and `data` chunk headers from the start of `reader`.
///
/// The reader is left positioned at the first audio byte.
pub fn read_dsf_header<R: Read + Seek>(reader: &mut R) -> DsfResult<DsfHeader> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let dsd = DsdChunk::read(reader).map_err(|source| DsfError::InvalidChunk {
        chunk: "DSD ",
        source,
    })?;
    if dsd.chunk_size != DSD_CHUNK_SIZE {
        return Err(DsfError::InvalidDsdChunkSize(dsd.chunk_size));
    }

    let fmt = FmtChunk::read_args(reader, (file_len,)).map_err(|source| {
        DsfError::InvalidChunk {
            chunk: "fmt ",
            source,
        }
    })?;
    if fmt.chunk_size < FMT_CHUNK_MIN_SIZE {
        return Err(DsfError::InvalidFmtChunkSize(fmt.chunk_size));
    }
    if fmt.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE {
        return Err(DsfError::UnsupportedBitsPerSample(fmt.bits_per_sample));
    }
    if fmt.channel_num == 0 {
        return Err(DsfError::InvalidStreamParams("channel count is zero"));
    }
    if fmt.sampling_frequency == 0 {
        return Err(DsfError::InvalidStreamParams("sample rate is zero"));
    }
    if fmt.block_size_per_channel == 0 {
        return Err(DsfError::InvalidStreamParams("block size is zero"));
    }

    let data = DataChunkHeader::read(reader).map_err(|source| DsfError::InvalidChunk {
        chunk: "data",
        source,
    })?;
    if data.chunk_size < DATA_CHUNK_HEADER_SIZE {
        return Err(DsfError::InvalidDataChunkSize(data.chunk_size));
    }
    let data_offset = reader.stream_position()?;
    let data_len = data.payload_len();

    let data_end = data_offset + data_len;
    if data_end > file_len {
        return Err(DsfError::DataChunkExceedsFile { data_end, file_len });
    }

    let params = StreamParams {
        channel_count: fmt.channel_num,
        sample_rate: fmt.sampling_frequency,
        bits_per_sample: fmt.bits_per_sample,
        block_size_per_channel: fmt.block_size_per_channel,
        data_offset,
        data_len,
    };

    debug!(
        "DSF header: {} ch, {} Hz, block {} bytes, data {} bytes at {}, {} blocks",
        params.channel_count,
        params.sample_rate,
        params.block_size_per_channel,
        params.data_len,
        params.data_offset,
        params.total_blocks()
    );

    Ok(DsfHeader {
        dsd,
        fmt,
        data,
        params,
    })
}
