use crate::cue::models::{MSF, Track};
use crate::dsf::error::{DsfError, DsfResult};
use crate::dsf::models::StreamParams;

/// Inclusive block range of one track within its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackRange {
    pub start_block: u64,
    pub end_block: u64,
}

impl TrackRange {
    pub fn block_count(&self) -> u64 {
        self.end_block - self.start_block + 1
    }

    /// Byte range of the track relative to the start of the data chunk payload.
    pub fn byte_range(&self, params: &StreamParams) -> std::ops::Range<u64> {
        let stride = params.block_stride();
        self.start_block * stride..(self.end_block + 1) * stride
    }

    pub fn duration_secs(&self, params: &StreamParams) -> f64 {
        (self.block_count() * params.samples_per_block()) as f64 / params.sample_rate as f64
    }
}

/// Maps a CUE timestamp onto the block containing it.
///
/// `floor(seconds * rate)` is computed as `frames * rate / 75` in integers, which is exact.
/// Positions too far out for a `u64` block index saturate and fail the range check.
pub fn block_index(position: MSF, params: &StreamParams) -> u64 {
    let sample_offset = position.total_frames() as u128 * params.sample_rate as u128
        / MSF::FRAMES_PER_SECOND as u128;
    let block = sample_offset / params.samples_per_block() as u128;
    u64::try_from(block).unwrap_or(u64::MAX)
}

/// Resolves the block range of `tracks[index]`, where `tracks` all belong to one source file.
///
/// A track ends one block before the next track of the same file starts, the last track ends
/// with the last complete block of the file.
pub fn resolve_track_range(
    tracks: &[Track],
    index: usize,
    params: &StreamParams,
) -> DsfResult<TrackRange> {
    let total_blocks = params.total_blocks();
    let start_block = block_index(tracks[index].start, params);

    if start_block >= total_blocks {
        return Err(DsfError::StartBlockOutOfRange {
            start_block,
            total_blocks,
        });
    }

    let end_block = match tracks.get(index + 1) {
        Some(next) => {
            let next_start_block = block_index(next.start, params).min(total_blocks);
            if next_start_block <= start_block {
                return Err(DsfError::EmptyTrackRange {
                    start_block,
                    next_start_block,
                });
            }
            next_start_block - 1
        }
        None => total_blocks - 1,
    };

    Ok(TrackRange {
        start_block,
        end_block,
    })
}
