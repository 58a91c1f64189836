use std::path::PathBuf;

use crate::error::SortError;

pub(crate) const KB: u64 = 1 << 10;
pub(crate) const MB: u64 = KB << 10;
pub(crate) const GB: u64 = MB << 10;
pub(crate) const TB: u64 = GB << 10;

/// Default lower bound for the chunk size, keeps the number of spill files in check
pub const MIN_CHUNK_SIZE_BYTES: u64 = MB;
/// Absolute upper bound for the chunk size
pub const MAX_CHUNK_SIZE_BYTES: u64 = TB;
/// Default maximum length of a single line, terminator included
pub const DEFAULT_MAX_LINE_LENGTH: usize = MB as usize;

#[derive(Clone, Debug)]
pub(crate) struct Config {
    tmp: PathBuf,
    chunk_size_bytes: u64,
    max_line_length: usize,
}

impl Config {
    pub(crate) fn new(tmp: PathBuf, chunk_size_bytes: u64, max_line_length: usize) -> Config {
        Config {
            tmp,
            chunk_size_bytes,
            max_line_length,
        }
    }

    pub(crate) fn tmp(&self) -> &PathBuf {
        &self.tmp
    }

    pub(crate) fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_bytes
    }

    pub(crate) fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

/// Check a requested chunk size against the floor, the ceiling and physical memory, in that
/// order. A `total_memory` of None skips the memory check.
pub(crate) fn validate_chunk_size(
    requested: u64,
    minimum: u64,
    maximum: u64,
    total_memory: Option<u64>,
) -> Result<(), SortError> {
    if requested == 0 {
        return Err(SortError::InvalidArgument("chunk size must be greater than zero".to_string()));
    }

    if requested < minimum {
        return Err(SortError::ChunkSizeBelowMinimum { requested, minimum });
    }

    if requested > maximum {
        return Err(SortError::ChunkSizeAboveMaximum { requested, maximum });
    }

    match total_memory {
        Some(total) if requested > total => {
            Err(SortError::ChunkSizeExceedsMemory { requested, total })
        }
        Some(_) => Ok(()),
        None => {
            log::warn!("Total physical memory is unknown, chunk size of {} bytes not checked against it", requested);
            Ok(())
        }
    }
}
