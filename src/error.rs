use thiserror::Error;

/// Errors raised by the sort pipeline.
///
/// I/O failures are propagated as [std::io::Error] wrapped in [anyhow::Error] context and are not
/// part of this enum. Use `error.downcast_ref::<SortError>()` on the returned [anyhow::Error] to
/// inspect the kind.
#[derive(Debug, Error)]
pub enum SortError {
    /// The chunk size is below the configured minimum
    #[error("chunk size of {requested} bytes is below the minimum of {minimum} bytes")]
    ChunkSizeBelowMinimum {
        requested: u64,
        minimum: u64,
    },

    /// The chunk size is above the absolute ceiling
    #[error("chunk size of {requested} bytes is above the maximum of {maximum} bytes")]
    ChunkSizeAboveMaximum {
        requested: u64,
        maximum: u64,
    },

    /// The chunk size does not fit into physical memory
    #[error("chunk size of {requested} bytes exceeds total physical memory of {total} bytes")]
    ChunkSizeExceedsMemory {
        requested: u64,
        total: u64,
    },

    /// Any other rejected setting or argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A line, terminator included, is longer than the configured maximum
    #[error("line exceeds the maximum length of {limit} bytes")]
    LineTooLong {
        limit: usize,
    },

    /// The merger selected a source that has no line left. Never expected.
    #[error("merge source {source_index} was selected but is exhausted")]
    ExhaustionInvariantViolation {
        source_index: usize,
    },
}

impl SortError {
    /// True for errors caused by configuration or arguments, detected before any file is opened
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SortError::ChunkSizeBelowMinimum { .. }
                | SortError::ChunkSizeAboveMaximum { .. }
                | SortError::ChunkSizeExceedsMemory { .. }
                | SortError::InvalidArgument(_)
        )
    }
}
