use std::path::PathBuf;

use thiserror::Error;

use crate::boundary::ByteRange;

/// A chunk could not be aggregated. The chunk produced no output at all.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("range {range} lies outside the input ({len} bytes)")]
    OutOfBounds { range: ByteRange, len: usize },

    #[error("failed to read range {range}: {source}")]
    Io {
        range: ByteRange,
        #[source]
        source: std::io::Error,
    },

    #[error("worker panicked while aggregating chunk {index}: {message}")]
    WorkerPanicked { index: usize, message: String },
}

/// Run-level failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("all {chunks} chunks failed; first error: {first}")]
    AllChunksFailed { chunks: usize, first: ChunkError },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
