//! Run configuration.

use std::num::NonZeroUsize;

use crate::executor::ExecutorKind;
use crate::format::LineFormat;

/// Configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of chunks and worker threads.
    /// Set to 0 to use the number of CPU cores.
    /// Default: 0
    pub workers: usize,

    /// Concurrency substrate that runs the chunks.
    /// Default: rayon
    pub executor: ExecutorKind,

    pub format: LineFormat,

    /// How many more times a failed chunk is attempted before it is given up.
    /// Default: 0
    pub chunk_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            executor: ExecutorKind::default(),
            format: LineFormat::default(),
            chunk_retries: 0,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the worker count, resolving 0 to the number of CPU cores.
    pub fn effective_workers(&self) -> NonZeroUsize {
        let workers = if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        };
        NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_executor(mut self, executor: ExecutorKind) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_chunk_retries(mut self, retries: u32) -> Self {
        self.chunk_retries = retries;
        self
    }
}
