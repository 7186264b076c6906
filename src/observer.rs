//! Observability hooks for a run.
//!
//! The core functions never log directly. They report to a
//! [`PipelineObserver`] handed in by the caller, which decides whether the
//! events become log lines, counters or nothing at all.

use std::time::Duration;

use crate::aggregate::SkipReason;
use crate::boundary::ByteRange;
use crate::error::ChunkError;

/// Events emitted while a run progresses.
#[derive(Debug, Clone, Copy)]
pub enum PipelineEvent<'a> {
    RunStarted {
        bytes: usize,
        chunks: usize,
        workers: usize,
        executor: &'static str,
    },
    ChunkStarted {
        index: usize,
        range: ByteRange,
    },
    /// A malformed line was dropped. `offset` is absolute in the input.
    LineSkipped {
        chunk: usize,
        offset: usize,
        reason: SkipReason,
    },
    ChunkFinished {
        index: usize,
        range: ByteRange,
        keys: usize,
        lines_parsed: u64,
        lines_skipped: u64,
        elapsed: Duration,
    },
    ChunkFailed {
        index: usize,
        attempt: u32,
        error: &'a ChunkError,
    },
    MergeStarted {
        partials: usize,
    },
    RunFinished {
        elapsed: Duration,
        bytes: usize,
        keys: usize,
        failed_chunks: usize,
    },
}

/// Receiver for [`PipelineEvent`]s. Called concurrently from worker threads.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&self, _event: &PipelineEvent<'_>) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        match *event {
            PipelineEvent::RunStarted {
                bytes,
                chunks,
                workers,
                executor,
            } => {
                tracing::info!(
                    bytes,
                    chunks,
                    workers,
                    executor,
                    "Starting processing of {:.2} KiB",
                    bytes as f64 / 1024.0
                );
            }
            PipelineEvent::ChunkStarted { index, range } => {
                tracing::debug!(
                    chunk = index,
                    %range,
                    "Starting chunk, {:.2} KiB",
                    range.len() as f64 / 1024.0
                );
            }
            PipelineEvent::LineSkipped {
                chunk,
                offset,
                reason,
            } => {
                tracing::warn!(chunk, offset, %reason, "Skipping malformed line");
            }
            PipelineEvent::ChunkFinished {
                index,
                range,
                keys,
                lines_parsed,
                lines_skipped,
                elapsed,
            } => {
                tracing::debug!(
                    chunk = index,
                    %range,
                    keys,
                    lines_parsed,
                    lines_skipped,
                    "Finished chunk in {:.4}s",
                    elapsed.as_secs_f64()
                );
            }
            PipelineEvent::ChunkFailed {
                index,
                attempt,
                error,
            } => {
                tracing::error!(chunk = index, attempt, %error, "Chunk failed");
            }
            PipelineEvent::MergeStarted { partials } => {
                tracing::debug!(partials, "Merging results from all chunks");
            }
            PipelineEvent::RunFinished {
                elapsed,
                bytes,
                keys,
                failed_chunks,
            } => {
                let secs = elapsed.as_secs_f64();
                let speed = if secs > 0.0 {
                    bytes as f64 / (1024.0 * 1024.0) / secs
                } else {
                    0.0
                };
                tracing::info!(
                    keys,
                    failed_chunks,
                    "Total processing time: {secs:.4}s, {speed:.2} MiB/s"
                );
            }
        }
    }
}
