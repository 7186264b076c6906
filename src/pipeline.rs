//! Plan, aggregate and merge driver.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::aggregate::{aggregate_range, ChunkOutput};
use crate::boundary::{plan_boundaries, ByteRange};
use crate::config::PipelineConfig;
use crate::error::{ChunkError, PipelineError, Result};
use crate::executor::ChunkResult;
use crate::merge::merge_all;
use crate::observer::{PipelineEvent, PipelineObserver, TracingObserver};
use crate::source::{ByteSource, MappedFile};
use crate::stats::StatsMap;

/// A chunk that still failed after every attempt.
#[derive(Debug)]
pub struct ChunkFailure {
    pub index: usize,
    pub range: ByteRange,
    pub attempts: u32,
    pub error: ChunkError,
}

/// Outcome of a run.
#[derive(Debug)]
pub struct RunReport {
    pub results: StatsMap,
    /// Number of planned chunks.
    pub chunks: usize,
    /// Chunks whose lines are missing from `results`.
    pub failures: Vec<ChunkFailure>,
    pub lines_parsed: u64,
    pub lines_ignored: u64,
    pub lines_skipped: u64,
    pub bytes: usize,
    pub elapsed: Duration,
}

impl RunReport {
    /// True when every chunk contributed to `results`.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn throughput_mib_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / (1024.0 * 1024.0) / secs
        } else {
            0.0
        }
    }
}

/// Runs the whole pipeline over one input.
pub struct Pipeline {
    config: PipelineConfig,
    observer: Arc<dyn PipelineObserver>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Maps `path` read-only and runs over it.
    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<RunReport> {
        let path = path.as_ref();
        let _span = tracing::info_span!("run", path = %path.display()).entered();
        let source = MappedFile::open(path)?;
        self.run_source(&source)
    }

    /// Runs over any byte source.
    ///
    /// All chunks are dispatched and joined before anything is merged. Failed
    /// chunks are re-dispatched up to `chunk_retries` times. The run fails only
    /// when no chunk at all succeeded.
    pub fn run_source<S>(&self, source: &S) -> Result<RunReport>
    where
        S: ByteSource + ?Sized,
    {
        let started = Instant::now();
        let observer = self.observer.as_ref();
        let format = self.config.format;
        let workers = self.config.effective_workers();
        let ranges = plan_boundaries(source.as_bytes(), workers, format.line_separator);
        let executor = self.config.executor.build(workers.get())?;

        observer.on_event(&PipelineEvent::RunStarted {
            bytes: source.len(),
            chunks: ranges.len(),
            workers: executor.workers(),
            executor: executor.name(),
        });

        let mut outputs: Vec<ChunkOutput> = Vec::with_capacity(ranges.len());
        let mut failures: Vec<ChunkFailure> = Vec::new();
        let mut pending: Vec<usize> = (0..ranges.len()).collect();
        let mut attempt = 1u32;

        while !pending.is_empty() {
            let results = {
                let batch = &pending;
                let ranges = &ranges;
                let job = |slot: usize| -> ChunkResult {
                    let index = batch[slot];
                    let range = ranges[index];
                    observer.on_event(&PipelineEvent::ChunkStarted { index, range });
                    let output = aggregate_range(source, index, range, &format, observer)?;
                    observer.on_event(&PipelineEvent::ChunkFinished {
                        index,
                        range,
                        keys: output.stats.len(),
                        lines_parsed: output.lines_parsed,
                        lines_skipped: output.lines_skipped,
                        elapsed: output.elapsed,
                    });
                    Ok(output)
                };
                executor.run(batch.len(), &job)
            };

            let mut retry = Vec::new();
            for (slot, result) in results.into_iter().enumerate() {
                let index = pending[slot];
                match result {
                    Ok(output) => outputs.push(output),
                    Err(error) => {
                        observer.on_event(&PipelineEvent::ChunkFailed {
                            index,
                            attempt,
                            error: &error,
                        });
                        if attempt > self.config.chunk_retries {
                            failures.push(ChunkFailure {
                                index,
                                range: ranges[index],
                                attempts: attempt,
                                error,
                            });
                        } else {
                            retry.push(index);
                        }
                    }
                }
            }
            pending = retry;
            attempt += 1;
        }

        if outputs.is_empty() && !failures.is_empty() {
            let chunks = ranges.len();
            failures.sort_by_key(|f| f.index);
            let first = failures.swap_remove(0).error;
            return Err(PipelineError::AllChunksFailed { chunks, first });
        }

        outputs.sort_by_key(|o| o.index);
        failures.sort_by_key(|f| f.index);

        let lines_parsed = outputs.iter().map(|o| o.lines_parsed).sum();
        let lines_ignored = outputs.iter().map(|o| o.lines_ignored).sum();
        let lines_skipped = outputs.iter().map(|o| o.lines_skipped).sum();

        observer.on_event(&PipelineEvent::MergeStarted {
            partials: outputs.len(),
        });
        let results = merge_all(outputs.into_iter().map(|o| o.stats));

        let report = RunReport {
            results,
            chunks: ranges.len(),
            failures,
            lines_parsed,
            lines_ignored,
            lines_skipped,
            bytes: source.len(),
            elapsed: started.elapsed(),
        };
        observer.on_event(&PipelineEvent::RunFinished {
            elapsed: report.elapsed,
            bytes: report.bytes,
            keys: report.results.len(),
            failed_chunks: report.failures.len(),
        });
        Ok(report)
    }
}
