//! Interchangeable concurrency substrates for running chunk jobs.
//!
//! Every executor runs the same job once per chunk index and hands back the
//! results in index order only after all jobs have finished. Nothing is shared
//! between jobs except the read-only input captured by the job itself.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use rayon::prelude::*;

use crate::aggregate::ChunkOutput;
use crate::error::{ChunkError, PipelineError};

pub type ChunkResult = Result<ChunkOutput, ChunkError>;

/// The per-chunk function an executor drives. Called with the chunk index.
pub type ChunkJob<'a> = dyn Fn(usize) -> ChunkResult + Sync + 'a;

pub trait Executor: Send + Sync {
    fn name(&self) -> &'static str;

    fn workers(&self) -> usize;

    /// Runs `job(0)..job(jobs)` and returns their results in index order.
    fn run(&self, jobs: usize, job: &ChunkJob<'_>) -> Vec<ChunkResult>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExecutorKind {
    /// Work-stealing rayon thread pool.
    #[default]
    Rayon,
    /// Fixed worker threads fed from a job queue.
    Pool,
    /// Every chunk in turn on the calling thread.
    Sequential,
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutorKind::Rayon => "rayon",
            ExecutorKind::Pool => "pool",
            ExecutorKind::Sequential => "sequential",
        })
    }
}

impl ExecutorKind {
    pub fn build(self, workers: usize) -> Result<Box<dyn Executor>, PipelineError> {
        Ok(match self {
            ExecutorKind::Rayon => Box::new(RayonExecutor::new(workers)?),
            ExecutorKind::Pool => Box::new(ChannelPoolExecutor::new(workers)),
            ExecutorKind::Sequential => Box::new(SequentialExecutor),
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Runs one job, turning a panic into a chunk failure.
fn run_job(job: &ChunkJob<'_>, index: usize) -> ChunkResult {
    catch_unwind(AssertUnwindSafe(|| job(index))).unwrap_or_else(|payload| {
        Err(ChunkError::WorkerPanicked {
            index,
            message: panic_message(payload),
        })
    })
}

/// Dedicated rayon pool.
pub struct RayonExecutor {
    pool: rayon::ThreadPool,
}

impl RayonExecutor {
    pub fn new(threads: usize) -> Result<Self, PipelineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("brc-rayon-{i}"))
            .build()?;
        Ok(Self { pool })
    }
}

impl Executor for RayonExecutor {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn run(&self, jobs: usize, job: &ChunkJob<'_>) -> Vec<ChunkResult> {
        self.pool.install(|| {
            (0..jobs)
                .into_par_iter()
                .map(|index| run_job(job, index))
                .collect()
        })
    }
}

/// Fixed number of scoped worker threads pulling chunk indices from a
/// crossbeam queue and pushing results back over a second channel.
pub struct ChannelPoolExecutor {
    workers: usize,
}

impl ChannelPoolExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl Executor for ChannelPoolExecutor {
    fn name(&self) -> &'static str {
        "pool"
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn run(&self, jobs: usize, job: &ChunkJob<'_>) -> Vec<ChunkResult> {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, ChunkResult)>();

        for index in 0..jobs {
            if job_tx.send(index).is_err() {
                break;
            }
        }
        drop(job_tx);

        thread::scope(|scope| {
            for _ in 0..self.workers.min(jobs) {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for index in job_rx.iter() {
                        if result_tx.send((index, run_job(job, index))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut slots: Vec<Option<ChunkResult>> = (0..jobs).map(|_| None).collect();
        for (index, result) in result_rx.iter() {
            slots[index] = Some(result);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    Err(ChunkError::WorkerPanicked {
                        index,
                        message: "worker exited without a result".to_string(),
                    })
                })
            })
            .collect()
    }
}

/// Runs chunks one after another on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn workers(&self) -> usize {
        1
    }

    fn run(&self, jobs: usize, job: &ChunkJob<'_>) -> Vec<ChunkResult> {
        (0..jobs).map(|index| run_job(job, index)).collect()
    }
}
