//! Per-key min/max/mean over huge `key;value` files.
//!
//! The input is split into newline-aligned byte ranges
//! ([`boundary::plan_boundaries`]), each range is aggregated independently
//! ([`aggregate::aggregate_range`]) on one of several executors, and the
//! partial maps are reduced into one ([`merge::merge_all`]).
//! [`pipeline::Pipeline`] wires the three together.

pub mod aggregate;
pub mod boundary;
pub mod config;
pub mod error;
pub mod executor;
pub mod format;
pub mod merge;
pub mod observer;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod stats;

pub use aggregate::{aggregate_range, ChunkOutput, SkipReason};
pub use boundary::{plan_boundaries, ByteRange};
pub use config::PipelineConfig;
pub use error::{ChunkError, PipelineError};
pub use executor::{Executor, ExecutorKind};
pub use format::LineFormat;
pub use merge::{merge_all, merge_into};
pub use observer::{NoopObserver, PipelineEvent, PipelineObserver, TracingObserver};
pub use pipeline::{ChunkFailure, Pipeline, RunReport};
pub use source::{ByteSource, MappedFile};
pub use stats::{RunningStats, StatsMap};
