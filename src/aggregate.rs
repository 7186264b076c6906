//! Single-pass aggregation of one byte range.

use std::fmt;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use memchr::memchr_iter;

use crate::boundary::ByteRange;
use crate::error::ChunkError;
use crate::format::LineFormat;
use crate::observer::{PipelineEvent, PipelineObserver};
use crate::source::ByteSource;
use crate::stats::{parse_value, RunningStats, StatsMap, ValueError};

/// Why a line was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    MissingDelimiter,
    ExtraDelimiter,
    InvalidUtf8,
    InvalidNumber,
    NonFinite,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::MissingDelimiter => "missing delimiter",
            SkipReason::ExtraDelimiter => "more than one delimiter",
            SkipReason::InvalidUtf8 => "key is not valid UTF-8",
            SkipReason::InvalidNumber => "value is not a number",
            SkipReason::NonFinite => "value is not finite",
        };
        f.write_str(s)
    }
}

/// Complete result of aggregating one chunk.
#[derive(Debug, Clone)]
pub struct ChunkOutput {
    pub index: usize,
    pub range: ByteRange,
    pub stats: StatsMap,
    pub lines_parsed: u64,
    /// Blank and comment lines.
    pub lines_ignored: u64,
    /// Malformed lines.
    pub lines_skipped: u64,
    pub elapsed: Duration,
}

enum Line<'a> {
    Ignored,
    Record { key: &'a str, value: f64 },
    Malformed(SkipReason),
}

#[inline]
fn classify<'a>(line: &'a [u8], format: &LineFormat) -> Line<'a> {
    if line.is_empty() || format.is_comment(line) {
        return Line::Ignored;
    }
    let Some(split) = memchr::memchr(format.delimiter, line) else {
        return Line::Malformed(SkipReason::MissingDelimiter);
    };
    let (key, value) = (&line[..split], &line[split + 1..]);
    if memchr::memchr(format.delimiter, value).is_some() {
        return Line::Malformed(SkipReason::ExtraDelimiter);
    }
    let value = match parse_value(value) {
        Ok(v) => v,
        Err(ValueError::Invalid) => return Line::Malformed(SkipReason::InvalidNumber),
        Err(ValueError::NonFinite) => return Line::Malformed(SkipReason::NonFinite),
    };
    match std::str::from_utf8(key) {
        Ok(key) => Line::Record { key, value },
        Err(_) => Line::Malformed(SkipReason::InvalidUtf8),
    }
}

/// Aggregates every line in `range` of `source`.
///
/// Lines are visited once, in place, without collecting them first. Keys are
/// borrowed from the input until the chunk is done and only copied once per
/// distinct key. Malformed lines are counted and reported to `observer`; they
/// never fail the chunk. The only failure is being unable to read `range`, in
/// which case nothing is returned, so a retry starts from scratch.
pub fn aggregate_range<S>(
    source: &S,
    index: usize,
    range: ByteRange,
    format: &LineFormat,
    observer: &dyn PipelineObserver,
) -> Result<ChunkOutput, ChunkError>
where
    S: ByteSource + ?Sized,
{
    let started = Instant::now();
    let bytes = source.read_range(range)?;

    let mut local: AHashMap<&str, RunningStats> = AHashMap::new();
    let mut lines_parsed = 0u64;
    let mut lines_ignored = 0u64;
    let mut lines_skipped = 0u64;

    let mut line_start = 0;
    let ends = memchr_iter(format.line_separator, bytes).chain(
        // Final line without a trailing separator.
        (bytes.last() != Some(&format.line_separator) && !bytes.is_empty())
            .then_some(bytes.len()),
    );
    for line_end in ends {
        let line = &bytes[line_start..line_end];
        match classify(line, format) {
            Line::Ignored => lines_ignored += 1,
            Line::Record { key, value } => {
                lines_parsed += 1;
                match local.get_mut(key) {
                    Some(stats) => stats.update(value),
                    None => {
                        local.insert(key, RunningStats::from_value(value));
                    }
                }
            }
            Line::Malformed(reason) => {
                lines_skipped += 1;
                observer.on_event(&PipelineEvent::LineSkipped {
                    chunk: index,
                    offset: range.start + line_start,
                    reason,
                });
            }
        }
        line_start = line_end + 1;
    }

    let stats: StatsMap = local
        .into_iter()
        .map(|(key, stats)| (key.to_owned(), stats))
        .collect();

    Ok(ChunkOutput {
        index,
        range,
        stats,
        lines_parsed,
        lines_ignored,
        lines_skipped,
        elapsed: started.elapsed(),
    })
}
