//! Newline-aligned partitioning of the input into worker ranges.

use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;

/// Half-open byte range `[start, end)` into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {start}..{end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Splits `data` into at most `chunks` contiguous ranges that tile it exactly.
///
/// Every boundary except `0` and `data.len()` falls immediately after a
/// `separator` byte. Each target boundary is `start + len / chunks`; the scan
/// for the separator starts at that byte, so a target landing on a separator
/// ends the chunk right after it.
///
/// Returns no ranges for empty input and never returns an empty range, so
/// small inputs produce fewer ranges than requested.
pub fn plan_boundaries(data: &[u8], chunks: NonZeroUsize, separator: u8) -> Vec<ByteRange> {
    let len = data.len();
    let chunks = chunks.get();
    let approx = len / chunks;
    let mut ranges = Vec::with_capacity(chunks.min(len));
    let mut start = 0;

    for i in 0..chunks {
        if start >= len {
            break;
        }
        let end = if i == chunks - 1 {
            len
        } else {
            let target = (start + approx).min(len);
            match memchr::memchr(separator, &data[target..]) {
                Some(offset) => target + offset + 1,
                None => len,
            }
        };
        ranges.push(ByteRange::new(start, end));
        start = end;
    }

    ranges
}
