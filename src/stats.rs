//! Per-key running statistics.

use ahash::AHashMap;

/// Key -> statistics mapping. One per chunk (partial) and one per run (final).
pub type StatsMap = AHashMap<String, RunningStats>;

/// Running min/max/sum/count for a single key.
///
/// An empty record holds `+inf`/`-inf` sentinels; the accessors hide them
/// behind `Option` so they are never reported as real values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
        }
    }
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    #[inline]
    pub fn update(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.sum += value;
        self.count += 1;
    }

    /// Folds `other` into `self`. Associative and commutative; an empty
    /// record is the identity.
    #[inline]
    pub fn combine(&mut self, other: &RunningStats) {
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Why a value field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueError {
    Invalid,
    NonFinite,
}

/// Parses a value field. Surrounding ASCII whitespace (including a stray
/// `\r` from CRLF input) is ignored; NaN and infinities are rejected.
pub fn parse_value(raw: &[u8]) -> Result<f64, ValueError> {
    let trimmed = raw.trim_ascii();
    let value: f64 = lexical_core::parse(trimmed).map_err(|_| ValueError::Invalid)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValueError::NonFinite)
    }
}
