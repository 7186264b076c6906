//! Text rendering of results.

use std::fmt::Write as _;

use crate::pipeline::RunReport;
use crate::stats::StatsMap;

/// One line per key, sorted by key: `key;min;mean;max`, one decimal each.
/// Keys without any values are left out.
pub fn render(results: &StatsMap) -> String {
    let mut keys: Vec<&String> = results.keys().collect();
    keys.sort_unstable();

    let mut out = String::with_capacity(keys.len() * 32);
    for key in keys {
        let stats = &results[key];
        if let (Some(min), Some(mean), Some(max)) = (stats.min(), stats.mean(), stats.max()) {
            let _ = writeln!(out, "{key};{min:.1};{mean:.1};{max:.1}");
        }
    }
    out
}

pub fn summary(report: &RunReport) -> String {
    format!(
        "{} keys from {} lines ({} ignored, {} skipped) in {}/{} chunks, {:.4}s, {:.2} MiB/s",
        report.results.len(),
        report.lines_parsed,
        report.lines_ignored,
        report.lines_skipped,
        report.chunks - report.failures.len(),
        report.chunks,
        report.elapsed.as_secs_f64(),
        report.throughput_mib_per_sec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RunningStats;

    #[test]
    fn render_sorts_and_formats() {
        let mut results = StatsMap::new();
        let mut a = RunningStats::from_value(1.0);
        a.update(3.0);
        results.insert("b".to_string(), RunningStats::from_value(-2.5));
        results.insert("a".to_string(), a);
        results.insert("empty".to_string(), RunningStats::new());

        assert_eq!(render(&results), "a;1.0;2.0;3.0\nb;-2.5;-2.5;-2.5\n");
    }

    #[test]
    fn render_empty() {
        assert_eq!(render(&StatsMap::new()), "");
    }
}
