use std::num::NonZeroUsize;

use proptest::prelude::*;

use brc_stats::{
    aggregate_range, merge_all, plan_boundaries, ByteRange, LineFormat, NoopObserver, StatsMap,
};

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => ("[A-E]", -999i32..=999).prop_map(|(k, v)| format!("{k};{}", v as f64 / 10.0)),
        1 => Just(String::new()),
        1 => Just("#note".to_string()),
    ]
}

fn malformed_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("no delimiter".to_string()),
        Just("A;1.0;2.0".to_string()),
        Just("B;abc".to_string()),
        Just("C;".to_string()),
        Just("D;NaN".to_string()),
    ]
}

fn join(lines: &[String], trailing_newline: bool) -> Vec<u8> {
    let mut text = lines.join("\n");
    if trailing_newline && !lines.is_empty() {
        text.push('\n');
    }
    text.into_bytes()
}

fn aggregate_whole(data: &[u8]) -> StatsMap {
    let range = ByteRange::new(0, data.len());
    aggregate_range(data, 0, range, &LineFormat::default(), &NoopObserver)
        .unwrap()
        .stats
}

fn aggregate_split(data: &[u8], workers: usize) -> StatsMap {
    let ranges = plan_boundaries(data, NonZeroUsize::new(workers).unwrap(), b'\n');
    let partials = ranges.iter().enumerate().map(|(i, range)| {
        aggregate_range(data, i, *range, &LineFormat::default(), &NoopObserver)
            .unwrap()
            .stats
    });
    merge_all(partials)
}

fn assert_equivalent(left: &StatsMap, right: &StatsMap) {
    assert_eq!(left.len(), right.len());
    for (key, l) in left.iter() {
        let r = &right[key];
        assert_eq!(l.min(), r.min(), "min of {key}");
        assert_eq!(l.max(), r.max(), "max of {key}");
        assert_eq!(l.count(), r.count(), "count of {key}");
        assert!((l.sum() - r.sum()).abs() < 1e-6, "sum of {key}");
    }
}

proptest! {
    #[test]
    fn boundaries_tile_the_input(
        data in proptest::collection::vec(prop_oneof![Just(b'\n'), any::<u8>()], 0..512),
        workers in 1usize..40,
    ) {
        let ranges = plan_boundaries(&data, NonZeroUsize::new(workers).unwrap(), b'\n');
        prop_assert!(ranges.len() <= workers);
        let mut pos = 0;
        for range in &ranges {
            prop_assert_eq!(range.start, pos);
            prop_assert!(range.end > range.start);
            if range.end != data.len() {
                prop_assert_eq!(data[range.end - 1], b'\n');
            }
            pos = range.end;
        }
        prop_assert_eq!(pos, data.len());
    }

    #[test]
    fn split_aggregation_matches_whole_file(
        lines in proptest::collection::vec(line(), 0..200),
        trailing in any::<bool>(),
        workers in 1usize..16,
    ) {
        let data = join(&lines, trailing);
        assert_equivalent(&aggregate_split(&data, workers), &aggregate_whole(&data));
    }

    #[test]
    fn merge_order_is_irrelevant(
        lines in proptest::collection::vec(line(), 1..200),
        workers in 2usize..12,
        seed in any::<u64>(),
    ) {
        let data = join(&lines, true);
        let ranges = plan_boundaries(&data, NonZeroUsize::new(workers).unwrap(), b'\n');
        let mut partials: Vec<StatsMap> = ranges
            .iter()
            .enumerate()
            .map(|(i, r)| {
                aggregate_range(&data[..], i, *r, &LineFormat::default(), &NoopObserver)
                    .unwrap()
                    .stats
            })
            .collect();

        let forward = merge_all(partials.clone());
        let rotate = (seed as usize) % partials.len();
        partials.rotate_left(rotate);
        partials.reverse();
        let shuffled = merge_all(partials);
        assert_equivalent(&forward, &shuffled);
    }

    #[test]
    fn malformed_lines_do_not_change_results(
        lines in proptest::collection::vec(line(), 0..100),
        noise in proptest::collection::vec((any::<prop::sample::Index>(), malformed_line()), 0..20),
        workers in 1usize..8,
    ) {
        let clean = join(&lines, true);

        let mut noisy_lines = lines.clone();
        for (at, bad) in noise {
            let pos = at.index(noisy_lines.len() + 1);
            noisy_lines.insert(pos, bad);
        }
        let noisy = join(&noisy_lines, true);

        assert_equivalent(&aggregate_split(&noisy, workers), &aggregate_whole(&clean));
    }

    #[test]
    fn same_range_is_idempotent(
        lines in proptest::collection::vec(line(), 0..100),
    ) {
        let data = join(&lines, true);
        let first = aggregate_whole(&data);
        let second = aggregate_whole(&data);
        prop_assert!(*first == *second);
    }
}
