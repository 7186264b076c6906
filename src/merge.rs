//! Reduction of partial per-chunk maps into one result.

use std::collections::hash_map::Entry;

use crate::stats::StatsMap;

/// Folds `partial` into `total` key by key.
pub fn merge_into(total: &mut StatsMap, partial: StatsMap) {
    for (key, stats) in partial {
        match total.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().combine(&stats),
            Entry::Vacant(entry) => {
                entry.insert(stats);
            }
        }
    }
}

/// Merges any number of partial maps. The result does not depend on the order
/// of the partials or of the keys inside them, except for float rounding in
/// `sum`.
pub fn merge_all<I>(partials: I) -> StatsMap
where
    I: IntoIterator<Item = StatsMap>,
{
    let mut partials = partials.into_iter();
    let Some(mut total) = partials.next() else {
        return StatsMap::new();
    };
    for partial in partials {
        merge_into(&mut total, partial);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RunningStats;

    fn map(entries: &[(&str, &[f64])]) -> StatsMap {
        let mut out = StatsMap::new();
        for (key, values) in entries {
            let mut stats = RunningStats::new();
            for v in *values {
                stats.update(*v);
            }
            out.insert(key.to_string(), stats);
        }
        out
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_all(Vec::new()).is_empty());
    }

    #[test]
    fn merge_combines_shared_keys() {
        let merged = merge_all(vec![
            map(&[("A", &[1.0]), ("B", &[2.0])]),
            map(&[("A", &[3.0])]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["A"].min(), Some(1.0));
        assert_eq!(merged["A"].max(), Some(3.0));
        assert_eq!(merged["A"].sum(), 4.0);
        assert_eq!(merged["A"].count(), 2);
        assert_eq!(merged["B"], RunningStats::from_value(2.0));
    }

    #[test]
    fn merge_order_does_not_matter() {
        let parts = [
            map(&[("A", &[1.0, 9.0]), ("C", &[-3.0])]),
            map(&[("B", &[4.0]), ("A", &[-2.0])]),
            map(&[("C", &[8.0]), ("B", &[0.5])]),
        ];
        let forward = merge_all(parts.iter().cloned());
        let backward = merge_all(parts.iter().rev().cloned());
        assert_eq!(*forward, *backward);
    }

    #[test]
    fn empty_records_do_not_disturb_the_merge() {
        let mut with_empty = map(&[("A", &[5.0])]);
        with_empty.insert("Z".to_string(), RunningStats::new());
        let merged = merge_all(vec![with_empty, map(&[("A", &[1.0])])]);
        assert_eq!(merged["A"].min(), Some(1.0));
        assert_eq!(merged["Z"].min(), None);
        assert_eq!(merged["Z"].count(), 0);
    }
}
