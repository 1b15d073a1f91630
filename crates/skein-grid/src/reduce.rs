//! Parallel grouped reduction over a [`CellMap`].
//!
//! Visits every `(key, value)` entry exactly once, walking each bucket
//! chain from its head. For each key, the matching entry nearest the
//! bucket head carries the key's *first* value; it is reached before the
//! key's other entries and gets `on_first(value)`, and every later entry
//! of that key gets `on_next(first_value, value)`. On a sealed map
//! (chains ascending by value) the first value is the key's minimum, so
//! which entry leads does not depend on how the inserts raced. Work is split over contiguous ranges of
//! the bucket array and handed to rayon's pool, whose work stealing
//! load-balances the extreme chain-length variance between empty and
//! dense cells.
//!
//! Race freedom does not come from locks: a key's entries all live in one
//! bucket (see [`CellMap`]), and each bucket belongs to exactly one range,
//! so no two workers ever examine entries of the same key. Callbacks may
//! therefore mutate per-key state without synchronization, provided they
//! only touch state owned by the keys they are handed.

use rayon::prelude::*;

use crate::map::{CellMap, EMPTY};

/// Default minimum number of buckets per parallel task.
///
/// Small enough to expose parallelism on modest maps, large enough that
/// task dispatch does not dominate the chain walks.
pub const DEFAULT_BUCKETS_PER_TASK: usize = 64;

impl CellMap {
    /// Run a grouped reduction over all entries.
    ///
    /// `buckets_per_task` controls the scan granularity (see
    /// [`DEFAULT_BUCKETS_PER_TASK`]); values below 1 are clamped to 1.
    ///
    /// Callback contract:
    /// - `on_first(v)` fires at a key's head-nearest entry, before any
    ///   `on_next` for that key, so a fold may initialize per-key state
    ///   in `on_first` and merge into it in `on_next`. When the first
    ///   value appears under the key more than once, each duplicate also
    ///   fires `on_first`, so `on_first` must be idempotent.
    /// - `on_next(first, v)` is called for every remaining entry of the
    ///   key, where `first` is the key's first value.
    /// - A key with a single entry sees only `on_first`.
    /// - On a sealed map the first value is the key's minimum (see
    ///   [`CellMap::seal`]), and every entry carrying it sits at the
    ///   chain head, making the reduction deterministic across runs.
    ///
    /// Both callbacks run concurrently across keys; within one key, calls
    /// are sequential (single worker walks the chain).
    pub fn for_each_group<F, N>(&self, buckets_per_task: usize, on_first: F, on_next: N)
    where
        F: Fn(u32) + Sync,
        N: Fn(u32, u32) + Sync,
    {
        let buckets = self.bucket_count();
        let width = buckets_per_task.max(1);
        let tasks = buckets.div_ceil(width);

        (0..tasks).into_par_iter().for_each(|task| {
            let start = task * width;
            let end = (start + width).min(buckets);
            for bucket in start..end {
                let mut entry = self.head_of(bucket);
                while entry != EMPTY {
                    let e = entry as usize;
                    let key = self.key_at(e);
                    let value = self.value_at(e);
                    let first = self
                        .first_value_in(bucket, key)
                        .expect("entry's key present in its own bucket chain");
                    if value == first {
                        on_first(value);
                    } else {
                        on_next(first, value);
                    }
                    entry = self.next_of(e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn build(entries: &[(i32, u32)]) -> CellMap {
        let map = CellMap::new(entries.len().max(1));
        for &(key, value) in entries {
            map.insert(key, value).unwrap();
        }
        map
    }

    #[test]
    fn single_value_key_sees_only_on_first() {
        let map = build(&[(9, 4)]);
        let firsts = AtomicUsize::new(0);
        let nexts = AtomicUsize::new(0);
        map.for_each_group(
            DEFAULT_BUCKETS_PER_TASK,
            |v| {
                assert_eq!(v, 4);
                firsts.fetch_add(1, Ordering::Relaxed);
            },
            |_, _| {
                nexts.fetch_add(1, Ordering::Relaxed);
            },
        );
        assert_eq!(firsts.load(Ordering::Relaxed), 1);
        assert_eq!(nexts.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn every_entry_visited_exactly_once() {
        let entries: Vec<(i32, u32)> = (0..500).map(|v| ((v % 13) as i32, v)).collect();
        let map = build(&entries);
        let visited = Mutex::new(Vec::new());
        map.for_each_group(
            4,
            |v| visited.lock().unwrap().push(v),
            |_, v| visited.lock().unwrap().push(v),
        );
        let mut visited = visited.into_inner().unwrap();
        visited.sort_unstable();
        let expected: Vec<u32> = (0..500).collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn groups_agree_on_one_first_per_key() {
        let entries: Vec<(i32, u32)> = (0..200).map(|v| ((v % 7) as i32, v)).collect();
        let map = build(&entries);

        // first value -> members (including the first itself)
        let groups = Mutex::new(BTreeMap::<u32, Vec<u32>>::new());
        map.for_each_group(
            1,
            |v| {
                groups.lock().unwrap().entry(v).or_default().push(v);
            },
            |first, v| {
                groups.lock().unwrap().entry(first).or_default().push(v);
            },
        );
        let groups = groups.into_inner().unwrap();
        assert_eq!(groups.len(), 7);

        // Each group's members must all share the representative reported
        // by the map itself, and sizes must add up.
        let mut total = 0;
        for (&first, members) in &groups {
            let key = (first % 7) as i32;
            assert_eq!(map.first_value(key), Some(first));
            for &m in members {
                assert_eq!((m % 7) as i32, key);
            }
            total += members.len();
        }
        assert_eq!(total, 200);
    }

    #[test]
    fn duplicate_value_self_merges_as_first() {
        let map = CellMap::new(4);
        map.insert(3, 8).unwrap();
        map.insert(3, 8).unwrap();
        let firsts = AtomicUsize::new(0);
        let nexts = AtomicUsize::new(0);
        map.for_each_group(
            DEFAULT_BUCKETS_PER_TASK,
            |v| {
                assert_eq!(v, 8);
                firsts.fetch_add(1, Ordering::Relaxed);
            },
            |_, _| {
                nexts.fetch_add(1, Ordering::Relaxed);
            },
        );
        // Both entries carry the first value, so both self-identify as
        // first; on_next never fires.
        assert_eq!(firsts.load(Ordering::Relaxed), 2);
        assert_eq!(nexts.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn sealed_first_is_the_lowest_value_whatever_the_insert_order() {
        let forward = build(&[(4, 1), (4, 2), (4, 3)]);
        let backward = build(&[(4, 3), (4, 2), (4, 1)]);
        for mut map in [forward, backward] {
            map.seal();
            let first_seen = AtomicU32::new(u32::MAX);
            map.for_each_group(
                DEFAULT_BUCKETS_PER_TASK,
                |v| first_seen.store(v, Ordering::Relaxed),
                |first, _| assert_eq!(first, 1),
            );
            assert_eq!(first_seen.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn initialization_precedes_merging_even_when_the_minimum_arrives_last() {
        // Ascending inserts leave the lowest value at the chain tail on
        // an unsealed map. The fold below is only correct if on_first
        // runs before the key's on_next calls: a late on_first would
        // reset the count and erase earlier merges.
        let map = build(&[(7, 0), (7, 1), (7, 2), (7, 3)]);
        let count = AtomicU32::new(0);
        map.for_each_group(
            DEFAULT_BUCKETS_PER_TASK,
            |_| count.store(1, Ordering::Relaxed),
            |_, _| {
                count.fetch_add(1, Ordering::Relaxed);
            },
        );
        assert_eq!(count.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn empty_map_is_a_no_op() {
        let map = CellMap::new(8);
        map.for_each_group(
            DEFAULT_BUCKETS_PER_TASK,
            |_| panic!("no entries to visit"),
            |_, _| panic!("no entries to visit"),
        );
    }

    #[test]
    fn granularity_does_not_change_group_assignment() {
        let entries: Vec<(i32, u32)> = (0..300).map(|v| ((v % 11) as i32, v)).collect();
        let map = build(&entries);

        let run = |buckets_per_task: usize| {
            let reps = Mutex::new(BTreeMap::<u32, u32>::new());
            map.for_each_group(
                buckets_per_task,
                |v| {
                    reps.lock().unwrap().insert(v, v);
                },
                |first, v| {
                    reps.lock().unwrap().insert(v, first);
                },
            );
            reps.into_inner().unwrap()
        };

        let coarse = run(usize::MAX); // single task
        let fine = run(1);
        assert_eq!(coarse, fine);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Every inserted entry is visited exactly once, whatever the
            // key distribution, and each value's representative shares
            // its key.
            #[test]
            fn visits_each_entry_once(keys in prop::collection::vec(any::<i16>(), 1..256)) {
                let entries: Vec<(i32, u32)> = keys
                    .iter()
                    .enumerate()
                    .map(|(slot, &k)| (i32::from(k), slot as u32))
                    .collect();
                let map = build(&entries);

                let visits: Vec<AtomicUsize> =
                    (0..entries.len()).map(|_| AtomicUsize::new(0)).collect();
                let reps = Mutex::new(vec![u32::MAX; entries.len()]);
                map.for_each_group(
                    8,
                    |v| {
                        visits[v as usize].fetch_add(1, Ordering::Relaxed);
                        reps.lock().unwrap()[v as usize] = v;
                    },
                    |first, v| {
                        visits[v as usize].fetch_add(1, Ordering::Relaxed);
                        reps.lock().unwrap()[v as usize] = first;
                    },
                );

                for visit in &visits {
                    prop_assert_eq!(visit.load(Ordering::Relaxed), 1);
                }
                let reps = reps.into_inner().unwrap();
                for (slot, &rep) in reps.iter().enumerate() {
                    prop_assert_eq!(entries[rep as usize].0, entries[slot].0);
                }
            }
        }
    }

    #[test]
    fn aggregation_with_atomics_conserves_totals() {
        // Sum per group via the callbacks, compare against a sequential
        // reference grouping.
        let entries: Vec<(i32, u32)> = (1..=100).map(|v| ((v % 5) as i32, v)).collect();
        let map = build(&entries);

        let sums: Vec<AtomicU32> = (0..=100).map(|_| AtomicU32::new(0)).collect();
        map.for_each_group(
            2,
            |v| {
                sums[v as usize].store(v, Ordering::Relaxed);
            },
            |first, v| {
                sums[first as usize].fetch_add(v, Ordering::Relaxed);
            },
        );

        let total: u32 = sums.iter().map(|s| s.load(Ordering::Relaxed)).sum();
        assert_eq!(total, (1..=100u32).sum::<u32>());
    }
}
