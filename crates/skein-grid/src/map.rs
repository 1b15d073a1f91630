//! Fixed-capacity concurrent multimap from cell key to agent slot.
//!
//! Built fresh every tick and discarded (capacity retained) at tick end.
//! Storage is three preallocated flat arrays — entry keys, entry values,
//! and per-entry chain links — plus a power-of-two array of bucket heads.
//! Inserting claims the next entry index from an atomic cursor, writes the
//! key/value, and prepends the entry onto its bucket's chain with a CAS
//! loop. No locks, no allocation after construction.
//!
//! Three properties the grouped reduction relies on:
//!
//! - **Bucket locality**: a key's bucket is a pure function of the key, so
//!   every entry of one key lives in exactly one bucket chain. A scan that
//!   assigns whole buckets to workers never splits a key across workers.
//! - **Head-first visit order**: the "first" value for a key is the
//!   matching entry nearest the bucket head, which any chain walk
//!   reaches before the key's other entries. An initialize-then-fold
//!   over a chain is therefore well ordered on any map, sealed or not.
//! - **Sealed chain order**: after the parallel build, [`CellMap::seal`]
//!   rebuilds every chain in ascending value order. The first value
//!   becomes the key's minimum, independent of how the inserts raced,
//!   and folds that walk chains (floating-point sums, most notably)
//!   visit entries in the same order on every run with the same
//!   entries.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicI32, AtomicU32, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::GridError;

/// Chain terminator sentinel for bucket heads and entry links.
pub(crate) const EMPTY: i32 = -1;

/// A concurrent multimap from `i32` cell key to `u32` agent slot.
pub struct CellMap {
    /// Bucket heads: entry index of the most recently prepended entry,
    /// or [`EMPTY`].
    heads: Vec<AtomicI32>,
    /// Per-entry link to the next entry in the same bucket chain.
    next: Vec<AtomicI32>,
    /// Per-entry key.
    keys: Vec<AtomicI32>,
    /// Per-entry value.
    values: Vec<AtomicU32>,
    /// Next unclaimed entry index. May overshoot capacity when inserts
    /// race past the limit; reads clamp to capacity.
    cursor: AtomicUsize,
    /// `bucket_count() - 1`; bucket count is a power of two.
    bucket_mask: u32,
}

impl CellMap {
    /// Create a map with room for `capacity` entries.
    ///
    /// The bucket array is sized to twice the capacity, rounded up to a
    /// power of two, to keep chains short. Capacity is clamped to at
    /// least 1 and at most `i32::MAX` (entry indices are `i32`).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, i32::MAX as usize);
        let bucket_count = (capacity * 2).next_power_of_two();
        Self {
            heads: (0..bucket_count).map(|_| AtomicI32::new(EMPTY)).collect(),
            next: (0..capacity).map(|_| AtomicI32::new(EMPTY)).collect(),
            keys: (0..capacity).map(|_| AtomicI32::new(0)).collect(),
            values: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
            cursor: AtomicUsize::new(0),
            bucket_mask: (bucket_count - 1) as u32,
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.next.len()
    }

    /// Number of entries inserted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursor.load(Ordering::Relaxed).min(self.capacity())
    }

    /// Whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buckets (a power of two).
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    /// The bucket a key chains into.
    #[must_use]
    pub fn bucket_of(&self, key: i32) -> usize {
        (key as u32 & self.bucket_mask) as usize
    }

    /// Insert a `(key, value)` pair. Safe to call concurrently from many
    /// threads; entries are never lost or reordered within memory, only
    /// chain order is insertion-race dependent.
    ///
    /// Returns [`GridError::MapFull`] once `capacity` entries exist. A
    /// failed insert still consumes nothing observable, but the internal
    /// cursor may pass capacity; `len()` clamps.
    pub fn insert(&self, key: i32, value: u32) -> Result<(), GridError> {
        let entry = self.cursor.fetch_add(1, Ordering::Relaxed);
        if entry >= self.capacity() {
            return Err(GridError::MapFull {
                capacity: self.capacity(),
            });
        }
        self.keys[entry].store(key, Ordering::Relaxed);
        self.values[entry].store(value, Ordering::Relaxed);

        let bucket = self.bucket_of(key);
        let mut head = self.heads[bucket].load(Ordering::Acquire);
        loop {
            self.next[entry].store(head, Ordering::Relaxed);
            match self.heads[bucket].compare_exchange_weak(
                head,
                entry as i32,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(current) => head = current,
            }
        }
    }

    /// The first value stored under `key`: the matching entry nearest
    /// the bucket head. Insertion-race dependent until sealed; after
    /// [`CellMap::seal`], the minimum value under the key. `None` if the
    /// key is absent.
    #[must_use]
    pub fn first_value(&self, key: i32) -> Option<u32> {
        self.first_value_in(self.bucket_of(key), key)
    }

    /// All values stored under `key`, in chain order: insertion-race
    /// dependent until sealed, ascending after [`CellMap::seal`].
    /// Intended for tests and diagnostics; the hot path never
    /// materializes per-key vectors.
    #[must_use]
    pub fn values_of(&self, key: i32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut entry = self.head_of(self.bucket_of(key));
        while entry != EMPTY {
            let e = entry as usize;
            if self.keys[e].load(Ordering::Relaxed) == key {
                out.push(self.values[e].load(Ordering::Relaxed));
            }
            entry = self.next[e].load(Ordering::Relaxed);
        }
        out
    }

    /// Canonicalize chain order: rebuild every bucket chain so entries
    /// appear in ascending value order.
    ///
    /// Until sealed, chain order is an artifact of insertion races, and
    /// any fold that walks chains inherits that nondeterminism. Sealing
    /// after the parallel build makes such folds reproducible across
    /// runs with the same entries, and leaves each key's minimum value
    /// at its chain head, so [`CellMap::first_value`] becomes
    /// insertion-order independent. Requires exclusive access, so it
    /// cannot race with inserts; call once per build.
    pub fn seal(&mut self) {
        let len = self.len();
        let mut order: Vec<u32> = (0..len as u32).collect();
        order.par_sort_unstable_by_key(|&e| Reverse(self.values[e as usize].load(Ordering::Relaxed)));

        for head in &mut self.heads {
            *head.get_mut() = EMPTY;
        }
        // Prepending in descending value order leaves every chain
        // ascending. Ties are duplicate values; their relative order
        // never affects a per-key fold.
        for &e in &order {
            let e = e as usize;
            let key = *self.keys[e].get_mut();
            let bucket = self.bucket_of(key);
            *self.next[e].get_mut() = *self.heads[bucket].get_mut();
            *self.heads[bucket].get_mut() = e as i32;
        }
    }

    /// Reset to empty, retaining capacity. Requires exclusive access, so
    /// it cannot race with inserts.
    pub fn clear(&mut self) {
        for head in &mut self.heads {
            *head.get_mut() = EMPTY;
        }
        *self.cursor.get_mut() = 0;
    }

    // ── chain walking, used by the grouped reduction ───────────────

    pub(crate) fn head_of(&self, bucket: usize) -> i32 {
        self.heads[bucket].load(Ordering::Relaxed)
    }

    pub(crate) fn next_of(&self, entry: usize) -> i32 {
        self.next[entry].load(Ordering::Relaxed)
    }

    pub(crate) fn key_at(&self, entry: usize) -> i32 {
        self.keys[entry].load(Ordering::Relaxed)
    }

    pub(crate) fn value_at(&self, entry: usize) -> u32 {
        self.values[entry].load(Ordering::Relaxed)
    }

    pub(crate) fn first_value_in(&self, bucket: usize, key: i32) -> Option<u32> {
        let mut entry = self.head_of(bucket);
        while entry != EMPTY {
            let e = entry as usize;
            if self.keys[e].load(Ordering::Relaxed) == key {
                return Some(self.values[e].load(Ordering::Relaxed));
            }
            entry = self.next[e].load(Ordering::Relaxed);
        }
        None
    }
}
