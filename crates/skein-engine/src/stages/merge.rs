//! Cell merge stage: grouped reduction of poses into per-cell aggregates.
//!
//! Consumes the cell map and folds every cell's members into its
//! representative's slot, in place: `positions[rep]` and `headings[rep]`
//! become the cell's sums, `counts[rep]` its population, and `reps[i]`
//! records each slot's representative. This mirrors the reduction
//! callbacks' contract in `skein-grid`: `on_first` initializes a
//! representative to itself with count 1, `on_next` folds one more member
//! in.

use std::marker::PhantomData;

use skein_grid::CellMap;

use crate::buffers::TickBuffers;

/// Shared mutable view over a slice, written at disjoint indices from
/// multiple workers.
///
/// The reduction writes only to slots owned by the key being reduced,
/// and all entries of one key are walked by a single worker (bucket
/// locality), so no index is ever written by two workers. That invariant
/// is what makes the unsafe accessors sound; it is established by
/// `CellMap::for_each_group` and re-stated at each call site.
struct DisjointSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Sync for DisjointSlice<'_, T> {}

impl<'a, T: Copy> DisjointSlice<'a, T> {
    fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// `i < len`, and no other worker reads or writes index `i`
    /// concurrently.
    unsafe fn get(&self, i: usize) -> T {
        debug_assert!(i < self.len);
        unsafe { *self.ptr.add(i) }
    }

    /// # Safety
    /// Same as [`DisjointSlice::get`].
    unsafe fn set(&self, i: usize, value: T) {
        debug_assert!(i < self.len);
        unsafe { *self.ptr.add(i) = value }
    }
}

/// Fold every cell's members into its representative's buffer slots.
///
/// After this returns, for every slot `i`: `reps[i]` names `i`'s
/// representative `r`, `positions[r]` is the sum of positions over the
/// cell's members (the representative included), `headings[r]` likewise,
/// and `counts[r]` is the member count.
///
/// The initialize-then-fold ordering (`on_first` before the key's
/// `on_next` calls) holds on any map. Sums still accumulate in chain
/// order, and the representative is whichever entry leads its chain, so
/// the pipeline seals the map first: that pins each cell's
/// representative to its lowest slot and makes every rounded bit of the
/// sums the same on every run.
pub(crate) fn merge_cells(map: &CellMap, bufs: &mut TickBuffers, buckets_per_task: usize) {
    let positions = DisjointSlice::new(&mut bufs.positions[..]);
    let headings = DisjointSlice::new(&mut bufs.headings[..]);
    let reps = DisjointSlice::new(&mut bufs.reps[..]);
    let counts = DisjointSlice::new(&mut bufs.counts[..]);

    map.for_each_group(
        buckets_per_task,
        |first| {
            let f = first as usize;
            // SAFETY: slot `first` belongs to the key this worker owns;
            // no other worker touches it. Idempotent, as the reduction
            // contract requires for duplicate values.
            unsafe {
                reps.set(f, first);
                counts.set(f, 1);
            }
        },
        |first, slot| {
            let (f, s) = (first as usize, slot as usize);
            // SAFETY: both `first` and `slot` belong to the key this
            // worker owns (bucket locality); `slot` occurs in exactly one
            // map entry, so `reps[s]` has a single writer.
            unsafe {
                counts.set(f, counts.get(f) + 1);
                positions.set(f, positions.get(f) + positions.get(s));
                headings.set(f, headings.get(f) + headings.get(s));
                reps.set(s, first);
            }
        },
    );
}
