//! Spatial partitioning for the Skein flocking simulation.
//!
//! Three pieces, rebuilt fresh every tick:
//!
//! - [`TickJitter`] / [`CellHasher`] — a per-tick random rotation and
//!   offset applied before quantizing positions to grid cells, so the
//!   fixed cell boundaries never sit in the same place two ticks in a
//!   row.
//! - [`CellMap`] — a fixed-capacity concurrent multimap from cell key to
//!   agent slot. Lock-free insertion; all entries sharing a key land in
//!   one bucket chain.
//! - [`CellMap::for_each_group`] — a parallel grouped reduction over the
//!   map's bucket array: one `on_first` call per key, one `on_next` call
//!   per further entry of that key. Generic over the callbacks; the
//!   flocking aggregation is just one client.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod hash;
pub mod map;
pub mod reduce;

pub use error::GridError;
pub use hash::{CellHasher, TickJitter};
pub use map::CellMap;
pub use reduce::DEFAULT_BUCKETS_PER_TASK;
