//! Tick pipeline for large flocking populations.
//!
//! [`Simulation`] runs one tick in four stages over caller-owned poses:
//! snapshot into flat buffers, jittered cell hashing into a concurrent
//! multimap, a grouped reduction that folds each cell into a
//! representative agent's slot, and a per-agent steering/integration
//! step. Stages are internally parallel; the buffers and cell map are
//! allocated once and reused every tick.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod buffers;
mod sim;
mod stages;

pub use sim::{ReductionView, Simulation};
