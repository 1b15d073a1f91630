//! The four pipeline stages of one tick.
//!
//! Strictly sequential between stages (each completed rayon loop is a
//! full barrier), data-parallel within each stage.

pub(crate) mod merge;
pub(crate) mod snapshot;
pub(crate) mod steer;
