//! Error type for the cell map.

use std::error::Error;
use std::fmt;

/// Errors from [`CellMap`](crate::map::CellMap) operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridError {
    /// An insert was attempted beyond the map's fixed entry capacity.
    ///
    /// The map never grows mid-tick; callers size it for the maximum
    /// population up front and reject oversized ticks before hashing.
    MapFull {
        /// The fixed entry capacity of the map.
        capacity: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapFull { capacity } => {
                write!(f, "cell map is full (capacity {capacity})")
            }
        }
    }
}

impl Error for GridError {}
