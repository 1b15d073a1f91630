//! Tick-scoped dense buffers.
//!
//! All four buffers are index-aligned by agent slot. The backing
//! allocations are retained across ticks and only grow; contents are
//! reset at the start of every tick, so no state leaks between ticks.

use glam::Vec3;

/// Sentinel for "representative not yet assigned".
pub(crate) const NO_REP: u32 = u32::MAX;

/// Per-tick working buffers, one element per agent slot.
///
/// After the snapshot stage, `positions[i]`/`headings[i]` hold agent
/// `i`'s pose. After the reduction, a representative slot's entries hold
/// its cell's *sums* instead (position sum, heading sum), `counts[r]`
/// holds the cell population, and `reps[i]` names slot `i`'s
/// representative. Non-representative position/heading entries keep the
/// agent's own values.
#[derive(Debug, Default)]
pub(crate) struct TickBuffers {
    pub positions: Vec<Vec3>,
    pub headings: Vec<Vec3>,
    pub reps: Vec<u32>,
    pub counts: Vec<u32>,
}

impl TickBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize to `len` slots and reset contents for a new tick.
    pub fn reset(&mut self, len: usize) {
        self.positions.clear();
        self.positions.resize(len, Vec3::ZERO);
        self.headings.clear();
        self.headings.resize(len, Vec3::ZERO);
        self.reps.clear();
        self.reps.resize(len, NO_REP);
        self.counts.clear();
        self.counts.resize(len, 0);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_previous_tick_state() {
        let mut bufs = TickBuffers::new();
        bufs.reset(3);
        bufs.positions[1] = Vec3::ONE;
        bufs.reps[1] = 1;
        bufs.counts[1] = 5;

        bufs.reset(2);
        assert_eq!(bufs.len(), 2);
        assert_eq!(bufs.positions[1], Vec3::ZERO);
        assert_eq!(bufs.reps[1], NO_REP);
        assert_eq!(bufs.counts[1], 0);
    }

    #[test]
    fn reset_grows_for_larger_ticks() {
        let mut bufs = TickBuffers::new();
        bufs.reset(2);
        bufs.reset(10);
        assert_eq!(bufs.len(), 10);
        assert!(bufs.reps.iter().all(|&r| r == NO_REP));
    }
}
