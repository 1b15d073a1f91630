//! The simulation: owns the tick-scoped state and runs the pipeline.
//!
//! One public operation, [`Simulation::advance`]: consume the host's
//! pose slice for this tick, run the four stages, and write the next
//! poses back in place. The host owns agent identity, spawning, and
//! rendering; the simulation owns nothing across ticks except buffer
//! capacity and the jitter RNG.

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use skein_core::{ConfigError, FlockConfig, Pose, TickError};
use skein_grid::{CellHasher, CellMap, TickJitter, DEFAULT_BUCKETS_PER_TASK};

use crate::buffers::{TickBuffers, NO_REP};
use crate::stages::steer::SteerParams;
use crate::stages::{merge, snapshot, steer};

/// A flocking simulation with a fixed configuration.
///
/// The cell map and working buffers are allocated once, at construction,
/// sized for `max_agents`; ticks reuse them without reallocating.
pub struct Simulation {
    config: FlockConfig,
    map: CellMap,
    buffers: TickBuffers,
    rng: ChaCha8Rng,
}

impl Simulation {
    /// Validate the configuration and allocate tick state.
    pub fn new(config: FlockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            map: CellMap::new(config.max_agents),
            buffers: TickBuffers::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        })
    }

    /// The configuration this simulation was built with.
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Advance one tick with a freshly sampled jitter, updating `poses`
    /// in place (same length, same order).
    ///
    /// `dt` is the tick duration in seconds; the caller's frame scheduler
    /// decides it.
    pub fn advance(&mut self, poses: &mut [Pose], dt: f32) -> Result<(), TickError> {
        let jitter = TickJitter::sample(&mut self.rng, self.config.sense_radius * 0.5);
        self.advance_with_jitter(poses, dt, jitter)
    }

    /// Advance one tick with an explicit jitter.
    ///
    /// Public so hosts can drive jitter from their own randomness source
    /// and tests can pin [`TickJitter::IDENTITY`] for reproducible
    /// grouping. With a fixed jitter and identical input poses, two calls
    /// produce identical representative assignments, aggregates, and
    /// output poses regardless of worker scheduling.
    pub fn advance_with_jitter(
        &mut self,
        poses: &mut [Pose],
        dt: f32,
        jitter: TickJitter,
    ) -> Result<(), TickError> {
        // 1. Capacity: reject, never truncate.
        if poses.len() > self.config.max_agents {
            return Err(TickError::CapacityExceeded {
                agents: poses.len(),
                max_agents: self.config.max_agents,
            });
        }

        // 2. Pose snapshot into flat, slot-indexed buffers.
        self.buffers.reset(poses.len());
        snapshot::store_poses(poses, &mut self.buffers.positions, &mut self.buffers.headings);

        // 3. Hash every slot into the cell map.
        self.map.clear();
        let hasher = CellHasher::new(jitter, self.config.sense_radius);
        let map = &self.map;
        self.buffers
            .positions
            .par_iter()
            .enumerate()
            .try_for_each(|(slot, &position)| map.insert(hasher.key(position), slot as u32))
            .map_err(|_| TickError::CapacityExceeded {
                agents: poses.len(),
                max_agents: self.config.max_agents,
            })?;
        // Canonical chain order: each cell's representative becomes its
        // lowest slot and the reduction's floating-point sums accumulate
        // identically on every run.
        self.map.seal();

        // 4. Grouped reduction: fold cells into their representatives.
        merge::merge_cells(&self.map, &mut self.buffers, DEFAULT_BUCKETS_PER_TASK);

        // 5. Consistency: every slot must have resolved a representative.
        if let Some(slot) = self
            .buffers
            .reps
            .par_iter()
            .position_first(|&rep| rep == NO_REP)
        {
            return Err(TickError::RepresentativeUnset { slot });
        }

        // 6. Steer and integrate, each agent writing only its own pose.
        steer::steer_all(
            poses,
            &self.buffers,
            SteerParams {
                sense_radius: self.config.sense_radius,
                cage_half_extent: self.config.cage_half_extent,
                speed: self.config.speed,
                weights: self.config.weights,
                dt,
            },
        );
        Ok(())
    }

    /// Read-only view of the most recent tick's reduction.
    ///
    /// Valid after a successful `advance`; hosts use it for debug
    /// overlays, tests use it to check aggregation invariants. Empty
    /// before the first tick.
    pub fn reduction(&self) -> ReductionView<'_> {
        ReductionView {
            buffers: &self.buffers,
        }
    }
}

/// Borrowed view of one tick's cell aggregates.
pub struct ReductionView<'a> {
    buffers: &'a TickBuffers,
}

impl ReductionView<'_> {
    /// Number of agent slots in the viewed tick.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the viewed tick had no agents.
    pub fn is_empty(&self) -> bool {
        self.buffers.len() == 0
    }

    /// The representative slot of `slot`'s cell.
    pub fn representative(&self, slot: usize) -> usize {
        self.buffers.reps[slot] as usize
    }

    /// Number of agents in `slot`'s cell (including `slot`).
    pub fn cell_count(&self, slot: usize) -> u32 {
        self.buffers.counts[self.representative(slot)]
    }

    /// Sum of member positions of `slot`'s cell.
    pub fn position_sum(&self, slot: usize) -> Vec3 {
        self.buffers.positions[self.representative(slot)]
    }

    /// Sum of member headings of `slot`'s cell.
    pub fn heading_sum(&self, slot: usize) -> Vec3 {
        self.buffers.headings[self.representative(slot)]
    }
}
