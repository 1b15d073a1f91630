//! Per-tick jittered cell hashing.
//!
//! Agent positions are quantized to a uniform grid whose edge length is
//! the sense radius, then the integer cell coordinate is mixed down to a
//! 32-bit key. Before quantizing, every position is rotated and offset by
//! a single per-tick random [`TickJitter`]: a fixed grid systematically
//! splits neighborhoods that straddle a cell boundary, and the jitter
//! moves those boundaries every tick so no pair of agents is mis-grouped
//! persistently.
//!
//! The key is a pure function of the jittered position: with the same
//! jitter, the same position always produces the same key.

use glam::{EulerRot, IVec3, Quat, Vec3};
use rand::Rng;

// ── TickJitter ─────────────────────────────────────────────────────

/// A random rotation and offset drawn once per tick (not per agent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickJitter {
    /// Rotation applied to every offset position before quantization.
    pub rotation: Quat,
    /// Translation added to every position before rotation.
    pub offset: Vec3,
}

impl TickJitter {
    /// No jitter: identity rotation, zero offset. Used by tests that need
    /// a fixed, predictable grid.
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        offset: Vec3::ZERO,
    };

    /// Sample a jitter from `rng`.
    ///
    /// Euler angles are uniform over one full turn in each axis; each
    /// offset component is uniform over `[-offset_range, offset_range]`.
    /// Callers pass half the sense radius as `offset_range` so the grid
    /// origin wanders across a full cell over time.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, offset_range: f32) -> Self {
        use std::f32::consts::TAU;
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            rng.random_range(-TAU..=TAU),
            rng.random_range(-TAU..=TAU),
            rng.random_range(-TAU..=TAU),
        );
        let offset = Vec3::new(
            rng.random_range(-offset_range..=offset_range),
            rng.random_range(-offset_range..=offset_range),
            rng.random_range(-offset_range..=offset_range),
        );
        Self { rotation, offset }
    }
}

// ── CellHasher ─────────────────────────────────────────────────────

/// Maps world positions to 32-bit cell keys for one tick.
#[derive(Clone, Copy, Debug)]
pub struct CellHasher {
    rotation: Quat,
    offset: Vec3,
    inv_cell_radius: f32,
}

impl CellHasher {
    /// Build a hasher for this tick's jitter and cell edge length.
    ///
    /// `cell_radius` must be positive; the caller validates it as part of
    /// config validation.
    #[must_use]
    pub fn new(jitter: TickJitter, cell_radius: f32) -> Self {
        Self {
            rotation: jitter.rotation,
            offset: jitter.offset,
            inv_cell_radius: cell_radius.recip(),
        }
    }

    /// The integer cell coordinate a position falls into.
    #[must_use]
    pub fn cell(&self, position: Vec3) -> IVec3 {
        let rotated = self.rotation * (position + self.offset);
        (rotated * self.inv_cell_radius).floor().as_ivec3()
    }

    /// The 32-bit cell key for a position.
    #[must_use]
    pub fn key(&self, position: Vec3) -> i32 {
        hash_cell(self.cell(position))
    }
}

/// Mix an integer cell coordinate down to a 32-bit key.
///
/// Per-axis prime multipliers followed by a murmur3-style finalizer.
/// Collisions are tolerated (colliding cells simply share a neighborhood
/// for one tick and the jitter re-rolls the grid next tick), so the only
/// requirement is a reasonable spread across buckets.
#[must_use]
pub fn hash_cell(cell: IVec3) -> i32 {
    let mut h = (cell.x as u32)
        .wrapping_mul(0x8DA6_B343)
        .wrapping_add((cell.y as u32).wrapping_mul(0xD816_3841))
        .wrapping_add((cell.z as u32).wrapping_mul(0xCB1A_B31F));
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h as i32
}
