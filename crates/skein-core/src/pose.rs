//! The host-facing agent pose.

use glam::Vec3;

/// Position and facing direction of one agent.
///
/// The host owns agent identity and lifetime; the simulation consumes a
/// dense slice of poses each tick and writes the next-tick poses back in
/// place. Slice index is only meaningful within a single tick.
///
/// `forward` is expected to be unit-ish. The steering stage renormalizes
/// on every tick, so small drift is tolerated; a zero `forward` on an
/// agent with no steering input will leave that agent stationary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// World-space position.
    pub position: Vec3,
    /// Facing direction (unit-ish).
    pub forward: Vec3,
}

impl Pose {
    /// Create a pose from a position and a forward vector.
    #[must_use]
    pub const fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }

    /// A pose at the origin facing +Z.
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pose_faces_positive_z() {
        let p = Pose::default();
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.forward, Vec3::Z);
    }
}
