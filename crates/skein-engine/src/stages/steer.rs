//! Steering and integration stage.
//!
//! Per agent, a pure function of its own pose, its cell's aggregate, and
//! the tick duration. Each agent writes only its own output slot, so the
//! stage parallelizes with no shared mutable state.
//!
//! This is a steering model, not free acceleration: the force perturbs
//! the heading, and the agent always moves at the configured constant
//! speed along its (renormalized) heading.

use glam::Vec3;
use rayon::prelude::*;
use skein_core::{Pose, SteeringWeights};

use crate::buffers::TickBuffers;

/// Constants the steering rule needs, hoisted out of the per-agent loop.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SteerParams {
    pub sense_radius: f32,
    pub cage_half_extent: f32,
    pub speed: f32,
    pub weights: SteeringWeights,
    pub dt: f32,
}

/// Advance every agent one tick, writing the new poses in place.
pub(crate) fn steer_all(poses: &mut [Pose], bufs: &TickBuffers, params: SteerParams) {
    poses.par_iter_mut().enumerate().for_each(|(slot, pose)| {
        *pose = steer_one(*pose, slot, bufs, params);
    });
}

fn steer_one(pose: Pose, slot: usize, bufs: &TickBuffers, p: SteerParams) -> Pose {
    let rep = bufs.reps[slot] as usize;
    let neighbor_count = bufs.counts[rep].saturating_sub(1);

    let mut force = Vec3::ZERO;

    if neighbor_count > 0 {
        let n = neighbor_count as f32;
        // The aggregate includes this agent; subtract self before
        // averaging so an agent never steers relative to itself.
        let avg_position = (bufs.positions[rep] - pose.position) / n;
        let avg_heading = (bufs.headings[rep] - pose.forward) / n;

        let to_avg = avg_position - pose.position;
        // 1 deep inside the neighborhood, fading to 0 at the sense
        // radius, so separation cannot overpower cohesion for agents
        // that are already well spaced.
        let need_to_leave =
            (1.0 - to_avg.length_squared() / (p.sense_radius * p.sense_radius)).max(0.0);
        let to_avg_dir = to_avg.normalize_or_zero();

        force += -to_avg_dir * p.weights.separation * need_to_leave;
        force += to_avg_dir * p.weights.cohesion;
        force += avg_heading * p.weights.alignment;
    }

    if distance_to_cage(pose.position, p.cage_half_extent) < p.sense_radius {
        // Push away from the origin, not the nearest face: agents near a
        // corner turn back toward the cage center instead of sliding
        // along the wall.
        force += -pose.position.normalize_or_zero() * p.weights.obstacle;
    }

    let velocity = pose.forward * p.speed + force * p.dt;
    // Degenerate velocity (zero-length or non-finite) falls back to the
    // previous heading instead of propagating NaN.
    let heading = velocity.try_normalize().unwrap_or(pose.forward);

    Pose {
        position: pose.position + heading * p.speed * p.dt,
        forward: heading,
    }
}

/// Distance from a position to the nearest face of the cage box.
/// Negative outside the cage.
fn distance_to_cage(position: Vec3, cage_half_extent: f32) -> f32 {
    cage_half_extent - position.abs().max_element()
}
