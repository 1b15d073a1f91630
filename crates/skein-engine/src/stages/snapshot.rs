//! Pose snapshot stage: copy host poses into the flat tick buffers.

use glam::Vec3;
use rayon::prelude::*;
use skein_core::Pose;

/// Copy each agent's position and forward into the index-aligned
/// buffers. Slot order follows the host's pose order and is stable for
/// the duration of the tick.
///
/// All three slices have equal length; the caller sizes the buffers.
pub(crate) fn store_poses(poses: &[Pose], positions: &mut [Vec3], headings: &mut [Vec3]) {
    positions
        .par_iter_mut()
        .zip_eq(headings.par_iter_mut())
        .zip_eq(poses.par_iter())
        .for_each(|((position, heading), pose)| {
            *position = pose.position;
            *heading = pose.forward;
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_every_pose_to_its_slot() {
        let poses: Vec<Pose> = (0..100)
            .map(|i| {
                Pose::new(
                    Vec3::new(i as f32, 0.0, -(i as f32)),
                    Vec3::new(0.0, 1.0, 0.0),
                )
            })
            .collect();
        let mut positions = vec![Vec3::ZERO; poses.len()];
        let mut headings = vec![Vec3::ZERO; poses.len()];

        store_poses(&poses, &mut positions, &mut headings);

        for (i, pose) in poses.iter().enumerate() {
            assert_eq!(positions[i], pose.position);
            assert_eq!(headings[i], pose.forward);
        }
    }
}
