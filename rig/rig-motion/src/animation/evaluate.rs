//! Joint hierarchy evaluation
//!
//! Computes armature-space and world-space joint matrices for a frame of a
//! clip. A joint's armature matrix is `parent * rest * pose(frame)`, where
//! the pose comes from the joint's channels in the clip, and its world
//! matrix is `object(frame) * armature`.

use glam::{Mat4, Vec3};

use super::clip::AnimationClip;
use crate::skeleton::Skeleton;
use crate::transform::Transform;

/// Pose evaluator for one skeleton and (optionally) one clip
pub struct PoseEvaluator<'a> {
    skeleton: &'a Skeleton,
    clip: Option<&'a AnimationClip>,
    /// Static top-level transform, overridden per component by object channels
    object_base: Transform,
    /// Computed top-level matrix
    object: Mat4,
    /// Computed armature-space joint matrices
    armature: Vec<Mat4>,
}

impl<'a> PoseEvaluator<'a> {
    /// Create an evaluator holding the rest pose
    pub fn new(
        skeleton: &'a Skeleton,
        object_base: Transform,
        clip: Option<&'a AnimationClip>,
    ) -> Self {
        Self {
            skeleton,
            clip,
            object_base,
            object: object_base.to_matrix(),
            armature: skeleton.rest_armature_matrices(),
        }
    }

    /// Get number of joints
    pub fn joint_count(&self) -> usize {
        self.armature.len()
    }

    /// Pose-space transform of a joint at a frame (identity without channels)
    pub fn pose_transform(&self, index: usize, frame: f32) -> Transform {
        let channels = self
            .clip
            .zip(self.skeleton.joint(index))
            .and_then(|(clip, joint)| clip.joint_channels(&joint.name));
        match channels {
            Some(channels) => channels.sample(frame, &Transform::IDENTITY),
            None => Transform::IDENTITY,
        }
    }

    /// Top-level transform at a frame
    pub fn object_transform(&self, frame: f32) -> Transform {
        match self.clip {
            Some(clip) => clip.object.sample(frame, &self.object_base),
            None => self.object_base,
        }
    }

    /// Evaluate every joint at a frame
    pub fn update(&mut self, frame: f32) {
        self.object = self.object_transform(frame).to_matrix();

        for index in 0..self.armature.len() {
            let Some(joint) = self.skeleton.joint(index) else {
                continue;
            };
            let local = joint.rest.to_matrix() * self.pose_transform(index, frame).to_matrix();
            self.armature[index] = match joint.parent {
                Some(parent) => self.armature[parent] * local,
                None => local,
            };
        }
    }

    pub fn object_matrix(&self) -> Mat4 {
        self.object
    }

    /// Armature-space matrix of a joint from the last update
    pub fn armature_matrix(&self, index: usize) -> Option<Mat4> {
        self.armature.get(index).copied()
    }

    /// World-space matrix of a joint from the last update
    pub fn world_matrix(&self, index: usize) -> Option<Mat4> {
        self.armature_matrix(index).map(|m| self.object * m)
    }

    /// World-space matrix of a joint's parent frame, i.e. the space its rest
    /// transform is expressed in
    pub fn parent_world_matrix(&self, index: usize) -> Option<Mat4> {
        let joint = self.skeleton.joint(index)?;
        match joint.parent {
            Some(parent) => self.world_matrix(parent),
            None => Some(self.object),
        }
    }

    /// World-space position of a joint from the last update
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        self.world_matrix(index)
            .map(|m| m.transform_point3(Vec3::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Curve, FrameRange, Keyframe};
    use crate::skeleton::Joint;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn skeleton() -> Skeleton {
        Skeleton::new(vec![
            Joint::new("Hips", None, Transform::from_translation(Vec3::new(0.0, 0.0, 1.0))),
            Joint::new("Spine", Some(0), Transform::from_translation(Vec3::new(0.0, 0.0, 0.5))),
        ])
        .unwrap()
    }

    #[test]
    fn test_rest_pose_without_clip() {
        let skeleton = skeleton();
        let evaluator = PoseEvaluator::new(&skeleton, Transform::IDENTITY, None);
        assert_eq!(evaluator.joint_count(), 2);
        let spine = evaluator.world_position(1).unwrap();
        assert!((spine - Vec3::new(0.0, 0.0, 1.5)).length() < 1e-6);
    }

    #[test]
    fn test_pose_translation_and_object_scale() {
        let skeleton = skeleton();
        let mut clip = AnimationClip::new("Walk", FrameRange::new(0, 10));
        clip.joint_channels_mut("Hips").translation = Some(Curve::new(vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(10.0, Vec3::new(10.0, 0.0, 0.0)),
        ]));

        let object = Transform::from_scale(Vec3::splat(0.5));
        let mut evaluator = PoseEvaluator::new(&skeleton, object, Some(&clip));
        evaluator.update(4.0);

        let hips = evaluator.world_position(0).unwrap();
        assert!((hips - Vec3::new(2.0, 0.0, 0.5)).length() < 1e-5);
        let spine = evaluator.world_position(1).unwrap();
        assert!((spine - Vec3::new(2.0, 0.0, 0.75)).length() < 1e-5);
    }

    #[test]
    fn test_object_channels_override_base() {
        let skeleton = skeleton();
        let mut clip = AnimationClip::new("Turn", FrameRange::new(0, 1));
        clip.object.rotation = Some(Curve::constant(0.0, Quat::from_rotation_z(FRAC_PI_2)));

        let base = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let mut evaluator = PoseEvaluator::new(&skeleton, base, Some(&clip));
        evaluator.update(0.0);

        let object = evaluator.object_transform(0.0);
        assert_eq!(object.translation, Vec3::new(1.0, 0.0, 0.0));
        let parent = evaluator.parent_world_matrix(0).unwrap();
        assert_eq!(parent, evaluator.object_matrix());
    }
}
