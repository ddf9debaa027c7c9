//! Root-motion extraction
//!
//! Mixamo clips carry the character's locomotion on the hip joint. This
//! module moves the planar part of that motion (and the hip's yaw) onto the
//! armature's top-level transform, which becomes the `root`, and rewrites
//! the hip so that it only holds what is left over.
//!
//! The conversion samples the hip's world transform at every frame of the
//! clip before anything is changed, then solves the hip's new local keys
//! against the new root so the world-space animation is preserved.

use glam::{Quat, Vec3};
use log::{debug, info, warn};

use crate::animation::{Curve, PoseEvaluator};
use crate::error::{Result, RigError};
use crate::rest_pose;
use crate::scene::{BIND_DUMMY_NAME, Mesh, Scene};
use crate::skeleton::Skeleton;
use crate::transform::{Transform, yaw_of, yaw_rotation};

/// Hip joint names tried in order
pub const HIP_CANDIDATES: [&str; 4] = ["Hips", "mixamorig:Hips", "mixamorig_Hips", "Pelvis"];

/// Name the armature takes once it carries the root motion
pub const ROOT_NAME: &str = "root";

/// Root-motion extraction settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RootMotionConfig {
    /// Copy the hip's X position onto the root
    pub use_x: bool,
    /// Copy the hip's Y position onto the root
    pub use_y: bool,
    /// Copy the hip's vertical position onto the root
    pub use_z: bool,
    /// Keep the root's vertical position on or above the ground
    /// (only with `use_z`)
    pub on_ground: bool,
    /// Uniform scale multiplied into the armature
    pub scale: f32,
    /// Bind-pose correction in world units
    pub rest_offset: Vec3,
    /// Explicit hip joint name, tried before the built-in candidates
    pub hip_name: String,
    /// Make sure a mesh is bound to the armature
    pub fix_bind: bool,
    /// Flatten the armature's rotation into the rest pose
    pub apply_rotation: bool,
    /// Flatten the armature's scale into the rest pose
    pub apply_scale: bool,
}

impl Default for RootMotionConfig {
    fn default() -> Self {
        Self {
            use_x: true,
            use_y: true,
            use_z: true,
            on_ground: true,
            scale: 1.0,
            rest_offset: Vec3::ZERO,
            hip_name: String::new(),
            fix_bind: true,
            apply_rotation: true,
            apply_scale: false,
        }
    }
}

impl RootMotionConfig {
    /// Hip candidates in resolution order
    pub fn hip_candidates(&self) -> Vec<&str> {
        let mut candidates = Vec::with_capacity(HIP_CANDIDATES.len() + 1);
        if !self.hip_name.is_empty() {
            candidates.push(self.hip_name.as_str());
        }
        candidates.extend(HIP_CANDIDATES);
        candidates
    }
}

/// Outcome of a root-motion conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootMotionReport {
    /// Name of the joint treated as the hip
    pub hip: String,
    /// Number of frames baked
    pub frames: usize,
    /// Whether a placeholder mesh had to be bound
    pub bind_mesh_created: bool,
}

/// Find the hip joint, trying each candidate name in order
pub fn resolve_hip(skeleton: &Skeleton, candidates: &[&str]) -> Result<usize> {
    candidates
        .iter()
        .find_map(|name| skeleton.find(name))
        .ok_or_else(|| {
            warn!(
                "No hip joint found among {} joints (tried {:?}), stopping conversion",
                skeleton.len(),
                candidates
            );
            RigError::MissingHipJoint {
                candidates: candidates.iter().map(ToString::to_string).collect(),
            }
        })
}

/// Hip world transform at one frame
#[derive(Debug, Clone, Copy)]
struct HipSample {
    frame: f32,
    position: Vec3,
    rotation: Quat,
}

/// Convert the hip motion of the armature's active clip into root motion
///
/// Fails with [`RigError::MissingHipJoint`], [`RigError::MissingArmature`]
/// or [`RigError::MissingClip`] before the scene is touched.
pub fn hip_to_root(scene: &mut Scene, config: &RootMotionConfig) -> Result<RootMotionReport> {
    let armature = scene.armature()?;
    let hip = resolve_hip(&armature.skeleton, &config.hip_candidates())?;
    let clip = scene.active_clip()?;
    if !clip.range.is_valid() {
        return Err(RigError::InvalidClip {
            clip: clip.name.clone(),
            reason: format!("empty frame range [{}, {}]", clip.range.start, clip.range.end),
        });
    }

    let (armature, clip) = scene.armature_and_clip_mut()?;
    let hip_name = armature
        .skeleton
        .joint(hip)
        .map(|j| j.name.clone())
        .ok_or_else(|| RigError::MissingJoint(format!("#{hip}")))?;
    info!(
        "Extracting root motion from '{}' over frames {}..={}",
        hip_name, clip.range.start, clip.range.end
    );

    if config.scale != 1.0 {
        clip.object.scale = None;
        armature.transform.scale *= config.scale;
    }

    if config.rest_offset != Vec3::ZERO {
        rest_pose::apply_rest_offset(armature, clip, hip, config.rest_offset)?;
    }

    // Ground reference: the hip's bind-pose height in world space
    let z_offset = armature
        .skeleton
        .rest_head(hip)
        .map_or(0.0, |head| armature.transform.to_matrix().transform_point3(head).z);

    let samples = sample_hip(
        PoseEvaluator::new(&armature.skeleton, armature.transform, Some(&*clip)),
        hip,
        clip.range.frames(),
    )?;

    let root_translation: Vec<(f32, Vec3)> = samples
        .iter()
        .map(|s| (s.frame, root_position(s.position, z_offset, config)))
        .collect();
    let root_yaw: Vec<(f32, Quat)> = samples
        .iter()
        .map(|s| (s.frame, yaw_rotation(yaw_of(s.rotation))))
        .collect();

    if config.apply_rotation || config.apply_scale {
        rest_pose::apply_object_transform(armature, clip, config.apply_rotation, config.apply_scale);
    }

    let static_rotation = armature.transform.rotation;
    clip.object.translation = Some(Curve::from_samples(root_translation));
    clip.object.rotation = Some(Curve::from_samples(
        root_yaw
            .into_iter()
            .map(|(frame, yaw)| (frame, (yaw * static_rotation).normalize())),
    ));

    let residual = solve_residual(
        PoseEvaluator::new(&armature.skeleton, armature.transform, Some(&*clip)),
        &armature.skeleton,
        hip,
        &samples,
    )?;
    let hip_channels = clip.joint_channels_mut(&hip_name);
    hip_channels.translation = Some(Curve::from_samples(
        residual.iter().map(|(frame, t, _)| (*frame, *t)),
    ));
    hip_channels.rotation = Some(Curve::from_samples(
        residual.iter().map(|(frame, _, q)| (*frame, *q)),
    ));

    scene.rename_armature(ROOT_NAME)?;

    let bind_mesh_created = if config.fix_bind {
        fix_bind(scene, config.apply_rotation, config.apply_scale)?
    } else {
        false
    };

    Ok(RootMotionReport {
        hip: hip_name,
        frames: samples.len(),
        bind_mesh_created,
    })
}

/// Bake the hip's world transform at every frame
fn sample_hip(
    mut evaluator: PoseEvaluator<'_>,
    hip: usize,
    frames: impl Iterator<Item = i32>,
) -> Result<Vec<HipSample>> {
    frames
        .map(|frame| -> Result<HipSample> {
            let frame = frame as f32;
            evaluator.update(frame);
            let matrix = evaluator
                .world_matrix(hip)
                .ok_or_else(|| RigError::MissingJoint(format!("#{hip}")))?;
            let world = Transform::from_matrix(&matrix);
            Ok(HipSample {
                frame,
                position: world.translation,
                rotation: world.rotation,
            })
        })
        .collect()
}

/// Root translation for one hip world position
fn root_position(hip: Vec3, z_offset: f32, config: &RootMotionConfig) -> Vec3 {
    let z = match (config.use_z, config.on_ground) {
        (true, true) => (hip.z - z_offset).max(0.0),
        (true, false) => hip.z,
        (false, _) => 0.0,
    };
    Vec3::new(
        if config.use_x { hip.x } else { 0.0 },
        if config.use_y { hip.y } else { 0.0 },
        z,
    )
}

/// Hip pose keys that reproduce the sampled world transforms under the
/// new root
fn solve_residual(
    mut evaluator: PoseEvaluator<'_>,
    skeleton: &Skeleton,
    hip: usize,
    samples: &[HipSample],
) -> Result<Vec<(f32, Vec3, Quat)>> {
    let rest = skeleton
        .joint(hip)
        .map_or(Transform::IDENTITY, |j| j.rest)
        .to_matrix();
    let mut previous: Option<Quat> = None;

    samples
        .iter()
        .map(|sample| -> Result<(f32, Vec3, Quat)> {
            evaluator.update(sample.frame);
            let parent = evaluator
                .parent_world_matrix(hip)
                .ok_or_else(|| RigError::MissingJoint(format!("#{hip}")))?;
            let base = parent * rest;
            let inverse = base.inverse();
            let translation = inverse.transform_point3(sample.position);
            let base_rotation = Transform::from_matrix(&base).rotation;
            let mut rotation = (base_rotation.inverse() * sample.rotation).normalize();
            if previous.is_some_and(|p| p.dot(rotation) < 0.0) {
                rotation = -rotation;
            }
            previous = Some(rotation);
            Ok((sample.frame, translation, rotation))
        })
        .collect()
}

/// Make sure the armature drives at least one mesh
///
/// Without a skinned mesh a placeholder plane is added and bound. Otherwise
/// the bound mesh takes the same rotation/scale flattening as the armature.
/// Returns whether the placeholder was created.
pub fn fix_bind(scene: &mut Scene, apply_rotation: bool, apply_scale: bool) -> Result<bool> {
    let armature_name = scene.armature()?.name.clone();
    match scene.bound_mesh_index() {
        None => {
            debug!("No mesh bound to '{armature_name}', adding '{BIND_DUMMY_NAME}'");
            scene
                .meshes
                .push(Mesh::placeholder_plane(BIND_DUMMY_NAME, armature_name));
            Ok(true)
        }
        Some(index) => {
            if apply_rotation || apply_scale {
                scene.meshes[index].apply_transform(apply_rotation, apply_scale);
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationClip, FrameRange, Keyframe};
    use crate::scene::Armature;
    use crate::skeleton::Joint;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn scene_with(names: &[&str]) -> Scene {
        let joints = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Joint::new(
                    *name,
                    i.checked_sub(1),
                    Transform::from_translation(Vec3::new(0.0, 0.0, 1.0)),
                )
            })
            .collect();
        let skeleton = Skeleton::new(joints).unwrap();
        let mut clip = AnimationClip::new("Take 001", FrameRange::new(0, 10));
        clip.joint_channels_mut(names[0]).translation = Some(Curve::new(vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(10.0, Vec3::new(10.0, 0.0, 0.0)),
        ]));

        Scene {
            armature: Some(Armature {
                name: "Armature".to_string(),
                transform: Transform::IDENTITY,
                skeleton,
                clip: Some("Take 001".to_string()),
            }),
            clips: vec![clip],
            ..Scene::default()
        }
    }

    #[test_case(&["Hips"], "Hips" ; "plain")]
    #[test_case(&["mixamorig:Hips"], "mixamorig:Hips" ; "colon namespace")]
    #[test_case(&["mixamorig_Hips"], "mixamorig_Hips" ; "underscore namespace")]
    #[test_case(&["Root", "Pelvis"], "Pelvis" ; "unreal pelvis")]
    fn test_resolve_hip(names: &[&str], expected: &str) {
        let scene = scene_with(names);
        let skeleton = &scene.armature.as_ref().unwrap().skeleton;
        let hip = resolve_hip(skeleton, &HIP_CANDIDATES).unwrap();
        assert_eq!(skeleton.joint(hip).unwrap().name, expected);
    }

    #[test]
    fn test_override_is_tried_first() {
        let scene = scene_with(&["Hips", "CustomHip"]);
        let config = RootMotionConfig {
            hip_name: "CustomHip".to_string(),
            ..RootMotionConfig::default()
        };
        let skeleton = &scene.armature.as_ref().unwrap().skeleton;
        assert_eq!(resolve_hip(skeleton, &config.hip_candidates()).unwrap(), 1);
    }

    #[test]
    fn test_missing_hip_leaves_scene_untouched() {
        let mut scene = scene_with(&["Torso"]);
        let original = scene.clone();
        let result = hip_to_root(&mut scene, &RootMotionConfig::default());
        assert!(matches!(result, Err(RigError::MissingHipJoint { .. })));
        assert_eq!(scene, original);
    }

    #[test]
    fn test_unknown_joint_fails_sampling() {
        let scene = scene_with(&["Hips"]);
        let armature = scene.armature.as_ref().unwrap();
        let clip = scene.active_clip().unwrap();
        let evaluator = || PoseEvaluator::new(&armature.skeleton, armature.transform, Some(clip));

        let samples = sample_hip(evaluator(), 0, clip.range.frames()).unwrap();
        assert_eq!(samples.len(), 11);

        assert!(matches!(
            sample_hip(evaluator(), 3, clip.range.frames()),
            Err(RigError::MissingJoint(name)) if name == "#3"
        ));
        assert!(matches!(
            solve_residual(evaluator(), &armature.skeleton, 3, &samples),
            Err(RigError::MissingJoint(_))
        ));
    }

    #[test]
    fn test_root_position_filters_axes() {
        let config = RootMotionConfig {
            use_y: false,
            ..RootMotionConfig::default()
        };
        let p = Vec3::new(1.0, 2.0, 0.5);
        assert_eq!(root_position(p, 1.0, &config), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(root_position(p, 0.25, &config), Vec3::new(1.0, 0.0, 0.25));

        let free = RootMotionConfig {
            on_ground: false,
            ..RootMotionConfig::default()
        };
        assert_eq!(root_position(p, 1.0, &free), p);

        let planar = RootMotionConfig {
            use_z: false,
            ..RootMotionConfig::default()
        };
        assert_eq!(root_position(p, 1.0, &planar).z, 0.0);
    }

    #[test]
    fn test_report_and_rename() {
        let mut scene = scene_with(&["Hips", "Spine"]);
        let report = hip_to_root(&mut scene, &RootMotionConfig::default()).unwrap();
        assert_eq!(
            report,
            RootMotionReport {
                hip: "Hips".to_string(),
                frames: 11,
                bind_mesh_created: true,
            }
        );
        assert_eq!(scene.armature.as_ref().unwrap().name, ROOT_NAME);
        assert!(scene.mesh(BIND_DUMMY_NAME).unwrap().is_bound_to(ROOT_NAME));
    }
}
