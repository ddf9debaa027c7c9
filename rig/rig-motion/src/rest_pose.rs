//! Structural corrections to the bind pose
//!
//! Each correction edits joint rest transforms and, where the animated
//! result would otherwise shift, compensates the affected curves.

use glam::{Quat, Vec3};
use log::debug;

use crate::animation::{AnimationClip, Curve};
use crate::error::{Result, RigError};
use crate::scene::Armature;
use crate::skeleton::Skeleton;

/// Default joints moved by the knee fix
pub const DEFAULT_KNEE_BONES: [&str; 2] = ["RightUpLeg", "LeftUpLeg"];

/// Knee fix joints once names follow the target skeleton
pub const TARGET_KNEE_BONES: [&str; 2] = ["calf_r", "calf_l"];

/// Move the whole bind pose by `offset` (world units)
///
/// The offset is taken into armature space (inverse object rotation, then
/// the uniform scale) and added to every top-level joint. The hip's translation keys are shifted back by the same
/// amount expressed in the hip's rest axes, so the animated hip stays where
/// it was. A hip without a translation curve gets a constant one.
pub fn apply_rest_offset(
    armature: &mut Armature,
    clip: &mut AnimationClip,
    hip: usize,
    offset: Vec3,
) -> Result<()> {
    let skeleton = &mut armature.skeleton;
    let hip_joint = skeleton
        .joint(hip)
        .ok_or_else(|| RigError::MissingJoint(format!("#{hip}")))?;
    let hip_name = hip_joint.name.clone();
    let hip_rotation = skeleton.rest_rotation(hip).unwrap_or(Quat::IDENTITY);

    let delta = armature.transform.rotation.inverse() * offset / armature.transform.scale.x;
    for root in skeleton.roots() {
        if let Some(joint) = skeleton.joint_mut(root) {
            joint.rest.translation += delta;
        }
    }

    let local = hip_rotation.inverse() * delta;
    let start = clip.range.start as f32;
    let channels = clip.joint_channels_mut(&hip_name);
    match &mut channels.translation {
        Some(curve) => curve.map_values(|v| *v - local),
        None => {
            channels.translation = Some(Curve::constant(start, -local));
        }
    }

    debug!("Applied rest offset {offset} to '{hip_name}' (local {local})");
    Ok(())
}

/// Move the tail end of each named joint by `offset` in armature space
///
/// Direct children of a named joint move with the tail; their own children
/// keep their armature-space rest position. Every name is resolved before
/// anything is changed.
pub fn apply_knee_fix(skeleton: &mut Skeleton, joints: &[String], offset: Vec3) -> Result<()> {
    let indices = joints
        .iter()
        .map(|name| {
            skeleton
                .find(name)
                .ok_or_else(|| RigError::MissingJoint(name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    for index in indices {
        for child in skeleton.children(index) {
            let parent_rotation = skeleton.rest_rotation(index).unwrap_or(Quat::IDENTITY);
            let child_rotation = skeleton.rest_rotation(child).unwrap_or(Quat::IDENTITY);

            if let Some(joint) = skeleton.joint_mut(child) {
                joint.rest.translation += parent_rotation.inverse() * offset;
            }
            for grandchild in skeleton.children(child) {
                if let Some(joint) = skeleton.joint_mut(grandchild) {
                    joint.rest.translation -= child_rotation.inverse() * offset;
                }
            }
        }
        debug!("Moved tail of joint #{index} by {offset}");
    }
    Ok(())
}

/// Flatten the armature's static rotation and/or uniform scale into the
/// rest pose
///
/// The world-space pose is unchanged: rest and pose translations are
/// multiplied by the scale, top-level joints take on the rotation, and the
/// armature transform is reset for each applied component.
pub fn apply_object_transform(
    armature: &mut Armature,
    clip: &mut AnimationClip,
    rotation: bool,
    scale: bool,
) {
    let factor = if scale {
        armature.transform.scale.x
    } else {
        1.0
    };
    let turn = if rotation {
        armature.transform.rotation
    } else {
        Quat::IDENTITY
    };

    let roots = armature.skeleton.roots();
    for index in 0..armature.skeleton.len() {
        let is_root = roots.contains(&index);
        let Some(joint) = armature.skeleton.joint_mut(index) else {
            continue;
        };
        joint.rest.translation *= factor;
        if is_root {
            joint.rest.translation = turn * joint.rest.translation;
            joint.rest.rotation = (turn * joint.rest.rotation).normalize();
        }
    }

    if factor != 1.0 {
        for curve in clip
            .joints
            .values_mut()
            .filter_map(|c| c.translation.as_mut())
        {
            curve.map_values(|v| *v * factor);
        }
    }

    if rotation {
        armature.transform.rotation = Quat::IDENTITY;
    }
    if scale {
        armature.transform.scale = Vec3::ONE;
    }
}
