//! Animation clips: per-joint and top-level transform curves over a frame range

use std::collections::BTreeMap;

use super::types::{FrameRange, TransformChannels};
use crate::error::{Result, RigError};
use crate::skeleton::Skeleton;

/// A named, time-ranged set of transform curves
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationClip {
    pub name: String,
    pub range: FrameRange,
    /// Curves of the armature's top-level transform
    #[cfg_attr(feature = "serde", serde(default))]
    pub object: TransformChannels,
    /// Pose-space curves keyed by joint name
    #[cfg_attr(feature = "serde", serde(default))]
    pub joints: BTreeMap<String, TransformChannels>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, range: FrameRange) -> Self {
        Self {
            name: name.into(),
            range,
            object: TransformChannels::default(),
            joints: BTreeMap::new(),
        }
    }

    pub fn joint_channels(&self, joint: &str) -> Option<&TransformChannels> {
        self.joints.get(joint)
    }

    /// Channels of a joint, created empty when missing
    pub fn joint_channels_mut(&mut self, joint: &str) -> &mut TransformChannels {
        self.joints.entry(joint.to_string()).or_default()
    }

    /// Move the channels of a renamed joint to its new name
    pub fn rename_joint(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }
        if let Some(channels) = self.joints.remove(old) {
            self.joints.insert(new.to_string(), channels);
        }
    }

    /// Check the frame range and that every channel targets a skeleton joint
    pub fn validate(&self, skeleton: &Skeleton) -> Result<()> {
        if !self.range.is_valid() {
            return Err(RigError::InvalidClip {
                clip: self.name.clone(),
                reason: format!(
                    "empty frame range [{}, {}]",
                    self.range.start, self.range.end
                ),
            });
        }
        if let Some(unknown) = self.joints.keys().find(|name| !skeleton.contains(name)) {
            return Err(RigError::InvalidClip {
                clip: self.name.clone(),
                reason: format!("channels target unknown joint '{unknown}'"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Curve;
    use crate::skeleton::Joint;
    use crate::transform::Transform;
    use glam::Vec3;

    fn skeleton() -> Skeleton {
        Skeleton::new(vec![Joint::new("Hips", None, Transform::IDENTITY)]).unwrap()
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let clip = AnimationClip::new("Walk", FrameRange::new(10, 0));
        assert!(matches!(
            clip.validate(&skeleton()),
            Err(RigError::InvalidClip { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_joint() {
        let mut clip = AnimationClip::new("Walk", FrameRange::new(0, 10));
        clip.joint_channels_mut("Tail").translation = Some(Curve::constant(0.0, Vec3::ZERO));
        assert!(clip.validate(&skeleton()).is_err());

        clip.rename_joint("Tail", "Hips");
        assert!(clip.validate(&skeleton()).is_ok());
    }
}
