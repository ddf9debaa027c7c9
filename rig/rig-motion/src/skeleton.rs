//! Skeleton: an ordered joint tree with bind-pose transforms

use glam::{Mat4, Quat, Vec3};
use std::collections::HashSet;

use crate::error::{Result, RigError};
use crate::transform::Transform;

/// A named joint
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint (None for top-level joints)
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<usize>,
    /// Bind pose relative to the parent (or to armature space)
    #[cfg_attr(feature = "serde", serde(default))]
    pub rest: Transform,
}

impl Joint {
    pub fn new(name: impl Into<String>, parent: Option<usize>, rest: Transform) -> Self {
        Self {
            name: name.into(),
            parent,
            rest,
        }
    }
}

/// Joint hierarchy
///
/// Parents always precede their children, so a single forward pass visits
/// every parent before its descendants.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Build a skeleton, checking name uniqueness and parent ordering
    pub fn new(joints: Vec<Joint>) -> Result<Self> {
        let skeleton = Self { joints };
        skeleton.validate()?;
        Ok(skeleton)
    }

    /// Check the structural invariants
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::with_capacity(self.joints.len());
        for (index, joint) in self.joints.iter().enumerate() {
            if !names.insert(joint.name.as_str()) {
                return Err(RigError::InvalidSkeleton(format!(
                    "duplicate joint name '{}'",
                    joint.name
                )));
            }
            if let Some(parent) = joint.parent
                && parent >= index
            {
                return Err(RigError::InvalidSkeleton(format!(
                    "joint '{}' (index {index}) has parent index {parent} which does not precede it",
                    joint.name
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn joint_mut(&mut self, index: usize) -> Option<&mut Joint> {
        self.joints.get_mut(index)
    }

    /// Find a joint index by exact name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Indices of the direct children of a joint
    pub fn children(&self, index: usize) -> Vec<usize> {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the top-level joints
    pub fn roots(&self) -> Vec<usize> {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Rename a joint, keeping names unique
    ///
    /// When `desired` is taken by another joint a numeric suffix is appended
    /// (`name.001`, `name.002`, ...). Returns the name actually assigned.
    pub fn rename(&mut self, index: usize, desired: &str) -> Result<String> {
        if index >= self.joints.len() {
            return Err(RigError::InvalidSkeleton(format!(
                "joint index {index} out of range"
            )));
        }
        let taken = |name: &str| {
            self.joints
                .iter()
                .enumerate()
                .any(|(i, j)| i != index && j.name == name)
        };

        let mut name = desired.to_string();
        let mut counter = 1;
        while taken(&name) {
            name = format!("{desired}.{counter:03}");
            counter += 1;
        }
        self.joints[index].name.clone_from(&name);
        Ok(name)
    }

    /// Append a joint; its parent must already exist
    pub fn push(&mut self, joint: Joint) -> Result<usize> {
        if self.contains(&joint.name) {
            return Err(RigError::InvalidSkeleton(format!(
                "duplicate joint name '{}'",
                joint.name
            )));
        }
        if let Some(parent) = joint.parent
            && parent >= self.joints.len()
        {
            return Err(RigError::InvalidSkeleton(format!(
                "joint '{}' references missing parent {parent}",
                joint.name
            )));
        }
        self.joints.push(joint);
        Ok(self.joints.len() - 1)
    }

    /// Rest-pose matrices of every joint in armature space
    pub fn rest_armature_matrices(&self) -> Vec<Mat4> {
        let mut matrices: Vec<Mat4> = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let local = joint.rest.to_matrix();
            let matrix = match joint.parent {
                Some(parent) => matrices[parent] * local,
                None => local,
            };
            matrices.push(matrix);
        }
        matrices
    }

    /// Armature-space rest position (the "head") of a joint
    pub fn rest_head(&self, index: usize) -> Option<Vec3> {
        self.rest_armature_matrices()
            .get(index)
            .map(|m| m.transform_point3(Vec3::ZERO))
    }

    /// Accumulated armature-space rest orientation of a joint
    pub fn rest_rotation(&self, index: usize) -> Option<Quat> {
        let joint = self.joints.get(index)?;
        let own = joint.rest.rotation;
        Some(match joint.parent {
            Some(parent) => self.rest_rotation(parent)? * own,
            None => own,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chain() -> Skeleton {
        Skeleton::new(vec![
            Joint::new("Hips", None, Transform::from_translation(Vec3::new(0.0, 0.0, 1.0))),
            Joint::new("Spine", Some(0), Transform::from_translation(Vec3::new(0.0, 0.0, 0.2))),
            Joint::new("LeftUpLeg", Some(0), Transform::from_translation(Vec3::new(0.1, 0.0, 0.0))),
            Joint::new("LeftLeg", Some(2), Transform::from_translation(Vec3::new(0.0, 0.0, -0.45))),
        ])
        .unwrap()
    }

    #[test]
    fn test_find_and_children() {
        let skeleton = chain();
        assert_eq!(skeleton.find("LeftLeg"), Some(3));
        assert_eq!(skeleton.find("Head"), None);
        assert_eq!(skeleton.children(0), vec![1, 2]);
        assert_eq!(skeleton.roots(), vec![0]);
    }

    #[test]
    fn test_rest_heads_accumulate() {
        let skeleton = chain();
        let head = skeleton.rest_head(3).unwrap();
        assert!((head - Vec3::new(0.1, 0.0, 0.55)).length() < 1e-6);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = Skeleton::new(vec![
            Joint::new("Hips", None, Transform::IDENTITY),
            Joint::new("Hips", Some(0), Transform::IDENTITY),
        ]);
        assert!(matches!(result, Err(RigError::InvalidSkeleton(_))));
    }

    #[test]
    fn test_rejects_forward_parent() {
        let result = Skeleton::new(vec![
            Joint::new("Spine", Some(1), Transform::IDENTITY),
            Joint::new("Hips", None, Transform::IDENTITY),
        ]);
        assert!(matches!(result, Err(RigError::InvalidSkeleton(_))));
    }

    #[test]
    fn test_rename_suffixes_collisions() {
        let mut skeleton = chain();
        assert_eq!(skeleton.rename(1, "Hips").unwrap(), "Hips.001");
        assert_eq!(skeleton.rename(2, "Hips").unwrap(), "Hips.002");
        assert_eq!(skeleton.rename(0, "Hips").unwrap(), "Hips");
        assert_eq!(skeleton.rename(3, "calf_l").unwrap(), "calf_l");
        assert!(skeleton.validate().is_ok());
    }

    #[test]
    fn test_push_checks_parent() {
        let mut skeleton = chain();
        assert!(skeleton.push(Joint::new("Foot", Some(42), Transform::IDENTITY)).is_err());
        assert_eq!(
            skeleton
                .push(Joint::new("LeftFoot", Some(3), Transform::IDENTITY))
                .unwrap(),
            4
        );
    }
}
