//! Joint and object naming
//!
//! Mixamo exports prefix every name with a namespace such as `mixamorig:`
//! or `mixamorig_`. Engines expect bare names, or names following their own
//! skeleton convention.

use log::{debug, warn};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RigError};
use crate::scene::Scene;

/// Return the part of a name after its last `:` or `_`
///
/// A name ending in a delimiter, or without one, is returned unchanged.
pub fn strip_namespace(name: &str) -> &str {
    match name.rfind([':', '_']) {
        Some(pos) if pos + 1 < name.len() => &name[pos + 1..],
        _ => name,
    }
}

/// Joint naming conventions that can be targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TargetSkeleton {
    /// Unreal Engine mannequin names
    #[default]
    Unreal,
}

const UNREAL_NAMES: &[(&str, &str)] = &[
    ("root", "Root"),
    ("Hips", "Pelvis"),
    ("Spine", "spine_01"),
    ("Spine1", "spine_02"),
    ("Spine2", "spine_03"),
    ("LeftShoulder", "clavicle_l"),
    ("LeftArm", "upperarm_l"),
    ("LeftForeArm", "lowerarm_l"),
    ("LeftHand", "hand_l"),
    ("RightShoulder", "clavicle_r"),
    ("RightArm", "upperarm_r"),
    ("RightForeArm", "lowerarm_r"),
    ("RightHand", "hand_r"),
    ("Neck1", "neck_01"),
    ("Neck", "neck_01"),
    ("Head", "head"),
    ("LeftUpLeg", "thigh_l"),
    ("LeftLeg", "calf_l"),
    ("LeftFoot", "foot_l"),
    ("RightUpLeg", "thigh_r"),
    ("RightLeg", "calf_r"),
    ("RightFoot", "foot_r"),
    ("LeftHandIndex1", "index_01_l"),
    ("LeftHandIndex2", "index_02_l"),
    ("LeftHandIndex3", "index_03_l"),
    ("LeftHandMiddle1", "middle_01_l"),
    ("LeftHandMiddle2", "middle_02_l"),
    ("LeftHandMiddle3", "middle_03_l"),
    ("LeftHandPinky1", "pinky_01_l"),
    ("LeftHandPinky2", "pinky_02_l"),
    ("LeftHandPinky3", "pinky_03_l"),
    ("LeftHandRing1", "ring_01_l"),
    ("LeftHandRing2", "ring_02_l"),
    ("LeftHandRing3", "ring_03_l"),
    ("LeftHandThumb1", "thumb_01_l"),
    ("LeftHandThumb2", "thumb_02_l"),
    ("LeftHandThumb3", "thumb_03_l"),
    ("RightHandIndex1", "index_01_r"),
    ("RightHandIndex2", "index_02_r"),
    ("RightHandIndex3", "index_03_r"),
    ("RightHandMiddle1", "middle_01_r"),
    ("RightHandMiddle2", "middle_02_r"),
    ("RightHandMiddle3", "middle_03_r"),
    ("RightHandPinky1", "pinky_01_r"),
    ("RightHandPinky2", "pinky_02_r"),
    ("RightHandPinky3", "pinky_03_r"),
    ("RightHandRing1", "ring_01_r"),
    ("RightHandRing2", "ring_02_r"),
    ("RightHandRing3", "ring_03_r"),
    ("RightHandThumb1", "thumb_01_r"),
    ("RightHandThumb2", "thumb_02_r"),
    ("RightHandThumb3", "thumb_03_r"),
    ("LeftToeBase", "ball_l"),
    ("RightToeBase", "ball_r"),
];

impl TargetSkeleton {
    /// Source to target name pairs
    pub fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Unreal => UNREAL_NAMES,
        }
    }

    /// Look up the target name of a joint
    pub fn lookup(self, name: &str) -> Option<&'static str> {
        self.table()
            .iter()
            .find(|(source, _)| *source == name)
            .map(|(_, target)| *target)
    }

    /// Target name of a joint, or the name itself with a warning
    pub fn rename<'a>(self, name: &'a str) -> &'a str {
        match self.lookup(name) {
            Some(target) => target,
            None => {
                warn!("'{name}' has no {self} name, keeping it");
                name
            }
        }
    }

    /// Map an object (armature or mesh) name
    ///
    /// Object names are rarely in the table, so misses are only logged at
    /// debug level.
    pub fn rename_object<'a>(self, name: &'a str) -> &'a str {
        self.lookup(name).unwrap_or_else(|| {
            debug!("Object '{name}' keeps its name");
            name
        })
    }
}

impl fmt::Display for TargetSkeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreal => write!(f, "unreal"),
        }
    }
}

impl FromStr for TargetSkeleton {
    type Err = RigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unreal" => Ok(Self::Unreal),
            other => Err(RigError::UnsupportedFormat(format!(
                "unknown target skeleton '{other}'"
            ))),
        }
    }
}

/// Strip namespaces from the armature, its joints and every mesh
pub fn strip_scene_namespaces(scene: &mut Scene) -> Result<()> {
    if let Some(armature) = scene.armature.as_ref() {
        let name = strip_namespace(&armature.name).to_string();
        scene.rename_armature(&name)?;
        let renamed = scene.rename_joints(|joint| strip_namespace(joint).to_string())?;
        debug!("Stripped namespaces from {renamed} joints");
    }
    scene.rename_meshes(|mesh| strip_namespace(mesh).to_string());
    Ok(())
}

/// Rename joints (after namespace stripping) and object names to a target
/// skeleton convention
pub fn rename_to_target(scene: &mut Scene, target: TargetSkeleton) -> Result<()> {
    if let Some(armature) = scene.armature.as_ref() {
        let name = target.rename_object(&armature.name).to_string();
        scene.rename_armature(&name)?;
        let renamed =
            scene.rename_joints(|joint| target.rename(strip_namespace(joint)).to_string())?;
        debug!("Renamed {renamed} joints to {target} names");
    }
    scene.rename_meshes(|mesh| target.rename_object(mesh).to_string());
    Ok(())
}
