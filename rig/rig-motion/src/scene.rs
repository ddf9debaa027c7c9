//! The scene aggregate: armature, meshes, materials and clips
//!
//! Every rig operation takes the scene explicitly. Names are the links
//! between parts: an armature names its active clip, a skinned mesh names its
//! armature and the joints its vertex groups follow, and clip channels are
//! keyed by joint name. Renames go through [`Scene`] so those links stay
//! intact.

use glam::{Quat, Vec3};
use log::warn;
use std::collections::BTreeMap;

use crate::animation::AnimationClip;
use crate::error::{Result, RigError};
use crate::skeleton::Skeleton;
use crate::transform::Transform;

/// Name given to the placeholder mesh bound to armatures without one
pub const BIND_DUMMY_NAME: &str = "binddummy";

/// A skeleton placed in the scene
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Armature {
    pub name: String,
    /// Static top-level transform
    #[cfg_attr(feature = "serde", serde(default))]
    pub transform: Transform,
    pub skeleton: Skeleton,
    /// Name of the active clip
    #[cfg_attr(feature = "serde", serde(default))]
    pub clip: Option<String>,
}

/// Attachment of a mesh to an armature's joints
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkinBinding {
    /// Name of the armature driving the mesh
    pub armature: String,
    /// Vertex group names, one per influencing joint
    #[cfg_attr(feature = "serde", serde(default))]
    pub groups: Vec<String>,
    /// Per-vertex `(group index, weight)` pairs
    #[cfg_attr(feature = "serde", serde(default))]
    pub influences: Vec<Vec<(u32, f32)>>,
}

/// A named blend-shape target
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeChannel {
    pub name: String,
    /// Current blend weight
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: f32,
    /// Per-vertex offsets from the basis
    #[cfg_attr(feature = "serde", serde(default))]
    pub offsets: Vec<Vec3>,
    /// Source weights a baked channel was built from
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "BTreeMap::is_empty")
    )]
    pub mix: BTreeMap<String, f32>,
}

impl ShapeChannel {
    pub fn new(name: impl Into<String>, offsets: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            offsets,
            mix: BTreeMap::new(),
        }
    }

    /// Weight a source channel contributed to this channel (0 when absent)
    pub fn mix_weight(&self, source: &str) -> f32 {
        self.mix.get(source).copied().unwrap_or(0.0)
    }
}

/// A renderable mesh
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Mesh {
    pub name: String,
    pub transform: Transform,
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub skin: Option<SkinBinding>,
    pub shape_channels: Vec<ShapeChannel>,
    /// Material names, in slot order
    pub materials: Vec<String>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A 2x2 plane in the XY plane, centred on the origin, skinned to an
    /// armature with no vertex groups
    pub fn placeholder_plane(name: impl Into<String>, armature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            vertices: vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            skin: Some(SkinBinding {
                armature: armature.into(),
                groups: Vec::new(),
                influences: vec![Vec::new(); 4],
            }),
            shape_channels: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Check if the mesh is skinned to the named armature
    pub fn is_bound_to(&self, armature: &str) -> bool {
        self.skin.as_ref().is_some_and(|s| s.armature == armature)
    }

    pub fn shape_channel(&self, name: &str) -> Option<&ShapeChannel> {
        self.shape_channels.iter().find(|c| c.name == name)
    }

    pub fn shape_channel_mut(&mut self, name: &str) -> Option<&mut ShapeChannel> {
        self.shape_channels.iter_mut().find(|c| c.name == name)
    }

    /// Remove a shape channel, returning whether it existed
    pub fn remove_shape_channel(&mut self, name: &str) -> bool {
        let before = self.shape_channels.len();
        self.shape_channels.retain(|c| c.name != name);
        self.shape_channels.len() != before
    }

    /// Add a channel holding the current weighted blend of all channels
    ///
    /// The new channel starts at weight 0 and records every non-zero source
    /// weight in its `mix`.
    pub fn add_shape_from_mix(&mut self, name: impl Into<String>) -> &ShapeChannel {
        let mut offsets = vec![Vec3::ZERO; self.vertices.len()];
        let mut mix = BTreeMap::new();
        for channel in self.shape_channels.iter().filter(|c| c.value != 0.0) {
            for (offset, delta) in offsets.iter_mut().zip(&channel.offsets) {
                *offset += *delta * channel.value;
            }
            mix.insert(channel.name.clone(), channel.value);
        }

        self.shape_channels.push(ShapeChannel {
            name: name.into(),
            value: 0.0,
            offsets,
            mix,
        });
        &self.shape_channels[self.shape_channels.len() - 1]
    }

    /// Bake the static rotation and/or scale into the geometry
    pub fn apply_transform(&mut self, rotation: bool, scale: bool) {
        let applied_rotation = if rotation {
            self.transform.rotation
        } else {
            Quat::IDENTITY
        };
        let applied_scale = if scale {
            self.transform.scale
        } else {
            Vec3::ONE
        };

        let apply = |v: &Vec3| applied_rotation * (*v * applied_scale);
        for vertex in &mut self.vertices {
            *vertex = apply(vertex);
        }
        for channel in &mut self.shape_channels {
            for offset in &mut channel.offsets {
                *offset = apply(offset);
            }
        }

        if rotation {
            self.transform.rotation = Quat::IDENTITY;
        }
        if scale {
            self.transform.scale = Vec3::ONE;
        }
    }
}

/// A material slot target
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub name: String,
}

/// Everything one rig conversion works on
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Scene {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub armature: Option<Armature>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub clips: Vec<AnimationClip>,
}

impl Scene {
    /// Check the skeleton, every clip, and the active clip reference
    pub fn validate(&self) -> Result<()> {
        let Some(armature) = &self.armature else {
            return Ok(());
        };
        armature.skeleton.validate()?;
        for clip in &self.clips {
            clip.validate(&armature.skeleton)?;
        }
        if let Some(name) = &armature.clip
            && self.clip(name).is_none()
        {
            return Err(RigError::MissingClip(name.clone()));
        }
        Ok(())
    }

    pub fn armature(&self) -> Result<&Armature> {
        self.armature.as_ref().ok_or(RigError::MissingArmature)
    }

    pub fn armature_mut(&mut self) -> Result<&mut Armature> {
        self.armature.as_mut().ok_or(RigError::MissingArmature)
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// The armature's active clip
    pub fn active_clip(&self) -> Result<&AnimationClip> {
        let armature = self.armature()?;
        let name = armature
            .clip
            .as_deref()
            .ok_or_else(|| RigError::MissingClip(format!("<none on '{}'>", armature.name)))?;
        self.clip(name)
            .ok_or_else(|| RigError::MissingClip(name.to_string()))
    }

    /// The armature and its active clip, borrowed together
    pub fn armature_and_clip_mut(&mut self) -> Result<(&mut Armature, &mut AnimationClip)> {
        let armature = self.armature.as_mut().ok_or(RigError::MissingArmature)?;
        let name = armature
            .clip
            .clone()
            .ok_or_else(|| RigError::MissingClip(format!("<none on '{}'>", armature.name)))?;
        let clip = self
            .clips
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or(RigError::MissingClip(name))?;
        Ok((armature, clip))
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    pub fn mesh_mut(&mut self, name: &str) -> Option<&mut Mesh> {
        self.meshes.iter_mut().find(|m| m.name == name)
    }

    /// Index of the first mesh skinned to the armature
    pub fn bound_mesh_index(&self) -> Option<usize> {
        let armature = self.armature.as_ref()?;
        self.meshes.iter().position(|m| m.is_bound_to(&armature.name))
    }

    pub fn has_material(&self, name: &str) -> bool {
        self.materials.iter().any(|m| m.name == name)
    }

    /// Rename the armature, re-pointing skin bindings at the new name
    pub fn rename_armature(&mut self, name: &str) -> Result<()> {
        let armature = self.armature.as_mut().ok_or(RigError::MissingArmature)?;
        let old = std::mem::replace(&mut armature.name, name.to_string());
        for skin in self.meshes.iter_mut().filter_map(|m| m.skin.as_mut()) {
            if skin.armature == old {
                skin.armature = name.to_string();
            }
        }
        Ok(())
    }

    /// Rename every joint through `rename`
    ///
    /// Clip channels and vertex groups follow their joint. Names that would
    /// collide get a numeric suffix. Returns the number of joints renamed.
    pub fn rename_joints(&mut self, mut rename: impl FnMut(&str) -> String) -> Result<usize> {
        let armature = self.armature.as_mut().ok_or(RigError::MissingArmature)?;
        let mut renamed = 0;

        for index in 0..armature.skeleton.len() {
            let Some(old) = armature.skeleton.joint(index).map(|j| j.name.clone()) else {
                continue;
            };
            let desired = rename(&old);
            if desired == old {
                continue;
            }
            let assigned = armature.skeleton.rename(index, &desired)?;
            if assigned != desired {
                warn!("Joint name '{desired}' already in use, renamed '{old}' to '{assigned}'");
            }

            for clip in &mut self.clips {
                clip.rename_joint(&old, &assigned);
            }
            for skin in self.meshes.iter_mut().filter_map(|m| m.skin.as_mut()) {
                if skin.armature != armature.name {
                    continue;
                }
                for group in skin.groups.iter_mut().filter(|g| **g == old) {
                    group.clone_from(&assigned);
                }
            }
            renamed += 1;
        }

        Ok(renamed)
    }

    /// Rename every mesh through `rename`
    pub fn rename_meshes(&mut self, mut rename: impl FnMut(&str) -> String) {
        for mesh in &mut self.meshes {
            mesh.name = rename(&mesh.name);
        }
    }

    /// Drop every clip except the armature's active one
    pub fn remove_orphan_clips(&mut self) -> usize {
        let active = self.armature.as_ref().and_then(|a| a.clip.clone());
        let before = self.clips.len();
        self.clips.retain(|c| Some(&c.name) == active.as_ref());
        before - self.clips.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Curve, FrameRange};
    use crate::skeleton::Joint;
    use pretty_assertions::assert_eq;

    fn scene() -> Scene {
        let skeleton = Skeleton::new(vec![
            Joint::new("mixamorig:Hips", None, Transform::IDENTITY),
            Joint::new("mixamorig:Spine", Some(0), Transform::IDENTITY),
        ])
        .unwrap();

        let mut clip = AnimationClip::new("Take 001", FrameRange::new(0, 10));
        clip.joint_channels_mut("mixamorig:Hips").translation =
            Some(Curve::constant(0.0, Vec3::ZERO));

        let mut body = Mesh::new("Body");
        body.skin = Some(SkinBinding {
            armature: "Armature".to_string(),
            groups: vec!["mixamorig:Hips".to_string(), "mixamorig:Spine".to_string()],
            influences: Vec::new(),
        });

        Scene {
            armature: Some(Armature {
                name: "Armature".to_string(),
                transform: Transform::IDENTITY,
                skeleton,
                clip: Some("Take 001".to_string()),
            }),
            meshes: vec![body],
            materials: Vec::new(),
            clips: vec![clip, AnimationClip::new("Orphan", FrameRange::new(0, 1))],
        }
    }

    #[test]
    fn test_rename_joints_updates_links() {
        let mut scene = scene();
        let renamed = scene
            .rename_joints(|name| name.trim_start_matches("mixamorig:").to_string())
            .unwrap();
        assert_eq!(renamed, 2);

        assert!(scene.active_clip().unwrap().joint_channels("Hips").is_some());
        let groups = &scene.meshes[0].skin.as_ref().unwrap().groups;
        assert_eq!(groups, &vec!["Hips".to_string(), "Spine".to_string()]);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_rename_armature_updates_skin() {
        let mut scene = scene();
        scene.rename_armature("root").unwrap();
        assert!(scene.meshes[0].is_bound_to("root"));
        assert_eq!(scene.bound_mesh_index(), Some(0));
    }

    #[test]
    fn test_remove_orphan_clips() {
        let mut scene = scene();
        assert_eq!(scene.remove_orphan_clips(), 1);
        assert_eq!(scene.clips.len(), 1);
        assert_eq!(scene.clips[0].name, "Take 001");
    }

    #[test]
    fn test_validate_reports_missing_active_clip() {
        let mut scene = scene();
        scene.clips.clear();
        assert!(matches!(scene.validate(), Err(RigError::MissingClip(_))));
        assert!(scene.armature_and_clip_mut().is_err());
    }

    #[test]
    fn test_add_shape_from_mix() {
        let mut mesh = Mesh::new("Body");
        mesh.vertices = vec![Vec3::ZERO, Vec3::X];
        mesh.shape_channels.push(ShapeChannel::new("Smile_Left", vec![Vec3::Z, Vec3::ZERO]));
        mesh.shape_channels.push(ShapeChannel::new("MouthOpen", vec![Vec3::ZERO, Vec3::Y]));
        mesh.shape_channel_mut("Smile_Left").unwrap().value = 0.5;

        let baked = mesh.add_shape_from_mix("Half").clone();
        assert_eq!(baked.value, 0.0);
        assert_eq!(baked.offsets, vec![Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO]);
        assert_eq!(baked.mix_weight("Smile_Left"), 0.5);
        assert_eq!(baked.mix_weight("MouthOpen"), 0.0);
    }

    #[test]
    fn test_mesh_apply_transform() {
        let mut mesh = Mesh::new("Body");
        mesh.vertices = vec![Vec3::new(100.0, 0.0, 0.0)];
        mesh.transform.scale = Vec3::splat(0.01);
        mesh.transform.rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);

        mesh.apply_transform(false, true);
        assert!((mesh.vertices[0] - Vec3::X).length() < 1e-5);
        assert_eq!(mesh.transform.scale, Vec3::ONE);
        assert_ne!(mesh.transform.rotation, Quat::IDENTITY);

        mesh.apply_transform(true, false);
        assert!((mesh.vertices[0] - Vec3::Y).length() < 1e-5);
        assert_eq!(mesh.transform.rotation, Quat::IDENTITY);
    }
}
