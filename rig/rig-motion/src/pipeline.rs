//! End-to-end conversion of Mixamo rigs
//!
//! One conversion loads a scene, cleans up names, extracts root motion,
//! applies the optional rest-pose fixes and facial poses, and writes the
//! result. Batches run the same steps file by file with a fresh scene each
//! time.

use glam::Vec3;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::document::{self, DocumentFormat, ExportOptions};
use crate::error::{Result, RigError};
use crate::facial::FacialPoseTable;
use crate::naming::{self, TargetSkeleton};
use crate::rest_pose::{self, DEFAULT_KNEE_BONES, TARGET_KNEE_BONES};
use crate::root_motion::{self, RootMotionConfig, RootMotionReport};
use crate::scene::{Material, Scene};

/// Material given to eyelash meshes that lack one
pub const EYELASH_MATERIAL: &str = "Eyelashesmat";

/// Mesh receiving the eyelash material
pub const EYELASH_MESH: &str = "Eyelashes";

/// Full conversion settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConversionConfig {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub root_motion: RootMotionConfig,
    /// Strip `namespace:` prefixes from joint and object names
    pub remove_namespace: bool,
    /// Rename joints to the target skeleton (when namespaces are kept)
    pub use_target_bone_names: bool,
    pub target_skeleton: TargetSkeleton,
    /// Add `_end` joints to every chain on export
    pub add_leaf_bones: bool,
    /// Armature-space offset for the knee fix; zero disables it
    pub knee_offset: Vec3,
    /// Joints moved by the knee fix (defaults depend on the naming)
    pub knee_bones: Vec<String>,
    /// Bake the facial pose table
    pub facial_rig: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            root_motion: RootMotionConfig::default(),
            remove_namespace: false,
            use_target_bone_names: true,
            target_skeleton: TargetSkeleton::default(),
            add_leaf_bones: false,
            knee_offset: Vec3::ZERO,
            knee_bones: Vec::new(),
            facial_rig: true,
        }
    }
}

impl ConversionConfig {
    /// Load settings from a JSON or YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        document::read_document(path)
    }

    /// Joints the knee fix applies to
    pub fn knee_joints(&self) -> Vec<String> {
        if !self.knee_bones.is_empty() {
            return self.knee_bones.clone();
        }
        let defaults = if self.renames_to_target() {
            TARGET_KNEE_BONES
        } else {
            DEFAULT_KNEE_BONES
        };
        defaults.iter().map(ToString::to_string).collect()
    }

    /// Target renaming only runs when namespaces are not stripped
    pub fn renames_to_target(&self) -> bool {
        !self.remove_namespace && self.use_target_bone_names
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            add_leaf_bones: self.add_leaf_bones,
        }
    }
}

/// Summary of one converted scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub root_motion: RootMotionReport,
    pub knee_fixed: bool,
    pub removed_clips: usize,
    pub facial_meshes: usize,
    pub eyelash_material_added: bool,
}

/// Run every conversion step on an in-memory scene
pub fn process_scene(scene: &mut Scene, config: &ConversionConfig) -> Result<ConversionReport> {
    if config.remove_namespace {
        naming::strip_scene_namespaces(scene)?;
    } else if config.use_target_bone_names {
        naming::rename_to_target(scene, config.target_skeleton)?;
    }

    let root_motion = root_motion::hip_to_root(scene, &config.root_motion)?;

    let knee_fixed = config.knee_offset != Vec3::ZERO;
    if knee_fixed {
        let joints = config.knee_joints();
        rest_pose::apply_knee_fix(&mut scene.armature_mut()?.skeleton, &joints, config.knee_offset)?;
        debug!("Knee fix applied to {joints:?}");
    }

    let removed_clips = scene.remove_orphan_clips();
    if removed_clips > 0 {
        debug!("Removed {removed_clips} orphan clips");
    }

    let facial_meshes = if config.facial_rig {
        FacialPoseTable::default().apply(scene)
    } else {
        0
    };

    let eyelash_material_added = add_eyelash_material(scene);

    Ok(ConversionReport {
        root_motion,
        knee_fixed,
        removed_clips,
        facial_meshes,
        eyelash_material_added,
    })
}

/// Give the eyelash mesh its own material when the scene has none by that
/// name
pub fn add_eyelash_material(scene: &mut Scene) -> bool {
    if scene.has_material(EYELASH_MATERIAL) {
        debug!("{EYELASH_MATERIAL} exists");
        return false;
    }
    let Some(mesh) = scene.mesh_mut(EYELASH_MESH) else {
        return false;
    };
    mesh.materials = vec![EYELASH_MATERIAL.to_string()];
    scene.materials.push(Material {
        name: EYELASH_MATERIAL.to_string(),
    });
    true
}

/// Convert one rig document
pub fn convert_file(src: &Path, dst: &Path, config: &ConversionConfig) -> Result<ConversionReport> {
    // Fail on the output format before spending time on the conversion
    DocumentFormat::from_path(dst)?;

    info!("Converting {} -> {}", src.display(), dst.display());
    let mut scene = document::load_scene(src)?;
    let report = process_scene(&mut scene, config)?;
    document::save_scene(&scene, dst, &config.export_options())?;
    Ok(report)
}

/// Files of a directory matching a glob pattern with a rig document
/// extension, in name order
pub fn batch_inputs(src_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = glob::Pattern::new(pattern)
        .map_err(|e| RigError::UnsupportedFormat(format!("invalid pattern '{pattern}': {e}")))?;

    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(src_dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| matcher.matches(name));
        if path.is_file() && matches && DocumentFormat::is_supported(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Output path of a batch input: its stem with the default extension
pub fn batch_output(dst_dir: &Path, input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".");
    name.push(DocumentFormat::DEFAULT_EXTENSION);
    dst_dir.join(name)
}

/// Convert every matching file of a directory
///
/// Stops at the first file that fails. `on_file` runs after each successful
/// conversion. Returns the number of converted files.
pub fn batch_convert(
    src_dir: &Path,
    dst_dir: &Path,
    pattern: &str,
    config: &ConversionConfig,
    mut on_file: impl FnMut(&Path, &ConversionReport),
) -> Result<usize> {
    let inputs = batch_inputs(src_dir, pattern)?;
    if inputs.is_empty() {
        warn!("No rig documents matching '{pattern}' in {}", src_dir.display());
        return Ok(0);
    }
    std::fs::create_dir_all(dst_dir)?;

    for input in &inputs {
        let output = batch_output(dst_dir, input);
        let report = convert_file(input, &output, config)?;
        on_file(input, &report);
    }
    info!("Converted {} files into {}", inputs.len(), dst_dir.display());
    Ok(inputs.len())
}
