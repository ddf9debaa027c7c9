//! Rig documents on disk
//!
//! Scenes and conversion settings are stored as JSON (`.json`) or YAML
//! (`.yaml`, `.yml`); the extension picks the format.

use glam::Vec3;
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Result, RigError};
use crate::scene::Scene;
use crate::skeleton::{Joint, Skeleton};
use crate::transform::Transform;

/// Suffix of joints added at the end of each chain
pub const LEAF_SUFFIX: &str = "_end";

/// Supported document encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
}

impl DocumentFormat {
    /// Extension used when a format has to be picked for output
    pub const DEFAULT_EXTENSION: &'static str = "json";

    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(RigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }

    pub fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T> {
        match self {
            Self::Json => Ok(serde_json::from_str(text)?),
            #[cfg(feature = "yaml")]
            Self::Yaml => Ok(serde_yaml_ng::from_str(text)?),
        }
    }

    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
            #[cfg(feature = "yaml")]
            Self::Yaml => Ok(serde_yaml_ng::to_string(value)?),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            #[cfg(feature = "yaml")]
            Self::Yaml => write!(f, "YAML"),
        }
    }
}

/// Read any document type from a file
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DocumentFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    match format {
        DocumentFormat::Json => Ok(serde_json::from_reader(reader)?),
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => Ok(serde_yaml_ng::from_reader(reader)?),
    }
}

/// Write any document type to a file
pub fn write_document<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let format = DocumentFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        DocumentFormat::Json => serde_json::to_writer_pretty(&mut writer, value)?,
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml_ng::to_writer(&mut writer, value)?,
    }
    writer.flush()?;
    Ok(())
}

/// Load and validate a scene
pub fn load_scene(path: &Path) -> Result<Scene> {
    let scene: Scene = read_document(path)?;
    scene.validate()?;
    debug!(
        "Loaded {} ({} meshes, {} clips)",
        path.display(),
        scene.meshes.len(),
        scene.clips.len()
    );
    Ok(scene)
}

/// Options applied while writing a scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Add a `<name>_end` joint below every joint without children
    pub add_leaf_bones: bool,
}

/// Write a scene, leaving the in-memory scene as it is
pub fn save_scene(scene: &Scene, path: &Path, options: &ExportOptions) -> Result<()> {
    // Check the format before doing any work
    DocumentFormat::from_path(path)?;

    if options.add_leaf_bones
        && let Some(armature) = &scene.armature
    {
        let mut exported = scene.clone();
        let mut skeleton = armature.skeleton.clone();
        let added = add_leaf_joints(&mut skeleton)?;
        if let Some(armature) = exported.armature.as_mut() {
            armature.skeleton = skeleton;
        }
        info!("Added {added} leaf joints for export");
        return write_document(&exported, path);
    }

    write_document(scene, path)
}

/// Give every joint without children an `_end` child
///
/// The leaf sits along the joint's local +Y axis, as far from it as the
/// joint is from its parent (one unit for joints at their parent's origin).
pub fn add_leaf_joints(skeleton: &mut Skeleton) -> Result<usize> {
    let leaves: Vec<(usize, String, f32)> = (0..skeleton.len())
        .filter(|&i| skeleton.children(i).is_empty())
        .filter_map(|i| {
            let joint = skeleton.joint(i)?;
            let length = joint.rest.translation.length();
            let length = if length > f32::EPSILON { length } else { 1.0 };
            Some((i, joint.name.clone(), length))
        })
        .collect();

    for (parent, name, length) in &leaves {
        skeleton.push(Joint::new(
            format!("{name}{LEAF_SUFFIX}"),
            Some(*parent),
            Transform::from_translation(Vec3::Y * *length),
        ))?;
    }
    Ok(leaves.len())
}
