//! Root CLI structure for rootmotion-rs

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;

use rig_motion::ConversionConfig;

#[derive(Parser)]
#[command(name = "rootmotion-rs")]
#[command(about = "Convert Mixamo hip motion into root motion", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub convert: ConvertArgs,

    /// Rig documents; the last two are the source and the destination
    pub paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one rig document
    Convert {
        /// Source rig document (.json, .yaml)
        src: PathBuf,

        /// Destination rig document
        dst: PathBuf,

        #[command(flatten)]
        args: ConvertArgs,
    },

    /// Convert every matching rig document of a directory (facial poses and eyelash material included)
    Batch {
        /// Directory with the source documents
        src_dir: PathBuf,

        /// Directory receiving the converted documents
        dst_dir: PathBuf,

        /// Glob pattern matched against file names
        #[arg(short, long, default_value = "*")]
        pattern: String,

        #[command(flatten)]
        args: ConvertArgs,
    },

    /// Show information about a rig document
    Info {
        /// Path to the rig document
        file: PathBuf,

        /// List every joint with its parent and rest position
        #[arg(short, long)]
        detailed: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Conversion settings given on the command line
///
/// Flags only ever move a setting away from its default, so they are
/// applied on top of the defaults or of the `--config` file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConvertArgs {
    /// JSON or YAML file with conversion settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not move X translation to the root
    #[arg(long)]
    pub no_x: bool,

    /// Do not move Y translation to the root
    #[arg(long)]
    pub no_y: bool,

    /// Do not move Z translation to the root
    #[arg(long)]
    pub no_z: bool,

    /// Let the root follow the hip below its rest height
    #[arg(long)]
    pub no_ground: bool,

    /// Scene scale applied to the root motion
    #[arg(long)]
    pub scale: Option<f32>,

    /// Offset added to the rest pose of the hip (x,y,z)
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, allow_hyphen_values = true)]
    pub rest_offset: Option<Vec3>,

    /// Name of the hip joint, tried before the default candidates
    #[arg(long)]
    pub hip_name: Option<String>,

    /// Leave the mesh bindings and static transforms untouched
    #[arg(long)]
    pub no_fix_bind: bool,

    /// Keep the static rotation of the armature and meshes
    #[arg(long)]
    pub no_apply_rotation: bool,

    /// Flatten the static scale of the armature and meshes
    #[arg(long)]
    pub apply_scale: bool,

    /// Strip namespaces instead of renaming to the target skeleton
    #[arg(long)]
    pub remove_namespace: bool,

    /// Keep the source joint names
    #[arg(long)]
    pub keep_bone_names: bool,

    /// Add an end joint to every chain on export
    #[arg(long)]
    pub add_leaf_bones: bool,

    /// Armature-space offset for the knee fix (x,y,z)
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, allow_hyphen_values = true)]
    pub knee_offset: Option<Vec3>,

    /// Joints moved by the knee fix
    #[arg(long, value_delimiter = ',')]
    pub knee_bones: Vec<String>,

    /// Skip the facial pose table
    #[arg(long)]
    pub no_facial: bool,
}

impl ConvertArgs {
    /// Build the conversion settings: defaults, then the config file, then
    /// the flags
    pub fn load_config(&self) -> Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::from_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => ConversionConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Override settings with the given flags
    pub fn apply(&self, config: &mut ConversionConfig) {
        let root = &mut config.root_motion;
        if self.no_x {
            root.use_x = false;
        }
        if self.no_y {
            root.use_y = false;
        }
        if self.no_z {
            root.use_z = false;
        }
        if self.no_ground {
            root.on_ground = false;
        }
        if let Some(scale) = self.scale {
            root.scale = scale;
        }
        if let Some(offset) = self.rest_offset {
            root.rest_offset = offset;
        }
        if let Some(hip) = &self.hip_name {
            root.hip_name.clone_from(hip);
        }
        if self.no_fix_bind {
            root.fix_bind = false;
        }
        if self.no_apply_rotation {
            root.apply_rotation = false;
        }
        if self.apply_scale {
            root.apply_scale = true;
        }

        if self.remove_namespace {
            config.remove_namespace = true;
        }
        if self.keep_bone_names {
            config.use_target_bone_names = false;
        }
        if self.add_leaf_bones {
            config.add_leaf_bones = true;
        }
        if let Some(offset) = self.knee_offset {
            config.knee_offset = offset;
        }
        if !self.knee_bones.is_empty() {
            config.knee_bones.clone_from(&self.knee_bones);
        }
        if self.no_facial {
            config.facial_rig = false;
        }
    }
}

/// Parse "x,y,z" into a vector
fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected three comma-separated numbers, got '{s}'"));
    };
    let component = |v: &str| {
        v.parse::<f32>()
            .map_err(|e| format!("invalid number '{v}': {e}"))
    };
    Ok(Vec3::new(component(x)?, component(y)?, component(z)?))
}
