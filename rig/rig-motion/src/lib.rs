//! Root-motion extraction and rig clean-up for Mixamo-style character rigs
//!
//! Mixamo animations move the character by animating its hip joint. Game
//! engines expect that locomotion on a root transform instead. This crate
//! works on an in-memory [`Scene`] (armature, clips, meshes) and provides:
//!
//! - Root-motion extraction ([`hip_to_root`])
//! - Bind-pose fixes (rest offset, knee fix, static transform flattening)
//! - Namespace stripping and renaming to a target skeleton convention
//! - Baking of a fixed facial pose table into blend-shape channels
//! - JSON/YAML rig documents and a file/batch conversion pipeline
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use rig_motion::animation::{AnimationClip, Curve, FrameRange, Keyframe};
//! use rig_motion::{Armature, Joint, RootMotionConfig, Scene, Skeleton, Transform, hip_to_root};
//!
//! let skeleton = Skeleton::new(vec![Joint::new(
//!     "Hips",
//!     None,
//!     Transform::from_translation(Vec3::new(0.0, 0.0, 1.0)),
//! )])?;
//! let mut clip = AnimationClip::new("Walk", FrameRange::new(0, 10));
//! clip.joint_channels_mut("Hips").translation = Some(Curve::new(vec![
//!     Keyframe::new(0.0, Vec3::ZERO),
//!     Keyframe::new(10.0, Vec3::new(10.0, 0.0, 0.0)),
//! ]));
//!
//! let mut scene = Scene {
//!     armature: Some(Armature {
//!         name: "Armature".to_string(),
//!         transform: Transform::IDENTITY,
//!         skeleton,
//!         clip: Some("Walk".to_string()),
//!     }),
//!     clips: vec![clip],
//!     ..Scene::default()
//! };
//!
//! let report = hip_to_root(&mut scene, &RootMotionConfig::default())?;
//! assert_eq!(report.hip, "Hips");
//! assert_eq!(report.frames, 11);
//! # Ok::<(), rig_motion::RigError>(())
//! ```

pub mod animation;
#[cfg(feature = "serde")]
pub mod document;
pub mod error;
pub mod facial;
pub mod naming;
#[cfg(feature = "serde")]
pub mod pipeline;
pub mod rest_pose;
pub mod root_motion;
pub mod scene;
pub mod skeleton;
pub mod transform;

// Re-export common types
pub use error::{Result, RigError};
pub use facial::{FacialPoseTable, FacialPreset};
pub use naming::{TargetSkeleton, strip_namespace};
pub use root_motion::{HIP_CANDIDATES, RootMotionConfig, RootMotionReport, hip_to_root};
pub use scene::{Armature, Material, Mesh, Scene, ShapeChannel, SkinBinding};
pub use skeleton::{Joint, Skeleton};
pub use transform::Transform;

#[cfg(feature = "serde")]
pub use document::{DocumentFormat, ExportOptions, load_scene, save_scene};
#[cfg(feature = "serde")]
pub use pipeline::{ConversionConfig, ConversionReport, batch_convert, convert_file, process_scene};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
