use std::io;
use thiserror::Error;

/// Error types for rig processing
#[derive(Error, Debug)]
pub enum RigError {
    /// None of the hip candidates exist in the skeleton
    #[error("No hip joint found (tried: {})", candidates.join(", "))]
    MissingHipJoint { candidates: Vec<String> },

    /// A joint referenced by name does not exist
    #[error("Joint not found: {0}")]
    MissingJoint(String),

    /// The scene has no armature to operate on
    #[error("Scene has no armature")]
    MissingArmature,

    /// The armature has no active clip, or the clip it names is absent
    #[error("Animation clip not found: {0}")]
    MissingClip(String),

    /// Skeleton structure violates an invariant
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    /// Clip structure violates an invariant
    #[error("Invalid clip '{clip}': {reason}")]
    InvalidClip { clip: String, reason: String },

    /// The file extension does not map to a rig document format
    #[error("Unsupported rig document format: {0}")]
    UnsupportedFormat(String),

    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization failure
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization failure
    #[cfg(feature = "yaml")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type using RigError
pub type Result<T> = std::result::Result<T, RigError>;
