//! Keyframe animation
//!
//! This module provides the animation data model and its evaluation:
//! - Keyframed curves with step and linear interpolation
//! - Transform channels for joints and the armature's top-level transform
//! - Clips over a closed integer frame range
//! - Per-frame pose evaluation of the whole joint hierarchy
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use rig_motion::animation::{Curve, Keyframe};
//!
//! let curve = Curve::new(vec![
//!     Keyframe::new(0.0, Vec3::ZERO),
//!     Keyframe::new(10.0, Vec3::new(10.0, 0.0, 0.0)),
//! ]);
//! assert_eq!(curve.sample(5.0), Some(Vec3::new(5.0, 0.0, 0.0)));
//! ```

mod clip;
mod evaluate;
mod interpolation;
mod types;

pub use clip::AnimationClip;
pub use evaluate::PoseEvaluator;
pub use interpolation::{find_key_index, sample_curve};
pub use types::{Curve, FrameRange, Interpolation, Keyframe, Lerp, TransformChannels};
