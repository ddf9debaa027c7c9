//! Common types for the keyframe animation model

use glam::{Quat, Vec3};

use crate::transform::Transform;

/// Trait for types that can be linearly interpolated
pub trait Lerp: Clone {
    /// Linear interpolation between self and other
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        // glam's slerp already takes the shorter arc
        self.slerp(*other, t).normalize()
    }
}

/// How values between two keys are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Interpolation {
    /// Hold the earlier key until the next one
    Step,
    /// Linear (slerp for rotations)
    #[default]
    Linear,
}

/// A single keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    pub frame: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(frame: f32, value: T) -> Self {
        Self { frame, value }
    }
}

/// A keyframed curve, keys sorted by frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Curve<T> {
    #[cfg_attr(feature = "serde", serde(default))]
    pub interpolation: Interpolation,
    pub keys: Vec<Keyframe<T>>,
}

impl<T: Lerp> Curve<T> {
    /// Create a linear curve from keys, sorting them by frame
    pub fn new(mut keys: Vec<Keyframe<T>>) -> Self {
        keys.sort_by(|a, b| a.frame.total_cmp(&b.frame));
        Self {
            interpolation: Interpolation::Linear,
            keys,
        }
    }

    /// A curve holding one value
    pub fn constant(frame: f32, value: T) -> Self {
        Self::new(vec![Keyframe::new(frame, value)])
    }

    /// Build a linear curve with one key per sampled frame
    pub fn from_samples(samples: impl IntoIterator<Item = (f32, T)>) -> Self {
        Self::new(
            samples
                .into_iter()
                .map(|(frame, value)| Keyframe::new(frame, value))
                .collect(),
        )
    }

    /// Check if the curve has any keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Evaluate the curve at a frame
    pub fn sample(&self, frame: f32) -> Option<T> {
        super::interpolation::sample_curve(self, frame)
    }

    /// Apply a function to every key value in place
    pub fn map_values(&mut self, mut f: impl FnMut(&T) -> T) {
        for key in &mut self.keys {
            key.value = f(&key.value);
        }
    }
}

/// Translation, rotation and scale curves of one animated transform
///
/// Missing curves leave the corresponding component of the base transform
/// untouched when sampled.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformChannels {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub translation: Option<Curve<Vec3>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rotation: Option<Curve<Quat>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub scale: Option<Curve<Vec3>>,
}

impl TransformChannels {
    /// Check if no curve is present
    pub fn is_empty(&self) -> bool {
        self.translation.is_none() && self.rotation.is_none() && self.scale.is_none()
    }

    /// Sample every present curve, falling back to `base` for the rest
    pub fn sample(&self, frame: f32, base: &Transform) -> Transform {
        Transform {
            translation: self
                .translation
                .as_ref()
                .and_then(|c| c.sample(frame))
                .unwrap_or(base.translation),
            rotation: self
                .rotation
                .as_ref()
                .and_then(|c| c.sample(frame))
                .unwrap_or(base.rotation),
            scale: self
                .scale
                .as_ref()
                .and_then(|c| c.sample(frame))
                .unwrap_or(base.scale),
        }
    }
}

/// Closed, non-empty range of integer frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
}

impl FrameRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// A range is valid when it holds at least one frame
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Number of frames in the range, both ends included
    pub fn len(&self) -> usize {
        if self.is_valid() {
            (self.end - self.start) as usize + 1
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate every frame of the range
    pub fn frames(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}
