//! Keyframe interpolation for animation curves

use super::types::{Curve, Interpolation, Keyframe, Lerp};

/// Find the index of the keyframe at or before the given frame
///
/// Returns None if there are no keyframes.
/// For interpolation, this returns the index of the earlier keyframe
/// in the bracketing pair (so we can interpolate between `[index]` and `[index+1]`).
/// Frames before the first key map to index 0.
pub fn find_key_index<T>(keys: &[Keyframe<T>], frame: f32) -> Option<usize> {
    if keys.is_empty() {
        return None;
    }

    if keys.len() == 1 {
        return Some(0);
    }

    let last_index = keys.len() - 1;

    if frame >= keys[last_index].frame {
        return Some(last_index);
    }

    // Largest index where keys[index].frame <= frame
    let mut low = 0;
    let mut high = last_index;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if keys[mid].frame <= frame {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Some(low)
}

/// Interpolate a curve value at the given frame
///
/// Frames outside the keyed range hold the first or last value.
pub fn sample_curve<T: Lerp>(curve: &Curve<T>, frame: f32) -> Option<T> {
    let keys = &curve.keys;
    let index = find_key_index(keys, frame)?;

    if index >= keys.len() - 1 || frame <= keys[index].frame {
        return Some(keys[index].value.clone());
    }

    let first = &keys[index];
    let second = &keys[index + 1];

    match curve.interpolation {
        Interpolation::Step => Some(first.value.clone()),
        Interpolation::Linear => {
            let span = second.frame - first.frame;
            let t = if span > 0.0 {
                (frame - first.frame) / span
            } else {
                0.0
            };
            Some(Lerp::lerp(&first.value, &second.value, t.clamp(0.0, 1.0)))
        }
    }
}
