//! Keyframe interpolation for bone tracks
//!
//! Times are in seconds. Non-looping techniques hold the last keyframe
//! after it is reached; looping techniques blend from the last keyframe back
//! to the first over the remainder of the animation's duration.

use glam::{Quat, Vec3};

/// Find the index of the keyframe at or before the given time
///
/// Returns the largest index whose time does not exceed `time`, or 0 when
/// `time` precedes the first keyframe. `times` must be non-empty and sorted.
pub fn find_previous_index(time: f32, times: &[f32]) -> usize {
    if times.len() <= 1 {
        return 0;
    }

    let last_index = times.len() - 1;
    if time >= times[last_index] {
        return last_index;
    }

    // We want the largest index where times[index] <= time
    let mut low = 0;
    let mut high = last_index;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if times[mid] <= time {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    low
}

/// Interpolation technique for translations and scales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum VectorTween {
    /// Linear interpolation, holding the last keyframe
    #[default]
    Lerp,
    /// Linear interpolation, wrapping from the last keyframe to the first
    LoopLerp,
}

/// Interpolation technique for rotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum QuaternionTween {
    /// Normalized linear interpolation, holding the last keyframe
    #[default]
    Nlerp,
    /// Spherical linear interpolation, holding the last keyframe
    Slerp,
    /// Normalized linear interpolation with wrap-around
    LoopNlerp,
    /// Spherical linear interpolation with wrap-around
    LoopSlerp,
}

/// Interpolation techniques for the three components of a bone track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct TweenOptions {
    pub translations: VectorTween,
    pub rotations: QuaternionTween,
    pub scales: VectorTween,
}

/// Blend between bracketing keyframes
///
/// `last` is the index of the last keyframe taking part; looping blends
/// from it back to keyframe 0 over `duration - times[last]`.
fn bracket(
    time: f32,
    times: &[f32],
    last: usize,
    looping: bool,
    duration: f32,
) -> (usize, usize, f32) {
    let index1 = find_previous_index(time, &times[..=last]);

    let (index2, interval) = if index1 < last {
        (index1 + 1, times[index1 + 1] - times[index1])
    } else if looping {
        (0, duration - times[index1])
    } else {
        return (index1, index1, 0.0);
    };

    if interval <= 0.0 {
        return (index1, index1, 0.0);
    }

    let t = ((time - times[index1]) / interval).clamp(0.0, 1.0);
    (index1, index2, t)
}

/// Resolve which keyframes a looping technique uses
///
/// A final keyframe placed exactly at the duration duplicates the first
/// one, so it is ignored; with too few keyframes left, looping is dropped.
fn loop_extent(times: &[f32], duration: f32) -> (usize, bool) {
    let last = times.len() - 1;
    if times[last] == duration {
        if last > 1 {
            (last - 1, true)
        } else {
            (last, false)
        }
    } else {
        (last, true)
    }
}

/// Times of the keyframes shared with a value array of length `count`
///
/// Returns `None` when fewer than two keyframes are shared.
fn shared_keyframes(times: &[f32], count: usize) -> Option<&[f32]> {
    let shared = times.len().min(count);
    (shared >= 2).then(|| &times[..shared])
}

impl VectorTween {
    /// Interpolate `values` at `time`
    ///
    /// Only the keyframes present in both `times` and `values` take part.
    /// With fewer than two, the first value is held (zero when empty).
    pub fn interpolate(self, time: f32, times: &[f32], duration: f32, values: &[Vec3]) -> Vec3 {
        let Some(times) = shared_keyframes(times, values.len()) else {
            return values.first().copied().unwrap_or(Vec3::ZERO);
        };

        let (last, looping) = match self {
            Self::Lerp => (times.len() - 1, false),
            Self::LoopLerp => loop_extent(times, duration),
        };

        let (index1, index2, t) = bracket(time, times, last, looping, duration);
        values[index1].lerp(values[index2], t)
    }
}

impl QuaternionTween {
    /// Interpolate `values` at `time`
    ///
    /// Only the keyframes present in both `times` and `values` take part.
    /// With fewer than two, the first value is held (identity when empty).
    pub fn interpolate(self, time: f32, times: &[f32], duration: f32, values: &[Quat]) -> Quat {
        let Some(times) = shared_keyframes(times, values.len()) else {
            return values.first().copied().unwrap_or(Quat::IDENTITY);
        };

        let (last, looping) = match self {
            Self::Nlerp | Self::Slerp => (times.len() - 1, false),
            Self::LoopNlerp | Self::LoopSlerp => loop_extent(times, duration),
        };

        let (index1, index2, t) = bracket(time, times, last, looping, duration);
        let q1 = values[index1];
        let q2 = values[index2];
        if index1 == index2 || q1 == q2 {
            return q1;
        }

        match self {
            Self::Nlerp | Self::LoopNlerp => q1.lerp(q2, t),
            Self::Slerp | Self::LoopSlerp => q1.slerp(q2, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_find_previous_index_single() {
        assert_eq!(find_previous_index(0.0, &[0.5]), 0);
        assert_eq!(find_previous_index(9.0, &[0.5]), 0);
    }

    #[test]
    fn test_find_previous_index_multiple() {
        let times = [0.0, 1.0, 2.0, 3.0];

        // Before first
        assert_eq!(find_previous_index(-1.0, &times), 0);

        // Between keyframes
        assert_eq!(find_previous_index(0.5, &times), 0);
        assert_eq!(find_previous_index(1.5, &times), 1);
        assert_eq!(find_previous_index(2.5, &times), 2);

        // At keyframes
        assert_eq!(find_previous_index(1.0, &times), 1);
        assert_eq!(find_previous_index(2.0, &times), 2);

        // After last
        assert_eq!(find_previous_index(4.0, &times), 3);
    }

    #[test]
    fn test_lerp() {
        let times = [0.0, 1.0];
        let values = [Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0)];

        let v = VectorTween::Lerp.interpolate(0.5, &times, 2.0, &values);
        assert!((v.x - 5.0).abs() < 0.001);

        // Holds the last keyframe
        let v = VectorTween::Lerp.interpolate(1.5, &times, 2.0, &values);
        assert!((v.x - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_loop_lerp_wraps_to_first() {
        let times = [0.0, 1.0];
        let values = [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)];

        // Halfway between the last keyframe (t=1) and the wrap point (t=2)
        let v = VectorTween::LoopLerp.interpolate(1.5, &times, 2.0, &values);
        assert!((v.x - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_loop_lerp_ignores_final_duplicate() {
        let times = [0.0, 1.0, 2.0];
        let values = [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO];

        let v = VectorTween::LoopLerp.interpolate(1.5, &times, 2.0, &values);
        assert!((v.x - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_loop_falls_back_with_two_keyframes_at_duration() {
        let times = [0.0, 2.0];
        let values = [Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)];

        let v = VectorTween::LoopLerp.interpolate(1.0, &times, 2.0, &values);
        assert!((v.x - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_quaternion_techniques_agree_at_midpoint() {
        let times = [0.0, 1.0];
        let values = [Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2)];
        let expected = Quat::from_rotation_z(FRAC_PI_2 / 2.0);

        for technique in [QuaternionTween::Nlerp, QuaternionTween::Slerp] {
            let q = technique.interpolate(0.5, &times, 1.0, &values);
            assert!(q.abs_diff_eq(expected, 1e-4), "{technique:?}: {q:?}");
        }
    }

    #[test]
    fn test_quaternion_hits_keyframes() {
        let times = [0.0, 1.0, 3.0];
        let values = [
            Quat::IDENTITY,
            Quat::from_rotation_x(1.0),
            Quat::from_rotation_y(1.0),
        ];

        for technique in [
            QuaternionTween::Nlerp,
            QuaternionTween::Slerp,
            QuaternionTween::LoopNlerp,
            QuaternionTween::LoopSlerp,
        ] {
            for (time, value) in times.iter().zip(values) {
                let q = technique.interpolate(*time, &times, 4.0, &values);
                assert!(q.abs_diff_eq(value, 1e-5), "{technique:?} at {time}");
            }
        }
    }

    #[test]
    fn test_mismatched_or_empty_keyframes() {
        assert_eq!(VectorTween::Lerp.interpolate(0.5, &[], 1.0, &[]), Vec3::ZERO);
        assert_eq!(
            QuaternionTween::LoopSlerp.interpolate(0.5, &[0.0, 1.0], 1.0, &[]),
            Quat::IDENTITY
        );

        // Extra times beyond the values are ignored
        let v = VectorTween::Lerp.interpolate(
            0.5,
            &[0.0, 1.0, 2.0],
            2.0,
            &[Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)],
        );
        assert!((v.x - 1.0).abs() < 0.001);

        let v = VectorTween::LoopLerp.interpolate(0.5, &[0.0], 1.0, &[Vec3::X, Vec3::Y]);
        assert_eq!(v, Vec3::X);
    }

    #[test]
    fn test_default_options() {
        let options = TweenOptions::default();
        assert_eq!(options.translations, VectorTween::Lerp);
        assert_eq!(options.rotations, QuaternionTween::Nlerp);
        assert_eq!(options.scales, VectorTween::Lerp);
    }
}
