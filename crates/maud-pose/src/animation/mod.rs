//! Bone-track animations
//!
//! This module provides the animation data a pose is loaded from and
//! captured into:
//! - [`BoneTrack`]: keyframed translation, rotation, and optional scale for
//!   one bone
//! - [`Animation`]: a named set of bone tracks with a duration
//! - Keyframe interpolation techniques in [`tween`]
//!
//! # Example
//!
//! ```rust
//! use glam::{Quat, Vec3};
//! use maud_pose::animation::{Animation, BoneTrack, TweenOptions};
//!
//! let track = BoneTrack::new(
//!     0,
//!     vec![0.0, 1.0],
//!     vec![Vec3::ZERO, Vec3::X],
//!     vec![Quat::IDENTITY, Quat::IDENTITY],
//!     None,
//! )?;
//!
//! let mut animation = Animation::new("walk", 1.0)?;
//! animation.add_track(track);
//!
//! let sampled = animation
//!     .find_track(0)
//!     .map(|track| track.sample(0.5, animation.duration(), &TweenOptions::default()));
//! assert!(sampled.is_some());
//! # Ok::<(), maud_pose::PoseError>(())
//! ```

pub mod tween;

use glam::{Quat, Vec3};

use crate::error::{PoseError, Result};
use crate::transform::Transform;

pub use tween::{QuaternionTween, TweenOptions, VectorTween, find_previous_index};

/// Upper bound on the keyframes [`BoneTrack::resample`] will produce
pub const MAX_RESAMPLED_KEYFRAMES: usize = 1 << 20;

fn check_duration(duration: f32) -> Result<()> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(())
    } else {
        Err(PoseError::InvalidArgument(format!(
            "duration must be finite and non-negative, got {duration}"
        )))
    }
}

/// Keyframes for a single bone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawBoneTrack")
)]
pub struct BoneTrack {
    bone_index: usize,
    times: Vec<f32>,
    translations: Vec<Vec3>,
    rotations: Vec<Quat>,
    scales: Option<Vec<Vec3>>,
}

impl BoneTrack {
    /// Create a bone track
    ///
    /// `times` must be non-empty, start at or after 0, and never decrease.
    /// The value arrays must have one entry per keyframe. Without `scales`
    /// the track samples as unit scale.
    pub fn new(
        bone_index: usize,
        times: Vec<f32>,
        translations: Vec<Vec3>,
        rotations: Vec<Quat>,
        scales: Option<Vec<Vec3>>,
    ) -> Result<Self> {
        let count = times.len();
        if count == 0 {
            return Err(PoseError::InvalidTrack(format!(
                "track for bone {bone_index} has no keyframes"
            )));
        }
        if translations.len() != count || rotations.len() != count {
            return Err(PoseError::InvalidTrack(format!(
                "track for bone {bone_index} has {count} times but {} translations and {} rotations",
                translations.len(),
                rotations.len()
            )));
        }
        if let Some(scales) = &scales {
            if scales.len() != count {
                return Err(PoseError::InvalidTrack(format!(
                    "track for bone {bone_index} has {count} times but {} scales",
                    scales.len()
                )));
            }
        }
        if !(times[0] >= 0.0) {
            return Err(PoseError::InvalidTrack(format!(
                "track for bone {bone_index} starts at {}",
                times[0]
            )));
        }
        if times.windows(2).any(|pair| !(pair[1] >= pair[0])) {
            return Err(PoseError::InvalidTrack(format!(
                "keyframe times for bone {bone_index} are not sorted"
            )));
        }

        Ok(Self {
            bone_index,
            times,
            translations,
            rotations,
            scales,
        })
    }

    /// Create a track with one keyframe at t=0 holding `transform`
    pub fn single_keyframe(bone_index: usize, transform: &Transform) -> Self {
        Self {
            bone_index,
            times: vec![0.0],
            translations: vec![transform.translation],
            rotations: vec![transform.rotation],
            scales: Some(vec![transform.scale]),
        }
    }

    /// Index of the animated bone
    pub fn bone_index(&self) -> usize {
        self.bone_index
    }

    /// Keyframe times in seconds
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    /// Translation keyframes
    pub fn translations(&self) -> &[Vec3] {
        &self.translations
    }

    /// Rotation keyframes
    pub fn rotations(&self) -> &[Quat] {
        &self.rotations
    }

    /// Scale keyframes, if the track animates scale
    pub fn scales(&self) -> Option<&[Vec3]> {
        self.scales.as_deref()
    }

    /// Number of keyframes
    pub fn keyframe_count(&self) -> usize {
        self.times.len()
    }

    /// Sample the track at `time` within an animation of `duration` seconds
    ///
    /// Times at or before zero, and tracks with a single keyframe, yield the
    /// first keyframe.
    pub fn sample(&self, time: f32, duration: f32, options: &TweenOptions) -> Transform {
        if time <= 0.0 || self.times.len() == 1 {
            return Transform {
                translation: self.translations[0],
                rotation: self.rotations[0],
                scale: self.scales.as_ref().map_or(Vec3::ONE, |scales| scales[0]),
            };
        }

        // A track may run past a duration it was not authored for
        let duration = duration.max(self.times[self.times.len() - 1]);
        let time = time.min(duration);

        let translation = options
            .translations
            .interpolate(time, &self.times, duration, &self.translations);
        let rotation = options
            .rotations
            .interpolate(time, &self.times, duration, &self.rotations);
        let scale = match &self.scales {
            Some(scales) => options.scales.interpolate(time, &self.times, duration, scales),
            None => Vec3::ONE,
        };

        Transform {
            translation,
            rotation,
            scale,
        }
    }

    /// Resample the track at a fixed rate
    ///
    /// The result has `1 + floor(duration * sample_rate)` keyframes at
    /// multiples of `1 / sample_rate`.
    pub fn resample(&self, sample_rate: f32, duration: f32, options: &TweenOptions) -> Result<Self> {
        if !(sample_rate > 0.0) {
            return Err(PoseError::InvalidArgument(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        check_duration(duration)?;

        let frames = (duration * sample_rate).floor();
        if !(frames < MAX_RESAMPLED_KEYFRAMES as f32) {
            return Err(PoseError::InvalidArgument(format!(
                "resampling {duration}s at {sample_rate} per second exceeds {MAX_RESAMPLED_KEYFRAMES} keyframes"
            )));
        }

        let count = 1 + frames as usize;
        let mut times = Vec::with_capacity(count);
        let mut translations = Vec::with_capacity(count);
        let mut rotations = Vec::with_capacity(count);
        let mut scales = self.scales.as_ref().map(|_| Vec::with_capacity(count));

        for frame in 0..count {
            let time = frame as f32 / sample_rate;
            let transform = self.sample(time, duration, options);
            times.push(time);
            translations.push(transform.translation);
            rotations.push(transform.rotation);
            if let Some(scales) = &mut scales {
                scales.push(transform.scale);
            }
        }

        Self::new(self.bone_index, times, translations, rotations, scales)
    }
}

/// Named collection of bone tracks
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawAnimation")
)]
pub struct Animation {
    name: String,
    duration: f32,
    tracks: Vec<BoneTrack>,
}

impl Animation {
    /// Create an animation with no tracks
    pub fn new(name: impl Into<String>, duration: f32) -> Result<Self> {
        check_duration(duration)?;

        Ok(Self {
            name: name.into(),
            duration,
            tracks: Vec::new(),
        })
    }

    /// Zero-duration animation, as produced by capturing a pose
    pub(crate) fn still(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: 0.0,
            tracks: Vec::new(),
        }
    }

    /// Name of the animation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Add a track, replacing any existing track for the same bone
    pub fn add_track(&mut self, track: BoneTrack) {
        match self
            .tracks
            .iter_mut()
            .find(|existing| existing.bone_index == track.bone_index)
        {
            Some(existing) => *existing = track,
            None => self.tracks.push(track),
        }
    }

    /// Find the track animating `bone_index`
    pub fn find_track(&self, bone_index: usize) -> Option<&BoneTrack> {
        self.tracks.iter().find(|track| track.bone_index == bone_index)
    }

    /// All tracks in insertion order
    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    /// Number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// Serialized form of a [`BoneTrack`], validated on the way in
#[cfg(feature = "serde-support")]
#[derive(serde::Deserialize)]
struct RawBoneTrack {
    bone_index: usize,
    times: Vec<f32>,
    translations: Vec<Vec3>,
    rotations: Vec<Quat>,
    scales: Option<Vec<Vec3>>,
}

#[cfg(feature = "serde-support")]
impl TryFrom<RawBoneTrack> for BoneTrack {
    type Error = PoseError;

    fn try_from(raw: RawBoneTrack) -> Result<Self> {
        Self::new(
            raw.bone_index,
            raw.times,
            raw.translations,
            raw.rotations,
            raw.scales,
        )
    }
}

/// Serialized form of an [`Animation`], validated on the way in
#[cfg(feature = "serde-support")]
#[derive(serde::Deserialize)]
struct RawAnimation {
    name: String,
    duration: f32,
    tracks: Vec<BoneTrack>,
}

#[cfg(feature = "serde-support")]
impl TryFrom<RawAnimation> for Animation {
    type Error = PoseError;

    fn try_from(raw: RawAnimation) -> Result<Self> {
        let mut animation = Self::new(raw.name, raw.duration)?;
        for track in raw.tracks {
            if animation.find_track(track.bone_index).is_some() {
                return Err(PoseError::InvalidTrack(format!(
                    "animation '{}' has more than one track for bone {}",
                    animation.name, track.bone_index
                )));
            }
            animation.tracks.push(track);
        }
        Ok(animation)
    }
}
