//! Retargeting poses and animations between skeletons
//!
//! Retargeting copies model-space orientations from a source skeleton onto
//! a target skeleton through a [`SkeletonMapping`]. Bones are visited from
//! each root down so every bone sees its ancestors' retargeted rotations.
//! Only rotations transfer; retargeted bones keep identity user translation
//! and scale, so the target's own proportions are preserved.

use std::borrow::Cow;
use std::sync::Arc;

use crate::animation::{Animation, BoneTrack, TweenOptions};
use crate::error::{PoseError, Result};
use crate::mapping::SkeletonMapping;
use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::transform::Transform;

/// Options for [`retarget_animation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct RetargetOptions {
    /// Use the inverse of the supplied mapping
    pub invert_mapping: bool,
    /// Interpolation used when sampling the source animation
    pub tween: TweenOptions,
}

impl Pose {
    /// Pose this skeleton like `source` through `mapping`
    ///
    /// Every bone is reset first. A bone that is unmapped, or whose source
    /// bone does not exist in `source`, stays at identity.
    pub fn set_to_retarget(&mut self, source: &Pose, mapping: &SkeletonMapping) {
        let skeleton = Arc::clone(self.skeleton());

        for index in skeleton.pre_order_indices() {
            self.transforms_mut()[index] = Transform::IDENTITY;

            let name = skeleton.bones()[index].name();
            let Some(bone_mapping) = mapping.get(name) else {
                log::trace!("Bone '{name}' is not mapped");
                continue;
            };
            let Some(source_index) = source.find_bone(bone_mapping.source_name()) else {
                log::warn!(
                    "Bone '{}' mapped to '{}', which is missing from the source skeleton",
                    name,
                    bone_mapping.source_name()
                );
                continue;
            };

            let model_orientation = source.model_orientation_of(source_index);
            let user = self.user_for_model_of(index, model_orientation);
            self.transforms_mut()[index].rotation = (user * bone_mapping.twist()).normalize();
        }
    }
}

/// Pose `target` like `source` through `mapping`
pub fn retarget(target: &mut Pose, source: &Pose, mapping: &SkeletonMapping) {
    target.set_to_retarget(source, mapping);
}

/// Retarget one bone's track
///
/// The result has a keyframe at every time of `source_track`, or a single
/// keyframe at t=0 when the source bone has no track. At each time the
/// whole source skeleton is posed from `source_animation` and the whole
/// target skeleton retargeted, so ancestors are taken into account.
pub fn retarget_track(
    source_animation: &Animation,
    source_track: Option<&BoneTrack>,
    source_skeleton: &Arc<Skeleton>,
    target_skeleton: &Arc<Skeleton>,
    mapping: &SkeletonMapping,
    target_index: usize,
    tween: &TweenOptions,
) -> Result<BoneTrack> {
    PoseError::check_index(target_index, target_skeleton.bone_count())?;

    let times = source_track.map_or(&[0.0][..], BoneTrack::times).to_vec();
    let mut source_pose = Pose::new(Arc::clone(source_skeleton));
    let mut target_pose = Pose::new(Arc::clone(target_skeleton));

    let mut translations = Vec::with_capacity(times.len());
    let mut rotations = Vec::with_capacity(times.len());
    let mut scales = Vec::with_capacity(times.len());

    for &time in &times {
        source_pose.set_to_animation_with(source_animation, time, tween)?;
        target_pose.set_to_retarget(&source_pose, mapping);

        let transform = target_pose.copy_transform(target_index)?;
        translations.push(transform.translation);
        rotations.push(transform.rotation);
        scales.push(transform.scale);
    }

    BoneTrack::new(target_index, times, translations, rotations, Some(scales))
}

/// Retarget a whole animation onto another skeleton
///
/// The result has the source animation's duration and one track for each
/// target bone mapped to a bone that exists in `source_skeleton`.
pub fn retarget_animation(
    source_animation: &Animation,
    source_skeleton: &Arc<Skeleton>,
    target_skeleton: &Arc<Skeleton>,
    mapping: &SkeletonMapping,
    name: impl Into<String>,
    options: &RetargetOptions,
) -> Result<Animation> {
    let mapping = if options.invert_mapping {
        Cow::Owned(mapping.inverse())
    } else {
        Cow::Borrowed(mapping)
    };

    let mut animation = Animation::new(name, source_animation.duration())?;

    for (target_index, bone) in target_skeleton.bones().iter().enumerate() {
        let Some(source_index) = mapping
            .source_bone_name(bone.name())
            .and_then(|source_name| source_skeleton.bone_index(source_name))
        else {
            continue;
        };

        let track = retarget_track(
            source_animation,
            source_animation.find_track(source_index),
            source_skeleton,
            target_skeleton,
            &mapping,
            target_index,
            &options.tween,
        )?;
        animation.add_track(track);
    }

    log::debug!(
        "Retargeted '{}' onto '{}': {} tracks",
        source_animation.name(),
        animation.name(),
        animation.track_count()
    );

    Ok(animation)
}
