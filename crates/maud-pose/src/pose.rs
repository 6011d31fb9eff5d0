//! Per-bone user transforms over a shared skeleton
//!
//! A [`Pose`] stores one user transform per bone. The user transform is
//! applied on top of the bone's bind transform to give its local transform;
//! local transforms composed up the parent chain give model transforms.
//!
//! Local transforms add the user translation to the bind translation rather
//! than rotating it into the bind frame. Editing tools rely on this: moving a
//! bone along X moves it along the parent's X regardless of bind rotation.

use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::{Animation, BoneTrack, TweenOptions};
use crate::error::{PoseError, Result};
use crate::skeleton::Skeleton;
use crate::transform::{IdentityTolerance, Transform};

/// User transforms for every bone of a skeleton
#[derive(Debug, Clone)]
pub struct Pose {
    skeleton: Arc<Skeleton>,
    transforms: Vec<Transform>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::empty()
    }
}

fn check_scale(scale: Vec3) -> Result<()> {
    for (axis, value) in [('x', scale.x), ('y', scale.y), ('z', scale.z)] {
        if !(value > 0.0) {
            return Err(PoseError::NonPositiveScale { axis, value });
        }
    }
    Ok(())
}

impl Pose {
    /// Create a pose in bind pose (identity user transforms)
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        let transforms = vec![Transform::IDENTITY; skeleton.bone_count()];
        Self {
            skeleton,
            transforms,
        }
    }

    /// Pose with no skeleton and no bones
    pub fn empty() -> Self {
        Self::new(Arc::new(Skeleton::default()))
    }

    /// Skeleton this pose is bound to
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    /// Number of bones
    pub fn count_bones(&self) -> usize {
        self.transforms.len()
    }

    /// Index of the bone called `name`
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.skeleton.bone_index(name)
    }

    /// Root bone indices in index order
    pub fn root_bone_indices(&self) -> &[usize] {
        self.skeleton.roots()
    }

    /// Bone indices with parents before children
    pub fn pre_order_indices(&self) -> Vec<usize> {
        self.skeleton.pre_order_indices()
    }

    fn check(&self, index: usize) -> Result<()> {
        PoseError::check_index(index, self.transforms.len())
    }

    /// Copy of the user transform of a bone
    pub fn copy_transform(&self, index: usize) -> Result<Transform> {
        self.check(index)?;
        Ok(self.transforms[index])
    }

    /// Same as [`copy_transform`](Self::copy_transform)
    pub fn user_transform(&self, index: usize) -> Result<Transform> {
        self.copy_transform(index)
    }

    /// User translation of a bone
    pub fn user_translation(&self, index: usize) -> Result<Vec3> {
        Ok(self.copy_transform(index)?.translation)
    }

    /// User rotation of a bone
    pub fn user_rotation(&self, index: usize) -> Result<Quat> {
        Ok(self.copy_transform(index)?.rotation)
    }

    /// User scale of a bone
    pub fn user_scale(&self, index: usize) -> Result<Vec3> {
        Ok(self.copy_transform(index)?.scale)
    }

    /// Overwrite the whole user transform of a bone
    pub fn set(&mut self, index: usize, transform: Transform) -> Result<()> {
        self.check(index)?;
        check_scale(transform.scale)?;
        self.transforms[index] = transform;
        Ok(())
    }

    /// Set the user translation, keeping rotation and scale
    pub fn set_translation(&mut self, index: usize, translation: Vec3) -> Result<()> {
        self.check(index)?;
        self.transforms[index].translation = translation;
        Ok(())
    }

    /// Set the user rotation, keeping translation and scale
    pub fn set_rotation(&mut self, index: usize, rotation: Quat) -> Result<()> {
        self.check(index)?;
        self.transforms[index].rotation = rotation;
        Ok(())
    }

    /// Set the user scale; every component must be positive
    pub fn set_scale(&mut self, index: usize, scale: Vec3) -> Result<()> {
        self.check(index)?;
        check_scale(scale)?;
        self.transforms[index].scale = scale;
        Ok(())
    }

    /// Reset the user translation to zero
    pub fn reset_translation(&mut self, index: usize) -> Result<()> {
        self.set_translation(index, Vec3::ZERO)
    }

    /// Reset the user rotation to identity
    pub fn reset_rotation(&mut self, index: usize) -> Result<()> {
        self.set_rotation(index, Quat::IDENTITY)
    }

    /// Reset the user scale to one
    pub fn reset_scale(&mut self, index: usize) -> Result<()> {
        self.set_scale(index, Vec3::ONE)
    }

    /// Bind transform of a bone, in its parent's space
    pub fn bind_transform(&self, index: usize) -> Result<Transform> {
        self.check(index)?;
        Ok(*self.skeleton.checked_bone(index)?.bind_transform())
    }

    /// Bind rotation followed by user rotation
    pub fn local_rotation(&self, index: usize) -> Result<Quat> {
        self.check(index)?;
        Ok(self.local_rotation_of(index))
    }

    /// Local transform of a bone: the user transform applied to the bind
    /// transform, with translations added
    pub fn local_transform(&self, index: usize) -> Result<Transform> {
        self.check(index)?;
        Ok(self.local_transform_of(index))
    }

    /// Transform of a bone in model space
    ///
    /// Recomputed from the whole parent chain on every call.
    pub fn model_transform(&self, index: usize) -> Result<Transform> {
        self.check(index)?;
        let mut chain = self.ancestor_chain(index).into_iter();
        let mut model = match chain.next() {
            Some(root) => self.local_transform_of(root),
            None => return Ok(Transform::IDENTITY),
        };
        for bone in chain {
            model = self.local_transform_of(bone).combine_with_parent(&model);
        }
        Ok(model)
    }

    /// Model-space position of a bone
    pub fn model_location(&self, index: usize) -> Result<Vec3> {
        Ok(self.model_transform(index)?.translation)
    }

    /// Model-space orientation of a bone
    pub fn model_orientation(&self, index: usize) -> Result<Quat> {
        self.check(index)?;
        Ok(self.model_orientation_of(index))
    }

    /// User rotation that gives a bone the requested model orientation
    ///
    /// Ancestors keep their current rotations.
    pub fn user_for_model(&self, index: usize, model_orientation: Quat) -> Result<Quat> {
        self.check(index)?;
        Ok(self.user_for_model_of(index, model_orientation))
    }

    /// Reset every user transform to identity
    pub fn set_to_bind(&mut self) {
        self.transforms.fill(Transform::IDENTITY);
    }

    /// Bind this pose to another skeleton, in bind pose
    pub fn reset_to_bind(&mut self, skeleton: Arc<Skeleton>) {
        self.transforms.clear();
        self.transforms
            .resize(skeleton.bone_count(), Transform::IDENTITY);
        self.skeleton = skeleton;
    }

    /// Capture the pose as a zero-duration animation
    ///
    /// Bones whose user transform is the identity under the default
    /// [`IdentityTolerance`] get no track.
    pub fn capture(&self, name: impl Into<String>) -> Animation {
        self.capture_with_tolerance(name, &IdentityTolerance::default())
    }

    /// Capture the pose, omitting bones that are the identity under `tolerance`
    pub fn capture_with_tolerance(
        &self,
        name: impl Into<String>,
        tolerance: &IdentityTolerance,
    ) -> Animation {
        let mut animation = Animation::still(name);
        for (index, transform) in self.transforms.iter().enumerate() {
            if !transform.is_identity(tolerance) {
                animation.add_track(BoneTrack::single_keyframe(index, transform));
            }
        }

        log::debug!(
            "Captured {} of {} bones into '{}'",
            animation.track_count(),
            self.transforms.len(),
            animation.name()
        );
        animation
    }

    /// Pose every bone from `animation` at `time` using default tweening
    pub fn set_to_animation(&mut self, animation: &Animation, time: f32) -> Result<()> {
        self.set_to_animation_with(animation, time, &TweenOptions::default())
    }

    /// Pose every bone from `animation` at `time`
    ///
    /// Bones without a track return to identity. `time` is clamped to the
    /// animation's duration.
    pub fn set_to_animation_with(
        &mut self,
        animation: &Animation,
        time: f32,
        options: &TweenOptions,
    ) -> Result<()> {
        if time.is_nan() {
            return Err(PoseError::InvalidArgument(
                "animation time is NaN".to_string(),
            ));
        }
        let time = time.clamp(0.0, animation.duration());

        self.set_to_bind();
        for track in animation.tracks() {
            match self.transforms.get_mut(track.bone_index()) {
                Some(transform) => *transform = track.sample(time, animation.duration(), options),
                None => log::debug!(
                    "Ignoring track for bone {} in '{}': pose has {} bones",
                    track.bone_index(),
                    animation.name(),
                    self.transforms.len()
                ),
            }
        }
        Ok(())
    }

    fn local_rotation_of(&self, index: usize) -> Quat {
        self.skeleton.bones()[index].bind_transform().rotation * self.transforms[index].rotation
    }

    fn local_transform_of(&self, index: usize) -> Transform {
        let bind = self.skeleton.bones()[index].bind_transform();
        let user = &self.transforms[index];
        Transform {
            translation: bind.translation + user.translation,
            rotation: bind.rotation * user.rotation,
            scale: bind.scale * user.scale,
        }
    }

    pub(crate) fn model_orientation_of(&self, index: usize) -> Quat {
        self.ancestor_chain(index)
            .into_iter()
            .fold(Quat::IDENTITY, |parent, bone| {
                parent * self.local_rotation_of(bone)
            })
    }

    pub(crate) fn user_for_model_of(&self, index: usize, model_orientation: Quat) -> Quat {
        let bone = &self.skeleton.bones()[index];
        let local = match bone.parent() {
            Some(parent) => self.model_orientation_of(parent).inverse() * model_orientation,
            None => model_orientation,
        };
        bone.bind_transform().rotation.inverse() * local
    }

    /// Path from the bone's root down to the bone itself
    fn ancestor_chain(&self, index: usize) -> Vec<usize> {
        let bones = self.skeleton.bones();
        let mut chain = vec![index];
        let mut current = bones[index].parent();
        while let Some(parent) = current {
            chain.push(parent);
            current = bones[parent].parent();
        }
        chain.reverse();
        chain
    }

    pub(crate) fn transforms_mut(&mut self) -> &mut [Transform] {
        &mut self.transforms
    }
}
