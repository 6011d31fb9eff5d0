//! Bone poses, skinning matrices, and skeleton retargeting
//!
//! A [`Pose`] holds per-bone user transforms over a shared [`Skeleton`].
//! From those it derives local and model transforms, skinning matrices,
//! and captures the pose as an [`Animation`]. [`retarget`] transfers the
//! model-space orientations of one pose onto a differently proportioned or
//! differently named skeleton through a [`SkeletonMapping`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use glam::{Quat, Vec3};
//! use maud_pose::{Bone, Pose, Skeleton, SkeletonMapping, Transform, retarget};
//!
//! let source_skeleton = Arc::new(Skeleton::new(vec![
//!     Bone::new("Root", Transform::IDENTITY, None),
//! ])?);
//! let target_skeleton = Arc::new(Skeleton::new(vec![
//!     Bone::new("Hips", Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)), None),
//! ])?);
//!
//! let mut source = Pose::new(source_skeleton);
//! source.set_rotation(0, Quat::from_rotation_y(0.5))?;
//!
//! let mapping = SkeletonMapping::new().with("Hips", "Root");
//! let mut target = Pose::new(target_skeleton);
//! retarget(&mut target, &source, &mapping);
//!
//! assert!(target.model_orientation(0)?.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-5));
//! # Ok::<(), maud_pose::PoseError>(())
//! ```

pub mod animation;
pub mod error;
pub mod mapping;
pub mod pose;
pub mod retarget;
pub mod skeleton;
pub mod skinning;
pub mod transform;

// Re-export common types
pub use animation::{Animation, BoneTrack, QuaternionTween, TweenOptions, VectorTween};
pub use error::{PoseError, Result};
pub use mapping::{BoneMapping, SkeletonMapping};
pub use pose::Pose;
pub use retarget::{RetargetOptions, retarget, retarget_animation, retarget_track};
pub use skeleton::{BindInverse, Bone, Skeleton};
pub use skinning::{SkinningOptions, skin_vertex};
pub use transform::{IdentityTolerance, Transform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
