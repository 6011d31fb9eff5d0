//! Skinning matrices and vertex deformation
//!
//! [`Pose::skin`] produces one matrix per bone that maps a bind-pose vertex
//! to its posed position. [`skin_vertex`] blends those matrices over a
//! vertex's bone influences.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use glam::Vec3;
//! use maud_pose::{Bone, Pose, Skeleton, Transform};
//! use maud_pose::skinning::{SkinningOptions, skin_vertex};
//!
//! let skeleton = Arc::new(Skeleton::new(vec![Bone::new("root", Transform::IDENTITY, None)])?);
//! let mut pose = Pose::new(skeleton);
//! pose.set_translation(0, Vec3::new(0.0, 1.0, 0.0))?;
//!
//! let matrices = pose.skin();
//! let moved = skin_vertex(&matrices, &[(0, 1.0)], Vec3::ZERO, &SkinningOptions::default());
//! assert!(moved.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
//! # Ok::<(), maud_pose::PoseError>(())
//! ```

use glam::{Mat4, Vec3};

use crate::error::{PoseError, Result};
use crate::pose::Pose;

/// Options for blending bone influences
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SkinningOptions {
    /// Divide the blended position by the total weight used
    pub normalize_weights: bool,
    /// Influences with a weight below this are ignored
    pub weight_threshold: f32,
}

impl Default for SkinningOptions {
    fn default() -> Self {
        Self {
            normalize_weights: true,
            weight_threshold: 0.001,
        }
    }
}

impl Pose {
    /// Skinning matrix for every bone, in bone index order
    ///
    /// The bind pose produces identity matrices.
    pub fn skin(&self) -> Vec<Mat4> {
        let mut matrices = vec![Mat4::IDENTITY; self.count_bones()];
        self.write_skin(&mut matrices);
        matrices
    }

    /// Write skinning matrices into `matrices`
    ///
    /// Fails when `matrices` has fewer entries than there are bones; extra
    /// entries are left untouched.
    pub fn skin_into(&self, matrices: &mut [Mat4]) -> Result<()> {
        if matrices.len() < self.count_bones() {
            return Err(PoseError::InvalidArgument(format!(
                "skinning buffer holds {} matrices but the pose has {} bones",
                matrices.len(),
                self.count_bones()
            )));
        }
        self.write_skin(matrices);
        Ok(())
    }

    fn write_skin(&self, matrices: &mut [Mat4]) {
        let skeleton = self.skeleton();
        for (index, matrix) in matrices.iter_mut().enumerate().take(self.count_bones()) {
            let (Ok(model), Ok(bind_inverse)) =
                (self.model_transform(index), skeleton.bind_inverse(index))
            else {
                continue;
            };

            let scale = model.scale * bind_inverse.scale;
            let rotation = model.rotation * bind_inverse.rotation;
            let translation = rotation * (scale * bind_inverse.translation) + model.translation;
            *matrix = Mat4::from_scale_rotation_translation(scale, rotation, translation);
        }
    }
}

/// Blend a bind-pose position over its bone influences
///
/// `influences` pairs bone indices into `matrices` with weights. Influences
/// below the weight threshold or with an out-of-range bone index are
/// skipped; when none remain the position is returned unchanged.
pub fn skin_vertex(
    matrices: &[Mat4],
    influences: &[(usize, f32)],
    position: Vec3,
    options: &SkinningOptions,
) -> Vec3 {
    let mut final_position = Vec3::ZERO;
    let mut total_weight = 0.0f32;

    for &(bone_index, weight) in influences {
        if weight < options.weight_threshold {
            continue;
        }
        let Some(matrix) = matrices.get(bone_index) else {
            log::trace!("Skipping influence of missing bone {bone_index}");
            continue;
        };

        final_position += matrix.transform_point3(position) * weight;
        total_weight += weight;
    }

    if total_weight < options.weight_threshold {
        return position;
    }

    if options.normalize_weights {
        final_position /= total_weight;
    }

    final_position
}
