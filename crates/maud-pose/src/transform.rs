//! Translation/rotation/scale triples for bone poses
//!
//! A [`Transform`] is the unit of state a pose stores per bone. The
//! composition here is the scene-graph rule used for model transforms:
//! rotate the child translation by the parent rotation, scale it by the
//! parent scale, then offset by the parent translation.

use glam::{Mat4, Quat, Vec3};

/// Tolerances used to decide whether a transform is the identity
///
/// Capturing a pose skips bones whose user transform is the identity under
/// these tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct IdentityTolerance {
    /// Maximum length of the translation vector
    pub translation: f32,
    /// Maximum rotation angle away from identity, in radians
    pub rotation: f32,
    /// Maximum deviation of each scale component from 1
    pub scale: f32,
}

impl Default for IdentityTolerance {
    fn default() -> Self {
        Self {
            translation: 1e-5,
            rotation: 1e-5,
            scale: 1e-5,
        }
    }
}

impl IdentityTolerance {
    /// Tolerances that accept only an exact identity
    pub const EXACT: Self = Self {
        translation: 0.0,
        rotation: 0.0,
        scale: 0.0,
    };
}

/// Translation, rotation, and scale applied in that order of precedence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (no translation, no rotation, unit scale)
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Pure translation
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Pure rotation
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Pure scale
    pub const fn from_scale(scale: Vec3) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale,
        }
    }

    /// Apply `parent` on top of this transform
    ///
    /// The result maps from this transform's space into the space `parent`
    /// maps into.
    pub fn combine_with_parent(&self, parent: &Transform) -> Self {
        Self {
            translation: (parent.rotation * self.translation) * parent.scale + parent.translation,
            rotation: parent.rotation * self.rotation,
            scale: parent.scale * self.scale,
        }
    }

    /// Invert this transform so that `self.inverse().combine_with_parent(&self)`
    /// is the identity
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let scale = self.scale.recip();
        Self {
            translation: rotation * (-self.translation * scale),
            rotation,
            scale,
        }
    }

    /// Transform a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (point * self.scale) + self.translation
    }

    /// Convert to a 4x4 matrix (translation * rotation * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Check whether this transform is the identity within `tolerance`
    pub fn is_identity(&self, tolerance: &IdentityTolerance) -> bool {
        if self.translation.length() > tolerance.translation {
            return false;
        }
        if rotation_angle(self.rotation) > tolerance.rotation {
            return false;
        }
        (self.scale - Vec3::ONE)
            .abs()
            .cmple(Vec3::splat(tolerance.scale))
            .all()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rotation angle of a unit quaternion, in radians (0..=PI)
///
/// Uses the vector part rather than `acos(w)`, which loses precision
/// near the identity.
pub fn rotation_angle(rotation: Quat) -> f32 {
    let sin_half = Vec3::new(rotation.x, rotation.y, rotation.z).length();
    2.0 * sin_half.atan2(rotation.w.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-5), "{a:?} != {b:?}");
    }

    #[test]
    fn test_identity_is_identity() {
        assert!(Transform::IDENTITY.is_identity(&IdentityTolerance::EXACT));
        assert!(Transform::default().is_identity(&IdentityTolerance::default()));
    }

    #[test]
    fn test_is_identity_rejects_each_component() {
        let tolerance = IdentityTolerance::default();
        assert!(!Transform::from_translation(Vec3::new(0.0, 0.01, 0.0)).is_identity(&tolerance));
        assert!(!Transform::from_rotation(Quat::from_rotation_x(0.01)).is_identity(&tolerance));
        assert!(!Transform::from_scale(Vec3::new(1.0, 1.0, 1.01)).is_identity(&tolerance));
    }

    #[test]
    fn test_is_identity_accepts_within_tolerance() {
        let tolerance = IdentityTolerance::default();
        let t = Transform::new(
            Vec3::new(1e-7, 0.0, 0.0),
            Quat::from_rotation_y(1e-7),
            Vec3::new(1.0 + 1e-7, 1.0, 1.0),
        );
        assert!(t.is_identity(&tolerance));
        assert!(!t.is_identity(&IdentityTolerance::EXACT));
    }

    #[test]
    fn test_negated_identity_quaternion_is_identity() {
        let t = Transform::from_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, -1.0));
        assert!(t.is_identity(&IdentityTolerance::EXACT));
    }

    #[test]
    fn test_combine_with_parent() {
        let parent = Transform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let child = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));

        let combined = child.combine_with_parent(&parent);
        // (1,0,0) rotated 90 degrees about Z is (0,1,0), doubled, then offset
        assert_vec3_near(combined.translation, Vec3::new(1.0, 2.0, 0.0));
        assert_vec3_near(combined.scale, Vec3::splat(2.0));
        assert!(combined.rotation.abs_diff_eq(parent.rotation, 1e-6));
    }

    #[test]
    fn test_inverse_cancels() {
        let t = Transform::new(
            Vec3::new(3.0, -2.0, 0.5),
            Quat::from_rotation_y(0.7),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let result = t.inverse().combine_with_parent(&t);
        assert!(result.is_identity(&IdentityTolerance {
            translation: 1e-4,
            rotation: 1e-4,
            scale: 1e-4,
        }));
    }

    #[test]
    fn test_to_matrix_matches_transform_point() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_x(0.3),
            Vec3::new(1.0, 2.0, 0.5),
        );
        let p = Vec3::new(0.5, -1.0, 4.0);
        assert_vec3_near(t.to_matrix().transform_point3(p), t.transform_point(p));
    }

    #[test]
    fn test_rotation_angle() {
        assert!((rotation_angle(Quat::from_rotation_z(FRAC_PI_2)) - FRAC_PI_2).abs() < 1e-5);
        assert_eq!(rotation_angle(Quat::IDENTITY), 0.0);
    }
}
