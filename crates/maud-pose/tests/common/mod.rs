//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;

use glam::{Quat, Vec3};
use maud_pose::{Bone, Skeleton, Transform};

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a skeleton from `(name, parent, bind)` triples
pub fn skeleton(bones: &[(&str, Option<usize>, Transform)]) -> Arc<Skeleton> {
    let bones = bones
        .iter()
        .map(|(name, parent, bind)| Bone::new(*name, *bind, *parent))
        .collect();
    Arc::new(Skeleton::new(bones).expect("Failed to build test skeleton"))
}

/// Humanoid-ish source rig: Root > Spine > Head, Root > Leg
pub fn source_rig() -> Arc<Skeleton> {
    skeleton(&[
        ("Root", None, Transform::IDENTITY),
        (
            "Spine",
            Some(0),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        ),
        (
            "Head",
            Some(1),
            Transform::from_translation(Vec3::new(0.0, 0.6, 0.0)),
        ),
        (
            "Leg",
            Some(0),
            Transform::new(
                Vec3::new(0.2, -0.1, 0.0),
                Quat::from_rotation_z(std::f32::consts::PI),
                Vec3::ONE,
            ),
        ),
    ])
}

/// Differently named and proportioned target rig with rotated binds
pub fn target_rig() -> Arc<Skeleton> {
    skeleton(&[
        (
            "Hips",
            None,
            Transform::from_translation(Vec3::new(0.0, 0.9, 0.0)),
        ),
        (
            "Chest",
            Some(0),
            Transform::new(
                Vec3::new(0.0, 1.4, 0.0),
                Quat::from_rotation_y(0.4),
                Vec3::ONE,
            ),
        ),
        (
            "Skull",
            Some(1),
            Transform::new(
                Vec3::new(0.0, 0.8, 0.1),
                Quat::from_rotation_x(-0.2),
                Vec3::splat(1.1),
            ),
        ),
        (
            "Thigh",
            Some(0),
            Transform::from_rotation(Quat::from_rotation_x(0.3)),
        ),
        ("Tail", Some(0), Transform::IDENTITY),
    ])
}

/// Assert two quaternions describe the same rotation
pub fn assert_same_rotation(actual: Quat, expected: Quat, epsilon: f32) {
    let aligned = if actual.dot(expected) < 0.0 {
        -actual
    } else {
        actual
    };
    assert!(
        aligned.abs_diff_eq(expected, epsilon),
        "rotation {actual:?} differs from {expected:?}"
    );
}
