use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Quat, Vec3};
use maud_pose::{
    Animation, Bone, BoneTrack, Pose, RetargetOptions, Skeleton, SkeletonMapping, Transform,
    retarget_animation,
};
use std::hint::black_box;
use std::sync::Arc;

/// Binary tree of bones, `depth` levels deep
fn create_test_skeleton(prefix: &str, depth: u32) -> Arc<Skeleton> {
    let mut bones = vec![Bone::new(format!("{prefix}0"), Transform::IDENTITY, None)];
    let mut level = vec![0usize];
    for _ in 1..depth {
        let mut next = Vec::new();
        for &parent in &level {
            for side in [-1.0f32, 1.0] {
                let index = bones.len();
                bones.push(Bone::new(
                    format!("{prefix}{index}"),
                    Transform::new(
                        Vec3::new(0.3 * side, 1.0, 0.0),
                        Quat::from_rotation_z(0.1 * side),
                        Vec3::ONE,
                    ),
                    Some(parent),
                ));
                next.push(index);
            }
        }
        level = next;
    }
    Arc::new(Skeleton::new(bones).unwrap())
}

fn create_test_mapping(count: usize) -> SkeletonMapping {
    (0..count)
        .map(|index| (format!("target{index}"), format!("source{index}"), Quat::IDENTITY))
        .collect()
}

fn posed(skeleton: &Arc<Skeleton>) -> Pose {
    let mut pose = Pose::new(Arc::clone(skeleton));
    for index in 0..pose.count_bones() {
        pose.set_rotation(index, Quat::from_rotation_x(0.01 * index as f32))
            .unwrap();
    }
    pose
}

fn bench_skin(c: &mut Criterion) {
    let skeleton = create_test_skeleton("source", 7);
    let pose = posed(&skeleton);
    let mut matrices = vec![glam::Mat4::IDENTITY; pose.count_bones()];

    c.bench_function("skin_127_bones", |b| {
        b.iter(|| pose.skin_into(black_box(&mut matrices)).unwrap())
    });
}

fn bench_retarget(c: &mut Criterion) {
    let source_skeleton = create_test_skeleton("source", 7);
    let target_skeleton = create_test_skeleton("target", 7);
    let source = posed(&source_skeleton);
    let mapping = create_test_mapping(source_skeleton.bone_count());
    let mut target = Pose::new(target_skeleton);

    c.bench_function("retarget_127_bones", |b| {
        b.iter(|| target.set_to_retarget(black_box(&source), &mapping))
    });
}

fn bench_retarget_animation(c: &mut Criterion) {
    let source_skeleton = create_test_skeleton("source", 5);
    let target_skeleton = create_test_skeleton("target", 5);
    let mapping = create_test_mapping(source_skeleton.bone_count());

    let mut animation = Animation::new("bench", 1.0).unwrap();
    for bone in 0..source_skeleton.bone_count() {
        let times: Vec<f32> = (0..=10).map(|frame| frame as f32 / 10.0).collect();
        let rotations = times
            .iter()
            .map(|&time| Quat::from_rotation_y(time + bone as f32 * 0.05))
            .collect();
        animation.add_track(
            BoneTrack::new(bone, times, vec![Vec3::ZERO; 11], rotations, None).unwrap(),
        );
    }

    c.bench_function("retarget_animation_31_bones", |b| {
        b.iter(|| {
            retarget_animation(
                black_box(&animation),
                &source_skeleton,
                &target_skeleton,
                &mapping,
                "retargeted",
                &RetargetOptions::default(),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_skin, bench_retarget, bench_retarget_animation);
criterion_main!(benches);
