//! Bone hierarchies
//!
//! A [`Skeleton`] is an arena of [`Bone`]s addressed by dense indices.
//! Parent and child links are stored as indices, so the hierarchy is cheap
//! to clone and has no reference cycles. Skeletons are immutable once
//! built; poses share them through an `Arc`.

use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::error::{PoseError, Result};
use crate::transform::Transform;

/// A named node of a skeleton with its bind (rest) transform
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    name: String,
    bind: Transform,
    parent: Option<usize>,
    #[cfg_attr(feature = "serde-support", serde(skip))]
    children: Vec<usize>,
}

impl Bone {
    /// Create a bone; children are filled in by [`Skeleton::new`]
    pub fn new(name: impl Into<String>, bind: Transform, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            bind,
            parent,
            children: Vec::new(),
        }
    }

    /// Name of the bone, unique within its skeleton
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind transform in the parent bone's space
    pub fn bind_transform(&self) -> &Transform {
        &self.bind
    }

    /// Parent bone index (`None` for a root)
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Child bone indices in declaration order
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Check whether this bone has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Model-space bind inverse of a bone, used to build skinning matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindInverse {
    /// Negated model-space bind translation
    pub translation: Vec3,
    /// Inverse of the model-space bind rotation
    pub rotation: Quat,
    /// Reciprocal of the model-space bind scale
    pub scale: Vec3,
}

/// Tree (or forest) of bones
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    roots: Vec<usize>,
    name_index: HashMap<String, usize>,
    model_bind: Vec<Transform>,
    bind_inverse: Vec<BindInverse>,
}

impl Skeleton {
    /// Build a skeleton from bones whose parent links are indices into `bones`
    ///
    /// Fails if a name repeats, a bind scale component is not positive, a
    /// parent index is out of range or points at the bone itself, or the
    /// parent links contain a cycle.
    pub fn new(mut bones: Vec<Bone>) -> Result<Self> {
        let count = bones.len();

        let mut name_index = HashMap::with_capacity(count);
        for (index, bone) in bones.iter().enumerate() {
            if name_index.insert(bone.name.clone(), index).is_some() {
                return Err(PoseError::InvalidSkeleton(format!(
                    "duplicate bone name '{}'",
                    bone.name
                )));
            }
            let scale = bone.bind.scale;
            for (axis, value) in [('x', scale.x), ('y', scale.y), ('z', scale.z)] {
                if !(value > 0.0) {
                    return Err(PoseError::InvalidSkeleton(format!(
                        "bone '{}' has {axis} bind scale {value}, which is not positive",
                        bone.name
                    )));
                }
            }
            if let Some(parent) = bone.parent {
                if parent >= count {
                    return Err(PoseError::InvalidSkeleton(format!(
                        "bone '{}' has parent index {} but there are only {} bones",
                        bone.name, parent, count
                    )));
                }
                if parent == index {
                    return Err(PoseError::InvalidSkeleton(format!(
                        "bone '{}' is its own parent",
                        bone.name
                    )));
                }
            }
        }

        // Every chain must reach a root within `count` steps
        for (index, bone) in bones.iter().enumerate() {
            let mut current = bone.parent;
            let mut steps = 0;
            while let Some(parent) = current {
                steps += 1;
                if steps > count {
                    return Err(PoseError::InvalidSkeleton(format!(
                        "cycle in parent links through bone {index} ('{}')",
                        bone.name
                    )));
                }
                current = bones[parent].parent;
            }
        }

        for bone in &mut bones {
            bone.children.clear();
        }
        let mut roots = Vec::new();
        for index in 0..count {
            let parent = bones[index].parent;
            match parent {
                Some(parent) => bones[parent].children.push(index),
                None => roots.push(index),
            }
        }

        let mut skeleton = Self {
            bones,
            roots,
            name_index,
            model_bind: vec![Transform::IDENTITY; count],
            bind_inverse: Vec::with_capacity(count),
        };
        skeleton.compute_bind_inverses();

        log::debug!(
            "Built skeleton with {} bones and {} roots",
            count,
            skeleton.roots.len()
        );

        Ok(skeleton)
    }

    fn compute_bind_inverses(&mut self) {
        for index in self.pre_order_indices() {
            let bone = &self.bones[index];
            self.model_bind[index] = match bone.parent {
                Some(parent) => bone.bind.combine_with_parent(&self.model_bind[parent]),
                None => bone.bind,
            };
        }

        self.bind_inverse = self
            .model_bind
            .iter()
            .map(|model| BindInverse {
                translation: -model.translation,
                rotation: model.rotation.inverse(),
                scale: model.scale.recip(),
            })
            .collect();
    }

    /// Number of bones
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Check whether the skeleton has no bones
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bone at `index`
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// All bones in index order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Index of the bone called `name`
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Root bone indices in index order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Parent of the bone at `index`
    pub fn parent(&self, index: usize) -> Result<Option<usize>> {
        Ok(self.checked_bone(index)?.parent)
    }

    /// Children of the bone at `index`
    pub fn children(&self, index: usize) -> Result<&[usize]> {
        Ok(self.checked_bone(index)?.children())
    }

    /// Every bone index, parents before children
    ///
    /// Roots are visited in index order and each subtree depth-first in
    /// child order.
    pub fn pre_order_indices(&self) -> Vec<usize> {
        let mut result = Vec::with_capacity(self.bones.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            result.push(index);
            stack.extend(self.bones[index].children.iter().rev());
        }
        result
    }

    /// Bind transform of the bone in model space
    pub fn model_bind_transform(&self, index: usize) -> Result<&Transform> {
        PoseError::check_index(index, self.bones.len())?;
        Ok(&self.model_bind[index])
    }

    /// Model-space bind inverse of the bone
    pub fn bind_inverse(&self, index: usize) -> Result<&BindInverse> {
        PoseError::check_index(index, self.bones.len())?;
        Ok(&self.bind_inverse[index])
    }

    pub(crate) fn checked_bone(&self, index: usize) -> Result<&Bone> {
        self.bones
            .get(index)
            .ok_or(PoseError::BoneIndexOutOfRange {
                index,
                count: self.bones.len(),
            })
    }
}
