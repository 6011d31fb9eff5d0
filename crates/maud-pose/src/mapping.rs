//! Bone name mappings between two skeletons
//!
//! A [`SkeletonMapping`] tells the retargeter which source bone drives each
//! target bone, and with what twist correction. Entries are keyed by target
//! bone name and iterate in name order.

use std::collections::BTreeMap;

use glam::Quat;

/// Source bone and twist correction for one target bone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneMapping {
    source_name: String,
    twist: Quat,
}

impl BoneMapping {
    /// Create a mapping from `source_name` with the given twist
    pub fn new(source_name: impl Into<String>, twist: Quat) -> Self {
        Self {
            source_name: source_name.into(),
            twist,
        }
    }

    /// Name of the source bone
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Rotation applied after the retargeted user rotation
    pub fn twist(&self) -> Quat {
        self.twist
    }

    /// Replace the twist correction
    pub fn set_twist(&mut self, twist: Quat) {
        self.twist = twist;
    }
}

/// Target bone name to [`BoneMapping`]
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SkeletonMapping {
    entries: BTreeMap<String, BoneMapping>,
}

impl SkeletonMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `target` to `source`, replacing any existing entry for `target`
    pub fn map(&mut self, target: impl Into<String>, source: impl Into<String>, twist: Quat) {
        self.entries
            .insert(target.into(), BoneMapping::new(source, twist));
    }

    /// Builder form of [`map`](Self::map) with no twist
    pub fn with(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.map(target, source, Quat::IDENTITY);
        self
    }

    /// Entry for the target bone named `target`
    pub fn get(&self, target: &str) -> Option<&BoneMapping> {
        self.entries.get(target)
    }

    /// Mutable entry for the target bone named `target`
    pub fn get_mut(&mut self, target: &str) -> Option<&mut BoneMapping> {
        self.entries.get_mut(target)
    }

    /// First entry (in target name order) driven by `source`
    pub fn get_for_source(&self, source: &str) -> Option<(&str, &BoneMapping)> {
        self.entries
            .iter()
            .find(|(_, mapping)| mapping.source_name == source)
            .map(|(target, mapping)| (target.as_str(), mapping))
    }

    /// Remove the entry for `target`, returning it
    pub fn unmap(&mut self, target: &str) -> Option<BoneMapping> {
        self.entries.remove(target)
    }

    /// Check whether `target` has an entry
    pub fn contains_target(&self, target: &str) -> bool {
        self.entries.contains_key(target)
    }

    /// Name of the source bone driving `target`
    pub fn source_bone_name(&self, target: &str) -> Option<&str> {
        self.get(target).map(BoneMapping::source_name)
    }

    /// Name of the first target bone driven by `source`
    pub fn target_bone_name(&self, source: &str) -> Option<&str> {
        self.get_for_source(source).map(|(target, _)| target)
    }

    /// Number of mapped target bones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether nothing is mapped
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as `(target name, mapping)` in target name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneMapping)> {
        self.entries
            .iter()
            .map(|(target, mapping)| (target.as_str(), mapping))
    }

    /// Mapping in the opposite direction
    ///
    /// Source and target names swap and each twist is inverted. When several
    /// targets share a source bone, the first target in name order wins.
    pub fn inverse(&self) -> Self {
        let mut entries = BTreeMap::new();
        for (target, mapping) in &self.entries {
            entries
                .entry(mapping.source_name.clone())
                .or_insert_with(|| BoneMapping::new(target.clone(), mapping.twist.inverse()));
        }
        Self { entries }
    }
}

impl<T, S> FromIterator<(T, S, Quat)> for SkeletonMapping
where
    T: Into<String>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, S, Quat)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (target, source, twist) in iter {
            mapping.map(target, source, twist);
        }
        mapping
    }
}
