use thiserror::Error;

/// Error types for pose editing and retargeting
///
/// Every variant is a precondition violation: a caller passed an argument
/// outside the documented domain. None of them are retried or recovered
/// inside the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    /// Bone index outside `[0, count)`
    #[error("Invalid argument: bone index {index} out of range (bone count {count})")]
    BoneIndexOutOfRange { index: usize, count: usize },

    /// Scale component that is zero, negative, or NaN
    #[error("Invalid argument: {axis} scale must be positive, got {value}")]
    NonPositiveScale { axis: char, value: f32 },

    /// Bone list that does not form a valid forest
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    /// Keyframe data with mismatched lengths or unordered times
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// Any other out-of-domain argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl PoseError {
    /// Check that `index` addresses one of `count` bones
    pub(crate) fn check_index(index: usize, count: usize) -> Result<()> {
        if index < count {
            Ok(())
        } else {
            Err(Self::BoneIndexOutOfRange { index, count })
        }
    }
}

/// Result type using PoseError
pub type Result<T> = std::result::Result<T, PoseError>;
