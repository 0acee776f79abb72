//! Error types for scene graph operations

use crate::scene::ObjectId;

/// Errors reported by recoverable scene graph operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// An object was reached again while it was still being cloned
    #[error("Cyclic graph detected while cloning object {0}")]
    CyclicGraph(ObjectId),

    /// A child index was outside the group's child list
    #[error("Child index {index} out of range (group has {len} children)")]
    ChildIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of children at the time of the call
        len: usize,
    },

    /// An image was requested with an unsupported component count
    #[error("Invalid image component count: {0} (expected 1-4)")]
    InvalidImageComponents(u32),
}

/// Result type for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;
