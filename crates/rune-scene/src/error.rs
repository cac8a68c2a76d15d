//! Error types for the scene runtime.

use thiserror::Error;

use crate::stage::ObjectId;

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors that can occur while configuring or persisting a scene graph.
///
/// Per-frame component code never returns these; it logs and skips. They
/// surface from validation entry points and from the save store.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A field-path expression is malformed.
    #[error("invalid field path `{path}` at {position}: {reason}")]
    Parse {
        path: String,
        position: usize,
        reason: String,
    },

    /// A field path names an object or segment that does not exist.
    #[error("cannot resolve field path `{path}`")]
    Resolution { path: String },

    /// A value of the wrong kind was written to a typed property.
    #[error("property `{key}` expects {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// A field path ends in a computed value and cannot be written.
    #[error("field path `{path}` is read-only")]
    ReadOnly { path: String },

    /// The addressed object is unknown or already disposed.
    #[error("object {0} does not exist")]
    MissingObject(ObjectId),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Save data could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
