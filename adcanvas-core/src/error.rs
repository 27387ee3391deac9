//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// Interaction-level failures (stale ids, locked layers) are not errors: the
/// editor treats them as no-ops. These variants cover document loading and
/// structural edits, where the caller needs to know why nothing happened.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Two layers in a document share the same id.
    #[error("Duplicate layer id: {0}")]
    DuplicateLayerId(String),

    /// A layer uses the id reserved for the background pseudo-layer.
    #[error("Layer id is reserved: {0}")]
    ReservedLayerId(String),

    /// A layer has an empty id.
    #[error("Layer id must not be empty")]
    EmptyLayerId,

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An inline image payload could not be decoded.
    #[error("Invalid image payload: {0}")]
    InvalidImage(String),
}
