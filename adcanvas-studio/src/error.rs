//! Studio error types.

use std::time::Duration;

use thiserror::Error;

/// Result type for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors reported by a [`GenerationService`](crate::GenerationService).
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The service could not be reached or is overloaded.
    #[error("generation service unavailable: {0}")]
    Unavailable(String),

    /// The service rejected the request (quota, policy, bad prompt).
    #[error("generation request rejected: {0}")]
    Rejected(String),

    /// The service answered with something that is not a design document.
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Returns true if this error is retryable (transient service failures).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors that can occur in the studio host.
#[derive(Debug, Error)]
pub enum StudioError {
    /// The generation call failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The generation call outlived the panic-unlock ceiling.
    #[error("regeneration #{seq} timed out after {}s; canvas unlocked", .after.as_secs())]
    TimedOut {
        /// Sequence number of the abandoned request.
        seq: u64,
        /// Ceiling that elapsed.
        after: Duration,
    },

    /// Document model error.
    #[error(transparent)]
    Canvas(#[from] adcanvas_core::CanvasError),

    /// Rendering or export error.
    #[error(transparent)]
    Render(#[from] adcanvas_renderer::RenderError),

    /// A script step could not be applied.
    #[error("script step {step}: {message}")]
    Script {
        /// Zero-based step index.
        step: usize,
        /// What went wrong.
        message: String,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error outside the document model.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
