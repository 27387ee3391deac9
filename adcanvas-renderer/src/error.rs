//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested backend is not compiled in.
    #[error("No rendering backend available: {0}")]
    NoBackend(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Rendering frame failed.
    #[error("Frame render failed: {0}")]
    Frame(String),

    /// Export failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Image reference could not be decoded.
    #[error(transparent)]
    Canvas(#[from] adcanvas_core::CanvasError),
}
