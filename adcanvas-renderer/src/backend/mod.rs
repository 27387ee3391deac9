//! Rendering backend implementations.

pub mod svg;
pub mod trace;

use crate::display::DisplayList;
use crate::{BackendType, RenderResult};

/// Trait for rendering backends.
pub trait RenderBackend: Send {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Render a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, frame: &DisplayList) -> RenderResult<()>;

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;
}
