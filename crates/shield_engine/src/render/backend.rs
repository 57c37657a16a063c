//! Backend abstraction for the rendering surface
//!
//! A backend is the drawing context bound to the host container. The surface
//! manager attaches it once at mount, forwards resizes, asks it to draw the
//! scene every frame and releases it on teardown.

use std::any::Any;

use thiserror::Error;

use crate::scene::SceneGraph;

/// Pixel dimensions of a drawable surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    /// Width in device pixels
    pub width: u32,
    /// Height in device pixels
    pub height: u32,
}

impl SurfaceSize {
    /// Create a new size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero
    pub const fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `None` for a degenerate size
    pub fn aspect(&self) -> Option<f32> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }

    /// Number of pixels
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// The host could not provide a drawing context
    #[error("Drawing context unavailable: {0}")]
    ContextUnavailable(String),

    /// Drawing was requested on a zero-sized surface
    #[error("Surface has degenerate size {width}x{height}")]
    DegenerateSurface {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },

    /// The backend was used after release
    #[error("Render surface has been released")]
    Released,

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Main rendering backend trait
pub trait RenderBackend {
    /// Short backend name for logging
    fn name(&self) -> &'static str;

    /// Acquire the drawing context sized to `size`
    ///
    /// Failing here means the visualization cannot start at all.
    fn attach(&mut self, size: SurfaceSize) -> RenderResult<()>;

    /// Resize the drawing context; only called with non-degenerate sizes
    fn resize(&mut self, size: SurfaceSize) -> RenderResult<()>;

    /// Draw one image of the scene through its camera
    fn draw(&mut self, scene: &SceneGraph) -> RenderResult<()>;

    /// Release every resource held by the context; further draws fail
    fn release(&mut self);

    /// Whether the context is attached and not yet released
    fn is_attached(&self) -> bool;

    /// Downcast to the concrete backend type, e.g. to read back pixels
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_aspect() {
        assert_eq!(SurfaceSize::new(800, 600).aspect(), Some(800.0 / 600.0));
        assert_eq!(SurfaceSize::new(0, 600).aspect(), None);
        assert!(SurfaceSize::new(800, 0).is_degenerate());
        assert_eq!(SurfaceSize::new(4, 3).pixel_count(), 12);
    }
}
