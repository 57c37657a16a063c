//! Render surface management
//!
//! Owns the backend for one mounted session and keeps its size and the camera
//! aspect in step with the host container.

use crate::render::backend::{RenderBackend, RenderError, RenderResult, SurfaceSize};
use crate::render::primitives::Camera;
use crate::scene::SceneGraph;

/// A backend bound to a host container
pub struct RenderSurface {
    backend: Box<dyn RenderBackend>,
    size: SurfaceSize,
    released: bool,
}

impl RenderSurface {
    /// Attach `backend` at the container's current size
    ///
    /// A degenerate size is accepted: the surface exists but is not drawable
    /// until a valid resize arrives.
    pub fn attach(mut backend: Box<dyn RenderBackend>, size: SurfaceSize) -> RenderResult<Self> {
        backend.attach(size)?;
        if size.is_degenerate() {
            log::warn!(
                "{} surface attached with degenerate size {}x{}; drawing deferred",
                backend.name(),
                size.width,
                size.height
            );
        }
        Ok(Self { backend, size, released: false })
    }

    /// Current drawing-buffer size
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Whether a draw would produce an image
    pub fn is_drawable(&self) -> bool {
        !self.released && !self.size.is_degenerate()
    }

    /// Whether `release` has run
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Match the buffer to `size` and update the camera aspect
    ///
    /// Returns `Ok(false)` without touching anything when `size` is degenerate,
    /// so the last valid size and aspect stay in effect.
    pub fn resize(&mut self, size: SurfaceSize, camera: &mut Camera) -> RenderResult<bool> {
        if self.released {
            return Err(RenderError::Released);
        }
        let Some(aspect) = size.aspect() else {
            log::warn!("Ignoring resize to degenerate size {}x{}", size.width, size.height);
            return Ok(false);
        };

        self.backend.resize(size)?;
        camera.set_aspect_ratio(aspect);
        self.size = size;
        log::debug!("Surface resized to {}x{}", size.width, size.height);
        Ok(true)
    }

    /// Draw one frame and mark the particle buffer consumed
    pub fn draw(&mut self, scene: &mut SceneGraph) -> RenderResult<()> {
        if self.released {
            return Err(RenderError::Released);
        }
        if self.size.is_degenerate() {
            return Err(RenderError::DegenerateSurface {
                width: self.size.width,
                height: self.size.height,
            });
        }
        self.backend.draw(scene)?;
        scene.particles_mut().mark_clean();
        Ok(())
    }

    /// Release the backend; later calls are no-ops
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.backend.release();
        self.released = true;
        log::info!("{} surface released", self.backend.name());
    }

    /// The underlying backend
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VisualizationConfig;
    use crate::test_support::{CountingBackend, FailingBackend};
    use approx::assert_relative_eq;

    fn small_scene(size: SurfaceSize) -> SceneGraph {
        SceneGraph::new(&VisualizationConfig::default().with_seed(1).with_particle_count(8), size)
    }

    #[test]
    fn test_attach_failure_propagates() {
        let result = RenderSurface::attach(Box::new(FailingBackend), SurfaceSize::new(10, 10));
        assert!(matches!(result, Err(RenderError::ContextUnavailable(_))));
    }

    #[test]
    fn test_resize_updates_camera_and_ignores_zero() {
        let (backend, probe) = CountingBackend::new();
        let size = SurfaceSize::new(800, 600);
        let mut surface = RenderSurface::attach(Box::new(backend), size).unwrap();
        let mut scene = small_scene(size);

        assert!(surface.resize(SurfaceSize::new(1000, 500), scene.camera_mut()).unwrap());
        assert_relative_eq!(scene.camera().aspect, 2.0);

        assert!(!surface.resize(SurfaceSize::new(0, 500), scene.camera_mut()).unwrap());
        assert_relative_eq!(scene.camera().aspect, 2.0);
        assert_eq!(surface.size(), SurfaceSize::new(1000, 500));
        assert_eq!(probe.resizes(), vec![SurfaceSize::new(1000, 500)]);
    }

    #[test]
    fn test_draw_marks_particles_clean() {
        let (backend, probe) = CountingBackend::new();
        let size = SurfaceSize::new(4, 4);
        let mut surface = RenderSurface::attach(Box::new(backend), size).unwrap();
        let mut scene = small_scene(size);

        assert!(scene.particles().is_dirty());
        surface.draw(&mut scene).unwrap();
        assert!(!scene.particles().is_dirty());
        assert_eq!(probe.draws(), 1);
    }

    #[test]
    fn test_release_is_idempotent_and_blocks_draws() {
        let (backend, probe) = CountingBackend::new();
        let size = SurfaceSize::new(4, 4);
        let mut surface = RenderSurface::attach(Box::new(backend), size).unwrap();
        let mut scene = small_scene(size);

        surface.release();
        surface.release();
        assert_eq!(probe.releases(), 1);
        assert!(!surface.is_drawable());
        assert!(matches!(surface.draw(&mut scene), Err(RenderError::Released)));
    }

    #[test]
    fn test_drop_releases_once() {
        let (backend, probe) = CountingBackend::new();
        let mut surface = RenderSurface::attach(Box::new(backend), SurfaceSize::new(4, 4)).unwrap();
        surface.release();
        drop(surface);
        assert_eq!(probe.releases(), 1);
    }

    #[test]
    fn test_degenerate_attach_is_not_drawable() {
        let (backend, _probe) = CountingBackend::new();
        let surface = RenderSurface::attach(Box::new(backend), SurfaceSize::new(0, 0)).unwrap();
        assert!(!surface.is_drawable());
    }
}
