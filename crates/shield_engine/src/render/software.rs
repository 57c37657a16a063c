//! CPU rasterizer backend
//!
//! Draws the scene into an RGBA float buffer with a depth buffer:
//!
//! 1. Clear to the lighting clear color and alpha
//! 2. Shield: flat-shaded, back-face culled, depth-tested and depth-written
//! 3. Wireframe: unique mesh edges, depth-tested but not depth-written
//! 4. Particles: square sprites, depth-tested but not depth-written
//!
//! Every layer is alpha blended over what is already in the buffer and fogged
//! by view depth. Primitives with any vertex at or behind the near plane are
//! skipped rather than clipped.

use std::any::Any;
use std::path::Path;

use image::RgbaImage;

use crate::foundation::math::{Mat4, Point3, Vec3, Vec4};
use crate::render::backend::{RenderBackend, RenderError, RenderResult, SurfaceSize};
use crate::render::lighting::LightingEnvironment;
use crate::render::material::Material;
use crate::render::primitives::Camera;
use crate::scene::{MeshEntity, SceneGraph};
use crate::sim::ParticleField;

/// Default allocation budget: one 8K frame
pub const DEFAULT_MAX_PIXELS: usize = 8192 * 8192;

/// Depth tolerance for coplanar wireframe and sprite tests
const DEPTH_BIAS: f32 = 1.0e-4;

/// A vertex after projection to screen space
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    view_depth: f32,
}

/// Software rendering backend
pub struct SoftwareBackend {
    size: SurfaceSize,
    color: Vec<[f32; 4]>,
    depth: Vec<f32>,
    attached: bool,
    max_pixels: usize,
    frames_drawn: u64,
}

impl SoftwareBackend {
    /// Create a detached backend with the default pixel budget
    pub fn new() -> Self {
        Self::with_max_pixels(DEFAULT_MAX_PIXELS)
    }

    /// Create a detached backend that refuses surfaces larger than `max_pixels`
    pub fn with_max_pixels(max_pixels: usize) -> Self {
        Self {
            size: SurfaceSize::default(),
            color: Vec::new(),
            depth: Vec::new(),
            attached: false,
            max_pixels,
            frames_drawn: 0,
        }
    }

    /// Current buffer size
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Number of completed draws
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Read one pixel as 8-bit RGBA
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let index = y as usize * self.size.width as usize + x as usize;
        self.color.get(index).map(|px| quantize(*px))
    }

    /// Copy the color buffer into an image
    pub fn to_image(&self) -> RenderResult<RgbaImage> {
        if !self.attached {
            return Err(RenderError::Released);
        }
        if self.size.is_degenerate() {
            return Err(RenderError::DegenerateSurface {
                width: self.size.width,
                height: self.size.height,
            });
        }

        let pixels: Vec<[u8; 4]> = self.color.iter().map(|px| quantize(*px)).collect();
        let bytes: &[u8] = bytemuck::cast_slice(&pixels);
        RgbaImage::from_raw(self.size.width, self.size.height, bytes.to_vec())
            .ok_or_else(|| RenderError::Backend("color buffer does not match surface size".to_string()))
    }

    /// Write the color buffer to a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let path = path.as_ref();
        self.to_image()?
            .save(path)
            .map_err(|e| RenderError::Backend(format!("failed to write {}: {}", path.display(), e)))?;
        log::debug!("Saved frame to {}", path.display());
        Ok(())
    }

    fn allocate(&mut self, size: SurfaceSize) -> RenderResult<()> {
        let count = size.pixel_count();
        if count > self.max_pixels {
            return Err(RenderError::ContextUnavailable(format!(
                "{}x{} exceeds the {} pixel budget",
                size.width, size.height, self.max_pixels
            )));
        }

        let mut color = Vec::new();
        let mut depth = Vec::new();
        color
            .try_reserve_exact(count)
            .and_then(|()| depth.try_reserve_exact(count))
            .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?;
        color.resize(count, [0.0; 4]);
        depth.resize(count, 1.0);

        self.color = color;
        self.depth = depth;
        self.size = size;
        Ok(())
    }

    fn clear(&mut self, lighting: &LightingEnvironment) {
        let c = lighting.clear_color;
        self.color.fill([c.x, c.y, c.z, lighting.clear_alpha]);
        self.depth.fill(1.0);
    }

    fn to_screen(&self, view_projection: &Mat4, near: f32, point: Vec3) -> Option<ScreenVertex> {
        let clip: Vec4 = Camera::project(view_projection, point);
        if clip.w <= near {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(ScreenVertex {
            x: (ndc_x + 1.0) * 0.5 * self.size.width as f32,
            y: (ndc_y + 1.0) * 0.5 * self.size.height as f32,
            depth: clip.z / clip.w,
            view_depth: clip.w,
        })
    }

    fn blend(&mut self, index: usize, color: Vec3, alpha: f32) {
        let dst = &mut self.color[index];
        let keep = 1.0 - alpha;
        dst[0] = color.x.clamp(0.0, 1.0) * alpha + dst[0] * keep;
        dst[1] = color.y.clamp(0.0, 1.0) * alpha + dst[1] * keep;
        dst[2] = color.z.clamp(0.0, 1.0) * alpha + dst[2] * keep;
        dst[3] = alpha + dst[3] * keep;
    }

    fn draw_solid(&mut self, entity: &MeshEntity, camera: &Camera, view_projection: &Mat4, lighting: &LightingEnvironment) {
        let model = entity.model_matrix();
        let mvp = view_projection * model;
        let material = &entity.material;

        let world: Vec<Vec3> = entity
            .geometry
            .vertices
            .iter()
            .map(|v| model.transform_point(&Point3::from(v.position())).coords)
            .collect();
        let screen: Vec<Option<ScreenVertex>> = entity
            .geometry
            .vertices
            .iter()
            .map(|v| self.to_screen(&mvp, camera.near, v.position()))
            .collect();

        for [a, b, c] in entity.geometry.triangles() {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let (Some(sa), Some(sb), Some(sc)) = (screen[a], screen[b], screen[c]) else {
                continue;
            };

            // Outward faces come out clockwise once Y points down.
            let area = edge(&sa, &sb, sc.x, sc.y);
            if area >= 0.0 {
                continue;
            }

            let (wa, wb, wc) = (world[a], world[b], world[c]);
            let Some(normal) = (wb - wa).cross(&(wc - wa)).try_normalize(1.0e-12) else {
                continue;
            };
            let centroid = (wa + wb + wc) / 3.0;
            let lit = lighting.shade(material, centroid, normal, camera.position);
            let view_depth = (sa.view_depth + sb.view_depth + sc.view_depth) / 3.0;
            let color = lighting.fog.apply(lit, view_depth);

            self.fill_triangle(&sa, &sb, &sc, area, color, material.opacity);
        }
    }

    fn fill_triangle(&mut self, a: &ScreenVertex, b: &ScreenVertex, c: &ScreenVertex, area: f32, color: Vec3, alpha: f32) {
        let width = self.size.width as f32;
        let height = self.size.height as f32;
        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(width) as usize;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
        let max_y = a.y.max(b.y).max(c.y).ceil().min(height) as usize;

        for y in min_y..max_y {
            let py = y as f32 + 0.5;
            for x in min_x..max_x {
                let px = x as f32 + 0.5;
                let w0 = edge(b, c, px, py) / area;
                let w1 = edge(c, a, px, py) / area;
                let w2 = edge(a, b, px, py) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                let index = y * self.size.width as usize + x;
                if !(0.0..=1.0).contains(&depth) || depth > self.depth[index] {
                    continue;
                }
                self.depth[index] = depth;
                self.blend(index, color, alpha);
            }
        }
    }

    fn draw_edges(&mut self, entity: &MeshEntity, camera: &Camera, view_projection: &Mat4, lighting: &LightingEnvironment) {
        let model = entity.model_matrix();
        let mvp = view_projection * model;
        let rotation = entity.transform.rotation_matrix();
        let material = &entity.material;
        let vertices = &entity.geometry.vertices;

        for &[a, b] in &entity.geometry.edges {
            let (va, vb) = (&vertices[a as usize], &vertices[b as usize]);
            let (Some(sa), Some(sb)) = (
                self.to_screen(&mvp, camera.near, va.position()),
                self.to_screen(&mvp, camera.near, vb.position()),
            ) else {
                continue;
            };

            let midpoint = model.transform_point(&Point3::from((va.position() + vb.position()) * 0.5)).coords;
            let normal = rotation
                .transform_vector(&(Vec3::from(va.normal) + Vec3::from(vb.normal)))
                .try_normalize(1.0e-12)
                .unwrap_or_else(Vec3::z);
            let lit = lighting.shade(material, midpoint, normal, camera.position);
            let color = lighting.fog.apply(lit, (sa.view_depth + sb.view_depth) * 0.5);

            self.draw_line(&sa, &sb, color, material.opacity);
        }
    }

    fn draw_line(&mut self, a: &ScreenVertex, b: &ScreenVertex, color: Vec3, alpha: f32) {
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x >= self.size.width as usize || y >= self.size.height as usize {
                continue;
            }

            let depth = a.depth + (b.depth - a.depth) * t;
            let index = y * self.size.width as usize + x;
            if (0.0..=1.0).contains(&depth) && depth <= self.depth[index] + DEPTH_BIAS {
                self.blend(index, color, alpha);
            }
        }
    }

    fn draw_points(&mut self, particles: &ParticleField, material: &Material, camera: &Camera, view_projection: &Mat4, lighting: &LightingEnvironment) {
        let height = self.size.height as f32;
        // Pixels per world unit at unit view depth.
        let scale = height * 0.5 / (camera.fov * 0.5).tan();

        for index in 0..particles.len() {
            let Some(center) = self.to_screen(view_projection, camera.near, particles.position(index)) else {
                continue;
            };
            if !(0.0..=1.0).contains(&center.depth) {
                continue;
            }

            let diameter = if material.size_attenuation {
                material.point_size * scale / center.view_depth
            } else {
                material.point_size
            };
            let half = (diameter * 0.5).max(0.5);
            let color = lighting.fog.apply(material.color, center.view_depth);
            self.fill_sprite(&center, half, color, material.opacity);
        }
    }

    fn fill_sprite(&mut self, center: &ScreenVertex, half: f32, color: Vec3, alpha: f32) {
        let x0 = (center.x - half).round().max(0.0) as usize;
        let y0 = (center.y - half).round().max(0.0) as usize;
        let x1 = ((center.x + half).round().max(0.0) as usize).max(x0 + 1).min(self.size.width as usize);
        let y1 = ((center.y + half).round().max(0.0) as usize).max(y0 + 1).min(self.size.height as usize);

        for y in y0..y1 {
            for x in x0..x1 {
                let index = y * self.size.width as usize + x;
                if center.depth <= self.depth[index] + DEPTH_BIAS {
                    self.blend(index, color, alpha);
                }
            }
        }
    }
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "software"
    }

    fn attach(&mut self, size: SurfaceSize) -> RenderResult<()> {
        if self.attached {
            return Err(RenderError::Backend("backend is already attached".to_string()));
        }
        self.allocate(size)?;
        self.attached = true;
        log::info!("Software surface attached at {}x{}", size.width, size.height);
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) -> RenderResult<()> {
        if !self.attached {
            return Err(RenderError::Released);
        }
        if size == self.size {
            return Ok(());
        }
        self.allocate(size)
    }

    fn draw(&mut self, scene: &SceneGraph) -> RenderResult<()> {
        if !self.attached {
            return Err(RenderError::Released);
        }
        if self.size.is_degenerate() {
            return Err(RenderError::DegenerateSurface {
                width: self.size.width,
                height: self.size.height,
            });
        }

        let camera = scene.camera();
        let lighting = scene.lighting();
        let view_projection = camera.view_projection_matrix();

        self.clear(lighting);
        self.draw_solid(scene.shield(), camera, &view_projection, lighting);
        self.draw_edges(scene.wireframe(), camera, &view_projection, lighting);
        self.draw_points(scene.particles(), scene.particle_material(), camera, &view_projection, lighting);

        self.frames_drawn += 1;
        log::trace!("Software frame {} drawn", self.frames_drawn);
        Ok(())
    }

    fn release(&mut self) {
        if !self.attached {
            return;
        }
        self.color = Vec::new();
        self.depth = Vec::new();
        self.attached = false;
        log::info!("Software surface released after {} frames", self.frames_drawn);
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Twice the signed area of `(a, b, p)`
fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn quantize(px: [f32; 4]) -> [u8; 4] {
    px.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}
