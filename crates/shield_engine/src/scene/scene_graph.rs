//! Scene graph for the shield visualization
//!
//! Holds every renderable and light for one session. Backends read it through
//! the shared accessors; only the animation driver and the surface manager
//! mutate it, through the crate-private ones.

use std::rc::Rc;

use crate::foundation::math::{Transform, Vec3};
use crate::input::InteractionState;
use crate::render::{Camera, LightingEnvironment, Material, Mesh, SurfaceSize};
use crate::settings::VisualizationConfig;
use crate::sim::ParticleField;

use super::MeshEntity;

/// Per-frame motion parameters copied out of the settings
#[derive(Debug, Clone, Copy)]
struct MeshMotion {
    shield_step: Vec3,
    wireframe_step: Vec3,
    pointer_gain: f32,
}

/// Complete scene for one mounted session
#[derive(Debug)]
pub struct SceneGraph {
    camera: Camera,
    shield: MeshEntity,
    wireframe: MeshEntity,
    particles: ParticleField,
    particle_material: Material,
    lighting: LightingEnvironment,
    motion: MeshMotion,
}

impl SceneGraph {
    /// Build the scene for a container of `size`
    ///
    /// The camera aspect is only computed from a non-degenerate size; otherwise
    /// it stays at its placeholder until the first valid resize.
    pub fn new(config: &VisualizationConfig, size: SurfaceSize) -> Self {
        let camera = Camera::from_config(&config.camera, size.aspect());

        let shield_config = &config.shield;
        let geometry = Rc::new(Mesh::icosphere(shield_config.radius, shield_config.detail));
        let shield = MeshEntity::new(
            "shield",
            Rc::clone(&geometry),
            Material::solid(&shield_config.material),
            Transform::identity(),
        );
        let wireframe = MeshEntity::new(
            "wireframe",
            geometry,
            Material::wireframe(&shield_config.wireframe_material),
            Transform::from_uniform_scale(shield_config.wireframe_scale),
        );

        let particles = ParticleField::new(&config.particles);
        let particle_material = Material::points(&config.particles);
        let lighting = LightingEnvironment::from_config(&config.lighting);

        let [sx, sy, sz] = shield_config.rotation_step;
        let [wx, wy, wz] = shield_config.wireframe_rotation_step;
        let motion = MeshMotion {
            shield_step: Vec3::new(sx, sy, sz),
            wireframe_step: Vec3::new(wx, wy, wz),
            pointer_gain: shield_config.pointer_gain,
        };

        log::info!(
            "Scene built: {} particles, {} shield triangles, {} lights",
            particles.len(),
            shield.geometry.triangle_count(),
            lighting.point_lights.len()
        );

        Self {
            camera,
            shield,
            wireframe,
            particles,
            particle_material,
            lighting,
            motion,
        }
    }

    /// Advance mesh rotations and set the shield offset from pointer state
    ///
    /// Rotation is additive per frame. The shield translation is assigned, not
    /// accumulated, and its Z offset is left alone; the wireframe never moves.
    pub fn animate_meshes(&mut self, interaction: InteractionState) {
        self.shield.transform.rotation += self.motion.shield_step;
        self.wireframe.transform.rotation += self.motion.wireframe_step;

        let position = &mut self.shield.transform.position;
        position.x = interaction.x * self.motion.pointer_gain;
        position.y = interaction.y * self.motion.pointer_gain;
    }

    /// The camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The solid shield
    pub fn shield(&self) -> &MeshEntity {
        &self.shield
    }

    /// The wireframe shell
    pub fn wireframe(&self) -> &MeshEntity {
        &self.wireframe
    }

    /// The particle field
    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// Material used for every particle
    pub fn particle_material(&self) -> &Material {
        &self.particle_material
    }

    /// Lights, fog and clear color
    pub fn lighting(&self) -> &LightingEnvironment {
        &self.lighting
    }

    pub(crate) fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub(crate) fn particles_mut(&mut self) -> &mut ParticleField {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> VisualizationConfig {
        VisualizationConfig::default().with_seed(11).with_particle_count(16)
    }

    #[test]
    fn test_scene_composition() {
        let scene = SceneGraph::new(&config(), SurfaceSize::new(800, 600));

        assert_relative_eq!(scene.camera().aspect, 800.0 / 600.0);
        assert_eq!(scene.particles().len(), 16);
        assert!(Rc::ptr_eq(&scene.shield().geometry, &scene.wireframe().geometry));
        assert_relative_eq!(scene.wireframe().transform.scale.x, 1.1);
        assert_relative_eq!(scene.shield().transform.scale.x, 1.0);
        assert_eq!(scene.lighting().point_lights.len(), 2);
    }

    #[test]
    fn test_degenerate_size_skips_aspect() {
        let scene = SceneGraph::new(&config(), SurfaceSize::new(0, 600));
        assert_relative_eq!(scene.camera().aspect, 1.0);
    }

    #[test]
    fn test_rotation_accumulates_per_frame() {
        let mut scene = SceneGraph::new(&config(), SurfaceSize::new(100, 100));
        for _ in 0..1000 {
            scene.animate_meshes(InteractionState::default());
        }

        let shield = scene.shield().transform.rotation;
        assert_relative_eq!(shield.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(shield.y, 2.0, epsilon = 1e-3);
        assert_relative_eq!(shield.z, 0.5, epsilon = 1e-3);

        let wire = scene.wireframe().transform.rotation;
        assert_relative_eq!(wire.x, -1.5, epsilon = 1e-3);
        assert_relative_eq!(wire.y, -1.0, epsilon = 1e-3);
        assert_relative_eq!(wire.z, 0.0);
    }

    #[test]
    fn test_pointer_sets_translation_without_accumulating() {
        let mut scene = SceneGraph::new(&config(), SurfaceSize::new(100, 100));
        scene.shield.transform.position.z = 3.0;

        let pointer = InteractionState { x: 0.5, y: -0.5 };
        scene.animate_meshes(pointer);
        scene.animate_meshes(pointer);

        let position = scene.shield().transform.position;
        assert_relative_eq!(position.x, 5.0);
        assert_relative_eq!(position.y, -5.0);
        assert_relative_eq!(position.z, 3.0);
        assert_relative_eq!(scene.wireframe().transform.position, Vec3::zeros());
    }
}
