//! Surface descriptions for the three renderables
//!
//! Colors are stored as linear `[0, 1]` RGB decoded from the `0xRRGGBB`
//! values in the settings.

use crate::foundation::math::{utils, Vec3};
use crate::settings::{MaterialConfig, ParticleConfig};

/// How a material is rasterized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Filled, lit triangles
    Solid,
    /// Mesh edges only
    Wireframe,
    /// One sprite per vertex
    Points,
}

/// Material parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Rasterization mode
    pub kind: MaterialKind,
    /// Base color
    pub color: Vec3,
    /// Emissive color
    pub emissive: Vec3,
    /// Emissive strength
    pub emissive_intensity: f32,
    /// Metalness in `[0, 1]`
    pub metalness: f32,
    /// Roughness in `[0, 1]`
    pub roughness: f32,
    /// Opacity in `[0, 1]`
    pub opacity: f32,
    /// Points only: sprite size in world units
    pub point_size: f32,
    /// Points only: shrink sprites with distance
    pub size_attenuation: bool,
}

impl Material {
    fn from_surface(kind: MaterialKind, config: &MaterialConfig) -> Self {
        Self {
            kind,
            color: utils::rgb_from_hex(config.color),
            emissive: utils::rgb_from_hex(config.emissive),
            emissive_intensity: config.emissive_intensity,
            metalness: config.metalness,
            roughness: config.roughness,
            opacity: config.opacity,
            point_size: 0.0,
            size_attenuation: false,
        }
    }

    /// Filled, lit material
    pub fn solid(config: &MaterialConfig) -> Self {
        Self::from_surface(MaterialKind::Solid, config)
    }

    /// Edge-only material
    pub fn wireframe(config: &MaterialConfig) -> Self {
        Self::from_surface(MaterialKind::Wireframe, config)
    }

    /// Unlit point sprites for the particle field
    pub fn points(config: &ParticleConfig) -> Self {
        Self {
            kind: MaterialKind::Points,
            color: utils::rgb_from_hex(config.color),
            emissive: Vec3::zeros(),
            emissive_intensity: 0.0,
            metalness: 0.0,
            roughness: 1.0,
            opacity: config.opacity,
            point_size: config.point_size,
            size_attenuation: config.size_attenuation,
        }
    }

    /// Emissive term added on top of lighting
    pub fn emission(&self) -> Vec3 {
        self.emissive * self.emissive_intensity
    }
}
