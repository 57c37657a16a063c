//! Lighting system for the shield scene
//!
//! Two static point lights, one ambient term and linear distance fog. Lights
//! are pure data; the rasterizer calls `LightingEnvironment::shade` per face.
//!
//! The shading model is Blinn-Phong with a roughness-derived exponent and a
//! metalness blend for the specular tint. It approximates a standard
//! metal/rough material closely enough for a decorative background.

use crate::foundation::math::{utils, Vec3};
use crate::render::material::Material;
use crate::settings::{LightingConfig, PointLightConfig};

/// Omnidirectional light with a finite falloff radius
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// World position
    pub position: Vec3,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Distance at which the light reaches zero; 0 disables falloff
    pub range: f32,
}

impl PointLight {
    fn from_config(config: &PointLightConfig) -> Self {
        let [x, y, z] = config.position;
        Self {
            position: Vec3::new(x, y, z),
            color: utils::rgb_from_hex(config.color),
            intensity: config.intensity,
            range: config.range,
        }
    }

    /// Falloff factor at `distance`
    pub fn attenuation(&self, distance: f32) -> f32 {
        if self.range <= 0.0 {
            return 1.0;
        }
        let window = (1.0 - distance / self.range).clamp(0.0, 1.0);
        window * window
    }
}

/// Uniform light applied to every surface
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
}

/// Linear distance fog
#[derive(Debug, Clone, PartialEq)]
pub struct Fog {
    /// Fog color
    pub color: Vec3,
    /// Distance where fog starts
    pub near: f32,
    /// Distance where fog is total
    pub far: f32,
}

impl Fog {
    /// Fog amount in `[0, 1]` at `distance` from the camera
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return if distance >= self.far { 1.0 } else { 0.0 };
        }
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }

    /// Blend `color` toward the fog color
    pub fn apply(&self, color: Vec3, distance: f32) -> Vec3 {
        color.lerp(&self.color, self.factor(distance))
    }
}

/// Complete, immutable lighting setup for one session
#[derive(Debug, Clone, PartialEq)]
pub struct LightingEnvironment {
    /// Point lights
    pub point_lights: Vec<PointLight>,
    /// Ambient term
    pub ambient: AmbientLight,
    /// Distance fog
    pub fog: Fog,
    /// Surface clear color
    pub clear_color: Vec3,
    /// Surface clear alpha
    pub clear_alpha: f32,
}

impl LightingEnvironment {
    /// Build from settings
    pub fn from_config(config: &LightingConfig) -> Self {
        Self {
            point_lights: config.point_lights.iter().map(PointLight::from_config).collect(),
            ambient: AmbientLight {
                color: utils::rgb_from_hex(config.ambient_color),
                intensity: config.ambient_intensity,
            },
            fog: Fog {
                color: utils::rgb_from_hex(config.fog_color),
                near: config.fog_near,
                far: config.fog_far,
            },
            clear_color: utils::rgb_from_hex(config.clear_color),
            clear_alpha: config.clear_alpha,
        }
    }

    /// Lit color of a surface point, before fog
    ///
    /// `normal` must be unit length; `eye` is the camera position.
    pub fn shade(&self, material: &Material, position: Vec3, normal: Vec3, eye: Vec3) -> Vec3 {
        let base = material.color;
        let ambient = self.ambient.color * self.ambient.intensity;
        let mut color = base.component_mul(&ambient);

        let view = (eye - position).try_normalize(1.0e-6).unwrap_or(normal);
        let shininess = (2.0 / (material.roughness.powi(4) + 1.0e-4) - 2.0).clamp(1.0, 256.0);
        let specular_tint = Vec3::repeat(0.04).lerp(&base, material.metalness);
        let diffuse_weight = 1.0 - material.metalness * 0.5;

        for light in &self.point_lights {
            let to_light = light.position - position;
            let distance = to_light.norm();
            if distance <= f32::EPSILON {
                continue;
            }
            let l = to_light / distance;
            let n_dot_l = normal.dot(&l).max(0.0);
            if n_dot_l == 0.0 {
                continue;
            }

            let radiance = light.color * (light.intensity * light.attenuation(distance));
            let half = (l + view).normalize();
            let specular = normal.dot(&half).max(0.0).powf(shininess);

            color += base.component_mul(&radiance) * (n_dot_l * diffuse_weight);
            color += specular_tint.component_mul(&radiance) * specular;
        }

        color + material.emission()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MaterialConfig, ShieldConfig};
    use approx::assert_relative_eq;

    #[test]
    fn test_default_environment() {
        let env = LightingEnvironment::from_config(&LightingConfig::default());
        assert_eq!(env.point_lights.len(), 2);
        assert_relative_eq!(env.point_lights[0].intensity, 2.0);
        assert_relative_eq!(env.point_lights[1].position.x, -30.0);
        assert_relative_eq!(env.clear_alpha, 0.1);
    }

    #[test]
    fn test_attenuation_window() {
        let light = PointLight {
            position: Vec3::zeros(),
            color: Vec3::repeat(1.0),
            intensity: 1.0,
            range: 100.0,
        };
        assert_relative_eq!(light.attenuation(0.0), 1.0);
        assert_relative_eq!(light.attenuation(50.0), 0.25);
        assert_relative_eq!(light.attenuation(150.0), 0.0);
    }

    #[test]
    fn test_fog_is_linear_between_planes() {
        let fog = Fog { color: Vec3::repeat(1.0), near: 100.0, far: 500.0 };
        assert_relative_eq!(fog.factor(50.0), 0.0);
        assert_relative_eq!(fog.factor(300.0), 0.5);
        assert_relative_eq!(fog.factor(900.0), 1.0);
        assert_relative_eq!(fog.apply(Vec3::zeros(), 300.0).x, 0.5);
    }

    #[test]
    fn test_lit_side_is_brighter_than_dark_side() {
        let env = LightingEnvironment::from_config(&LightingConfig::default());
        let material = Material::solid(&MaterialConfig::default());
        let eye = Vec3::new(0.0, 0.0, 50.0);

        let toward = Vec3::new(1.0, 1.0, 1.0).normalize();
        let away = -toward;
        let lit = env.shade(&material, toward * 15.0, toward, eye);
        let dark = env.shade(&material, away * 15.0, away, eye);
        assert!(lit.sum() > dark.sum());
    }

    #[test]
    fn test_emission_survives_without_lights() {
        let config = LightingConfig { point_lights: Vec::new(), ambient_intensity: 0.0, ..LightingConfig::default() };
        let env = LightingEnvironment::from_config(&config);
        let material = Material::wireframe(&ShieldConfig::default().wireframe_material);
        let color = env.shade(&material, Vec3::zeros(), Vec3::z(), Vec3::new(0.0, 0.0, 50.0));
        assert_relative_eq!(color, material.emission(), epsilon = 1e-6);
    }
}
