//! # Visualization Settings
//!
//! Every tunable constant of the visualization lives here instead of being a
//! literal in the algorithms, so hosts and tests can shrink the particle field
//! or change rates without touching the simulation code.
//!
//! All sections use `#[serde(default)]`, so a config file only needs to name
//! the values it overrides.

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

/// Particle field parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Number of particles; fixed for the lifetime of a scene
    pub count: usize,
    /// Half-extent of the cube particles reflect inside
    pub bound: f32,
    /// Maximum per-axis speed; velocities are sampled from `[-max_speed, max_speed]`
    pub max_speed: f32,
    /// Inclusive lower bound of the per-particle size attribute
    pub min_size: f32,
    /// Exclusive upper bound of the per-particle size attribute
    pub max_size: f32,
    /// Seed for reproducible fields; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Point color as `0xRRGGBB`
    pub color: u32,
    /// Sprite size in world units, shared by every particle
    pub point_size: f32,
    /// Point opacity
    pub opacity: f32,
    /// Whether point size shrinks with distance
    pub size_attenuation: bool,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 1500,
            bound: 100.0,
            max_speed: 0.1,
            min_size: 0.1,
            max_size: 0.6,
            seed: None,
            color: 0x3b_82_f6,
            point_size: 0.3,
            opacity: 0.6,
            size_attenuation: true,
        }
    }
}

/// Surface material parameters shared by the shield and its wireframe shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// Base color as `0xRRGGBB`
    pub color: u32,
    /// Emissive color as `0xRRGGBB`
    pub emissive: u32,
    /// Emissive strength
    pub emissive_intensity: f32,
    /// Metalness in `[0, 1]`
    pub metalness: f32,
    /// Roughness in `[0, 1]`
    pub roughness: f32,
    /// Opacity in `[0, 1]`
    pub opacity: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color: 0x0e_a5_e9,
            emissive: 0x02_84_c7,
            emissive_intensity: 0.3,
            metalness: 0.7,
            roughness: 0.2,
            opacity: 0.8,
        }
    }
}

/// Shield and wireframe geometry plus per-frame animation rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Icosphere radius
    pub radius: f32,
    /// Icosahedron subdivision level
    pub detail: u32,
    /// Per-frame shield rotation increments (radians, X/Y/Z)
    pub rotation_step: [f32; 3],
    /// Per-frame wireframe rotation increments (radians, X/Y/Z)
    pub wireframe_rotation_step: [f32; 3],
    /// Uniform scale of the wireframe shell
    pub wireframe_scale: f32,
    /// World units of shield translation per unit of normalized pointer
    pub pointer_gain: f32,
    /// Solid shield material
    pub material: MaterialConfig,
    /// Wireframe shell material
    pub wireframe_material: MaterialConfig,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            radius: 15.0,
            detail: 4,
            rotation_step: [0.001, 0.002, 0.0005],
            wireframe_rotation_step: [-0.0015, -0.001, 0.0],
            wireframe_scale: 1.1,
            pointer_gain: 10.0,
            material: MaterialConfig::default(),
            wireframe_material: MaterialConfig {
                color: 0x06_b6_d4,
                emissive: 0x02_84_c7,
                emissive_intensity: 0.5,
                metalness: 0.0,
                roughness: 1.0,
                opacity: 0.3,
            },
        }
    }
}

/// Perspective camera parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Camera position; the camera always looks at the origin
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 0.0, 50.0],
        }
    }
}

/// A point light entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLightConfig {
    /// Light color as `0xRRGGBB`
    pub color: u32,
    /// Light intensity
    pub intensity: f32,
    /// Falloff radius; zero means no falloff
    pub range: f32,
    /// World position
    pub position: [f32; 3],
}

/// Lights, fog and clear color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Point lights
    pub point_lights: Vec<PointLightConfig>,
    /// Ambient color as `0xRRGGBB`
    pub ambient_color: u32,
    /// Ambient intensity
    pub ambient_intensity: f32,
    /// Fog color as `0xRRGGBB`
    pub fog_color: u32,
    /// Distance where fog starts
    pub fog_near: f32,
    /// Distance where fog is total
    pub fog_far: f32,
    /// Surface clear color as `0xRRGGBB`
    pub clear_color: u32,
    /// Surface clear alpha
    pub clear_alpha: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            point_lights: vec![
                PointLightConfig {
                    color: 0x3b_82_f6,
                    intensity: 2.0,
                    range: 100.0,
                    position: [30.0, 30.0, 30.0],
                },
                PointLightConfig {
                    color: 0x02_84_c7,
                    intensity: 1.5,
                    range: 100.0,
                    position: [-30.0, -30.0, 30.0],
                },
            ],
            ambient_color: 0x1e_29_3b,
            ambient_intensity: 0.5,
            fog_color: 0x0a_0e_27,
            fog_near: 100.0,
            fog_far: 500.0,
            clear_color: 0x00_00_00,
            clear_alpha: 0.1,
        }
    }
}

/// # Complete Visualization Configuration
///
/// Top-level configuration passed to `Visualization::mount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Log level used by hosts that initialise logging from config
    pub log_level: String,
    /// Particle field
    pub particles: ParticleConfig,
    /// Shield and wireframe
    pub shield: ShieldConfig,
    /// Camera
    pub camera: CameraConfig,
    /// Lights and fog
    pub lighting: LightingConfig,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            particles: ParticleConfig::default(),
            shield: ShieldConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
        }
    }
}

impl VisualizationConfig {
    /// Use a fixed particle seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.particles.seed = Some(seed);
        self
    }

    /// Override the particle count
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particles.count = count;
        self
    }

    /// Load and validate a TOML or RON file
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    ///
    /// A config that passes can be mounted without panicking: every float is
    /// finite and every sampling range has a finite span.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if let Some(name) = self.first_non_finite() {
            return Err(ConfigError::Invalid(format!("{} must be finite", name)));
        }

        let particles = &self.particles;
        if particles.count == 0 {
            return invalid("particle count must be at least 1");
        }
        if particles.bound <= 0.0 || !(2.0 * particles.bound).is_finite() {
            return invalid("particle bound must be positive with a finite span");
        }
        if particles.max_speed < 0.0 || !(2.0 * particles.max_speed).is_finite() {
            return invalid("particle max_speed must be non-negative with a finite span");
        }
        if particles.min_size < 0.0 || particles.min_size >= particles.max_size {
            return invalid("particle size range must satisfy 0 <= min_size < max_size");
        }
        if particles.point_size <= 0.0 {
            return invalid("particle point size must be positive");
        }

        let shield = &self.shield;
        if shield.radius <= 0.0 {
            return invalid("shield radius must be positive");
        }
        if shield.detail > 6 {
            return invalid("shield detail above 6 produces an impractically dense mesh");
        }
        if shield.wireframe_scale <= 0.0 {
            return invalid("wireframe scale must be positive");
        }

        let camera = &self.camera;
        if camera.fov_degrees <= 0.0 || camera.fov_degrees >= 180.0 {
            return invalid("camera fov must be in (0, 180) degrees");
        }
        if camera.near <= 0.0 || camera.near >= camera.far {
            return invalid("camera planes must satisfy 0 < near < far");
        }
        if camera.position == [0.0, 0.0, 0.0] {
            return invalid("camera cannot sit at the origin it looks at");
        }

        let lighting = &self.lighting;
        if lighting.fog_near > lighting.fog_far {
            return invalid("fog near distance must not exceed fog far distance");
        }
        if !(0.0..=1.0).contains(&lighting.clear_alpha) {
            return invalid("clear alpha must be in [0, 1]");
        }

        Ok(())
    }

    /// Name of the first NaN or infinite setting, if any
    fn first_non_finite(&self) -> Option<String> {
        let particles = &self.particles;
        let shield = &self.shield;
        let camera = &self.camera;
        let lighting = &self.lighting;

        let mut fields: Vec<(String, f32)> = vec![
            ("particles.bound".into(), particles.bound),
            ("particles.max_speed".into(), particles.max_speed),
            ("particles.min_size".into(), particles.min_size),
            ("particles.max_size".into(), particles.max_size),
            ("particles.point_size".into(), particles.point_size),
            ("particles.opacity".into(), particles.opacity),
            ("shield.radius".into(), shield.radius),
            ("shield.wireframe_scale".into(), shield.wireframe_scale),
            ("shield.pointer_gain".into(), shield.pointer_gain),
            ("camera.fov_degrees".into(), camera.fov_degrees),
            ("camera.near".into(), camera.near),
            ("camera.far".into(), camera.far),
            ("lighting.ambient_intensity".into(), lighting.ambient_intensity),
            ("lighting.fog_near".into(), lighting.fog_near),
            ("lighting.fog_far".into(), lighting.fog_far),
        ];
        for (axis, step) in shield.rotation_step.iter().enumerate() {
            fields.push((format!("shield.rotation_step[{}]", axis), *step));
        }
        for (axis, step) in shield.wireframe_rotation_step.iter().enumerate() {
            fields.push((format!("shield.wireframe_rotation_step[{}]", axis), *step));
        }
        for (axis, value) in camera.position.iter().enumerate() {
            fields.push((format!("camera.position[{}]", axis), *value));
        }
        for (section, material) in [("shield.material", &shield.material), ("shield.wireframe_material", &shield.wireframe_material)] {
            fields.push((format!("{}.emissive_intensity", section), material.emissive_intensity));
            fields.push((format!("{}.metalness", section), material.metalness));
            fields.push((format!("{}.roughness", section), material.roughness));
            fields.push((format!("{}.opacity", section), material.opacity));
        }
        for (i, light) in lighting.point_lights.iter().enumerate() {
            fields.push((format!("lighting.point_lights[{}].intensity", i), light.intensity));
            fields.push((format!("lighting.point_lights[{}].range", i), light.range));
            for (axis, value) in light.position.iter().enumerate() {
                fields.push((format!("lighting.point_lights[{}].position[{}]", i, axis), *value));
            }
        }

        fields.into_iter().find(|(_, value)| !value.is_finite()).map(|(name, _)| name)
    }
}

impl Config for VisualizationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VisualizationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particles.count, 1500);
        assert_eq!(config.shield.rotation_step, [0.001, 0.002, 0.0005]);
        assert_eq!(config.camera.fov_degrees, 75.0);
    }

    #[test]
    fn test_validate_rejects_inverted_planes() {
        let mut config = VisualizationConfig::default();
        config.camera.near = 2000.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        for text in [
            "[particles]\nbound = inf\n",
            "[particles]\nbound = nan\n",
            "[particles]\nmax_speed = -inf\n",
            "[particles]\nmax_size = inf\n",
            "[camera]\nfar = inf\n",
            "[lighting]\nfog_far = nan\n",
            "[shield]\nrotation_step = [0.001, nan, 0.0]\n",
        ] {
            let config = VisualizationConfig::from_str_with_format(text, "viz.toml").unwrap();
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_validate_rejects_overflowing_span() {
        let mut config = VisualizationConfig::default();
        config.particles.bound = 2.0e38;
        assert!(config.validate().is_err());

        let mut config = VisualizationConfig::default();
        config.particles.max_speed = 2.0e38;
        assert!(config.validate().is_err());

        let mut config = VisualizationConfig::default();
        config.particles.bound = 1.0e38;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_field() {
        let config = VisualizationConfig::default().with_particle_count(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = "[particles]\ncount = 64\nseed = 7\n";
        let config = VisualizationConfig::from_str_with_format(text, "viz.toml").unwrap();
        assert_eq!(config.particles.count, 64);
        assert_eq!(config.particles.seed, Some(7));
        assert_eq!(config.particles.bound, 100.0);
        assert_eq!(config.shield.radius, 15.0);
    }

    #[test]
    fn test_ron_parses() {
        let text = "(shield: (radius: 5.0, detail: 1))";
        let config = VisualizationConfig::from_str_with_format(text, "viz.ron").unwrap();
        assert_eq!(config.shield.radius, 5.0);
        assert_eq!(config.shield.detail, 1);
        assert_eq!(config.shield.pointer_gain, 10.0);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = VisualizationConfig::from_str_with_format("{}", "viz.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
