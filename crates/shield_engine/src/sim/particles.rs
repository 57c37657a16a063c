//! Bounded particle field
//!
//! A fixed-length buffer of points drifting in straight lines inside the cube
//! `[-bound, bound]³`. When a coordinate's magnitude exceeds the bound after a
//! step, that axis's velocity is negated, so the particle turns around on the
//! following step. Positions may therefore overshoot the bound by at most one
//! velocity step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::math::Vec3;
use crate::settings::ParticleConfig;

/// Structure-of-arrays particle storage
///
/// Positions and velocities are flat `[x0, y0, z0, x1, ...]` buffers so the
/// position buffer can be handed to a renderer without repacking.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<f32>,
    velocities: Vec<f32>,
    sizes: Vec<f32>,
    bound: f32,
    dirty: bool,
}

impl ParticleField {
    /// Sample a new field from `config`
    ///
    /// Uses `config.seed` when present so fields are reproducible.
    pub fn new(config: &ParticleConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::sample(config, &mut rng)
    }

    /// Sample a new field using the caller's random source
    pub fn sample<R: Rng + ?Sized>(config: &ParticleConfig, rng: &mut R) -> Self {
        let count = config.count;
        let bound = config.bound;
        let speed = config.max_speed;

        let mut positions = Vec::with_capacity(count * 3);
        let mut velocities = Vec::with_capacity(count * 3);
        let mut sizes = Vec::with_capacity(count);

        for _ in 0..count {
            for _ in 0..3 {
                positions.push(rng.gen_range(-bound..=bound));
            }
            for _ in 0..3 {
                velocities.push(if speed > 0.0 { rng.gen_range(-speed..=speed) } else { 0.0 });
            }
            sizes.push(rng.gen_range(config.min_size..config.max_size));
        }

        log::debug!("Sampled particle field: {} particles, bound {}", count, bound);

        Self {
            positions,
            velocities,
            sizes,
            bound,
            dirty: true,
        }
    }

    /// Build a field from explicit state
    ///
    /// `positions` and `velocities` hold three components per particle and
    /// `sizes` one; returns `None` if the lengths disagree.
    pub fn from_parts(positions: Vec<f32>, velocities: Vec<f32>, sizes: Vec<f32>, bound: f32) -> Option<Self> {
        if positions.len() != sizes.len() * 3 || velocities.len() != positions.len() {
            return None;
        }
        Some(Self {
            positions,
            velocities,
            sizes,
            bound,
            dirty: true,
        })
    }

    /// Advance every particle by one frame
    pub fn step(&mut self) {
        let bound = self.bound;
        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *position += *velocity;
            if position.abs() > bound {
                *velocity = -*velocity;
            }
        }
        self.dirty = true;
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether the field has no particles
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Reflection bound
    pub fn bound(&self) -> f32 {
        self.bound
    }

    /// Flat position buffer
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat velocity buffer
    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    /// Per-particle size attribute
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Position of particle `index`
    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * 3;
        Vec3::new(self.positions[base], self.positions[base + 1], self.positions[base + 2])
    }

    /// Velocity of particle `index`
    pub fn velocity(&self, index: usize) -> Vec3 {
        let base = index * 3;
        Vec3::new(self.velocities[base], self.velocities[base + 1], self.velocities[base + 2])
    }

    /// Whether positions changed since the renderer last consumed them
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the renderer after uploading positions
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(count: usize, seed: u64) -> ParticleConfig {
        ParticleConfig {
            count,
            seed: Some(seed),
            ..ParticleConfig::default()
        }
    }

    #[test]
    fn test_initial_sampling_ranges() {
        let config = ParticleConfig::default();
        let field = ParticleField::new(&ParticleConfig { seed: Some(42), ..config.clone() });

        assert_eq!(field.len(), 1500);
        assert_eq!(field.positions().len(), 4500);
        assert!(field.positions().iter().all(|p| p.abs() <= 100.0));
        assert!(field.velocities().iter().all(|v| v.abs() <= 0.1));
        assert!(field.sizes().iter().all(|s| (0.1..0.6).contains(s)));
        assert!(field.is_dirty());
    }

    #[test]
    fn test_seeded_fields_are_reproducible() {
        let a = ParticleField::new(&small_config(32, 9));
        let b = ParticleField::new(&small_config(32, 9));
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.velocities(), b.velocities());
        assert_eq!(a.sizes(), b.sizes());
    }

    #[test]
    fn test_step_is_linear_inside_bounds() {
        let mut field = ParticleField::from_parts(
            vec![0.0, 10.0, -10.0],
            vec![0.1, -0.05, 0.02],
            vec![0.3],
            100.0,
        )
        .unwrap();

        field.mark_clean();
        field.step();
        field.step();

        let p = field.position(0);
        assert!((p.x - 0.2).abs() < 1e-6);
        assert!((p.y - 9.9).abs() < 1e-5);
        assert!((p.z + 9.96).abs() < 1e-5);
        assert!(field.is_dirty());
    }

    #[test]
    fn test_velocity_flips_once_at_boundary() {
        let mut field = ParticleField::from_parts(
            vec![99.95, 0.0, 0.0],
            vec![0.1, 0.0, 0.0],
            vec![0.3],
            100.0,
        )
        .unwrap();

        field.step();
        assert!(field.position(0).x > 100.0);
        assert!(field.velocity(0).x < 0.0);

        for _ in 0..50 {
            field.step();
            assert!(field.velocity(0).x < 0.0);
        }
        assert!(field.position(0).x < 100.0);
    }

    #[test]
    fn test_negative_boundary_reflects() {
        let mut field = ParticleField::from_parts(
            vec![0.0, -99.99, 0.0],
            vec![0.0, -0.05, 0.0],
            vec![0.2],
            100.0,
        )
        .unwrap();

        field.step();
        assert!(field.velocity(0).y > 0.0);
        field.step();
        assert!(field.position(0).y >= -100.0);
    }

    #[test]
    fn test_long_run_stays_within_one_step_of_bound() {
        let config = ParticleConfig {
            count: 64,
            bound: 2.0,
            max_speed: 0.1,
            seed: Some(3),
            ..ParticleConfig::default()
        };
        let mut field = ParticleField::new(&config);

        for _ in 0..5_000 {
            field.step();
            assert!(field.positions().iter().all(|p| p.abs() <= 2.0 + 0.1 + 1e-5));
        }
        assert_eq!(field.len(), 64);
    }
}
