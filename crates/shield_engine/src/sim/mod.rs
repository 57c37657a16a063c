//! Simulation state advanced once per frame, independent of rendering

pub mod particles;

pub use particles::ParticleField;
