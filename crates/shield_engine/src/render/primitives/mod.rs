//! Core primitive types for rendering
//!
//! This module contains the camera and the geometry shared by the shield and
//! its wireframe shell.

pub mod camera;
pub mod mesh;

pub use camera::Camera;
pub use mesh::{Mesh, Vertex};
