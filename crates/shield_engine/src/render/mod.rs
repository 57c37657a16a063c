//! # Rendering System
//!
//! Backend-agnostic rendering layer for the visualization.
//!
//! ## Architecture
//!
//! - **Primitives**: perspective camera, icosphere mesh and vertex layout
//! - **Materials / Lighting**: solid, wireframe and point materials; point + ambient lights and fog
//! - **Backend**: `RenderBackend` trait implemented by the CPU `SoftwareBackend`
//! - **Surface**: `RenderSurface` owns the backend, tracks pixel dimensions and handles resize

pub mod primitives;
pub mod material;
pub mod lighting;
pub mod backend;
pub mod software;
pub mod surface;

pub use backend::{RenderBackend, RenderError, RenderResult, SurfaceSize};
pub use lighting::{AmbientLight, Fog, LightingEnvironment, PointLight};
pub use material::{Material, MaterialKind};
pub use primitives::{Camera, Mesh, Vertex};
pub use software::SoftwareBackend;
pub use surface::RenderSurface;
