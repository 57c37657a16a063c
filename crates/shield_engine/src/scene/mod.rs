//! Scene management
//!
//! One `SceneGraph` per mounted session: camera, lights, the shield, its
//! wireframe shell and the particle field, all built together at mount and
//! dropped together at teardown.

mod mesh_entity;
mod scene_graph;

pub use mesh_entity::MeshEntity;
pub use scene_graph::SceneGraph;
