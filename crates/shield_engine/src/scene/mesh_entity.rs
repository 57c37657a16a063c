//! Mesh entity representation for the scene

use std::rc::Rc;

use crate::foundation::math::{Mat4, Transform};
use crate::render::{Material, Mesh};

/// A geometry paired with a material and a mutable transform
///
/// The shield and its wireframe shell share one `Mesh` through the `Rc`;
/// only the transform differs between them.
#[derive(Debug, Clone)]
pub struct MeshEntity {
    /// Name used in logs
    pub name: &'static str,

    /// Shared geometry
    pub geometry: Rc<Mesh>,

    /// Surface material
    pub material: Material,

    /// Rotation, translation and scale
    pub transform: Transform,
}

impl MeshEntity {
    /// Create a new entity with the given transform
    pub fn new(name: &'static str, geometry: Rc<Mesh>, material: Material, transform: Transform) -> Self {
        Self {
            name,
            geometry,
            material,
            transform,
        }
    }

    /// Model matrix for the current transform
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MaterialConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_shared_geometry_scaled_copy() {
        let mesh = Rc::new(Mesh::icosphere(1.0, 0));
        let material = Material::solid(&MaterialConfig::default());
        let inner = MeshEntity::new("inner", Rc::clone(&mesh), material.clone(), Transform::identity());
        let outer = MeshEntity::new("outer", Rc::clone(&mesh), material, Transform::from_uniform_scale(1.1));

        assert!(Rc::ptr_eq(&inner.geometry, &outer.geometry));
        assert_eq!(Rc::strong_count(&mesh), 3);
        assert_relative_eq!(outer.model_matrix()[(0, 0)], 1.1);
    }
}
