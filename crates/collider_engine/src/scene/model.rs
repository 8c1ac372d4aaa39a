//! Placed models and the registry that owns them
//!
//! A [`Model`] pairs a shared [`Mesh`] with a world transform and a dirty flag
//! that is raised whenever the transform changes. Models live in a
//! [`ModelRegistry`] arena and are referred to everywhere else by
//! [`ModelKey`], so the collider never holds a reference into the registry.

use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use super::mesh::Mesh;
use crate::foundation::math::{Mat4, Quat, Transform, Vec3};

new_key_type! {
    /// Stable handle to a model stored in a [`ModelRegistry`]
    pub struct ModelKey;
}

/// What the collision core needs to know about a model
pub trait ModelSource {
    /// Model-to-world matrix
    fn world_matrix(&self) -> Mat4;

    /// Model-space triangle mesh
    fn mesh(&self) -> &Mesh;

    /// Whether the world-space geometry changed since the flag was last cleared
    fn is_dirty(&self) -> bool;
}

/// A mesh instance placed in the world
#[derive(Debug, Clone)]
pub struct Model {
    mesh: Arc<Mesh>,
    transform: Transform,
    dirty: bool,
}

impl Model {
    /// Place a mesh at the identity transform
    ///
    /// New models start dirty; they have never been seen by the collider.
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self::with_transform(mesh, Transform::identity())
    }

    /// Place a mesh at the given transform
    pub fn with_transform(mesh: Arc<Mesh>, transform: Transform) -> Self {
        Self {
            mesh,
            transform,
            dirty: true,
        }
    }

    /// Current transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the whole transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.dirty = true;
    }

    /// Move to an absolute position
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.transform.position = Vec3::new(x, y, z);
        self.dirty = true;
    }

    /// Set absolute rotation from Euler angles (radians)
    pub fn rotate(&mut self, x: f32, y: f32, z: f32) {
        self.transform.rotation = Quat::from_euler_angles(x, y, z);
        self.dirty = true;
    }

    /// Set uniform scale
    pub fn scale(&mut self, s: f32) {
        self.transform.scale = Vec3::new(s, s, s);
        self.dirty = true;
    }

    /// Swap the mesh, e.g. after a deformation
    pub fn set_mesh(&mut self, mesh: Arc<Mesh>) {
        self.mesh = mesh;
        self.dirty = true;
    }

    /// Clear the dirty flag
    pub fn clean(&mut self) {
        self.dirty = false;
    }
}

impl ModelSource for Model {
    fn world_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Arena owning every model in a scene
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: SlotMap<ModelKey, Model>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model and return its key
    pub fn insert(&mut self, model: Model) -> ModelKey {
        self.models.insert(model)
    }

    /// Remove a model; its key becomes stale
    pub fn remove(&mut self, key: ModelKey) -> Option<Model> {
        self.models.remove(key)
    }

    /// Look up a model
    pub fn get(&self, key: ModelKey) -> Option<&Model> {
        self.models.get(key)
    }

    /// Look up a model mutably
    pub fn get_mut(&mut self, key: ModelKey) -> Option<&mut Model> {
        self.models.get_mut(key)
    }

    /// Whether the key refers to a live model
    pub fn contains(&self, key: ModelKey) -> bool {
        self.models.contains_key(key)
    }

    /// Number of live models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry holds no models
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterate over all models with their keys
    pub fn iter(&self) -> impl Iterator<Item = (ModelKey, &Model)> {
        self.models.iter()
    }

    /// Clear every dirty flag, returning how many were set
    pub fn clean_all(&mut self) -> usize {
        let mut cleaned = 0;
        for model in self.models.values_mut().filter(|m| m.dirty) {
            model.clean();
            cleaned += 1;
        }
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_model_is_dirty() {
        let mut model = Model::new(Arc::new(Mesh::unit_cube()));
        assert!(model.is_dirty());

        model.clean();
        assert!(!model.is_dirty());
    }

    #[test]
    fn test_mutations_mark_dirty() {
        let mut model = Model::new(Arc::new(Mesh::unit_cube()));

        model.clean();
        model.translate(1.0, 2.0, 3.0);
        assert!(model.is_dirty());

        model.clean();
        model.rotate(0.5, 0.0, 0.0);
        assert!(model.is_dirty());

        model.clean();
        model.scale(2.0);
        assert!(model.is_dirty());
    }

    #[test]
    fn test_world_matrix_matches_transform() {
        let mut model = Model::new(Arc::new(Mesh::unit_cube()));
        model.translate(10.0, 0.0, -10.0);

        let matrix = model.world_matrix();
        assert_relative_eq!(matrix.m14, 10.0);
        assert_relative_eq!(matrix.m34, -10.0);
    }

    #[test]
    fn test_registry_keys_go_stale() {
        let mut registry = ModelRegistry::new();
        let key = registry.insert(Model::new(Arc::new(Mesh::unit_cube())));
        assert!(registry.contains(key));

        registry.remove(key);
        assert!(!registry.contains(key));
        assert!(registry.get(key).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clean_all_counts_dirty_models() {
        let mut registry = ModelRegistry::new();
        let mesh = Arc::new(Mesh::unit_cube());
        let a = registry.insert(Model::new(Arc::clone(&mesh)));
        registry.insert(Model::new(mesh));

        assert_eq!(registry.clean_all(), 2);
        assert_eq!(registry.clean_all(), 0);

        registry.get_mut(a).unwrap().translate(0.0, 1.0, 0.0);
        assert_eq!(registry.clean_all(), 1);
    }
}
