//! Simulation world: the models of a scene and the collider built from them
//!
//! [`World`] is the single owner of scene state. Systems borrow it (or the
//! collider inside it) for the duration of a frame instead of reaching for
//! shared globals.

use std::sync::Arc;

use crate::core::config::ColliderConfig;
use crate::foundation::math::Transform;
use crate::physics::{Collider, ColliderError};
use crate::scene::{Mesh, Model, ModelKey, ModelRegistry};

/// Scene models plus their collision surfaces
#[derive(Debug, Default)]
pub struct World {
    models: ModelRegistry,
    collider: Collider,
    static_models: Vec<ModelKey>,
}

impl World {
    /// Create an empty world
    pub fn new(config: ColliderConfig) -> Self {
        Self {
            models: ModelRegistry::new(),
            collider: Collider::new(config),
            static_models: Vec::new(),
        }
    }

    /// Add a model whose surfaces are built once and never refreshed
    pub fn add_static_model(&mut self, mesh: Arc<Mesh>, transform: Transform) -> ModelKey {
        let mut model = Model::with_transform(mesh, transform);
        self.collider.register_static(&model);
        model.clean();

        let key = self.models.insert(model);
        self.static_models.push(key);
        key
    }

    /// Add a model whose surfaces follow it whenever it moves
    pub fn add_dynamic_model(&mut self, mesh: Arc<Mesh>, transform: Transform) -> Result<ModelKey, ColliderError> {
        let key = self.models.insert(Model::with_transform(mesh, transform));
        self.collider.register_dynamic(key, &self.models)?;
        if let Some(model) = self.models.get_mut(key) {
            model.clean();
        }
        Ok(key)
    }

    /// Remove a dynamic model and its surfaces
    ///
    /// Static models cannot be removed; their surfaces are merged.
    pub fn remove_dynamic_model(&mut self, key: ModelKey) -> Option<Model> {
        if !self.collider.unregister_dynamic(key) {
            return None;
        }
        self.models.remove(key)
    }

    /// Look up a model
    pub fn model(&self, key: ModelKey) -> Option<&Model> {
        self.models.get(key)
    }

    /// Look up a model to move it
    ///
    /// Moving a static model changes how it renders but not its surfaces.
    pub fn model_mut(&mut self, key: ModelKey) -> Option<&mut Model> {
        let is_static = self.static_models.contains(&key);
        let model = self.models.get_mut(key)?;
        if is_static {
            log::warn!("Static model {key:?} borrowed mutably; its surfaces will not follow");
        }
        Some(model)
    }

    /// All models
    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Collision surfaces, current as of the last refresh
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    /// Rebuild moved dynamic models and consume every dirty flag
    ///
    /// Call once per frame before any collision query. Returns the number of
    /// groups rebuilt.
    pub fn refresh_collision(&mut self) -> usize {
        let rebuilt = self.collider.refresh_dynamic_models(&self.models);
        self.models.clean_all();
        rebuilt
    }
}
