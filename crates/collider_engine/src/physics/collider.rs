//! Floor and wall queries against a scene of surface groups
//!
//! The [`Collider`] owns one static [`SurfaceGroup`] that every static model
//! is appended to, plus one group per dynamic model keyed by [`ModelKey`].
//! Queries scan every group as a single sequence (static first) with no
//! broad phase.
//!
//! Per frame, call [`Collider::refresh_dynamic_models`] before any query.
//! Queries take `&self` and never touch geometry.

use slotmap::SecondaryMap;
use thiserror::Error;

use super::surface::Surface;
use super::surface_group::{SurfaceCounts, SurfaceGroup};
use crate::core::config::ColliderConfig;
use crate::foundation::math::Vec3;
use crate::scene::{ModelKey, ModelRegistry, ModelSource};

/// Collider errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColliderError {
    /// The key does not refer to a live model in the registry
    #[error("model {0:?} is not in the registry")]
    UnknownModel(ModelKey),
}

/// The highest floor under a query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorHit<'a> {
    /// The floor surface
    pub surface: &'a Surface,
    /// World Y of the floor at the query point
    pub height: f32,
}

/// The nearest wall along a query ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit<'a> {
    /// The wall surface
    pub surface: &'a Surface,
    /// Distance from the (offset) ray origin to the hit
    pub distance: f32,
}

/// Scene-wide floor/wall query engine
#[derive(Debug, Default)]
pub struct Collider {
    config: ColliderConfig,
    static_group: SurfaceGroup,
    dynamic_groups: SecondaryMap<ModelKey, SurfaceGroup>,
    rebuild_count: u64,
}

impl Collider {
    /// Create an empty collider
    pub fn new(config: ColliderConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Classification settings in use
    pub fn config(&self) -> &ColliderConfig {
        &self.config
    }

    /// Append a static model's geometry to the static group
    ///
    /// Static geometry is never refreshed; register it during load.
    pub fn register_static(&mut self, model: &impl ModelSource) {
        self.static_group.append_model(model, &self.config);
        log::debug!(
            "Registered static model ({} triangles)",
            model.mesh().triangle_count()
        );
    }

    /// Track a dynamic model and build its group immediately
    ///
    /// Registering a key twice rebuilds its group.
    pub fn register_dynamic(&mut self, key: ModelKey, models: &ModelRegistry) -> Result<(), ColliderError> {
        let model = models.get(key).ok_or(ColliderError::UnknownModel(key))?;
        let group = SurfaceGroup::from_model(model, &self.config);
        log::debug!("Registered dynamic model {key:?} ({} surfaces)", group.len());
        self.dynamic_groups.insert(key, group);
        Ok(())
    }

    /// Stop tracking a dynamic model, returning whether it was tracked
    pub fn unregister_dynamic(&mut self, key: ModelKey) -> bool {
        self.dynamic_groups.remove(key).is_some()
    }

    /// Rebuild the group of every dynamic model that reports dirty
    ///
    /// Dirty flags are only read, never cleared. Entries whose model has left
    /// the registry are dropped. Returns the number of groups rebuilt.
    pub fn refresh_dynamic_models(&mut self, models: &ModelRegistry) -> usize {
        let mut stale = Vec::new();
        let mut rebuilt = 0;

        for (key, group) in &mut self.dynamic_groups {
            match models.get(key) {
                Some(model) if model.is_dirty() => {
                    group.rebuild(model, &self.config);
                    rebuilt += 1;
                }
                Some(_) => {}
                None => stale.push(key),
            }
        }

        for key in stale {
            log::warn!("Dynamic model {key:?} left the registry; dropping its surfaces");
            self.dynamic_groups.remove(key);
        }

        self.rebuild_count += rebuilt as u64;
        rebuilt
    }

    /// Highest floor at or below `point.y + offset_y` under (x, z)
    ///
    /// Ties keep the first surface found (static group first).
    pub fn find_floor(&self, point: &Vec3, offset_y: f32) -> Option<FloorHit<'_>> {
        let probe_y = point.y + offset_y;
        let mut best: Option<FloorHit<'_>> = None;

        for surface in self.groups().flat_map(SurfaceGroup::floors) {
            // Entirely above the probe
            if surface.min_y > probe_y {
                continue;
            }
            if !surface.within_bound(point.x, point.z) {
                continue;
            }
            let Some(height) = surface.height_at(point.x, point.z) else {
                continue;
            };
            // Keep the highest floor
            if best.is_some_and(|b| height <= b.height) {
                continue;
            }
            // Probe already below this floor
            if probe_y < height {
                continue;
            }
            best = Some(FloorHit { surface, height });
        }

        best
    }

    /// Nearest wall hit by a ray from `origin` raised by `offset_y`
    ///
    /// `direction` need not be unit length; distances are measured in world
    /// units. A zero direction hits nothing.
    pub fn find_wall(&self, origin: &Vec3, direction: &Vec3, offset_y: f32) -> Option<WallHit<'_>> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        let origin = Vec3::new(origin.x, origin.y + offset_y, origin.z);
        let mut best: Option<WallHit<'_>> = None;

        for surface in self.groups().flat_map(SurfaceGroup::walls) {
            if origin.y < surface.min_y || origin.y > surface.max_y {
                continue;
            }
            let Some(distance) = surface.intersect_ray(&origin, &direction) else {
                continue;
            };
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(WallHit { surface, distance });
            }
        }

        best
    }

    /// Static group followed by every dynamic group
    pub fn groups(&self) -> impl Iterator<Item = &SurfaceGroup> {
        std::iter::once(&self.static_group).chain(self.dynamic_groups.values())
    }

    /// The group holding all static geometry
    pub fn static_group(&self) -> &SurfaceGroup {
        &self.static_group
    }

    /// The group of one dynamic model
    pub fn dynamic_group(&self, key: ModelKey) -> Option<&SurfaceGroup> {
        self.dynamic_groups.get(key)
    }

    /// Number of tracked dynamic models
    pub fn dynamic_count(&self) -> usize {
        self.dynamic_groups.len()
    }

    /// Total dynamic group rebuilds performed by refreshes
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Surface counts summed over all groups
    pub fn surface_counts(&self) -> SurfaceCounts {
        self.groups()
            .map(SurfaceGroup::counts)
            .fold(SurfaceCounts::default(), |acc, counts| acc + counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use crate::scene::{Mesh, Model};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    const EPSILON: f32 = 1e-5;

    fn plane_at(y: f32, half_extent: f32) -> Model {
        Model::with_transform(
            Arc::new(Mesh::plane(half_extent)),
            Transform::from_position(Vec3::new(0.0, y, 0.0)),
        )
    }

    /// Vertical quad in the plane z = `z`, spanning x in [-1, 1] and y in [0, 4]
    fn wall_at(z: f32) -> Model {
        let positions = vec![
            Vec3::new(1.0, 0.0, z),
            Vec3::new(-1.0, 0.0, z),
            Vec3::new(-1.0, 4.0, z),
            Vec3::new(1.0, 4.0, z),
        ];
        let mesh = Mesh::single_subset(positions, vec![0, 1, 2, 2, 3, 0]).unwrap();
        Model::new(Arc::new(mesh))
    }

    #[test]
    fn test_unit_cube_scenario() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&Model::new(Arc::new(Mesh::unit_cube())));

        let hit = collider.find_floor(&Vec3::new(0.0, 5.0, 0.0), 0.0).unwrap();
        assert_relative_eq!(hit.height, 0.5, epsilon = EPSILON);
        assert!(hit.surface.normal.y > 0.99);
        // First top-face triangle wins the tie on the shared diagonal
        assert_eq!(hit.surface, &collider.static_group().floors()[0]);

        // The bottom face is a ceiling, so nothing is below the cube
        assert!(collider.find_floor(&Vec3::new(0.0, -5.0, 0.0), 0.0).is_none());
    }

    #[test]
    fn test_find_floor_highest_wins() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&plane_at(0.0, 10.0));
        collider.register_static(&plane_at(3.0, 10.0));

        let hit = collider.find_floor(&Vec3::new(1.0, 10.0, 1.0), 0.0).unwrap();
        assert_relative_eq!(hit.height, 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_find_floor_ignores_floors_above_probe() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&plane_at(0.0, 10.0));
        collider.register_static(&plane_at(3.0, 10.0));

        let hit = collider.find_floor(&Vec3::new(1.0, 2.0, 1.0), 0.0).unwrap();
        assert_relative_eq!(hit.height, 0.0, epsilon = EPSILON);

        // Raising the probe reaches the upper floor
        let hit = collider.find_floor(&Vec3::new(1.0, 2.0, 1.0), 1.5).unwrap();
        assert_relative_eq!(hit.height, 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_find_floor_standing_exactly_on_surface() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&plane_at(2.0, 10.0));

        let hit = collider.find_floor(&Vec3::new(0.3, 2.0, -0.7), 0.0).unwrap();
        assert_relative_eq!(hit.height, 2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_find_floor_outside_all_floors() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&plane_at(0.0, 10.0));

        assert!(collider.find_floor(&Vec3::new(20.0, 5.0, 0.0), 0.0).is_none());
    }

    #[test]
    fn test_find_floor_spans_static_and_dynamic_groups() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&plane_at(0.0, 10.0));

        let platform = models.insert(plane_at(1.0, 2.0));
        collider.register_dynamic(platform, &models).unwrap();

        let hit = collider.find_floor(&Vec3::new(0.0, 5.0, 0.0), 0.0).unwrap();
        assert_relative_eq!(hit.height, 1.0, epsilon = EPSILON);

        let hit = collider.find_floor(&Vec3::new(5.0, 5.0, 0.0), 0.0).unwrap();
        assert_relative_eq!(hit.height, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_find_wall_nearest_wins() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&wall_at(8.0));
        collider.register_static(&wall_at(5.0));

        let hit = collider
            .find_wall(&Vec3::new(0.3, 0.0, 0.0), &Vec3::new(0.0, 0.0, 1.0), 2.0)
            .unwrap();
        assert_relative_eq!(hit.distance, 5.0, epsilon = EPSILON);
        assert_relative_eq!(hit.surface.v1.z, 5.0);
    }

    #[test]
    fn test_find_wall_distance_ignores_direction_length() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&wall_at(5.0));

        let hit = collider
            .find_wall(&Vec3::new(0.0, 0.0, 1.0), &Vec3::new(0.0, 0.0, 10.0), 1.0)
            .unwrap();
        assert_relative_eq!(hit.distance, 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_find_wall_vertical_reject() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&wall_at(5.0));

        // Probe above the top of the wall
        let origin = Vec3::new(0.0, 3.0, 0.0);
        assert!(collider.find_wall(&origin, &Vec3::new(0.0, 0.0, 1.0), 2.0).is_none());
        assert!(collider.find_wall(&origin, &Vec3::new(0.0, 0.0, 1.0), 0.0).is_some());
    }

    #[test]
    fn test_vertical_margin_widens_wall_reject() {
        // Starts 0.3 above the top of the wall and angles down into it
        let origin = Vec3::zeros();
        let direction = Vec3::new(0.0, -0.1, 1.0);

        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&wall_at(5.0));
        assert!(collider.find_wall(&origin, &direction, 4.3).is_none());

        let mut collider = Collider::new(ColliderConfig::default().with_vertical_margin(0.5));
        collider.register_static(&wall_at(5.0));
        assert_relative_eq!(collider.config().vertical_margin, 0.5);

        let hit = collider.find_wall(&origin, &direction, 4.3).unwrap();
        assert_relative_eq!(hit.distance, 5.0 * 1.01f32.sqrt(), epsilon = EPSILON);
    }

    #[test]
    fn test_find_wall_degenerate_inputs() {
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&wall_at(5.0));

        assert!(collider.find_wall(&Vec3::zeros(), &Vec3::zeros(), 1.0).is_none());
        // Pointing away
        assert!(collider
            .find_wall(&Vec3::zeros(), &Vec3::new(0.0, 0.0, -1.0), 1.0)
            .is_none());
    }

    #[test]
    fn test_refresh_skips_clean_models() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        let a = models.insert(Model::new(Arc::new(Mesh::unit_cube())));
        let b = models.insert(Model::new(Arc::new(Mesh::unit_cube())));
        collider.register_dynamic(a, &models).unwrap();
        collider.register_dynamic(b, &models).unwrap();
        models.clean_all();

        assert_eq!(collider.refresh_dynamic_models(&models), 0);
        assert_eq!(collider.rebuild_count(), 0);

        models.get_mut(b).unwrap().translate(0.0, 10.0, 0.0);
        assert_eq!(collider.refresh_dynamic_models(&models), 1);
        assert_eq!(collider.rebuild_count(), 1);

        // Only b moved
        let a_top = collider.dynamic_group(a).unwrap().floors()[0].max_y;
        let b_top = collider.dynamic_group(b).unwrap().floors()[0].max_y;
        assert_relative_eq!(a_top, 0.5, epsilon = EPSILON);
        assert_relative_eq!(b_top, 10.5, epsilon = EPSILON);
    }

    #[test]
    fn test_refresh_never_clears_dirty_flags() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        let key = models.insert(Model::new(Arc::new(Mesh::unit_cube())));
        collider.register_dynamic(key, &models).unwrap();

        assert_eq!(collider.refresh_dynamic_models(&models), 1);
        assert!(models.get(key).unwrap().is_dirty());
        assert_eq!(collider.refresh_dynamic_models(&models), 1);
        assert_eq!(collider.rebuild_count(), 2);
    }

    #[test]
    fn test_moved_dynamic_model_changes_queries() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        let key = models.insert(plane_at(1.0, 2.0));
        collider.register_dynamic(key, &models).unwrap();
        models.clean_all();

        models.get_mut(key).unwrap().translate(20.0, 1.0, 0.0);
        // Not refreshed yet: the old position still answers
        assert!(collider.find_floor(&Vec3::new(0.0, 5.0, 0.0), 0.0).is_some());

        collider.refresh_dynamic_models(&models);
        assert!(collider.find_floor(&Vec3::new(0.0, 5.0, 0.0), 0.0).is_none());
        assert!(collider.find_floor(&Vec3::new(20.0, 5.0, 0.0), 0.0).is_some());
    }

    #[test]
    fn test_swapped_mesh_rebuilds_on_refresh() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        let key = models.insert(Model::new(Arc::new(Mesh::unit_cube())));
        collider.register_dynamic(key, &models).unwrap();
        models.clean_all();

        let model = models.get_mut(key).unwrap();
        model.set_mesh(Arc::new(Mesh::plane(4.0)));
        assert!(model.is_dirty());

        assert_eq!(collider.refresh_dynamic_models(&models), 1);
        let counts = collider.dynamic_group(key).unwrap().counts();
        assert_eq!(counts, SurfaceCounts { floors: 2, walls: 0, ceilings: 0 });

        let hit = collider.find_floor(&Vec3::new(3.0, 1.0, 3.0), 0.0).unwrap();
        assert_relative_eq!(hit.height, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_set_transform_moves_surfaces() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        let key = models.insert(plane_at(0.0, 2.0));
        collider.register_dynamic(key, &models).unwrap();
        models.clean_all();

        models
            .get_mut(key)
            .unwrap()
            .set_transform(Transform::from_position(Vec3::new(0.0, 6.0, 0.0)).with_uniform_scale(3.0));
        assert_relative_eq!(models.get(key).unwrap().transform().scale.x, 3.0);
        collider.refresh_dynamic_models(&models);

        let hit = collider.find_floor(&Vec3::new(5.0, 10.0, 5.0), 0.0).unwrap();
        assert_relative_eq!(hit.height, 6.0, epsilon = EPSILON);
    }

    #[test]
    fn test_register_unknown_model() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        let key = models.insert(plane_at(0.0, 1.0));
        models.remove(key);

        assert_eq!(collider.register_dynamic(key, &models), Err(ColliderError::UnknownModel(key)));
        assert_eq!(collider.dynamic_count(), 0);
    }

    #[test]
    fn test_removed_model_is_dropped_on_refresh() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        let key = models.insert(plane_at(0.0, 1.0));
        collider.register_dynamic(key, &models).unwrap();

        models.remove(key);
        assert_eq!(collider.refresh_dynamic_models(&models), 0);
        assert_eq!(collider.dynamic_count(), 0);
        assert!(!collider.unregister_dynamic(key));
    }

    #[test]
    fn test_surface_counts_sum_groups() {
        let mut models = ModelRegistry::new();
        let mut collider = Collider::new(ColliderConfig::default());
        collider.register_static(&Model::new(Arc::new(Mesh::unit_cube())));
        let key = models.insert(Model::new(Arc::new(Mesh::unit_cube())));
        collider.register_dynamic(key, &models).unwrap();

        let counts = collider.surface_counts();
        assert_eq!(counts, SurfaceCounts { floors: 4, walls: 16, ceilings: 4 });
        assert_eq!(collider.groups().count(), 2);
    }
}
