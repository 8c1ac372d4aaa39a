//! # Collider Engine
//!
//! Surface classification and floor/wall queries for real-time 3D scenes.
//!
//! ## Features
//!
//! - **Surface Classification**: Model triangles split into floors, walls and ceilings
//! - **Floor Queries**: Highest walkable surface under a point
//! - **Wall Queries**: Nearest wall along a horizontal ray
//! - **Dynamic Models**: Surfaces rebuilt only for models that moved
//! - **Character Stepping**: Wall sliding, step-up and falling on top of the queries
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use collider_engine::prelude::*;
//!
//! let mut world = World::new(ColliderConfig::default());
//! world.add_static_model(Arc::new(Mesh::plane(50.0)), Transform::identity());
//! world.refresh_collision();
//!
//! let floor = world.collider().find_floor(&Vec3::new(1.0, 3.0, 1.0), 1.0);
//! assert!(floor.is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

pub mod physics;
pub mod scene;

mod world;

pub use world::World;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        World,
        core::config::{ApplicationConfig, CharacterConfig, ColliderConfig, Config, EngineConfig},
        foundation::math::{Transform, Vec3},
        physics::{CharacterController, Collider, MovementState, WalkInput},
        scene::{Mesh, Model, ModelKey, ModelSource},
    };
}
