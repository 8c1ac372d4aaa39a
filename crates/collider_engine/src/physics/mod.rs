//! Surface collision for triangle-mesh scenes
//!
//! Model triangles are classified into floors, walls and ceilings by the
//! vertical component of their face normal. The [`Collider`] answers two
//! questions against those surfaces: which floor is under a point, and which
//! wall is in front of it. [`CharacterController`] walks a character over the
//! result.

pub mod character;
pub mod collider;
pub mod surface;
pub mod surface_group;

pub use character::{CharacterController, MovementState, StepResult, WalkInput};
pub use collider::{Collider, ColliderError, FloorHit, WallHit};
pub use surface::{Surface, MIN_HEIGHT_NORMAL_Y};
pub use surface_group::{SurfaceCounts, SurfaceGroup, SurfaceKind};
