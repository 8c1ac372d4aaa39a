//! Scene geometry: meshes, placed models and the model registry
//!
//! Rendering is out of scope here; a model is only what collision needs,
//! a triangle mesh, a world transform and a dirty flag.

mod mesh;
mod model;

pub use mesh::{Mesh, MeshError, Subset};
pub use model::{Model, ModelKey, ModelRegistry, ModelSource};
