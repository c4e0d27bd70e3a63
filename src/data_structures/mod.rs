//! Renderer data structures: models, textures and instances.
//!
//! - `model` contains vertices, meshes, models and the draw calls that submit them
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data
//! - `cube` is the unit cube used by the crates and the lamps

pub mod cube;
pub mod instance;
pub mod model;
pub mod texture;
