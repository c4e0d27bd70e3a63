//! phong-demo
//!
//! A free-fly Phong lighting demo on wgpu. It opens a window and shows either
//! ten spinning textured containers or a model imported from an OBJ or glTF
//! file, lit by one directional light, four point lights and a spot light
//! mounted on the camera.
//!
//! High-level modules
//! - `app`: the winit event loop and the [`app::Scene`] trait
//! - `camera`: roll-aware free-fly camera, projection and camera uniform
//! - `config`: start-up settings and asset location
//! - `context`: window, device, surface, camera and shaders
//! - `data_structures`: vertices, meshes, models, textures and instances
//! - `input`: input queue and key bindings
//! - `pipelines`: shader programs, light uniforms and material bindings
//! - `resources`: file loading and scene import
//! - `scenes`: the cube scene and the model scene
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod input;
pub mod pipelines;
pub mod resources;
pub mod scenes;

// Re-exports commonly used crates for downstream code.
pub use cgmath;
pub use wgpu;
pub use winit;
