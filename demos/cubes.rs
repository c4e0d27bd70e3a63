//! Ten spinning containers under Phong lighting.
//!
//! WASD moves, Q/E rises and sinks, Z/C rolls, R levels the camera, the mouse
//! looks around and the wheel zooms. Hold left shift to move faster, F11
//! toggles fullscreen and Escape quits.

use phong_demo::{app, config::Config, scenes};

fn main() -> anyhow::Result<()> {
    app::run(Config::default(), scenes::cubes())
}
