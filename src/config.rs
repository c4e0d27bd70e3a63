//! Start-up configuration.
//!
//! Everything here is fixed before the window opens. Asset paths are compiled
//! in relative to the crate root; `PHONG_DEMO_ASSETS` points the demo at a
//! different asset directory without rebuilding.

use std::path::PathBuf;

/// Environment variable that overrides [`Config::asset_dir`].
pub const ASSET_DIR_ENV: &str = "PHONG_DEMO_ASSETS";

#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_colour: wgpu::Color,
    pub asset_dir: PathBuf,
    pub camera_position: [f32; 3],
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub znear: f32,
    pub zfar: f32,
    pub vsync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Hello!".to_string(),
            width: 800,
            height: 600,
            clear_colour: wgpu::Color {
                r: 0.05,
                g: 0.08,
                b: 0.1,
                a: 1.0,
            },
            asset_dir: default_asset_dir(),
            camera_position: [0.0, 0.0, 3.0],
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            znear: 0.1,
            zfar: 100.0,
            vsync: true,
        }
    }
}

impl Config {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Resolve a path relative to the asset directory.
    pub fn asset(&self, relative: &str) -> PathBuf {
        self.asset_dir.join(relative)
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

fn default_asset_dir() -> PathBuf {
    std::env::var_os(ASSET_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"))
}
