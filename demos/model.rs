//! An imported model under Phong lighting.
//!
//! The model path comes from `PHONG_DEMO_MODEL` and defaults to the bundled
//! crates. Controls are the same as in the cubes demo.

use std::path::PathBuf;

use phong_demo::{app, config::Config, scenes};

const MODEL_ENV: &str = "PHONG_DEMO_MODEL";

fn main() -> anyhow::Result<()> {
    let config = Config::default();
    let path = std::env::var_os(MODEL_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.asset(scenes::model::DEFAULT_MODEL));
    app::run(config, scenes::model(path))
}
