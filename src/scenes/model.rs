use std::path::Path;

use instant::Duration;

use crate::{
    app::Scene,
    context::{Context, LoadContext},
    data_structures::{
        instance::{Instance, mk_instance_buffer},
        model::{DrawModel, Model},
    },
    scenes::Lamps,
};

/// Path of the bundled model, relative to the asset directory.
pub const DEFAULT_MODEL: &str = "models/crates/crates.obj";

/// One imported model at the origin.
pub struct ModelScene {
    model: Model,
    instance_buffer: wgpu::Buffer,
    lamps: Lamps,
}

impl ModelScene {
    /// A model that fails to import is logged and replaced by an empty one, so
    /// the window still opens with just the lamps.
    pub async fn new(load: LoadContext, path: &Path) -> Self {
        let model = match Model::load(path, &load.device, &load.queue, &load.materials).await {
            Ok(model) => model,
            Err(e) => {
                log::error!("Failed to load model {}: {e:#}", path.display());
                Model::default()
            }
        };
        if model.is_empty() {
            log::warn!("Model {} has nothing to draw", path.display());
        }
        let instance_buffer = mk_instance_buffer(&load.device, &[Instance::new()], "Model Instance Buffer");
        Self {
            model,
            instance_buffer,
            lamps: Lamps::new(&load),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

impl Scene for ModelScene {
    fn update(&mut self, _ctx: &Context, _dt: Duration) {}

    fn draw<'a>(&'a self, ctx: &'a Context, pass: &mut wgpu::RenderPass<'a>) {
        if ctx.shaders.phong.bind(pass) {
            pass.draw_model_instanced(&self.model, &self.instance_buffer, 0..1);
        }
        self.lamps.draw(ctx, pass);
    }
}
