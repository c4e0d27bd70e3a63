//! The two scenes the demo can show.
//!
//! - `cubes`: ten spinning textured containers
//! - `model`: one model imported from an OBJ or glTF file
//!
//! Both draw the four point lights as small white lamp cubes.

use std::path::PathBuf;

use crate::{
    app::{Scene, SceneConstructor},
    context::{Context, LoadContext},
    data_structures::{
        cube::{cube_indices, cube_vertices},
        instance::{Instance, mk_instance_buffer},
        model::{DrawModel, Mesh},
    },
    pipelines::light::POINT_LIGHT_POSITIONS,
};

pub mod cubes;
pub mod model;

pub use cubes::CubeScene;
pub use model::ModelScene;

pub fn cubes() -> SceneConstructor {
    Box::new(|load| {
        Box::pin(async move {
            let scene = CubeScene::new(load).await?;
            Ok(Box::new(scene) as Box<dyn Scene>)
        })
    })
}

pub fn model(path: PathBuf) -> SceneConstructor {
    Box::new(move |load| {
        Box::pin(async move {
            let scene = ModelScene::new(load, &path).await;
            Ok(Box::new(scene) as Box<dyn Scene>)
        })
    })
}

/// Unit cubes drawn unlit at the point light positions.
#[derive(Debug)]
pub struct Lamps {
    mesh: Mesh,
    instance_buffer: wgpu::Buffer,
    count: u32,
}

impl Lamps {
    pub fn new(load: &LoadContext) -> Self {
        let mesh = Mesh::new(
            &load.device,
            &load.materials,
            "lamp",
            &cube_vertices(),
            &cube_indices(),
            Vec::new(),
        );
        let instances = lamp_instances();
        let instance_buffer = mk_instance_buffer(&load.device, &instances, "Lamp Instance Buffer");
        Self {
            mesh,
            instance_buffer,
            count: instances.len() as u32,
        }
    }

    pub fn draw<'a>(&'a self, ctx: &'a Context, pass: &mut wgpu::RenderPass<'a>) {
        if ctx.shaders.lamp.bind(pass) {
            pass.draw_mesh_instanced(&self.mesh, &self.instance_buffer, 0..self.count);
        }
    }
}

fn lamp_instances() -> Vec<Instance> {
    POINT_LIGHT_POSITIONS
        .iter()
        .map(|&position| Instance::from(cgmath::Vector3::from(position)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_lamp_per_point_light() {
        let lamps = lamp_instances();
        assert_eq!(lamps.len(), POINT_LIGHT_POSITIONS.len());
        assert_eq!(lamps[1].position, cgmath::Vector3::new(2.3, -3.3, -4.0));
        assert_eq!(lamps[1].scale, cgmath::Vector3::new(1.0, 1.0, 1.0));
    }
}
