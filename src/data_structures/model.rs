//! Meshes, models and the draw calls that submit them.
//!
//! A [`Model`] owns every [`Mesh`] produced by an import and a map of the
//! unique textures those meshes share. Textures are reference counted: a mesh
//! holds an [`Arc`] to each [`MaterialTexture`] it samples, so two meshes built
//! from the same source path point at one GPU texture.

use std::{collections::HashMap, ops::Range, path::Path, sync::Arc};

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::{Texture, TextureKind},
    pipelines::material::MaterialLayout,
    resources::scene::SceneData,
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl ModelVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// A texture loaded for a material, remembered by the path it came from.
#[derive(Debug)]
pub struct MaterialTexture {
    pub kind: TextureKind,
    pub path: String,
    pub texture: Texture,
}

/// One vertex buffer, one index buffer and the textures the mesh samples.
///
/// The material bind group is built once here and never changes afterwards.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub textures: Vec<Arc<MaterialTexture>>,
    pub bind_group: wgpu::BindGroup,
}

impl Mesh {
    pub fn new(
        device: &wgpu::Device,
        materials: &MaterialLayout,
        name: &str,
        vertices: &[ModelVertex],
        indices: &[u32],
        textures: Vec<Arc<MaterialTexture>>,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let bind_group = materials.bind_group(device, name, &textures);

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
            textures,
            bind_group,
        }
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub textures: HashMap<String, Arc<MaterialTexture>>,
}

impl Model {
    /// Upload an imported scene. Each unique texture becomes one GPU texture,
    /// then one [`Mesh`] is built per imported mesh in import order.
    pub fn from_scene(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        materials: &MaterialLayout,
        scene: SceneData,
    ) -> Self {
        let uploaded = scene
            .textures
            .iter()
            .map(|data| {
                Arc::new(MaterialTexture {
                    kind: data.kind,
                    path: data.path.clone(),
                    texture: Texture::from_image(device, queue, &data.image, &data.path, data.kind),
                })
            })
            .collect::<Vec<_>>();

        let meshes = scene
            .meshes
            .iter()
            .map(|mesh| {
                let textures = mesh.textures.iter().map(|&i| uploaded[i].clone()).collect();
                Mesh::new(device, materials, &mesh.name, &mesh.vertices, &mesh.indices, textures)
            })
            .collect();

        let textures = uploaded
            .into_iter()
            .map(|texture| (texture.path.clone(), texture))
            .collect();

        Self { meshes, textures }
    }

    /// Import the file at `path` and upload it.
    pub async fn load(
        path: &Path,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        materials: &MaterialLayout,
    ) -> anyhow::Result<Self> {
        let scene = SceneData::import(path).await?;
        log::info!(
            "Imported {}: {} meshes, {} unique textures",
            path.display(),
            scene.meshes.len(),
            scene.textures.len()
        );
        Ok(Self::from_scene(device, queue, materials, scene))
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Draw calls for meshes and models, implemented on the render pass.
pub trait DrawModel<'a> {
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instance_buffer: &'a wgpu::Buffer, instances: Range<u32>);
    fn draw_model_instanced(&mut self, model: &'a Model, instance_buffer: &'a wgpu::Buffer, instances: Range<u32>);
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instance_buffer: &'b wgpu::Buffer, instances: Range<u32>) {
        self.set_bind_group(2, &mesh.bind_group, &[]);
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, instance_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }

    fn draw_model_instanced(&mut self, model: &'b Model, instance_buffer: &'b wgpu::Buffer, instances: Range<u32>) {
        for mesh in &model.meshes {
            self.draw_mesh_instanced(mesh, instance_buffer, instances.clone());
        }
    }
}
