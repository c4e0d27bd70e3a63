//! Render pipelines and the bind group layouts they share.
//!
//! Every program in the demo uses the same pipeline layout:
//!
//! - group 0: camera uniform
//! - group 1: lights uniform
//! - group 2: material textures and sampler
//!
//! The lamp program ignores groups 1 and 2 but keeps them in its layout, so a
//! mesh draws the same way whichever program is bound.

use std::path::Path;

use crate::pipelines::{material::MaterialLayout, shader::Shader};

pub mod light;
pub mod material;
pub mod shader;

pub const PHONG_SHADER: &str = "shaders/phong.wgsl";
pub const LAMP_SHADER: &str = "shaders/lamp.wgsl";

#[derive(Clone, Debug)]
pub struct ShaderLayouts {
    pub camera: wgpu::BindGroupLayout,
    pub lights: wgpu::BindGroupLayout,
    pub material: MaterialLayout,
    pub pipeline_layout: wgpu::PipelineLayout,
}

impl ShaderLayouts {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let camera = mk_uniform_layout(device, "camera_bind_group_layout");
        let lights = mk_uniform_layout(device, "lights_bind_group_layout");
        let material = MaterialLayout::new(device, queue);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[Some(&camera), Some(&lights), Some(&material.layout)],
            immediate_size: 0,
        });
        Self {
            camera,
            lights,
            material,
            pipeline_layout,
        }
    }
}

fn mk_uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

/// The two programs the scenes draw with.
#[derive(Debug)]
pub struct Shaders {
    /// Lit, textured surfaces.
    pub phong: Shader,
    /// Unlit white lamp cubes.
    pub lamp: Shader,
}

impl Shaders {
    pub async fn load(
        device: &wgpu::Device,
        layouts: &ShaderLayouts,
        asset_dir: &Path,
        color_format: wgpu::TextureFormat,
    ) -> anyhow::Result<Self> {
        let phong = Shader::from_file(device, layouts, &asset_dir.join(PHONG_SHADER), color_format).await?;
        let lamp = Shader::from_file(device, layouts, &asset_dir.join(LAMP_SHADER), color_format).await?;

        let shaders = Self { phong, lamp };
        for shader in [&shaders.phong, &shaders.lamp] {
            if shader.is_valid() {
                log::info!("Shader {} ready", shader.label());
            }
        }
        Ok(shaders)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Shader> {
        [&mut self.phong, &mut self.lamp].into_iter()
    }
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
