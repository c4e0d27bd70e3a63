//! A compiled shader program with typed uniform setters.
//!
//! Setters only stage values in the CPU copies of the uniform blocks;
//! [`Shader::flush`] writes whatever changed to the GPU once per frame.
//!
//! A program that fails to compile is kept around without a pipeline. The
//! compiler output is logged and draws through it are skipped, so the rest of
//! the scene keeps rendering.

use std::path::Path;

use anyhow::Context as _;
use cgmath::{Matrix4, Point3, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    camera::CameraUniform,
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::{
        ShaderLayouts,
        light::{DirectionalLight, LightsUniform, PointLight, SpotLight},
        mk_render_pipeline,
    },
    resources::load_string,
};

/// CPU copy of a uniform block plus the buffer and bind group it is flushed to.
#[derive(Debug)]
pub struct UniformBlock<T> {
    staged: T,
    dirty: bool,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl<T: bytemuck::Pod> UniformBlock<T> {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str, value: T) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Buffer")),
            contents: bytemuck::cast_slice(&[value]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} bind group")),
        });
        Self {
            staged: value,
            dirty: false,
            buffer,
            bind_group,
        }
    }

    pub fn stage(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.staged);
        self.dirty = true;
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if self.dirty {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.staged]));
            self.dirty = false;
        }
    }
}

#[derive(Debug)]
pub struct Shader {
    label: String,
    pipeline: Option<wgpu::RenderPipeline>,
    camera: UniformBlock<CameraUniform>,
    lights: UniformBlock<LightsUniform>,
}

impl Shader {
    /// Compile `source` and build its render pipeline.
    ///
    /// Module and pipeline creation run inside validation error scopes, so a
    /// broken program is logged and left without a pipeline instead of
    /// reaching the device's uncaptured error handler.
    pub async fn new(
        device: &wgpu::Device,
        layouts: &ShaderLayouts,
        label: &str,
        source: &str,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let module_error = scope.pop().await;
        let info = module.get_compilation_info().await;
        let mut compiled = report_compilation(label, &info.messages);
        if let Some(e) = module_error {
            if compiled {
                log::error!("{label}: {e}");
            }
            compiled = false;
        }

        let pipeline = if compiled {
            let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
            let pipeline = mk_render_pipeline(
                device,
                &layouts.pipeline_layout,
                color_format,
                Some(wgpu::BlendState::REPLACE),
                Some(Texture::DEPTH_FORMAT),
                &[ModelVertex::desc(), InstanceRaw::desc()],
                &module,
                label,
            );
            match scope.pop().await {
                None => Some(pipeline),
                Some(e) => {
                    log::error!("{label}: pipeline rejected: {e}");
                    None
                }
            }
        } else {
            None
        };
        if pipeline.is_none() {
            log::error!("Shader {label} failed to compile, draws using it are skipped");
        }

        Self {
            label: label.to_string(),
            pipeline,
            camera: UniformBlock::new(device, &layouts.camera, &format!("{label} Camera"), CameraUniform::new()),
            lights: UniformBlock::new(device, &layouts.lights, &format!("{label} Lights"), LightsUniform::new()),
        }
    }

    /// Read a WGSL file and compile it. A missing or unreadable file is an error.
    pub async fn from_file(
        device: &wgpu::Device,
        layouts: &ShaderLayouts,
        path: &Path,
        color_format: wgpu::TextureFormat,
    ) -> anyhow::Result<Self> {
        let source = load_string(path)
            .await
            .with_context(|| format!("Failed to read shader {}", path.display()))?;
        let label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(device, layouts, &label, &source, color_format).await)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_valid(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn set_view_projection(&mut self, view_proj: Matrix4<f32>) {
        self.camera.stage(|c| c.set_view_proj(view_proj));
    }

    pub fn set_view_position(&mut self, position: Point3<f32>) {
        self.camera.stage(|c| c.set_view_position(position));
    }

    pub fn set_directional_light(&mut self, light: &DirectionalLight) {
        self.lights.stage(|l| l.set_directional(light));
    }

    /// Out of range indices are reported and ignored.
    pub fn set_point_light(&mut self, index: usize, light: &PointLight) {
        let mut accepted = true;
        self.lights.stage(|l| accepted = l.set_point(index, light));
        if !accepted {
            log::warn!("Shader {}: no point light slot {index}", self.label);
        }
    }

    pub fn set_spot_light(&mut self, light: &SpotLight) {
        self.lights.stage(|l| l.set_spot(light));
    }

    pub fn set_spot_pose(&mut self, position: Point3<f32>, direction: Vector3<f32>) {
        self.lights.stage(|l| l.set_spot_pose(position, direction));
    }

    pub fn set_shininess(&mut self, shininess: f32) {
        self.lights.stage(|l| l.set_shininess(shininess));
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.camera.flush(queue);
        self.lights.flush(queue);
    }

    /// Make this program current on `pass`. Returns false when there is nothing
    /// to bind because compilation failed.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) -> bool {
        let Some(pipeline) = &self.pipeline else {
            return false;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.camera.bind_group, &[]);
        pass.set_bind_group(1, &self.lights.bind_group, &[]);
        true
    }
}

/// Log every compiler message and tell whether any of them was an error.
fn report_compilation(label: &str, messages: &[wgpu::CompilationMessage]) -> bool {
    let mut ok = true;
    for message in messages {
        let location = message
            .location
            .as_ref()
            .map(|l| format!("{}:{}", l.line_number, l.line_position))
            .unwrap_or_default();
        match message.message_type {
            wgpu::CompilationMessageType::Error => {
                ok = false;
                log::error!("{label}:{location}: {}", message.message);
            }
            wgpu::CompilationMessageType::Warning => log::warn!("{label}:{location}: {}", message.message),
            wgpu::CompilationMessageType::Info => log::info!("{label}:{location}: {}", message.message),
        }
    }
    ok
}
