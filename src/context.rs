use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{Camera, Projection},
    config::Config,
    data_structures::texture,
    pipelines::{ShaderLayouts, Shaders, material::MaterialLayout},
};

/// Window, GPU objects and the per-run state every frame needs.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: Camera,
    pub projection: Projection,
    pub layouts: ShaderLayouts,
    pub shaders: Shaders,
    pub clear_colour: wgpu::Color,
    pub asset_dir: PathBuf,
    is_surface_configured: bool,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: &Config) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter can present to the window")?;
        log::info!("Adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("Failed to open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders write linear colour and rely on an sRGB target for the conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface reports no texture formats")?;
        // Auto modes pick a supported mode themselves.
        let present_mode = settings.present_mode();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let mut camera = Camera::new(settings.camera_position);
        camera.movement_speed = settings.movement_speed;
        camera.mouse_sensitivity = settings.mouse_sensitivity;
        let projection = Projection::new(config.width, config.height, settings.znear, settings.zfar);

        let depth_texture =
            texture::Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        let layouts = ShaderLayouts::new(&device, &queue);
        let shaders = Shaders::load(&device, &layouts, &settings.asset_dir, surface_format).await?;

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            layouts,
            shaders,
            clear_colour: settings.clear_colour,
            asset_dir: settings.asset_dir.clone(),
            is_surface_configured: false,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn is_surface_configured(&self) -> bool {
        self.is_surface_configured
    }

    /// Reconfigure the surface, depth buffer and projection. A zero sized
    /// window (minimised) is ignored until it has an area again.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.is_surface_configured = true;
            self.projection.resize(width, height);
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = texture::Texture::create_depth_texture(
                &self.device,
                [self.config.width, self.config.height],
                "depth_texture",
            );
        }
    }

    /// Stage this frame's camera and spot light values in every shader and
    /// upload them.
    pub fn update_uniforms(&mut self) {
        let view_proj = self.projection.calc_matrix(self.camera.fov()) * self.camera.view_matrix();
        let position = self.camera.position;
        for shader in self.shaders.iter_mut() {
            shader.set_view_projection(view_proj);
            shader.set_view_position(position);
        }
        // The spot light is a flashlight held by the camera.
        self.shaders.phong.set_spot_pose(position, self.camera.front());
        for shader in self.shaders.iter_mut() {
            shader.flush(&self.queue);
        }
    }
}

/// What a scene needs to build its GPU resources. Handles are cloned out of
/// the [`Context`] so scene construction can own them across awaits.
#[derive(Clone, Debug)]
pub struct LoadContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub materials: MaterialLayout,
    pub asset_dir: PathBuf,
}

impl LoadContext {
    pub fn asset(&self, relative: &str) -> PathBuf {
        self.asset_dir.join(relative)
    }
}

impl From<&Context> for LoadContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            materials: ctx.layouts.material.clone(),
            asset_dir: ctx.asset_dir.clone(),
        }
    }
}
