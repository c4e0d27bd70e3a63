//! Application event loop.
//!
//! A [`Scene`] is what the window shows: it owns its meshes and instances,
//! advances its own animation and records its draw calls. The [`App`] owns
//! everything else and runs the same sequence on every redraw:
//!
//! 1. drain the input queue into the camera and window requests
//! 2. move the camera by the keys still held
//! 3. push camera and spot light uniforms to the shaders
//! 4. let the scene update
//! 5. record the frame and present it
//!
//! Window, device and scene set-up run once in `resumed`, blocking on the
//! tokio runtime before the first frame.

use std::{future::Future, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{CursorGrabMode, Fullscreen, Window, WindowId},
};

use crate::{
    config::Config,
    context::{Context, LoadContext},
    input::{InputEvent, InputQueue, InputState, WindowRequest},
};

/// Something the window can show.
pub trait Scene {
    /// Advance animation by `dt`. Called once per frame after the camera moved.
    fn update(&mut self, ctx: &Context, dt: Duration);

    /// Record draw calls into the frame's render pass.
    fn draw<'a>(&'a self, ctx: &'a Context, pass: &mut wgpu::RenderPass<'a>);
}

/// Builds the scene once the device exists.
pub type SceneConstructor =
    Box<dyn FnOnce(LoadContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn Scene>>>>>>;

/// Counts frames and reports the rate roughly once per second.
#[derive(Debug, Default)]
pub struct FrameCounter {
    frames: u32,
    elapsed: Duration,
}

impl FrameCounter {
    pub fn tick(&mut self, dt: Duration) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed.as_secs_f32();
        self.frames = 0;
        self.elapsed = Duration::ZERO;
        Some(fps)
    }
}

/// Time since the previous frame.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }

    /// Start measuring from now, dropping whatever time passed before.
    pub fn restart(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

struct AppState {
    ctx: Context,
    scene: Box<dyn Scene>,
}

impl AppState {
    fn render(&self) -> FrameStatus {
        if !self.ctx.is_surface_configured() {
            return FrameStatus::Skipped;
        }
        let (output, suboptimal) = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => (output, false),
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => (output, true),
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                return FrameStatus::Skipped;
            }
            wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                return FrameStatus::Reconfigure;
            }
            wgpu::CurrentSurfaceTexture::Validation => {
                log::error!("Unable to acquire the next frame");
                return FrameStatus::Skipped;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            self.scene.draw(&self.ctx, &mut render_pass);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        if suboptimal {
            FrameStatus::Reconfigure
        } else {
            FrameStatus::Presented
        }
    }
}

/// What became of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameStatus {
    Presented,
    Skipped,
    /// The surface no longer matches the window and has to be configured again.
    Reconfigure,
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    settings: Config,
    state: Option<AppState>,
    // Taken on the first `resumed`.
    constructor: Option<SceneConstructor>,
    input: InputQueue,
    input_state: InputState,
    frames: FrameCounter,
    clock: FrameClock,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Config, constructor: SceneConstructor) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            settings,
            state: None,
            constructor: Some(constructor),
            input: InputQueue::new(),
            input_state: InputState::new(),
            frames: FrameCounter::default(),
            clock: FrameClock::new(),
            error: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop, constructor: SceneConstructor) -> anyhow::Result<AppState> {
        let window_attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(self.settings.width, self.settings.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        grab_cursor(&window);

        let settings = &self.settings;
        let (mut ctx, scene) = self.async_runtime.block_on(async move {
            let ctx = Context::new(window, settings).await?;
            let scene = constructor((&ctx).into()).await?;
            anyhow::Ok((ctx, scene))
        })?;

        let size = ctx.window().inner_size();
        ctx.resize(size.width, size.height);
        ctx.window().request_redraw();
        log::info!("Start-up finished, entering the frame loop");
        Ok(AppState { ctx, scene })
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let dt = self.clock.tick();

        for event in self.input.drain() {
            match self.input_state.handle(event, &mut state.ctx.camera) {
                Some(WindowRequest::Close) => {
                    log::info!("Close requested, exiting");
                    event_loop.exit();
                    return;
                }
                Some(WindowRequest::ToggleFullscreen) => toggle_fullscreen(state.ctx.window()),
                Some(WindowRequest::Resize { width, height }) => state.ctx.resize(width, height),
                Some(WindowRequest::GrabCursor) => grab_cursor(state.ctx.window()),
                None => {}
            }
        }
        self.input_state
            .apply_held_keys(&mut state.ctx.camera, dt.as_secs_f32());

        state.ctx.update_uniforms();
        state.scene.update(&state.ctx, dt);

        if state.render() == FrameStatus::Reconfigure {
            let size = state.ctx.window().inner_size();
            state.ctx.resize(size.width, size.height);
        }

        if let Some(fps) = self.frames.tick(dt) {
            log::debug!("{fps:.1} frames per second");
            state
                .ctx
                .window()
                .set_title(&format!("{} ({fps:.0} fps)", self.settings.title));
        }
        state.ctx.window().request_redraw();
    }
}

fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        log::warn!("Could not grab the cursor: {e}");
    }
    window.set_cursor_visible(false);
}

fn toggle_fullscreen(window: &Window) {
    if window.fullscreen().is_some() {
        window.set_fullscreen(None);
    } else {
        window.set_fullscreen(Some(Fullscreen::Borderless(window.current_monitor())));
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructor) = self.constructor.take() else {
            return;
        };
        match self.init(event_loop, constructor) {
            Ok(state) => {
                // Start-up time is not part of the first frame.
                self.clock.restart();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Start-up failed: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(event) = InputEvent::from_device_event(&event) {
            self.input.push(event);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::RedrawRequested = event {
            self.frame(event_loop);
        } else if let Some(event) = InputEvent::from_window_event(&event) {
            self.input.push(event);
        }
    }
}

/// Open the window, build the scene and run until the window closes.
///
/// Logging goes through `env_logger`; `RUST_LOG` picks the filter and
/// defaults to `info`.
pub fn run(settings: Config, constructor: SceneConstructor) -> anyhow::Result<()> {
    let logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
    if let Err(e) = logger {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings, constructor)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
