//! Winit viewer
//!
//! Opens the window, bootstraps the GPU on the first `resumed`, and drives
//! one frame per redraw:
//!
//! ```text
//! scene.update(dt) → FrameRenderContext → RenderPipeline::render → present
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use stagelight::app::{config::ViewerConfig, winit::App};
//!
//! fn main() -> stagelight::errors::Result<()> {
//!     App::new().with_config(ViewerConfig::default()).run()
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::app::config::ViewerConfig;
use crate::config::display;
use crate::errors::{Result, StageError};
use crate::renderer::context::GpuContext;
use crate::renderer::frame::FrameRenderContext;
use crate::renderer::pipeline::RenderPipeline;
use crate::renderer::settings::{GpuSettings, PipelineSettings};
use crate::scene::scene::Scene;

pub mod input_adapter;

/// Viewer builder.
pub struct App {
    title: String,
    config: ViewerConfig,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Stage Light Visualizer".into(),
            config: ViewerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ViewerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the event loop until the window closes.
    ///
    /// The scene is built before the window opens, so a broken fixture
    /// archive fails here rather than after the GPU is up.
    pub fn run(self) -> Result<()> {
        let sources = self.config.scene_sources()?;
        let mut scene = Scene::initialize(sources);
        self.config.apply(&mut scene);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::new(self.title, self.config, scene);
        event_loop.run_app(&mut runner)?;
        runner.into_result()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU state created once the window exists.
struct Viewport {
    window: Arc<Window>,
    gpu: GpuContext,
    pipeline: RenderPipeline,
}

struct AppRunner {
    title: String,
    gpu_settings: GpuSettings,
    settings: PipelineSettings,
    scene: Scene,
    viewport: Option<Viewport>,
    last_loop_time: Instant,
    /// Startup failure that ended the event loop; returned from [`App::run`].
    fatal_error: Option<StageError>,
}

impl AppRunner {
    fn new(title: String, config: ViewerConfig, scene: Scene) -> Self {
        Self {
            title,
            gpu_settings: GpuSettings {
                vsync: config.vsync,
                ..GpuSettings::default()
            },
            settings: config.pipeline.clamped(),
            scene,
            viewport: None,
            last_loop_time: Instant::now(),
            fatal_error: None,
        }
    }

    /// Outcome of the event loop: the startup failure that ended it, if any.
    fn into_result(self) -> Result<()> {
        match self.fatal_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn init_viewport(&self, window: Arc<Window>) -> Result<Viewport> {
        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new(
            window.clone(),
            &self.gpu_settings,
            size.width,
            size.height,
        ))?;
        let pipeline = pollster::block_on(RenderPipeline::new(
            &gpu.device,
            &gpu.queue,
            gpu.surface_format(),
            &self.scene,
        ))?;

        Ok(Viewport {
            window,
            gpu,
            pipeline,
        })
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_loop_time).as_secs_f32();
        self.last_loop_time = now;

        self.scene.update(dt);

        let Some(viewport) = &mut self.viewport else {
            return;
        };

        let frame = FrameRenderContext::from_scene(&self.scene);
        let Some(output) = viewport.gpu.acquire_frame() else {
            return;
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        viewport.pipeline.render(
            &viewport.gpu.device,
            &viewport.gpu.queue,
            &frame,
            &self.settings,
            &view,
        );
        output.present();
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewport.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(display::WIDTH, display::HEIGHT));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                self.fatal_error = Some(StageError::SurfaceError(e.to_string()));
                event_loop.exit();
                return;
            }
        };

        log::info!("Initializing Renderer Backend...");

        match self.init_viewport(window) {
            Ok(viewport) => {
                log::info!(
                    "Scene initialized with {} spotlight(s)",
                    self.scene.spotlights.len()
                );
                self.viewport = Some(viewport);
                self.last_loop_time = Instant::now();
            }
            Err(e) => {
                log::error!("Fatal Renderer Error: {e}");
                self.fatal_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                // Offscreen targets stay at the display resolution.
                if let Some(viewport) = &mut self.viewport {
                    viewport.gpu.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(action) = input_adapter::translate_key_event(&event) {
                    action.apply(&mut self.scene, &mut self.settings);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(viewport) = &self.viewport {
                    viewport.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewport) = &self.viewport {
            viewport.window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::scene::SceneSources;

    fn runner() -> AppRunner {
        let scene = Scene::initialize(SceneSources::default());
        AppRunner::new("test".into(), ViewerConfig::default(), scene)
    }

    #[test]
    fn clean_exit_is_ok() {
        assert!(runner().into_result().is_ok());
    }

    #[test]
    fn startup_failure_is_returned() {
        let mut runner = runner();
        runner.fatal_error = Some(StageError::PipelineCreationFailed {
            pass: "Scene Pass",
            message: "invalid shader".to_string(),
        });

        let err = runner.into_result().unwrap_err();
        assert!(matches!(err, StageError::PipelineCreationFailed { pass: "Scene Pass", .. }));
    }
}
