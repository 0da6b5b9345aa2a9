//! Windowed viewer.
//!
//! Opens a winit window, draws the field with [`GpuRenderer`] and drives a
//! [`FrameLoop`] from redraw requests. The window is the resize observer:
//! every non-zero resize regenerates the field for the new bounds.
//!
//! Controls:
//! - `Space` pause / resume
//! - `R` re-seed the field
//! - `P` toggle cursor interaction
//! - `Esc` quit

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::FieldConfig;
use crate::error::ViewerError;
use crate::field::ParticleField;
use crate::gpu::GpuRenderer;
use crate::input::{Input, KeyCode};
use crate::ticker::{FrameLoop, Subscription, TickOutcome};
use crate::time::Clock;

/// Open a window and animate `config` until it is closed.
///
/// `seed` makes the initial field reproducible; without it the field is
/// seeded from OS entropy.
pub fn run(config: FieldConfig, seed: Option<u64>) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, seed);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    config: FieldConfig,
    rng: StdRng,
    frames: FrameLoop,
    subscription: Option<Subscription>,
    window: Option<Arc<Window>>,
    renderer: Option<GpuRenderer>,
    input: Input,
    error: Option<ViewerError>,
}

impl App {
    fn new(config: FieldConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clock = Clock::new(config.step);
        Self {
            config,
            rng,
            frames: FrameLoop::new(ParticleField::new(), clock),
            subscription: None,
            window: None,
            renderer: None,
            input: Input::new(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let attrs = Window::default_attributes()
            .with_title("Constellation")
            .with_inner_size(LogicalSize::new(
                self.config.viewport.width as f64,
                self.config.viewport.height as f64,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let renderer = pollster::block_on(GpuRenderer::new(window.clone()))?;

        // the field lives in physical pixels, same as cursor events
        let size = window.inner_size();
        let config = self
            .config
            .clone()
            .with_viewport(size.width as f32, size.height as f32);
        // rejected configs still run, rendering blank; the field logs why
        let _ = self.frames.field_mut().initialize(config, &mut self.rng);

        self.subscription = Some(self.frames.subscribe());
        info!(
            width = size.width,
            height = size.height,
            particles = self.frames.field().particles().map_or(0, |s| s.len()),
            "viewer started"
        );

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.frames.field_mut().teardown();
        info!("viewer closed");
        event_loop.exit();
    }

    fn handle_keys(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Escape) {
            self.shutdown(event_loop);
            return;
        }
        if self.input.key_pressed(KeyCode::Space) {
            let clock = self.frames.clock_mut();
            clock.toggle_pause();
            info!(paused = clock.is_paused(), "toggled pause");
        }
        if self.input.key_pressed(KeyCode::R) {
            match self.frames.field_mut().reseed(&mut self.rng) {
                Ok(()) => info!("reseeded field"),
                Err(err) => warn!(error = %err, "reseed left the field blank"),
            }
        }
        if self.input.key_pressed(KeyCode::P) {
            let field = self.frames.field_mut();
            let enabled = !field.pointer_enabled();
            field.set_pointer_enabled(enabled);
            info!(enabled, "toggled cursor interaction");
        }
        self.input.begin_frame();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match self.frames.tick(renderer) {
            TickOutcome::Rendered => match renderer.take_error() {
                None => {}
                Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    warn!("surface lost; reconfiguring");
                    renderer.reconfigure();
                }
                Some(wgpu::SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory");
                    self.shutdown(event_loop);
                    return;
                }
                Some(err) => warn!(error = %err, "frame dropped"),
            },
            TickOutcome::NotReady | TickOutcome::Idle => {}
            TickOutcome::Cancelled => return,
        }

        if self.frames.is_subscribed() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            error!(error = %err, "failed to start viewer");
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                if size.width > 0 && size.height > 0 && self.frames.field().is_running() {
                    debug!(width = size.width, height = size.height, "resizing field");
                    if let Err(err) = self.frames.field_mut().resize(
                        size.width as f32,
                        size.height as f32,
                        &mut self.rng,
                    ) {
                        warn!(error = %err, "resize left the field blank");
                    }
                }
            }
            WindowEvent::CursorMoved { .. } | WindowEvent::CursorLeft { .. } => {
                let cursor = self.input.cursor();
                self.frames.field_mut().set_pointer(cursor);
            }
            WindowEvent::KeyboardInput { .. } => self.handle_keys(event_loop),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
