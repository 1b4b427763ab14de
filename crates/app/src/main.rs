//! Stage - demo runner entry point.
//!
//! Opens a window and drives one demo per display refresh, presenting each
//! rendered frame, or renders a fixed number of frames off-screen and writes
//! a PNG snapshot.

mod cli;
mod headless;
mod present;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use cli::Cli;
use present::Presenter;
use stage_core::{FrameClock, StageConfig};
use stage_harness::{Collaborators, FrameOutcome, Harness, SoftwareRenderer, demos};
use stage_platform::{InputState, KeyCode, Window};

/// Frames between window title refreshes.
const TITLE_INTERVAL: u64 = 30;

struct App {
    demo: String,
    size: (u32, u32),
    title: String,
    snapshot: PathBuf,
    collaborators: Collaborators,
    window: Option<Window>,
    presenter: Option<Presenter>,
    harness: Option<Harness<Window, SoftwareRenderer>>,
    input: InputState,
    clock: FrameClock,
    frames: u64,
}

impl App {
    fn new(demo: String, size: (u32, u32), title: String, snapshot: PathBuf, collaborators: Collaborators) -> Self {
        Self {
            demo,
            size,
            title,
            snapshot,
            collaborators,
            window: None,
            presenter: None,
            harness: None,
            input: InputState::new(),
            clock: FrameClock::realtime(),
            frames: 0,
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(harness) = self.harness.as_mut() {
            harness.dispose();
        }
        event_loop.exit();
    }

    fn save_snapshot(&self) {
        let Some(harness) = &self.harness else { return };
        match harness.renderer().image().save(&self.snapshot) {
            Ok(()) => info!("Snapshot saved to {}", self.snapshot.display()),
            Err(e) => error!("Failed to save snapshot to {}: {}", self.snapshot.display(), e),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(harness) = self.harness.as_mut() else { return };

        harness.orbit(self.input.take_drag(), self.input.take_scroll());
        if harness.frame(self.clock.now_ms()) == FrameOutcome::Stopped {
            event_loop.exit();
            return;
        }

        if let Some(presenter) = self.presenter.as_mut()
            && let Err(e) = presenter.present(harness.renderer().image())
        {
            warn!("Failed to present frame: {:#}", e);
        }

        self.frames += 1;
        if self.frames % TITLE_INTERVAL == 0
            && let Some(window) = &self.window
        {
            let stats = harness.renderer().stats();
            window.inner().set_title(&format!(
                "{} | {} | {} meshes, {} triangles",
                self.title,
                harness.demo_name(),
                stats.meshes,
                stats.triangles
            ));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let (width, height) = self.size;
        let window = match Window::new(event_loop, width, height, &self.title) {
            Ok(window) => window,
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match Harness::for_demo(
            &self.demo,
            window.handle(),
            SoftwareRenderer::new(width, height),
            self.collaborators.clone(),
        ) {
            Ok(harness) => {
                match Presenter::new(window.shared()) {
                    Ok(presenter) => self.presenter = Some(presenter),
                    Err(e) => warn!("Window surface unavailable, frames will not be shown: {:#}", e),
                }
                info!("Initialization complete, running '{}'", self.demo);
                self.harness = Some(harness);
                self.window = Some(window);
            }
            Err(e) => {
                error!("Failed to set up demo '{}': {}", self.demo, e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(_) => {
                if let Some(harness) = self.harness.as_mut() {
                    harness.resize();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key) = event.physical_key else {
                    return;
                };
                if !event.state.is_pressed() {
                    self.input.on_key_released(key);
                    return;
                }
                self.input.on_key_pressed(key);
                match key {
                    KeyCode::Escape => self.shutdown(event_loop),
                    KeyCode::KeyS if !event.repeat => self.save_snapshot(),
                    _ => {}
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.input.on_mouse_pressed(button.into()),
                ElementState::Released => self.input.on_mouse_released(button.into()),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.input.on_mouse_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => self.input.on_mouse_left(),
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => self.input.on_scroll_lines(y),
                MouseScrollDelta::PixelDelta(pos) => self.input.on_scroll_pixels(pos.y as f32),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.input.end_frame();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    stage_core::init_logging();

    if cli.list {
        for name in demos::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = StageConfig::load_or_default(cli.config.as_deref()).context("failed to load configuration")?;
    let demo = cli
        .demo
        .clone()
        .or_else(|| config.demo.clone())
        .unwrap_or_else(|| demos::DEFAULT_DEMO.to_string());
    let size = cli.size.unwrap_or((config.window.width, config.window.height));
    let collaborators = Collaborators::from_config(&config, cli.capture.device());

    if cli.headless {
        info!("Starting '{}' headless at {}x{}", demo, size.0, size.1);
        return headless::run(&demo, size, cli.frames, &cli.out, collaborators);
    }

    info!("Starting '{}'", demo);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(demo, size, config.window.title.clone(), cli.out.clone(), collaborators);
    event_loop.run_app(&mut app)?;

    Ok(())
}
