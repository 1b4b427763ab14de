//! The harness: viewport, camera, scene, renderer and frame loop around one demo.

use stage_core::{Result, StageConfig};
use stage_platform::Viewport;
use stage_resources::CancellationToken;
use stage_scene::{Camera, OrbitController, SceneGraph};
use tracing::{debug, error, info, trace};

use crate::demo::{Collaborators, Demo, FrameContext, SetupContext};
use crate::frame::{FrameDriver, FrameOutcome};
use crate::render::Renderer;

/// Runs one demo against a viewport and a renderer.
///
/// Construction builds the camera and scene, then performs an initial
/// [`resize`](Self::resize). The host then calls [`frame`](Self::frame) once
/// per display refresh and [`resize`](Self::resize) whenever the container
/// changes size.
pub struct Harness<V: Viewport, R: Renderer> {
    viewport: V,
    renderer: R,
    demo: Box<dyn Demo>,
    scene: SceneGraph,
    camera: Camera,
    orbit: Option<OrbitController>,
    driver: FrameDriver,
    token: CancellationToken,
    surface: Option<(u32, u32)>,
    resize_attached: bool,
}

impl<V: Viewport, R: Renderer> Harness<V, R> {
    /// Set up `demo` and size everything to the viewport.
    ///
    /// # Errors
    /// Returns the demo's setup error; collaborator failures are not errors
    /// here, they surface later as missing meshes.
    pub fn new(viewport: V, renderer: R, mut demo: Box<dyn Demo>, collaborators: Collaborators) -> Result<Self> {
        let (width, height) = viewport.client_size();
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };

        let token = CancellationToken::new();
        let mut camera = demo.camera(aspect);
        let mut scene = SceneGraph::new();
        demo.setup(&mut SetupContext::new(&mut scene, &mut camera, &collaborators, &token))?;

        let orbit = demo
            .orbit_target()
            .map(|target| OrbitController::from_camera(&camera, target));

        info!(
            "Demo '{}' ready: {} nodes, {} meshes, {} lights",
            demo.name(),
            scene.len(),
            scene.mesh_count(),
            scene.light_count()
        );

        let mut harness = Self {
            viewport,
            renderer,
            demo,
            scene,
            camera,
            orbit,
            driver: FrameDriver::new(),
            token,
            surface: None,
            resize_attached: true,
        };
        harness.resize();
        Ok(harness)
    }

    /// Build a harness for a registered demo by name.
    pub fn for_demo(name: &str, viewport: V, renderer: R, collaborators: Collaborators) -> Result<Self> {
        let demo = crate::demos::by_name(name)
            .ok_or_else(|| stage_core::Error::Config(format!("unknown demo '{name}'")))?;
        Self::new(viewport, renderer, demo, collaborators)
    }

    /// Build a harness for the demo named in `config`, or the first demo.
    pub fn from_config(config: &StageConfig, viewport: V, renderer: R, collaborators: Collaborators) -> Result<Self> {
        let name = config.demo.as_deref().unwrap_or(crate::demos::DEFAULT_DEMO);
        Self::for_demo(name, viewport, renderer, collaborators)
    }

    /// Match camera aspect and surface size to the viewport.
    ///
    /// Zero sizes are ignored, repeated sizes change nothing, and after
    /// [`dispose`](Self::dispose) this is a no-op.
    pub fn resize(&mut self) {
        if !self.resize_attached {
            return;
        }

        let (width, height) = self.viewport.client_size();
        if width == 0 || height == 0 {
            debug!("Ignoring resize to zero dimensions ({}x{})", width, height);
            return;
        }
        if self.surface == Some((width, height)) {
            trace!("Resize to unchanged size {}x{}", width, height);
            return;
        }

        self.camera.set_aspect(width as f32 / height as f32);
        self.renderer.resize(width, height);
        debug!(
            "Resized to {}x{} (aspect {:.4}, pixel ratio {})",
            width,
            height,
            self.camera.aspect(),
            self.viewport.pixel_ratio()
        );
        self.surface = Some((width, height));
    }

    /// Run one frame: resolve async work, update the demo, draw.
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
        let Some(time) = self.driver.tick(timestamp_ms) else {
            return FrameOutcome::Stopped;
        };

        if let Err(e) = self.demo.resolve(&mut self.scene) {
            error!("Demo '{}' failed to finish setup: {}", self.demo.name(), e);
        }

        self.demo.update(&mut FrameContext {
            scene: &mut self.scene,
            camera: &mut self.camera,
            time,
        });
        self.sync_camera_rig();

        if let Err(e) = self.renderer.render(&self.scene, &self.camera, &time) {
            error!("Render failed on frame {}: {}", time.frame(), e);
        }
        FrameOutcome::Rendered
    }

    /// Apply a pointer drag (pixels) and wheel movement (lines) to the
    /// orbit controls, if the demo has them.
    pub fn orbit(&mut self, drag: (f32, f32), scroll: f32) {
        if !self.driver.is_running() {
            return;
        }
        let Some(orbit) = self.orbit.as_mut() else {
            return;
        };
        if drag == (0.0, 0.0) && scroll == 0.0 {
            return;
        }
        orbit.rotate(drag.0, drag.1);
        orbit.zoom(scroll);
        orbit.apply(&mut self.camera);
    }

    /// Stop the frame loop, cancel in-flight loads and stop reacting to
    /// resizes. Idempotent.
    pub fn dispose(&mut self) {
        if !self.driver.is_running() && !self.resize_attached {
            return;
        }
        self.driver.stop();
        self.token.cancel();
        self.resize_attached = false;
        info!(
            "Demo '{}' disposed after {} frames",
            self.demo.name(),
            self.driver.frames()
        );
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn demo_name(&self) -> &'static str {
        self.demo.name()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Surface size applied by the last effective resize.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface
    }

    /// Nodes attached to the camera rig follow the camera.
    fn sync_camera_rig(&mut self) {
        let Some(rig) = self.scene.camera_rig_id() else {
            return;
        };
        if let Some(transform) = self.scene.transform_mut(rig) {
            transform.position = self.camera.position;
            transform.set_quaternion(self.camera.rotation);
        }
    }
}

impl<V: Viewport, R: Renderer> Drop for Harness<V, R> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
