//! Per-demo configuration.
//!
//! A demo is the only thing that differs between examples: it builds the
//! camera and scene once, finishes async setup when collaborator results
//! arrive, and moves nodes as a function of elapsed time.

use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec3;
use stage_core::{FrameTime, Result, StageConfig};
use stage_resources::{
    AssetLoader, CancellationToken, FileAssetLoader, MediaCapture, MediaConstraints, RetryPolicy, Texture,
    UnsupportedCapture, VideoSource,
};
use stage_scene::{Camera, SceneGraph};

use crate::pending::Pending;

/// External services a demo may call during setup.
#[derive(Clone)]
pub struct Collaborators {
    pub loader: Arc<dyn AssetLoader>,
    pub capture: Arc<dyn MediaCapture>,
    pub retry: RetryPolicy,
    pub constraints: MediaConstraints,
}

impl Collaborators {
    pub fn new(loader: Arc<dyn AssetLoader>, capture: Arc<dyn MediaCapture>) -> Self {
        Self {
            loader,
            capture,
            retry: RetryPolicy::default(),
            constraints: MediaConstraints::default(),
        }
    }

    /// File loader rooted at the configured asset directory, retry policy
    /// and capture constraints from `config`, and the given capture device.
    pub fn from_config(config: &StageConfig, capture: Arc<dyn MediaCapture>) -> Self {
        Self {
            retry: RetryPolicy::from(&config.retry),
            constraints: MediaConstraints::from(&config.capture),
            ..Self::new(Arc::new(FileAssetLoader::new(config.assets.root.clone())), capture)
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for Collaborators {
    /// Assets from `./assets`, no media devices.
    fn default() -> Self {
        Self::new(Arc::new(FileAssetLoader::new("assets")), Arc::new(UnsupportedCapture))
    }
}

/// What a demo gets to build its scene with.
pub struct SetupContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub camera: &'a mut Camera,
    collaborators: &'a Collaborators,
    token: &'a CancellationToken,
}

impl<'a> SetupContext<'a> {
    /// `token` is cancelled when the owner of the scene goes away.
    pub fn new(
        scene: &'a mut SceneGraph,
        camera: &'a mut Camera,
        collaborators: &'a Collaborators,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            scene,
            camera,
            collaborators,
            token,
        }
    }

    /// Start loading a texture; the result arrives in [`Demo::resolve`].
    pub fn load_texture(&self, path: impl Into<PathBuf>) -> Pending<Texture> {
        let path = path.into();
        let loader = Arc::clone(&self.collaborators.loader);
        Pending::spawn(
            path.display().to_string(),
            self.collaborators.retry.clone(),
            self.token.clone(),
            move || loader.load_texture(&path),
        )
    }

    /// Ask for a live video stream.
    ///
    /// Only a busy device is retried; refusal and missing support settle
    /// the slot on the first attempt.
    pub fn open_capture(&self) -> Pending<Box<dyn VideoSource>> {
        let capture = Arc::clone(&self.collaborators.capture);
        let constraints = self.collaborators.constraints;
        Pending::spawn(
            "media capture",
            self.collaborators.retry.clone(),
            self.token.clone(),
            move || capture.open(&constraints),
        )
    }
}

/// What a demo gets every frame.
pub struct FrameContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub camera: &'a mut Camera,
    pub time: FrameTime,
}

/// One animated example.
pub trait Demo {
    /// Registry name, e.g. `"solar-system"`.
    fn name(&self) -> &'static str;

    /// The initial camera for a container of the given aspect ratio.
    fn camera(&self, aspect: f32) -> Camera;

    /// Point user orbit controls revolve around; `None` disables them.
    fn orbit_target(&self) -> Option<Vec3> {
        Some(Vec3::ZERO)
    }

    /// Build lights, meshes and helpers; start async loads.
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()>;

    /// Finish setup steps whose async results have arrived.
    ///
    /// Called once per frame before [`Demo::update`].
    fn resolve(&mut self, _scene: &mut SceneGraph) -> Result<()> {
        Ok(())
    }

    /// Set node transforms for the frame's timestamp.
    fn update(&mut self, _ctx: &mut FrameContext<'_>) {}
}
