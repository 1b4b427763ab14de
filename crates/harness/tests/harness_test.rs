//! Integration tests for the harness: resize, timing, async setup, helpers
//! and disposal.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec3;
use stage_core::{Error, FrameTime};
use stage_harness::demos;
use stage_harness::{Collaborators, Demo, FrameOutcome, Harness, Renderer, SetupContext, SoftwareRenderer};
use stage_platform::{FixedViewport, Viewport};
use stage_resources::{
    AssetLoader, MediaCapture, MediaConstraints, ResourceError, ResourceResult, RetryPolicy, SyntheticCapture,
    Texture, VideoSource,
};
use stage_scene::{Camera, Projection, SceneGraph};

/// Renderer that only records what it was asked to do.
#[derive(Debug, Default)]
struct RecordingRenderer {
    size: (u32, u32),
    resizes: Vec<(u32, u32)>,
    frames: u64,
}

impl Renderer for RecordingRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.resizes.push((width, height));
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(&mut self, _scene: &SceneGraph, _camera: &Camera, _time: &FrameTime) -> stage_core::Result<()> {
        self.frames += 1;
        Ok(())
    }
}

/// Every texture is a 4x4 white square.
struct SolidLoader;

impl AssetLoader for SolidLoader {
    fn load_texture(&self, _path: &Path) -> ResourceResult<Texture> {
        Ok(Texture::solid(4, 4, [255, 255, 255, 255]))
    }
}

/// Capture that refuses access and counts requests.
#[derive(Default)]
struct DeniedCapture {
    requests: AtomicUsize,
}

impl MediaCapture for DeniedCapture {
    fn open(&self, _constraints: &MediaConstraints) -> ResourceResult<Box<dyn VideoSource>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Err(ResourceError::PermissionDenied("camera".into()))
    }
}

/// No texture exists; every load fails and is counted.
#[derive(Default)]
struct MissingLoader {
    calls: AtomicUsize,
}

impl AssetLoader for MissingLoader {
    fn load_texture(&self, path: &Path) -> ResourceResult<Texture> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ResourceError::FileNotFound(path.to_path_buf()))
    }
}

/// Fails for files whose name contains any of `missing`.
struct PartialLoader {
    missing: &'static [&'static str],
}

impl AssetLoader for PartialLoader {
    fn load_texture(&self, path: &Path) -> ResourceResult<Texture> {
        let name = path.to_string_lossy();
        if self.missing.iter().any(|m| name.contains(m)) {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }
        Ok(Texture::solid(4, 4, [255, 255, 255, 255]))
    }
}

fn collaborators(capture: Arc<dyn MediaCapture>) -> Collaborators {
    Collaborators::new(Arc::new(SolidLoader), capture).with_retry(RetryPolicy::once(Duration::from_secs(2)))
}

fn harness(name: &str, viewport: &FixedViewport) -> Harness<FixedViewport, RecordingRenderer> {
    Harness::for_demo(
        name,
        viewport.clone(),
        RecordingRenderer::default(),
        collaborators(Arc::new(SyntheticCapture)),
    )
    .unwrap()
}

fn harness_loading(
    name: &str,
    viewport: &FixedViewport,
    loader: Arc<dyn AssetLoader>,
) -> Harness<FixedViewport, RecordingRenderer> {
    let collaborators =
        Collaborators::new(loader, Arc::new(SyntheticCapture)).with_retry(RetryPolicy::once(Duration::from_secs(2)));
    Harness::for_demo(name, viewport.clone(), RecordingRenderer::default(), collaborators).unwrap()
}

/// Drive frames until `done` holds or two seconds pass.
fn frames_until<V: Viewport, R: Renderer>(h: &mut Harness<V, R>, mut done: impl FnMut(&Harness<V, R>) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut t = 0.0;
    while !done(h) && Instant::now() < deadline {
        h.frame(t);
        t += 16.0;
        thread::sleep(Duration::from_millis(2));
    }
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn helper_vertices<V: Viewport, R: Renderer>(h: &Harness<V, R>, name: &str) -> Vec<Vec3> {
    let id = h.scene().find_by_name(name).unwrap();
    h.scene().node(id).unwrap().mesh().unwrap().geometry.positions.clone()
}

#[test]
fn test_initial_size_and_resize() {
    let viewport = FixedViewport::new(800, 600);
    let mut h = harness("structure", &viewport);
    assert!((h.camera().aspect() - 1.333).abs() < 1e-3);
    assert_eq!(h.surface_size(), Some((800, 600)));
    assert_eq!(h.renderer().size(), (800, 600));

    viewport.set_size(400, 300);
    h.resize();
    assert!((h.camera().aspect() - 1.333).abs() < 1e-3);
    assert_eq!(h.surface_size(), Some((400, 300)));
    assert_eq!(h.renderer().size(), (400, 300));
}

#[test]
fn test_aspect_is_exact_ratio() {
    let viewport = FixedViewport::new(640, 480);
    let mut h = harness("material-phong", &viewport);
    for (w, h_px) in [(1920, 1080), (333, 777), (1, 4096), (1024, 1)] {
        viewport.set_size(w, h_px);
        h.resize();
        assert_eq!(h.camera().aspect(), w as f32 / h_px as f32);
        assert_eq!(h.renderer().size(), (w, h_px));
    }
}

#[test]
fn test_resize_is_idempotent() {
    let viewport = FixedViewport::new(320, 240);
    let mut h = harness("structure", &viewport);
    let camera = h.camera().clone();
    h.resize();
    h.resize();
    assert_eq!(h.renderer().resizes, vec![(320, 240)]);
    assert_eq!(h.camera(), &camera);
}

#[test]
fn test_zero_size_is_ignored() {
    let viewport = FixedViewport::new(320, 240);
    let mut h = harness("structure", &viewport);
    for (w, h_px) in [(0, 240), (320, 0), (0, 0)] {
        viewport.set_size(w, h_px);
        h.resize();
    }
    assert_eq!(h.surface_size(), Some((320, 240)));
    assert_eq!(h.renderer().resizes.len(), 1);
    assert!(approx_eq(h.camera().aspect(), 320.0 / 240.0));
}

#[test]
fn test_angle_tracks_elapsed_time() {
    let viewport = FixedViewport::new(200, 200);
    let mut h = harness("structure", &viewport);
    let cube = h.scene().find_by_name("cube").unwrap();

    h.frame(1000.0);
    let first = h.scene().node(cube).unwrap().transform.rotation;
    h.frame(3500.0);
    let second = h.scene().node(cube).unwrap().transform.rotation;

    assert!(approx_eq(second.x - first.x, 1.0 * 2500.0 * 0.001));
    assert!(approx_eq(second.y - first.y, 0.1 * 2500.0 * 0.001));
}

#[test]
fn test_update_has_no_accumulation() {
    let viewport = FixedViewport::new(200, 200);
    let mut h = harness("scenegraph", &viewport);
    let system3 = h.scene().find_by_name("system3").unwrap();

    for t in [0.0, 16.0, 33.0, 500.0, 2000.0] {
        h.frame(t);
    }
    let after_many = h.scene().node(system3).unwrap().transform.rotation.y;

    let mut fresh = harness("scenegraph", &viewport);
    fresh.frame(2000.0);
    let after_one = fresh.scene().node(system3).unwrap().transform.rotation.y;

    assert!(approx_eq(after_many, after_one));
    assert!(approx_eq(after_one, 4.0 * 2.0));
}

#[test]
fn test_backwards_timestamps_do_not_rewind() {
    let viewport = FixedViewport::new(200, 200);
    let mut h = harness("structure", &viewport);
    let cube = h.scene().find_by_name("cube").unwrap();
    h.frame(2000.0);
    h.frame(1000.0);
    assert!(approx_eq(h.scene().node(cube).unwrap().transform.rotation.x, 2.0));
}

#[test]
fn test_every_demo_is_a_tree() {
    for name in demos::names() {
        let viewport = FixedViewport::new(160, 120);
        let mut h = harness(name, &viewport);
        frames_until(&mut h, |h| h.renderer().frames >= 5);

        let mut seen = HashSet::new();
        for (id, _) in h.scene().traverse() {
            assert!(seen.insert(id), "demo '{}' revisits {:?}", name, id);
        }
        assert_eq!(seen.len(), h.scene().len(), "demo '{}' has unreachable nodes", name);
    }
}

#[test]
fn test_every_demo_renders_in_software() {
    for name in demos::names() {
        let viewport = FixedViewport::new(48, 32);
        let mut h = Harness::for_demo(
            name,
            viewport,
            SoftwareRenderer::new(1, 1),
            collaborators(Arc::new(SyntheticCapture)),
        )
        .unwrap();
        assert_eq!(h.frame(0.0), FrameOutcome::Rendered);
        assert_eq!(h.frame(16.0), FrameOutcome::Rendered);
        assert_eq!(h.renderer().image().dimensions(), (48, 32));
        assert_eq!(h.renderer().frames_drawn(), 2);
    }
}

#[test]
fn test_structure_draws_the_box() {
    let viewport = FixedViewport::new(64, 48);
    let mut h = Harness::for_demo(
        "structure",
        viewport,
        SoftwareRenderer::new(1, 1),
        Collaborators::default(),
    )
    .unwrap();
    h.frame(0.0);
    let image = h.renderer().image();
    assert_ne!(image.get_pixel(32, 24), image.get_pixel(0, 0));
}

#[test]
fn test_denied_capture_leaves_mesh_out() {
    let capture = Arc::new(DeniedCapture::default());
    let viewport = FixedViewport::new(160, 120);
    let mut h = Harness::for_demo(
        "video-texture",
        viewport,
        RecordingRenderer::default(),
        collaborators(capture.clone()),
    )
    .unwrap();

    frames_until(&mut h, |_| capture.requests.load(Ordering::SeqCst) > 0);
    // let the refusal reach the resolve step
    for i in 0..20 {
        assert_eq!(h.frame(10_000.0 + i as f64 * 16.0), FrameOutcome::Rendered);
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(capture.requests.load(Ordering::SeqCst), 1);
    assert!(h.scene().find_by_name("videoBox").is_none());
    assert!(h.is_running());
}

#[test]
fn test_granted_capture_adds_mesh() {
    let viewport = FixedViewport::new(160, 120);
    let mut h = harness("video-texture", &viewport);
    frames_until(&mut h, |h| h.scene().find_by_name("videoBox").is_some());
    let screen = h.scene().find_by_name("videoBox").unwrap();
    let mesh = h.scene().node(screen).unwrap().mesh().unwrap();
    assert!(mesh.material.map.is_some());
}

#[test]
fn test_unsupported_capture_is_skipped() {
    let viewport = FixedViewport::new(160, 120);
    let mut h = Harness::for_demo(
        "video-texture",
        viewport,
        RecordingRenderer::default(),
        Collaborators::default(),
    )
    .unwrap();
    for i in 0..20 {
        h.frame(i as f64 * 16.0);
        thread::sleep(Duration::from_millis(5));
    }
    assert!(h.scene().find_by_name("videoBox").is_none());
}

#[test]
fn test_textures_resolve_into_meshes() {
    let viewport = FixedViewport::new(160, 120);
    let mut h = harness("texture", &viewport);
    assert_eq!(h.scene().mesh_count(), 0);
    frames_until(&mut h, |h| h.scene().mesh_count() == 2);
    assert_eq!(h.scene().mesh_count(), 2);
}

#[test]
fn test_missing_textures_leave_scene_running() {
    for name in ["texture", "sprite-points"] {
        let viewport = FixedViewport::new(160, 120);
        let loader = Arc::new(MissingLoader::default());
        let mut h = harness_loading(name, &viewport, loader.clone());
        frames_until(&mut h, |_| loader.calls.load(Ordering::SeqCst) > 0);
        let mut t = 1000.0;
        for _ in 0..20 {
            assert_eq!(h.frame(t), FrameOutcome::Rendered);
            t += 16.0;
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1, "{name}");
        assert_eq!(h.scene().mesh_count(), 0, "{name}");
        assert!(h.is_running(), "{name}");
        assert_eq!(h.frame(t), FrameOutcome::Rendered, "{name}");
    }
}

#[test]
fn test_pbr_maps_skip_failed_slots() {
    let viewport = FixedViewport::new(160, 120);
    let loader = Arc::new(PartialLoader {
        missing: &["normal", "light1"],
    });
    let mut h = harness_loading("pbr-maps", &viewport, loader);
    frames_until(&mut h, |h| h.scene().mesh_count() == 2);
    assert_eq!(h.scene().mesh_count(), 2);
    assert!(h.is_running());

    let cube = h.scene().find_by_name("box").unwrap();
    let material = &h.scene().node(cube).unwrap().mesh().unwrap().material;
    assert!(material.normal_map.is_none());
    assert!(material.light_map.is_none());
    assert!(material.map.is_some());
    assert!(material.ao_map.is_some());
    assert!(material.displacement_map.is_some());
    assert!(material.roughness_map.is_some());
    assert!(material.metalness_map.is_some());
    assert_eq!(material.textures().count(), 5);
}

#[test]
fn test_camera_rig_light_follows_orbit() {
    let viewport = FixedViewport::new(200, 200);
    let mut h = harness("pbr-maps", &viewport);
    let offset = Vec3::new(-1.0, 2.0, 4.0);
    h.frame(0.0);
    let light = h.scene().find_by_name("keyLight").unwrap();
    let before = h.scene().world_position(light).unwrap();
    let camera = h.camera();
    assert!((before - (camera.position + camera.rotation * offset)).length() < 1e-3);

    h.orbit((200.0, 0.0), 0.0);
    h.frame(16.0);
    let after = h.scene().world_position(light).unwrap();
    let camera = h.camera();
    assert!((after - (camera.position + camera.rotation * offset)).length() < 1e-3);
    assert!((after - before).length() > 1e-2);
}

#[test]
fn test_light_helpers_follow_small_sphere() {
    let viewport = FixedViewport::new(200, 200);
    for (demo, helper) in [("spotlight", "spotLightHelper"), ("shadow", "sunLightHelper")] {
        let mut h = harness(demo, &viewport);
        let sphere = h.scene().find_by_name("smallSphere").unwrap();
        for t in [0.0, 1800.0, 4200.0] {
            h.frame(t);
            let target = h.scene().world_position(sphere).unwrap();
            let lines = helper_vertices(&h, helper);
            assert!((lines[1] - target).length() < 1e-3, "{demo} at {t}");
        }
    }
}

#[test]
fn test_shadow_frustum_helper_turns_with_light() {
    let viewport = FixedViewport::new(200, 200);
    let mut h = harness("shadow", &viewport);
    h.frame(0.0);
    let first = helper_vertices(&h, "sunLightShadowCameraHelper");
    h.frame(2500.0);
    let second = helper_vertices(&h, "sunLightShadowCameraHelper");
    assert_eq!(first.len(), 24);
    assert_eq!(second.len(), 24);
    assert!(first.iter().zip(&second).any(|(a, b)| (*a - *b).length() > 1e-3));
}

#[test]
fn test_rect_light_helpers_present() {
    let viewport = FixedViewport::new(200, 200);
    for demo in ["rect-area-light", "camera-target"] {
        let h = harness(demo, &viewport);
        let lines = helper_vertices(&h, "rectLightHelper");
        assert_eq!(lines.len(), 10, "{demo}");
        // Outline sits at the light's height.
        assert!(lines[..8].iter().all(|v| approx_eq(v.y, 5.0)), "{demo}");
    }
}

#[test]
fn test_dispose_stops_everything() {
    let viewport = FixedViewport::new(320, 240);
    let mut h = harness("structure", &viewport);
    assert_eq!(h.frame(0.0), FrameOutcome::Rendered);

    h.dispose();
    h.dispose();
    assert!(!h.is_running());
    assert_eq!(h.frame(16.0), FrameOutcome::Stopped);
    assert_eq!(h.renderer().frames, 1);

    viewport.set_size(100, 100);
    h.resize();
    assert_eq!(h.surface_size(), Some((320, 240)));
    assert_eq!(h.renderer().resizes.len(), 1);
}

#[test]
fn test_unknown_demo_is_config_error() {
    let result = Harness::for_demo(
        "nope",
        FixedViewport::new(10, 10),
        RecordingRenderer::default(),
        Collaborators::default(),
    );
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_orbit_moves_camera_only_when_enabled() {
    let viewport = FixedViewport::new(200, 200);
    let mut orbiting = harness("material-phong", &viewport);
    let before = orbiting.camera().position;
    orbiting.orbit((40.0, 0.0), 0.0);
    assert!((orbiting.camera().position - before).length() > 1e-3);

    let mut fixed = harness("structure", &viewport);
    let before = fixed.camera().position;
    fixed.orbit((40.0, 0.0), 2.0);
    assert_eq!(fixed.camera().position, before);
}

#[test]
fn test_camera_target_rides_small_sphere() {
    let viewport = FixedViewport::new(200, 200);
    let mut h = harness("camera-target", &viewport);
    h.frame(1800.0);
    let sphere = h.scene().find_by_name("smallSphere").unwrap();
    let eye = h.scene().world_position(sphere).unwrap();
    assert!((h.camera().position - eye).length() < 1e-4);
    assert!((eye - Vec3::new(0.0, 0.5, -3.0)).length() < 1e-3);
}

/// Orthographic demo used to check the aspect branch.
struct Flat;

impl Demo for Flat {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn camera(&self, _aspect: f32) -> Camera {
        let mut camera = Camera::new();
        camera.set_orthographic(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
        camera
    }

    fn setup(&mut self, _ctx: &mut SetupContext<'_>) -> stage_core::Result<()> {
        Ok(())
    }
}

#[test]
fn test_orthographic_resize_keeps_height() {
    let viewport = FixedViewport::new(800, 400);
    let mut h = Harness::new(
        viewport.clone(),
        RecordingRenderer::default(),
        Box::new(Flat),
        Collaborators::default(),
    )
    .unwrap();

    let Projection::Orthographic {
        left,
        right,
        bottom,
        top,
        ..
    } = h.camera().projection
    else {
        panic!("expected orthographic projection");
    };
    assert!(approx_eq(left, -2.0) && approx_eq(right, 2.0));
    assert!(approx_eq(bottom, -1.0) && approx_eq(top, 1.0));

    viewport.set_size(300, 600);
    h.resize();
    assert!(approx_eq(h.camera().aspect(), 0.5));
}
