//! Lighting demos.
//!
//! All four share one stage: a ground plane, a centerpiece, a ring of eight
//! tori and a small sphere that circles the centerpiece at 50°/s. They differ
//! in the light and in what follows the small sphere. Each light carries a
//! line helper, refreshed whenever the light's target moves.

use std::f32::consts::PI;

use glam::Vec3;
use stage_core::Result;
use stage_scene::{
    Camera, DirectionalLight, Geometry, HelperKind, Light, LightHelper, Material, Mesh, Node, NodeId,
    RectAreaLight, SceneGraph, ShadowSettings, Side, SpotLight, Transform, rgb_hex,
};
use tracing::warn;

use super::perspective;
use crate::demo::{Demo, FrameContext, SetupContext};

/// Degrees per second the small sphere travels around the stage.
const ORBIT_DEGREES_PER_SECOND: f32 = 50.0;
/// How far ahead of the small sphere the camera-target pivot leads.
const LOOK_AHEAD_DEGREES: f32 = 10.0;
/// Offset of tori and small sphere from their pivots.
const RING_OFFSET: Vec3 = Vec3::new(3.0, 0.5, 0.0);

/// Centerpiece of the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Centerpiece {
    /// Upper half of a sphere of radius 1.5
    HalfSphere,
    /// Torus knot raised to y = 1.6
    TorusKnot,
}

/// Node handles of the shared lighting stage.
#[derive(Clone, Debug)]
pub struct LightingStage {
    pub ground: NodeId,
    pub centerpiece: NodeId,
    pub torus_pivots: Vec<NodeId>,
    pub small_sphere_pivot: NodeId,
    pub small_sphere: NodeId,
}

impl LightingStage {
    /// Build the stage under the scene root.
    ///
    /// With `shadows` every mesh casts and receives shadows, except the
    /// ground which only receives them.
    pub fn build(scene: &mut SceneGraph, centerpiece: Centerpiece, shadows: bool) -> Result<Self> {
        let root = scene.root();

        let mut ground = Mesh::new(
            &Geometry::plane(10.0, 10.0),
            Material {
                side: Side::Double,
                ..Material::standard(rgb_hex(0x2c3e50), 0.5, 0.5)
            },
        );
        ground.receive_shadow = shadows;
        let ground = scene.add_mesh(
            root,
            "ground",
            Transform::new().with_rotation(Vec3::new(-PI / 2.0, 0.0, 0.0)),
            ground,
        )?;

        let centerpiece_material = Material::standard(rgb_hex(0xffffff), 0.1, 0.2);
        let (geometry, position) = match centerpiece {
            Centerpiece::HalfSphere => (
                Geometry::Sphere {
                    radius: 1.5,
                    width_segments: 64,
                    height_segments: 64,
                    phi_start: 0.0,
                    phi_length: PI,
                },
                Vec3::ZERO,
            ),
            Centerpiece::TorusKnot => (Geometry::torus_knot(1.0, 0.4), Vec3::new(0.0, 1.6, 0.0)),
        };
        let centerpiece = scene.add_mesh(
            root,
            "centerpiece",
            Transform::new()
                .with_position(position)
                .with_rotation(Vec3::new(-PI / 2.0, 0.0, 0.0)),
            shadowed(Mesh::new(&geometry, centerpiece_material), shadows),
        )?;

        let torus = Mesh::new(
            &Geometry::torus(0.4, 0.1, 32, 32),
            Material::standard(rgb_hex(0xa0a0a0), 0.5, 0.1),
        );
        let torus_pivots = (0..8)
            .map(|i| {
                let pivot = scene.add_empty(
                    root,
                    format!("torusPivot{i}"),
                    Transform::new().with_rotation(Vec3::new(0.0, (45.0 * i as f32).to_radians(), 0.0)),
                )?;
                scene.add_mesh(
                    pivot,
                    "torus",
                    Transform::new().with_position(RING_OFFSET),
                    shadowed(torus.clone(), shadows),
                )?;
                Ok(pivot)
            })
            .collect::<Result<Vec<_>>>()?;

        let small_sphere_pivot = scene.add_empty(root, "smallSpherePivot", Transform::new())?;
        let small_sphere = scene.add_mesh(
            small_sphere_pivot,
            "smallSphere",
            Transform::new().with_position(RING_OFFSET),
            shadowed(
                Mesh::new(
                    &Geometry::sphere(0.3, 32, 32),
                    Material::standard(rgb_hex(0xeeeeee), 0.2, 0.5),
                ),
                shadows,
            ),
        )?;

        Ok(Self {
            ground,
            centerpiece,
            torus_pivots,
            small_sphere_pivot,
            small_sphere,
        })
    }

    /// Stage camera: (7, 7, 0) looking at the origin.
    pub fn camera(aspect: f32) -> Camera {
        let mut camera = perspective(aspect, Vec3::new(7.0, 7.0, 0.0));
        camera.look_at(Vec3::ZERO);
        camera
    }

    /// Pivot angle in radians at `seconds`.
    pub fn orbit_angle(seconds: f32) -> f32 {
        (seconds * ORBIT_DEGREES_PER_SECOND).to_radians()
    }

    /// Turn the small sphere's pivot and return the sphere's world position.
    pub fn advance(&self, scene: &mut SceneGraph, seconds: f32) -> Option<Vec3> {
        scene.transform_mut(self.small_sphere_pivot)?.rotation.y = Self::orbit_angle(seconds);
        scene.world_position(self.small_sphere)
    }
}

fn shadowed(mut mesh: Mesh, shadows: bool) -> Mesh {
    mesh.cast_shadow = shadows;
    mesh.receive_shadow = shadows;
    mesh
}

/// Point a targeted light at `target`.
fn aim(scene: &mut SceneGraph, light: Option<NodeId>, target: Vec3) {
    if let Some(light) = light.and_then(|id| scene.node_mut(id)).and_then(Node::light_mut) {
        light.set_target(target);
    }
}

/// Rebuild helper lines after their lights moved.
fn refresh(scene: &mut SceneGraph, helpers: &[LightHelper]) {
    for helper in helpers {
        if let Err(e) = helper.update(scene) {
            warn!("Failed to refresh light helper: {}", e);
        }
    }
}

/// Rect light over the stage, facing down, with its outline helper.
fn overhead_rect_light(scene: &mut SceneGraph) -> Result<LightHelper> {
    let root = scene.root();
    let light = scene.add_light(
        root,
        "rectLight",
        Transform::new()
            .with_position(Vec3::new(0.0, 5.0, 0.0))
            .with_rotation(Vec3::new(-PI / 2.0, 0.0, 0.0)),
        Light::RectArea(RectAreaLight {
            intensity: 10.0,
            width: 3.0,
            height: 0.5,
            ..Default::default()
        }),
    )?;
    LightHelper::attach(scene, light, HelperKind::Light)
}

/// A 40° spot light overhead tracking the small sphere.
#[derive(Debug, Default)]
pub struct SpotLighting {
    stage: Option<LightingStage>,
    light: Option<NodeId>,
    helpers: Vec<LightHelper>,
}

impl SpotLighting {
    /// Cone helper of the spot light, once set up.
    pub fn helper(&self) -> Option<&LightHelper> {
        self.helpers.first()
    }
}

impl Demo for SpotLighting {
    fn name(&self) -> &'static str {
        "spotlight"
    }

    fn camera(&self, aspect: f32) -> Camera {
        LightingStage::camera(aspect)
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        let light = ctx.scene.add_light(
            root,
            "spotLight",
            Transform::new().with_position(Vec3::new(0.0, 5.0, 0.0)),
            Light::Spot(SpotLight {
                angle: 40f32.to_radians(),
                penumbra: 0.0,
                ..Default::default()
            }),
        )?;
        self.helpers = vec![LightHelper::attach(ctx.scene, light, HelperKind::Light)?];
        self.light = Some(light);
        self.stage = Some(LightingStage::build(ctx.scene, Centerpiece::HalfSphere, false)?);
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let Some(stage) = &self.stage else { return };
        if let Some(sphere) = stage.advance(ctx.scene, ctx.time.seconds()) {
            aim(ctx.scene, self.light, sphere);
            refresh(ctx.scene, &self.helpers);
        }
    }
}

/// A 3 × 0.5 rect area light over the stage.
#[derive(Debug, Default)]
pub struct RectAreaLighting {
    stage: Option<LightingStage>,
    helper: Option<LightHelper>,
}

impl RectAreaLighting {
    /// Outline helper of the rect light, once set up.
    pub fn helper(&self) -> Option<&LightHelper> {
        self.helper.as_ref()
    }
}

impl Demo for RectAreaLighting {
    fn name(&self) -> &'static str {
        "rect-area-light"
    }

    fn camera(&self, aspect: f32) -> Camera {
        LightingStage::camera(aspect)
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        self.helper = Some(overhead_rect_light(ctx.scene)?);
        self.stage = Some(LightingStage::build(ctx.scene, Centerpiece::HalfSphere, false)?);
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(stage) = &self.stage {
            stage.advance(ctx.scene, ctx.time.seconds());
        }
    }
}

/// A shadow-casting directional light aimed at the small sphere.
#[derive(Debug, Default)]
pub struct ShadowDemo {
    stage: Option<LightingStage>,
    light: Option<NodeId>,
    /// Light helper, then shadow frustum helper
    helpers: Vec<LightHelper>,
}

impl ShadowDemo {
    pub fn helpers(&self) -> &[LightHelper] {
        &self.helpers
    }
}

impl Demo for ShadowDemo {
    fn name(&self) -> &'static str {
        "shadow"
    }

    fn camera(&self, aspect: f32) -> Camera {
        LightingStage::camera(aspect)
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        let light = ctx.scene.add_light(
            root,
            "sunLight",
            Transform::new().with_position(Vec3::new(0.0, 5.0, 0.0)),
            Light::Directional(DirectionalLight {
                cast_shadow: true,
                shadow: ShadowSettings {
                    extent: 6.0,
                    map_size: 2048,
                    radius: 5.0,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )?;
        self.helpers = vec![
            LightHelper::attach(ctx.scene, light, HelperKind::Light)?,
            LightHelper::attach(ctx.scene, light, HelperKind::ShadowCamera)?,
        ];
        self.light = Some(light);
        self.stage = Some(LightingStage::build(ctx.scene, Centerpiece::TorusKnot, true)?);
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let Some(stage) = &self.stage else { return };
        if let Some(sphere) = stage.advance(ctx.scene, ctx.time.seconds()) {
            aim(ctx.scene, self.light, sphere);
            refresh(ctx.scene, &self.helpers);
        }
    }
}

/// The camera rides the small sphere, looking slightly ahead along its path.
#[derive(Debug, Default)]
pub struct CameraTarget {
    stage: Option<LightingStage>,
    target_pivot: Option<NodeId>,
    target: Option<NodeId>,
    helper: Option<LightHelper>,
}

impl CameraTarget {
    /// Outline helper of the rect light, once set up.
    pub fn helper(&self) -> Option<&LightHelper> {
        self.helper.as_ref()
    }

    /// Look-ahead pivot angle in radians at `seconds`.
    pub fn target_angle(seconds: f32) -> f32 {
        (seconds * ORBIT_DEGREES_PER_SECOND + LOOK_AHEAD_DEGREES).to_radians()
    }
}

impl Demo for CameraTarget {
    fn name(&self) -> &'static str {
        "camera-target"
    }

    fn camera(&self, aspect: f32) -> Camera {
        LightingStage::camera(aspect)
    }

    fn orbit_target(&self) -> Option<Vec3> {
        None
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        self.helper = Some(overhead_rect_light(ctx.scene)?);
        self.stage = Some(LightingStage::build(ctx.scene, Centerpiece::HalfSphere, false)?);

        let root = ctx.scene.root();
        let pivot = ctx.scene.add_empty(root, "targetPivot", Transform::new())?;
        self.target = Some(ctx.scene.add_empty(pivot, "target", Transform::new().with_position(RING_OFFSET))?);
        self.target_pivot = Some(pivot);
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let Some(stage) = &self.stage else { return };
        let t = ctx.time.seconds();
        let Some(eye) = stage.advance(ctx.scene, t) else {
            return;
        };
        ctx.camera.position = eye;

        if let Some(pivot) = self.target_pivot.and_then(|id| ctx.scene.transform_mut(id)) {
            pivot.rotation.y = Self::target_angle(t);
        }
        if let Some(target) = self.target.and_then(|id| ctx.scene.world_position(id)) {
            ctx.camera.look_at(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_stage_layout() {
        let mut scene = SceneGraph::new();
        let stage = LightingStage::build(&mut scene, Centerpiece::HalfSphere, false).unwrap();
        assert_eq!(stage.torus_pivots.len(), 8);
        // ground, centerpiece, 8 tori, small sphere
        assert_eq!(scene.mesh_count(), 11);
        assert_eq!(scene.find_by_name("smallSpherePivot"), Some(stage.small_sphere_pivot));

        let last = scene.node(stage.torus_pivots[7]).unwrap();
        assert!(approx_eq(last.transform.rotation.y, 315f32.to_radians()));
    }

    #[test]
    fn test_small_sphere_orbit() {
        let mut scene = SceneGraph::new();
        let stage = LightingStage::build(&mut scene, Centerpiece::HalfSphere, false).unwrap();

        let start = stage.advance(&mut scene, 0.0).unwrap();
        assert!((start - RING_OFFSET).length() < 1e-5);

        // 1.8 s at 50°/s is a quarter turn: +X rotates to -Z
        let quarter = stage.advance(&mut scene, 1.8).unwrap();
        assert!((quarter - Vec3::new(0.0, 0.5, -3.0)).length() < 1e-4);
    }

    #[test]
    fn test_target_leads_by_ten_degrees() {
        for t in [0.0, 1.0, 7.5] {
            let lead = CameraTarget::target_angle(t) - LightingStage::orbit_angle(t);
            assert!(approx_eq(lead, 10f32.to_radians()));
        }
    }

    #[test]
    fn test_shadow_flags() {
        let mut scene = SceneGraph::new();
        let stage = LightingStage::build(&mut scene, Centerpiece::TorusKnot, true).unwrap();
        let ground = scene.node(stage.ground).unwrap().mesh().unwrap();
        assert!(ground.receive_shadow && !ground.cast_shadow);
        let knot = scene.node(stage.centerpiece).unwrap();
        assert!(knot.mesh().unwrap().cast_shadow);
        assert!(approx_eq(knot.transform.position.y, 1.6));
    }
}
