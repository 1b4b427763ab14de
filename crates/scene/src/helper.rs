//! Line helpers that visualize lights.
//!
//! A helper is a line mesh under the scene root with its vertices in world
//! space. [`LightHelper::update`] rebuilds the lines from the light's current
//! pose, so call it after moving a light or its target.
//!
//! For targeted lights (directional, spot) the first segment always runs
//! from the light to its target.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use stage_core::{Error, Result};

use crate::geometry::Geometry;
use crate::graph::{Mesh, Node, NodeId, SceneGraph};
use crate::light::{DirectionalLight, Light, RectAreaLight, ShadowSettings, SpotLight};
use crate::material::{Material, rgb_hex};
use crate::transform::Transform;

/// Segments in a spot light's cone rim.
const RIM_SEGMENTS: u32 = 32;
/// Half size of the square drawn at a directional light.
const DIRECTIONAL_HALF_SIZE: f32 = 1.0;
/// Half size of the octahedron drawn at a point light.
const POINT_HALF_SIZE: f32 = 0.5;
const SHADOW_FRUSTUM_COLOR: u32 = 0xffaa00;

/// What a helper draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelperKind {
    /// The light itself: cone, plane, rectangle or marker
    Light,
    /// Orthographic shadow frustum of a directional light
    ShadowCamera,
}

/// A line mesh tracking one light node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightHelper {
    light: NodeId,
    node: NodeId,
    kind: HelperKind,
}

impl LightHelper {
    /// Add a helper for the light carried by `light` and build its lines.
    ///
    /// The helper node is named after the light node, e.g. `spotLightHelper`.
    pub fn attach(scene: &mut SceneGraph, light: NodeId, kind: HelperKind) -> Result<Self> {
        let node = scene
            .node(light)
            .ok_or_else(|| Error::Scene(format!("unknown light node {:?}", light)))?;
        let payload = node
            .light()
            .ok_or_else(|| Error::Scene(format!("node '{}' carries no light", node.name)))?;
        let (name, color) = match kind {
            HelperKind::Light => (format!("{}Helper", node.name), payload.color()),
            HelperKind::ShadowCamera => (
                format!("{}ShadowCameraHelper", node.name),
                rgb_hex(SHADOW_FRUSTUM_COLOR),
            ),
        };

        let root = scene.root();
        let mesh = Mesh::new(&Geometry::Lines(Vec::new()), Material::line(color));
        let node = scene.add_mesh(root, name, Transform::new(), mesh)?;
        let helper = Self { light, node, kind };
        helper.update(scene)?;
        Ok(helper)
    }

    /// The helper's mesh node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The light node being visualized.
    pub fn light(&self) -> NodeId {
        self.light
    }

    pub fn kind(&self) -> HelperKind {
        self.kind
    }

    /// Rebuild the lines from the light's current world pose and parameters.
    pub fn update(&self, scene: &mut SceneGraph) -> Result<()> {
        let light = scene
            .node(self.light)
            .and_then(Node::light)
            .copied()
            .ok_or_else(|| Error::Scene(format!("light {:?} is gone", self.light)))?;
        let world = scene
            .world_matrix(self.light)
            .ok_or_else(|| Error::Scene(format!("light {:?} is gone", self.light)))?;

        let lines = match (self.kind, light) {
            (HelperKind::Light, light) => light_lines(&light, world),
            (HelperKind::ShadowCamera, Light::Directional(directional)) => {
                shadow_frustum_lines(&directional, world)
            }
            (HelperKind::ShadowCamera, _) => Vec::new(),
        };

        let mesh = scene
            .node_mut(self.node)
            .and_then(Node::mesh_mut)
            .ok_or_else(|| Error::Scene(format!("helper mesh {:?} is gone", self.node)))?;
        mesh.geometry = Arc::new(Geometry::Lines(lines).build());
        Ok(())
    }
}

/// World-space line list outlining `light` placed at `world`.
pub fn light_lines(light: &Light, world: Mat4) -> Vec<Vec3> {
    let position = world.transform_point3(Vec3::ZERO);
    match light {
        Light::Ambient(_) => Vec::new(),
        Light::Directional(l) => directional_lines(position, l.target),
        Light::Point(_) => point_lines(position),
        Light::Spot(l) => spot_lines(position, l),
        Light::RectArea(l) => rect_lines(l, world),
    }
}

/// World-space edges of a directional light's shadow frustum: near face,
/// far face and the four connecting edges.
pub fn shadow_frustum_lines(light: &DirectionalLight, world: Mat4) -> Vec<Vec3> {
    let position = world.transform_point3(Vec3::ZERO);
    let Some(dir) = (light.target - position).try_normalize() else {
        return Vec::new();
    };
    let (u, v) = dir.any_orthonormal_pair();
    let ShadowSettings { extent, near, far, .. } = light.shadow;
    let near_face = square(position + dir * near, u, v, extent);
    let far_face = square(position + dir * far, u, v, extent);

    let mut lines = Vec::with_capacity(24);
    push_loop(&mut lines, &near_face);
    push_loop(&mut lines, &far_face);
    for (a, b) in near_face.into_iter().zip(far_face) {
        lines.extend([a, b]);
    }
    lines
}

fn directional_lines(position: Vec3, target: Vec3) -> Vec<Vec3> {
    let Some(dir) = (target - position).try_normalize() else {
        return Vec::new();
    };
    let (u, v) = dir.any_orthonormal_pair();
    let mut lines = vec![position, target];
    push_loop(&mut lines, &square(position, u, v, DIRECTIONAL_HALF_SIZE));
    lines
}

/// Axis to the target, four generators and the rim at the target's depth
/// (or at `distance` when the light has a range).
fn spot_lines(apex: Vec3, light: &SpotLight) -> Vec<Vec3> {
    let axis = light.target - apex;
    let Some(dir) = axis.try_normalize() else {
        return Vec::new();
    };
    let length = if light.distance > 0.0 {
        light.distance
    } else {
        axis.length()
    };
    let center = apex + dir * length;
    let radius = length * light.angle.tan();
    let (u, v) = dir.any_orthonormal_pair();
    let rim = |i: u32| {
        let a = std::f32::consts::TAU * i as f32 / RIM_SEGMENTS as f32;
        center + (u * a.cos() + v * a.sin()) * radius
    };

    let mut lines = vec![apex, light.target];
    for i in 0..4 {
        lines.extend([apex, rim(i * RIM_SEGMENTS / 4)]);
    }
    for i in 0..RIM_SEGMENTS {
        lines.extend([rim(i), rim(i + 1)]);
    }
    lines
}

/// Outline in the node's XY plane plus a unit stub along the emitting -Z axis.
fn rect_lines(light: &RectAreaLight, world: Mat4) -> Vec<Vec3> {
    let (hw, hh) = (light.width * 0.5, light.height * 0.5);
    let corners = [
        Vec3::new(-hw, -hh, 0.0),
        Vec3::new(hw, -hh, 0.0),
        Vec3::new(hw, hh, 0.0),
        Vec3::new(-hw, hh, 0.0),
    ]
    .map(|corner| world.transform_point3(corner));

    let mut lines = Vec::with_capacity(10);
    push_loop(&mut lines, &corners);
    lines.extend([world.transform_point3(Vec3::ZERO), world.transform_point3(Vec3::NEG_Z)]);
    lines
}

fn point_lines(center: Vec3) -> Vec<Vec3> {
    let ring = [Vec3::X, Vec3::Z, Vec3::NEG_X, Vec3::NEG_Z].map(|d| center + d * POINT_HALF_SIZE);
    let (top, bottom) = (center + Vec3::Y * POINT_HALF_SIZE, center - Vec3::Y * POINT_HALF_SIZE);

    let mut lines = Vec::with_capacity(24);
    push_loop(&mut lines, &ring);
    for p in ring {
        lines.extend([top, p, bottom, p]);
    }
    lines
}

fn square(center: Vec3, u: Vec3, v: Vec3, half: f32) -> [Vec3; 4] {
    [
        center + (u + v) * half,
        center + (v - u) * half,
        center - (u + v) * half,
        center + (u - v) * half,
    ]
}

/// Closed polyline through `corners` as segments.
fn push_loop(lines: &mut Vec<Vec3>, corners: &[Vec3]) {
    for (i, corner) in corners.iter().enumerate() {
        lines.extend([*corner, corners[(i + 1) % corners.len()]]);
    }
}
