//! Material showcases: one material shared by a box and a sphere.

use std::sync::Arc;

use glam::Vec3;
use stage_core::Result;
use stage_scene::{Camera, Geometry, Material, MaterialKind, Mesh, NodeId, SceneGraph, Side, Transform, rgb_hex};

use super::{key_light, perspective};
use crate::demo::{Demo, SetupContext};

/// Box at x = -1 and sphere at x = +1, both wearing `material`.
pub(crate) fn box_and_sphere(
    scene: &mut SceneGraph,
    material: Arc<Material>,
    box_geometry: &Geometry,
) -> Result<(NodeId, NodeId)> {
    let root = scene.root();
    let cube = scene.add_mesh(
        root,
        "box",
        Transform::new().with_position(Vec3::new(-1.0, 0.0, 0.0)),
        Mesh::shared(Arc::new(box_geometry.build()), Arc::clone(&material)),
    )?;
    let sphere = scene.add_mesh(
        root,
        "sphere",
        Transform::new().with_position(Vec3::new(1.0, 0.0, 0.0)),
        Mesh::shared(Arc::new(Geometry::sphere(0.5, 32, 32).build()), material),
    )?;
    Ok((cube, sphere))
}

fn material_stage(ctx: &mut SetupContext<'_>, material: Material) -> Result<()> {
    let root = ctx.scene.root();
    key_light(ctx.scene, root)?;
    box_and_sphere(ctx.scene, Arc::new(material), &Geometry::cuboid(1.0, 1.0, 1.0))?;
    Ok(())
}

fn material_camera(aspect: f32) -> Camera {
    perspective(aspect, Vec3::new(0.0, 0.0, 3.0))
}

/// Half-transparent unlit yellow.
#[derive(Debug, Default)]
pub struct MaterialBasic;

impl Demo for MaterialBasic {
    fn name(&self) -> &'static str {
        "material-basic"
    }

    fn camera(&self, aspect: f32) -> Camera {
        material_camera(aspect)
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        material_stage(
            ctx,
            Material {
                transparent: true,
                opacity: 0.5,
                side: Side::Front,
                ..Material::basic(rgb_hex(0xffff00))
            },
        )
    }
}

/// Red phong with cyan highlights.
#[derive(Debug, Default)]
pub struct MaterialPhong;

impl Demo for MaterialPhong {
    fn name(&self) -> &'static str {
        "material-phong"
    }

    fn camera(&self, aspect: f32) -> Camera {
        material_camera(aspect)
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        material_stage(
            ctx,
            Material {
                emissive: Vec3::ZERO,
                specular: rgb_hex(0x00ffff),
                shininess: 10.0,
                ..Material::phong(rgb_hex(0xff0000))
            },
        )
    }
}

/// Red metal with a clearcoat slot.
#[derive(Debug, Default)]
pub struct MaterialPhysical;

impl Demo for MaterialPhysical {
    fn name(&self) -> &'static str {
        "material-physical"
    }

    fn camera(&self, aspect: f32) -> Camera {
        material_camera(aspect)
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        material_stage(
            ctx,
            Material {
                roughness: 0.25,
                metalness: 1.0,
                clearcoat: 0.0,
                clearcoat_roughness: 0.0,
                ..Material::new(MaterialKind::Physical, rgb_hex(0xff0000))
            },
        )
    }
}
