//! First steps: a spinning box, a wireframe, nested systems and a point cloud.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stage_core::Result;
use stage_scene::{Camera, Geometry, Material, Mesh, NodeId, Transform, rgb_hex};

use super::{key_light, perspective};
use crate::demo::{Demo, FrameContext, SetupContext};

/// A phong box tumbling under one directional light.
#[derive(Debug, Default)]
pub struct Structure {
    cube: Option<NodeId>,
}

impl Demo for Structure {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn camera(&self, aspect: f32) -> Camera {
        perspective(aspect, Vec3::new(0.0, 0.0, 2.0))
    }

    fn orbit_target(&self) -> Option<Vec3> {
        None
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        key_light(ctx.scene, root)?;
        let cube = Mesh::new(&Geometry::cuboid(1.0, 1.0, 1.0), Material::phong(rgb_hex(0x044a88)));
        self.cube = Some(ctx.scene.add_mesh(root, "cube", Transform::new(), cube)?);
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let t = ctx.time.seconds();
        if let Some(transform) = self.cube.and_then(|id| ctx.scene.transform_mut(id)) {
            transform.rotation.x = t;
            transform.rotation.y = t / 10.0;
        }
    }
}

/// A sphere and its edge wireframe spinning together in one group.
#[derive(Debug, Default)]
pub struct Wireframe {
    group: Option<NodeId>,
}

impl Demo for Wireframe {
    fn name(&self) -> &'static str {
        "wireframe"
    }

    fn camera(&self, aspect: f32) -> Camera {
        perspective(aspect, Vec3::new(0.0, 0.0, 2.0))
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        key_light(ctx.scene, root)?;

        let group = ctx.scene.add_empty(root, "group", Transform::new())?;
        let sphere = Geometry::sphere(1.0, 10, 10);
        ctx.scene.add_mesh(
            group,
            "sphere",
            Transform::new(),
            Mesh::new(&sphere, Material::phong(rgb_hex(0x044a88))),
        )?;
        ctx.scene.add_mesh(
            group,
            "edges",
            Transform::new(),
            Mesh::new(&Geometry::wireframe(sphere), Material::line(rgb_hex(0xffff00))),
        )?;
        self.group = Some(group);
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let t = ctx.time.seconds();
        if let Some(transform) = self.group.and_then(|id| ctx.scene.transform_mut(id)) {
            transform.rotation.x = t;
            transform.rotation.y = t / 10.0;
        }
    }
}

/// Three spheres, each inside a pivot that spins faster than its parent.
#[derive(Debug, Default)]
pub struct SceneGraphDemo {
    systems: [Option<NodeId>; 3],
}

impl SceneGraphDemo {
    /// Y spin per second of each nested system, outermost first.
    const SPIN: [f32; 3] = [1.0, 2.0, 4.0];
}

impl Demo for SceneGraphDemo {
    fn name(&self) -> &'static str {
        "scenegraph"
    }

    fn camera(&self, aspect: f32) -> Camera {
        perspective(aspect, Vec3::new(0.0, 0.0, 20.0))
    }

    fn orbit_target(&self) -> Option<Vec3> {
        None
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        key_light(ctx.scene, root)?;

        let bodies = [(3.0, 0x044a88, 0.0), (2.0, 0x012458, 10.0), (1.0, 0x0ad990, 3.0)];
        let mut parent = root;
        for (i, (radius, color, offset)) in bodies.into_iter().enumerate() {
            let system = ctx.scene.add_empty(
                parent,
                format!("system{}", i + 1),
                Transform::new().with_position(Vec3::new(offset, 0.0, 0.0)),
            )?;
            ctx.scene.add_mesh(
                system,
                format!("body{}", i + 1),
                Transform::new(),
                Mesh::new(&Geometry::sphere(radius, 10, 10), Material::phong(rgb_hex(color))),
            )?;
            self.systems[i] = Some(system);
            parent = system;
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let t = ctx.time.seconds();
        for (system, spin) in self.systems.iter().zip(Self::SPIN) {
            if let Some(transform) = system.and_then(|id| ctx.scene.transform_mut(id)) {
                transform.rotation.y = spin * t;
            }
        }
    }
}

/// Number of points in the random clouds.
pub(crate) const CLOUD_SIZE: usize = 10_000;

/// `CLOUD_SIZE` points uniformly spread over a cube of the given edge.
pub(crate) fn random_cloud(seed: u64, spread: f32) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = spread * 0.5;
    (0..CLOUD_SIZE)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
            )
        })
        .collect()
}

/// Ten thousand fixed-size red points.
#[derive(Debug)]
pub struct PointCloud {
    seed: u64,
    points: Option<NodeId>,
}

impl Default for PointCloud {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            points: None,
        }
    }
}

impl Demo for PointCloud {
    fn name(&self) -> &'static str {
        "points"
    }

    fn camera(&self, aspect: f32) -> Camera {
        perspective(aspect, Vec3::new(0.0, 0.0, 2.0))
    }

    fn orbit_target(&self) -> Option<Vec3> {
        None
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        key_light(ctx.scene, root)?;
        let cloud = Geometry::Points(random_cloud(self.seed, 5.0));
        let mesh = Mesh::new(&cloud, Material::points(rgb_hex(0xff0000), 5.0, false));
        self.points = Some(ctx.scene.add_mesh(root, "points", Transform::new(), mesh)?);
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let t = ctx.time.seconds();
        if let Some(transform) = self.points.and_then(|id| ctx.scene.transform_mut(id)) {
            transform.rotation.x = t;
            transform.rotation.y = t / 10.0;
        }
    }
}
