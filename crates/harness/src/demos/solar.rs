//! A toy solar system: eight planets on orbit pivots around a glowing sun.

use glam::Vec3;
use stage_core::Result;
use stage_scene::{
    AmbientLight, Camera, Geometry, Light, Material, Mesh, NodeId, PointLight, SceneGraph, Transform, rgb_hex,
};

use crate::demo::{Demo, FrameContext, SetupContext};

/// Sphere tessellation for every body.
const SEGMENTS: u32 = 32;

struct Body {
    radius: f32,
    color: u32,
    metalness: f32,
    /// Distance of the planet's system from the sun
    distance: f32,
    /// Orbit pivot Y rotation per second
    orbit: f32,
    /// System pivot Y rotation per second
    spin: f32,
}

const fn body(radius: f32, color: u32, distance: f32, orbit: f32, spin: f32) -> Body {
    Body {
        radius,
        color,
        metalness: 0.0,
        distance,
        orbit,
        spin,
    }
}

const PLANETS: [Body; 8] = [
    body(10.0, 0xb9ccf2, 80.0, 0.25, 1.0),
    body(20.0, 0xe75d21, 140.0, 0.6, 1.0),
    body(25.0, 0x3960ef, 210.0, 1.0, 2.0),
    Body {
        metalness: 1.0,
        ..body(18.0, 0xe29d42, 290.0, 1.8, 1.0)
    },
    body(40.0, 0xdbc09d, 370.0, 0.08, 1.0),
    body(30.0, 0x6a9572, 470.0, 0.03, 1.0),
    body(25.0, 0x4ab8ce, 550.0, 0.01, 1.0),
    body(20.0, 0x2c4493, 620.0, 0.005, 1.0),
];

/// Index of the planet with a moon.
const MOON_HOST: usize = 2;
/// Index of the ringed planet.
const RING_HOST: usize = 5;

/// Orbit and system pivots, one pair per planet.
#[derive(Debug, Default)]
pub struct SolarSystem {
    orbits: Vec<NodeId>,
    systems: Vec<NodeId>,
}

impl SolarSystem {
    fn add_sun(scene: &mut SceneGraph, parent: NodeId) -> Result<()> {
        let material = Material {
            emissive: rgb_hex(0xffff00),
            ..Material::standard(rgb_hex(0xff6a3e), 1.0, 0.0)
        };
        scene.add_mesh(
            parent,
            "sun",
            Transform::new(),
            Mesh::new(&Geometry::sphere(50.0, SEGMENTS, SEGMENTS), material),
        )?;
        Ok(())
    }

    fn add_planet(scene: &mut SceneGraph, system: NodeId, index: usize, planet: &Body) -> Result<()> {
        scene.add_mesh(
            system,
            format!("planet{index}"),
            Transform::new(),
            Mesh::new(
                &Geometry::sphere(planet.radius, SEGMENTS, SEGMENTS),
                Material::standard(rgb_hex(planet.color), 1.0, planet.metalness),
            ),
        )?;

        if index == MOON_HOST {
            scene.add_mesh(
                system,
                "moon",
                Transform::new().with_position(Vec3::new(40.0, 0.0, 0.0)),
                Mesh::new(
                    &Geometry::sphere(5.0, SEGMENTS, SEGMENTS),
                    Material::standard(rgb_hex(0xfbffbe), 1.0, 0.0),
                ),
            )?;
        }
        if index == RING_HOST {
            scene.add_mesh(
                system,
                "ring",
                Transform::new().with_rotation(Vec3::new(80f32.to_radians(), 0.0, 0.0)),
                Mesh::new(
                    &Geometry::torus(40.0, 4.0, 4, 128),
                    Material::standard(rgb_hex(0x464325), 1.0, 0.0),
                ),
            )?;
        }
        Ok(())
    }
}

impl Demo for SolarSystem {
    fn name(&self) -> &'static str {
        "solar-system"
    }

    fn camera(&self, aspect: f32) -> Camera {
        let mut camera = Camera::perspective(75f32.to_radians(), aspect, 0.1, 10_000.0);
        camera.position = Vec3::new(0.0, 0.0, 800.0);
        camera
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        ctx.scene.add_light(
            root,
            "ambient",
            Transform::new(),
            Light::Ambient(AmbientLight {
                color: Vec3::ONE,
                intensity: 0.5,
            }),
        )?;
        ctx.scene.add_light(
            root,
            "sunLight",
            Transform::new(),
            Light::Point(PointLight::default()),
        )?;

        let solar = ctx.scene.add_empty(root, "solarSystem", Transform::new())?;
        Self::add_sun(ctx.scene, solar)?;

        self.orbits.clear();
        self.systems.clear();
        for (i, planet) in PLANETS.iter().enumerate() {
            let orbit = ctx.scene.add_empty(solar, format!("orbit{i}"), Transform::new())?;
            let system = ctx.scene.add_empty(
                orbit,
                format!("system{i}"),
                Transform::new().with_position(Vec3::new(planet.distance, 0.0, 0.0)),
            )?;
            Self::add_planet(ctx.scene, system, i, planet)?;
            self.orbits.push(orbit);
            self.systems.push(system);
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let t = ctx.time.seconds();
        for (i, planet) in PLANETS.iter().enumerate() {
            if let Some(orbit) = self.orbits.get(i).and_then(|id| ctx.scene.transform_mut(*id)) {
                orbit.rotation.y = planet.orbit * t;
            }
            if let Some(system) = self.systems.get(i).and_then(|id| ctx.scene.transform_mut(*id)) {
                system.rotation.y = planet.spin * t;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_table() {
        let distances: Vec<f32> = PLANETS.iter().map(|p| p.distance).collect();
        assert!(distances.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(PLANETS[MOON_HOST].spin, 2.0);
    }
}
