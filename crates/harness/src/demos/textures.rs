//! Demos whose meshes wait on texture loads.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use stage_core::Result;
use stage_resources::{Filter, Texture, Wrap};
use stage_scene::{
    AmbientLight, Camera, Geometry, Light, Material, Mesh, NodeId, SceneGraph, Side, Transform,
    rgb_hex,
};
use tracing::info;

use super::basic::random_cloud;
use super::materials::box_and_sphere;
use super::{key_light, perspective, poll_slot, report_skipped};
use crate::demo::{Demo, SetupContext};
use crate::pending::Pending;

const SPRITE: &str = "circle.png";
const TILE: &str = "1.jpg";

/// Yellow round sprites; the cloud appears once the sprite arrives.
#[derive(Debug)]
pub struct SpritePoints {
    seed: u64,
    sprite: Option<Pending<Texture>>,
    points: Option<NodeId>,
}

impl Default for SpritePoints {
    fn default() -> Self {
        Self {
            seed: 0xc1c1e,
            sprite: None,
            points: None,
        }
    }
}

impl SpritePoints {
    /// Node holding the cloud, once built.
    pub fn points(&self) -> Option<NodeId> {
        self.points
    }
}

impl Demo for SpritePoints {
    fn name(&self) -> &'static str {
        "sprite-points"
    }

    fn camera(&self, aspect: f32) -> Camera {
        perspective(aspect, Vec3::new(0.0, 0.0, 10.0))
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        key_light(ctx.scene, root)?;
        self.sprite = Some(ctx.load_texture(SPRITE));
        Ok(())
    }

    fn resolve(&mut self, scene: &mut SceneGraph) -> Result<()> {
        match poll_slot(&mut self.sprite) {
            Some(Ok(sprite)) => {
                let material = Material {
                    map: Some(Arc::new(sprite)),
                    alpha_test: 0.5,
                    ..Material::points(rgb_hex(0xffff00), 0.1, true)
                };
                let cloud = Geometry::Points(random_cloud(self.seed, 5.0));
                let root = scene.root();
                self.points = Some(scene.add_mesh(root, "points", Transform::new(), Mesh::new(&cloud, material))?);
                info!("Sprite cloud ready");
            }
            Some(Err(e)) => report_skipped(SPRITE, "the point cloud", &e),
            None => {}
        }
        Ok(())
    }
}

/// A tiled, offset texture on a box and a sphere.
#[derive(Debug, Default)]
pub struct TextureDemo {
    map: Option<Pending<Texture>>,
}

impl TextureDemo {
    /// Four repeats per face, shifted by half a tile.
    fn configure(texture: Texture) -> Texture {
        let mut texture = texture.with_wrap(Wrap::Repeat);
        texture.repeat = Vec2::splat(4.0);
        texture.offset = Vec2::splat(0.5);
        texture.mag_filter = Filter::Linear;
        texture.min_filter = Filter::NearestMipmapLinear;
        texture
    }
}

impl Demo for TextureDemo {
    fn name(&self) -> &'static str {
        "texture"
    }

    fn camera(&self, aspect: f32) -> Camera {
        perspective(aspect, Vec3::new(0.0, 0.0, 3.0))
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        key_light(ctx.scene, root)?;
        self.map = Some(ctx.load_texture(TILE));
        Ok(())
    }

    fn resolve(&mut self, scene: &mut SceneGraph) -> Result<()> {
        match poll_slot(&mut self.map) {
            Some(Ok(texture)) => {
                let material = Material {
                    map: Some(Arc::new(Self::configure(texture))),
                    ..Material::default()
                };
                box_and_sphere(scene, Arc::new(material), &Geometry::cuboid(1.0, 1.0, 1.0))?;
            }
            Some(Err(e)) => report_skipped(TILE, "the textured meshes", &e),
            None => {}
        }
        Ok(())
    }
}

/// Texture slots of the PBR demo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MapSlot {
    Base,
    Occlusion,
    Height,
    Normal,
    Roughness,
    Metalness,
    Baked,
}

impl MapSlot {
    const ALL: [MapSlot; 7] = [
        MapSlot::Base,
        MapSlot::Occlusion,
        MapSlot::Height,
        MapSlot::Normal,
        MapSlot::Roughness,
        MapSlot::Metalness,
        MapSlot::Baked,
    ];

    fn file(self) -> &'static str {
        match self {
            MapSlot::Base => "Glass_Window_002_basecolor.jpg",
            MapSlot::Occlusion => "Glass_Window_002_ambientOcclusion.jpg",
            MapSlot::Height => "Glass_Window_002_height.png",
            MapSlot::Normal => "Glass_Window_002_normal.jpg",
            MapSlot::Roughness => "Glass_Window_002_roughness.jpg",
            MapSlot::Metalness => "Glass_Window_002_metallic.jpg",
            MapSlot::Baked => "light1.jpeg",
        }
    }

    fn assign(self, material: &mut Material, texture: Arc<Texture>) {
        let slot = match self {
            MapSlot::Base => &mut material.map,
            MapSlot::Occlusion => &mut material.ao_map,
            MapSlot::Height => &mut material.displacement_map,
            MapSlot::Normal => &mut material.normal_map,
            MapSlot::Roughness => &mut material.roughness_map,
            MapSlot::Metalness => &mut material.metalness_map,
            MapSlot::Baked => &mut material.light_map,
        };
        *slot = Some(texture);
    }
}

/// A full PBR map set plus a baked light map on a subdivided box and a
/// sphere, lit from the camera.
///
/// The meshes are added once every map has settled; maps that failed to
/// load are left empty.
#[derive(Debug, Default)]
pub struct PbrMaps {
    loads: Vec<(MapSlot, Option<Pending<Texture>>)>,
    material: Material,
    built: bool,
}

impl PbrMaps {
    fn base_material() -> Material {
        Material {
            displacement_scale: 0.2,
            displacement_bias: -0.15,
            ao_map_intensity: 10.0,
            light_map_intensity: 2.0,
            transparent: true,
            side: Side::Double,
            ..Material::standard(Vec3::ONE, 1.0, 0.5)
        }
    }
}

impl Demo for PbrMaps {
    fn name(&self) -> &'static str {
        "pbr-maps"
    }

    fn camera(&self, aspect: f32) -> Camera {
        perspective(aspect, Vec3::new(0.0, 0.0, 3.0))
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        ctx.scene.add_light(
            root,
            "ambient",
            Transform::new(),
            Light::Ambient(AmbientLight {
                color: Vec3::ONE,
                intensity: 0.2,
            }),
        )?;
        let rig = ctx.scene.camera_rig()?;
        key_light(ctx.scene, rig)?;

        self.material = Self::base_material();
        self.loads = MapSlot::ALL
            .into_iter()
            .map(|slot| (slot, Some(ctx.load_texture(slot.file()))))
            .collect();
        Ok(())
    }

    fn resolve(&mut self, scene: &mut SceneGraph) -> Result<()> {
        if self.built || self.loads.is_empty() {
            return Ok(());
        }
        for (slot, load) in &mut self.loads {
            match poll_slot(load) {
                Some(Ok(texture)) => slot.assign(&mut self.material, Arc::new(texture)),
                Some(Err(e)) => report_skipped(slot.file(), "that map", &e),
                None => {}
            }
        }
        if self.loads.iter().any(|(_, load)| load.is_some()) {
            return Ok(());
        }

        let subdivided = Geometry::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            width_segments: 64,
            height_segments: 64,
            depth_segments: 64,
        };
        let material = Arc::new(std::mem::take(&mut self.material));
        info!("PBR maps settled: {} of {} bound", material.textures().count(), MapSlot::ALL.len());
        box_and_sphere(scene, material, &subdivided)?;
        self.built = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_configuration() {
        let texture = TextureDemo::configure(Texture::solid(2, 2, [255; 4]));
        assert_eq!(texture.wrap_s, Wrap::Repeat);
        assert_eq!(texture.wrap_t, Wrap::Repeat);
        assert_eq!(texture.repeat, Vec2::splat(4.0));
        assert_eq!(texture.offset, Vec2::splat(0.5));
        assert_eq!(texture.min_filter, Filter::NearestMipmapLinear);
    }

    #[test]
    fn test_material_settings() {
        let material = PbrMaps::base_material();
        assert_eq!((material.roughness, material.metalness), (1.0, 0.5));
        assert_eq!(material.ao_map_intensity, 10.0);
        assert_eq!(material.light_map_intensity, 2.0);
        assert_eq!(material.side, Side::Double);
        assert!(material.transparent);
    }

    #[test]
    fn test_every_slot_is_assigned() {
        let mut material = Material::default();
        let texture = Arc::new(Texture::solid(1, 1, [0, 0, 0, 255]));
        for slot in MapSlot::ALL {
            slot.assign(&mut material, Arc::clone(&texture));
        }
        assert_eq!(material.textures().count(), 7);
        assert!(material.light_map.is_some());
        assert!(material.alpha_map.is_none());
    }
}
