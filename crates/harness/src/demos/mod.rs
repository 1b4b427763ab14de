//! Demo registry.
//!
//! Every demo is a small type implementing [`Demo`]; this module lists them
//! by name and holds the setup pieces several of them share.

mod basic;
mod lighting;
mod materials;
mod solar;
mod textures;
mod video;

use glam::Vec3;
use stage_core::Result;
use stage_resources::{ResourceError, ResourceResult};
use stage_scene::{Camera, DirectionalLight, Light, NodeId, SceneGraph, Transform};
use tracing::{debug, warn};

use crate::demo::Demo;
use crate::pending::Pending;

pub use basic::{PointCloud, SceneGraphDemo, Structure, Wireframe};
pub use lighting::{CameraTarget, Centerpiece, LightingStage, RectAreaLighting, ShadowDemo, SpotLighting};
pub use materials::{MaterialBasic, MaterialPhong, MaterialPhysical};
pub use solar::SolarSystem;
pub use textures::{PbrMaps, SpritePoints, TextureDemo};
pub use video::VideoTexture;

/// Demo used when none is named.
pub const DEFAULT_DEMO: &str = "structure";

/// One instance of every demo, in presentation order.
pub fn registry() -> Vec<Box<dyn Demo>> {
    vec![
        Box::new(Structure::default()),
        Box::new(Wireframe::default()),
        Box::new(SceneGraphDemo::default()),
        Box::new(PointCloud::default()),
        Box::new(SpritePoints::default()),
        Box::new(MaterialBasic),
        Box::new(MaterialPhong),
        Box::new(MaterialPhysical),
        Box::new(TextureDemo::default()),
        Box::new(PbrMaps::default()),
        Box::new(SpotLighting::default()),
        Box::new(RectAreaLighting::default()),
        Box::new(ShadowDemo::default()),
        Box::new(CameraTarget::default()),
        Box::new(SolarSystem::default()),
        Box::new(VideoTexture::default()),
    ]
}

/// Registered demo names.
pub fn names() -> Vec<&'static str> {
    registry().iter().map(|demo| demo.name()).collect()
}

/// A fresh demo instance for `name`.
pub fn by_name(name: &str) -> Option<Box<dyn Demo>> {
    registry().into_iter().find(|demo| demo.name() == name)
}

/// 75° perspective camera with the usual 0.1..100 depth range.
pub(crate) fn perspective(aspect: f32, position: Vec3) -> Camera {
    let mut camera = Camera::perspective(75f32.to_radians(), aspect, 0.1, 100.0);
    camera.position = position;
    camera
}

/// White directional light at (-1, 2, 4) aimed at the origin.
pub(crate) fn key_light(scene: &mut SceneGraph, parent: NodeId) -> Result<NodeId> {
    scene.add_light(
        parent,
        "keyLight",
        Transform::new().with_position(Vec3::new(-1.0, 2.0, 4.0)),
        Light::Directional(DirectionalLight::default()),
    )
}

/// Poll a pending slot, emptying it once it settles.
pub(crate) fn poll_slot<T>(slot: &mut Option<Pending<T>>) -> Option<ResourceResult<T>> {
    let result = slot.as_mut()?.poll()?;
    *slot = None;
    Some(result)
}

/// Log a collaborator failure that leaves `skipped` out of the scene.
pub(crate) fn report_skipped(what: &str, skipped: &str, error: &ResourceError) {
    match error {
        ResourceError::Cancelled => debug!("'{}' cancelled; {} not added", what, skipped),
        ResourceError::Unsupported(_) => warn!("{}: {}; skipping {}", what, error, skipped),
        _ => warn!("Failed to get '{}' ({}); continuing without {}", what, error, skipped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names = names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), 16);
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_default_is_registered() {
        assert!(by_name(DEFAULT_DEMO).is_some());
        assert!(by_name("no-such-demo").is_none());
    }
}
