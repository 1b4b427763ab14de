//! A box wearing a live video stream.

use std::sync::Arc;

use glam::Vec3;
use stage_core::Result;
use stage_resources::{Texture, VideoSource};
use stage_scene::{Camera, Geometry, Material, Mesh, Node, NodeId, SceneGraph, Transform, rgb_hex};
use tracing::{info, warn};

use super::{key_light, perspective, poll_slot, report_skipped};
use crate::demo::{Demo, FrameContext, SetupContext};
use crate::pending::Pending;

/// Requests the capture stream during setup and adds the box once the
/// stream opens. A refused or missing device leaves the scene without it.
#[derive(Default)]
pub struct VideoTexture {
    capture: Option<Pending<Box<dyn VideoSource>>>,
    source: Option<Box<dyn VideoSource>>,
    screen: Option<NodeId>,
}

impl VideoTexture {
    /// The textured box, once the stream is live.
    pub fn screen(&self) -> Option<NodeId> {
        self.screen
    }

    fn attach(&mut self, scene: &mut SceneGraph, source: Box<dyn VideoSource>) -> Result<()> {
        let (width, height) = source.size();
        let material = Material {
            map: Some(Arc::new(Texture::solid(width, height, [0, 0, 0, 255]))),
            ..Material::phong(rgb_hex(0x44a888))
        };
        let root = scene.root();
        let mesh = Mesh::new(&Geometry::cuboid(1.0, 1.0, 1.0), material);
        self.screen = Some(scene.add_mesh(root, "videoBox", Transform::new(), mesh)?);
        self.source = Some(source);
        info!("Video stream attached at {}x{}", width, height);
        Ok(())
    }
}

impl Demo for VideoTexture {
    fn name(&self) -> &'static str {
        "video-texture"
    }

    fn camera(&self, aspect: f32) -> Camera {
        perspective(aspect, Vec3::new(0.0, 0.0, 2.0))
    }

    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> Result<()> {
        let root = ctx.scene.root();
        key_light(ctx.scene, root)?;
        self.capture = Some(ctx.open_capture());
        Ok(())
    }

    fn resolve(&mut self, scene: &mut SceneGraph) -> Result<()> {
        match poll_slot(&mut self.capture) {
            Some(Ok(source)) => self.attach(scene, source),
            Some(Err(e)) => {
                report_skipped("media capture", "the video box", &e);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let (Some(source), Some(screen)) = (self.source.as_mut(), self.screen) else {
            return;
        };
        let frame = match source.next_frame(ctx.time.timestamp_ms()) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Video stream ended: {}", e);
                self.source = None;
                return;
            }
        };
        let map = ctx
            .scene
            .node_mut(screen)
            .and_then(Node::mesh_mut)
            .and_then(|mesh| mesh.material_mut().map.as_mut());
        if let Some(map) = map {
            Arc::make_mut(map).replace_image(frame);
        }
    }
}
