//! Scene graph and components.
//!
//! This crate provides scene management:
//! - Transform and node hierarchy
//! - Camera and orbit controller
//! - Light, material and geometry descriptors
//! - Line helpers visualizing lights

pub mod camera;
pub mod geometry;
pub mod graph;
pub mod helper;
pub mod light;
pub mod material;
pub mod transform;

pub use camera::{Camera, OrbitController, Projection};
pub use geometry::{Geometry, GeometryData, Topology};
pub use graph::{Mesh, Node, NodeId, Payload, SceneGraph, Traverse};
pub use helper::{HelperKind, LightHelper, light_lines, shadow_frustum_lines};
pub use light::{
    AmbientLight, DirectionalLight, Light, PointLight, RectAreaLight, ShadowSettings, SpotLight,
};
pub use material::{Material, MaterialKind, Side, rgb_hex};
pub use transform::{Transform, normal_matrix};
