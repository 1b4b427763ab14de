//! Uniform records shared by renderers.
//!
//! These structures follow std140 layout so a GPU backend can upload them
//! unchanged; the software renderer consumes the same records on the CPU.
//! All structures use `#[repr(C)]` for predictable memory layout and implement
//! `Pod` and `Zeroable` for safe byte casting.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use stage_scene::{Camera, Light, normal_matrix};

/// Camera uniform data.
///
/// # Memory Layout
///
/// - Offset 0: view matrix (64 bytes)
/// - Offset 64: projection matrix (64 bytes)
/// - Offset 128: viewProjection matrix (64 bytes)
/// - Offset 192: camera position (12 bytes)
/// - Offset 204: padding (4 bytes)
/// - Total size: 208 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct CameraUbo {
    /// View matrix (world to view space).
    pub view: Mat4,
    /// Projection matrix (view to clip space).
    pub projection: Mat4,
    /// Combined view-projection matrix.
    pub view_projection: Mat4,
    /// Camera world position.
    pub camera_position: Vec3,
    /// Padding for 16-byte alignment.
    pub _padding: f32,
}

impl CameraUbo {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates a new camera record from matrices and position.
    pub fn new(view: Mat4, projection: Mat4, camera_position: Vec3) -> Self {
        Self {
            view,
            projection,
            view_projection: projection * view,
            camera_position,
            _padding: 0.0,
        }
    }

    /// Snapshot of a scene camera.
    pub fn from_camera(camera: &Camera) -> Self {
        Self::new(camera.view_matrix(), camera.projection_matrix(), camera.position)
    }
}

/// Per-object uniform data.
///
/// # Memory Layout
///
/// - Offset 0: model matrix (64 bytes)
/// - Offset 64: normal matrix (64 bytes)
/// - Total size: 128 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ObjectUbo {
    /// Model matrix (object to world space).
    pub model: Mat4,
    /// Normal matrix for transforming normals.
    pub normal_matrix: Mat4,
}

impl ObjectUbo {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates a new object record from a world matrix.
    pub fn new(model: Mat4) -> Self {
        Self {
            model,
            normal_matrix: normal_matrix(model),
        }
    }

    /// Creates an identity object record.
    pub fn identity() -> Self {
        Self {
            model: Mat4::IDENTITY,
            normal_matrix: Mat4::IDENTITY,
        }
    }
}

/// Light type tags stored in `LightUbo::position.w`.
pub const LIGHT_DIRECTIONAL: f32 = 0.0;
pub const LIGHT_POINT: f32 = 1.0;
pub const LIGHT_SPOT: f32 = 2.0;
pub const LIGHT_RECT_AREA: f32 = 3.0;

/// One non-ambient light in world space.
///
/// | Offset | Field | Contents |
/// |--------|-------|----------|
/// | 0  | position  | xyz world position, w type tag |
/// | 16 | direction | xyz unit direction the light travels, w cosine of the outer cone |
/// | 32 | color     | rgb color × intensity, w cosine of the inner cone |
/// | 48 | params    | distance, decay, width, height |
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LightUbo {
    pub position: Vec4,
    pub direction: Vec4,
    pub color: Vec4,
    pub params: Vec4,
}

impl LightUbo {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Pack a light placed by `world`. Ambient lights have no record.
    pub fn from_light(light: &Light, world: Mat4) -> Option<Self> {
        let position = world.transform_point3(Vec3::ZERO);
        let radiance = (light.color() * light.intensity()).extend(1.0);
        let aim = |target: Vec3| (target - position).normalize_or(Vec3::NEG_Y);

        let record = match light {
            Light::Ambient(_) => return None,
            Light::Directional(l) => Self {
                position: position.extend(LIGHT_DIRECTIONAL),
                direction: aim(l.target).extend(-1.0),
                color: radiance,
                params: Vec4::ZERO,
            },
            Light::Point(l) => Self {
                position: position.extend(LIGHT_POINT),
                direction: Vec4::new(0.0, -1.0, 0.0, -1.0),
                color: radiance,
                params: Vec4::new(l.distance, l.decay, 0.0, 0.0),
            },
            Light::Spot(l) => {
                let outer = l.angle.cos();
                let inner = (l.angle * (1.0 - l.penumbra.clamp(0.0, 1.0))).cos();
                Self {
                    position: position.extend(LIGHT_SPOT),
                    direction: aim(l.target).extend(outer),
                    color: radiance.truncate().extend(inner),
                    params: Vec4::new(l.distance, l.decay, 0.0, 0.0),
                }
            }
            Light::RectArea(l) => {
                let facing = world.transform_vector3(Vec3::NEG_Z).normalize_or(Vec3::NEG_Y);
                Self {
                    position: position.extend(LIGHT_RECT_AREA),
                    direction: facing.extend(0.0),
                    color: radiance,
                    params: Vec4::new(0.0, 0.0, l.width, l.height),
                }
            }
        };
        Some(record)
    }

    /// Type tag of this record.
    pub fn kind(&self) -> f32 {
        self.position.w
    }
}

/// Scene-wide lighting data.
///
/// - Offset 0: ambient color × intensity (16 bytes)
/// - Offset 16: number of `LightUbo` records (4 bytes)
/// - Offset 20: padding (12 bytes)
/// - Total size: 32 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SceneUbo {
    pub ambient: Vec4,
    pub light_count: u32,
    pub _padding: [u32; 3],
}

impl SceneUbo {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(ambient: Vec3, light_count: u32) -> Self {
        Self {
            ambient: ambient.extend(1.0),
            light_count,
            _padding: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_scene::{AmbientLight, DirectionalLight, RectAreaLight, SpotLight};

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_camera_ubo_size() {
        // 3 Mat4 (3 * 64) + Vec3 (12) + padding (4) = 208 bytes
        assert_eq!(CameraUbo::SIZE, 208);
        assert_eq!(std::mem::align_of::<CameraUbo>(), 16);
    }

    #[test]
    fn test_object_ubo_size() {
        assert_eq!(ObjectUbo::SIZE, 128);
        assert_eq!(std::mem::align_of::<ObjectUbo>(), 16);
    }

    #[test]
    fn test_light_and_scene_sizes() {
        assert_eq!(LightUbo::SIZE, 64);
        assert_eq!(SceneUbo::SIZE, 32);
    }

    #[test]
    fn test_camera_ubo_from_camera() {
        let mut camera = Camera::perspective(75.0_f32.to_radians(), 4.0 / 3.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 0.0, 2.0);
        let ubo = CameraUbo::from_camera(&camera);

        assert_eq!(ubo.view_projection, ubo.projection * ubo.view);
        assert_eq!(ubo.camera_position, camera.position);
    }

    #[test]
    fn test_object_ubo_scaled_normal_matrix() {
        let model = Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
        let ubo = ObjectUbo::new(model);
        assert_eq!(ubo.model, model);
        assert_eq!(ubo.normal_matrix, model.inverse().transpose());
    }

    #[test]
    fn test_ambient_has_no_record() {
        let light = Light::Ambient(AmbientLight::default());
        assert!(LightUbo::from_light(&light, Mat4::IDENTITY).is_none());
    }

    #[test]
    fn test_directional_points_at_target() {
        let light = Light::Directional(DirectionalLight {
            target: Vec3::ZERO,
            ..Default::default()
        });
        let world = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        let record = LightUbo::from_light(&light, world).unwrap();
        assert_eq!(record.kind(), LIGHT_DIRECTIONAL);
        assert!(approx_eq_vec3(record.direction.truncate(), Vec3::NEG_Y));
        assert!(approx_eq_vec3(record.position.truncate(), Vec3::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_spot_cone_cosines() {
        let light = Light::Spot(SpotLight {
            angle: 60.0_f32.to_radians(),
            penumbra: 0.5,
            ..Default::default()
        });
        let record = LightUbo::from_light(&light, Mat4::from_translation(Vec3::Y * 5.0)).unwrap();
        assert!((record.direction.w - 0.5).abs() < 1e-5);
        assert!((record.color.w - 30.0_f32.to_radians().cos()).abs() < 1e-5);
    }

    #[test]
    fn test_rect_area_faces_down_when_tilted() {
        let light = Light::RectArea(RectAreaLight {
            width: 3.0,
            height: 0.5,
            ..Default::default()
        });
        let world = Mat4::from_rotation_x(-90.0_f32.to_radians());
        let record = LightUbo::from_light(&light, world).unwrap();
        assert!(approx_eq_vec3(record.direction.truncate(), Vec3::NEG_Y));
        assert_eq!(record.params.z, 3.0);
    }

    #[test]
    fn test_ubo_pod_bytes() {
        let camera = CameraUbo::default();
        assert_eq!(bytemuck::bytes_of(&camera).len(), CameraUbo::SIZE);
        let scene = SceneUbo::new(Vec3::splat(0.2), 3);
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&scene));
        assert_eq!(words[4], 3);
    }
}
