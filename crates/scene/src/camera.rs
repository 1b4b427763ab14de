//! Camera and camera controllers.

use glam::{Mat4, Quat, Vec3};

/// Projection type for the camera.
#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

/// A camera for rendering the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Camera rotation
    pub rotation: Quat,
    /// Projection settings
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
            projection: Projection::Perspective {
                fov_y: 75.0_f32.to_radians(),
                aspect: 1.0,
                near: 0.1,
                far: 100.0,
            },
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a perspective camera at the origin.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            },
        }
    }

    /// Set the perspective projection.
    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        };
    }

    /// Set the orthographic projection.
    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        };
    }

    /// Update the projection for a new surface aspect ratio.
    ///
    /// Perspective cameras store `aspect` as given. Orthographic cameras keep
    /// their vertical extent and horizontal center and recompute `left`/`right`
    /// so the frustum width is `height * aspect`.
    pub fn set_aspect(&mut self, aspect: f32) {
        match &mut self.projection {
            Projection::Perspective { aspect: a, .. } => *a = aspect,
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                ..
            } => {
                let half_height = (*top - *bottom) * 0.5;
                let center = (*left + *right) * 0.5;
                *left = center - half_height * aspect;
                *right = center + half_height * aspect;
            }
        }
    }

    /// Current aspect ratio implied by the projection.
    pub fn aspect(&self) -> f32 {
        match self.projection {
            Projection::Perspective { aspect, .. } => aspect,
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                ..
            } => (right - left) / (top - bottom),
        }
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Get the projection matrix (right-handed, depth in `[0, 1]`).
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
        }
    }

    /// Get the view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the forward direction vector.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Get the right direction vector.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction vector.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Look at a target position, keeping +Y as up where possible.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() <= f32::EPSILON {
            return;
        }
        let forward = forward.normalize();
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_to_rh(self.position, forward, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation.normalize();
    }
}

/// Orbit controller: rotates the camera around a target point.
///
/// Mouse drag maps to [`OrbitController::rotate`] and the wheel to
/// [`OrbitController::zoom`]; [`OrbitController::apply`] writes the result
/// back into the camera.
#[derive(Clone, Debug)]
pub struct OrbitController {
    /// Point the camera orbits around
    pub target: Vec3,
    /// Distance from the target
    pub radius: f32,
    /// Horizontal angle around +Y (radians)
    pub yaw: f32,
    /// Vertical angle above the XZ plane (radians)
    pub pitch: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Fraction of radius per scroll unit
    pub zoom_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl OrbitController {
    const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    /// Build a controller matching the camera's current placement.
    pub fn from_camera(camera: &Camera, target: Vec3) -> Self {
        let offset = camera.position - target;
        let radius = offset.length().max(1e-3);
        let pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self {
            target,
            radius,
            yaw,
            pitch,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_radius: 0.1,
            max_radius: 1000.0,
        }
    }

    /// Rotate by a pointer drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.rotate_speed;
        self.pitch = (self.pitch + dy * self.rotate_speed).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Zoom by scroll units; positive values move closer.
    pub fn zoom(&mut self, amount: f32) {
        let factor = (1.0 - amount * self.zoom_speed).max(0.05);
        self.radius = (self.radius * factor).clamp(self.min_radius, self.max_radius);
    }

    /// Camera position implied by the controller state.
    pub fn eye(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    /// Place the camera and aim it at the target.
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.eye();
        camera.look_at(self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_set_aspect_perspective_is_exact() {
        let mut camera = Camera::perspective(75.0_f32.to_radians(), 1.0, 0.1, 100.0);
        camera.set_aspect(800.0 / 600.0);
        assert_eq!(camera.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn test_set_aspect_orthographic_rescales_extents() {
        let mut camera = Camera::new();
        camera.set_orthographic(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0);
        camera.set_aspect(2.0);

        match camera.projection {
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                ..
            } => {
                assert_eq!(left, -20.0);
                assert_eq!(right, 20.0);
                assert_eq!(bottom, -10.0);
                assert_eq!(top, 10.0);
            }
            _ => panic!("projection changed kind"),
        }
        assert!((camera.aspect() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(7.0, 7.0, 0.0);
        camera.look_at(Vec3::ZERO);

        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!(approx_eq_vec3(camera.forward(), expected));
        // No roll: right vector stays horizontal
        assert!(camera.right().y.abs() < EPSILON);
    }

    #[test]
    fn test_look_at_straight_down() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 5.0, 0.0);
        camera.look_at(Vec3::ZERO);
        assert!(approx_eq_vec3(camera.forward(), Vec3::NEG_Y));
    }

    #[test]
    fn test_view_matrix_moves_target_onto_axis() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, 2.0);
        let view_pos = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(approx_eq_vec3(view_pos, Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn test_orbit_controller_round_trip() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(3.0, 2.0, 4.0);
        let controller = OrbitController::from_camera(&camera, Vec3::ZERO);

        assert!(approx_eq_vec3(controller.eye(), camera.position));

        controller.apply(&mut camera);
        assert!(approx_eq_vec3(camera.forward(), (-camera.position).normalize()));
    }

    #[test]
    fn test_orbit_controller_zoom_and_pitch_limits() {
        let camera = Camera::new();
        let mut controller = OrbitController::from_camera(&camera, Vec3::ZERO);

        controller.zoom(100.0);
        assert!(controller.radius >= controller.min_radius);

        controller.rotate(0.0, 1.0e6);
        assert!(controller.pitch < std::f32::consts::FRAC_PI_2);
    }
}
