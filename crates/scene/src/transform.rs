//! Transform component for scene nodes.
//!
//! This module provides the [`Transform`] struct for representing position,
//! rotation, and scale of a node relative to its parent. Rotation is stored
//! as Euler angles (radians, applied in XYZ order) so per-frame updates can
//! set a single axis directly.
//!
//! # Example
//!
//! ```
//! use stage_scene::Transform;
//! use glam::Vec3;
//!
//! let mut t = Transform::new().with_position(Vec3::new(3.0, 0.5, 0.0));
//! t.rotation.y = 1.2;
//!
//! let local = t.local_matrix();
//! ```

use glam::{EulerRot, Mat4, Quat, Vec3};

/// A transform representing position, rotation, and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position relative to the parent node
    pub position: Vec3,
    /// Euler rotation in radians, XYZ order
    pub rotation: Vec3,
    /// Scale factor
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with the given position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Create a transform with the given Euler rotation (radians).
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Create a transform with the given scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// The rotation as a quaternion.
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Set the rotation from a quaternion.
    pub fn set_quaternion(&mut self, rotation: Quat) {
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }

    /// Rotate around the local X axis by `angle` radians.
    pub fn rotate_x(&mut self, angle: f32) {
        self.set_quaternion(self.quaternion() * Quat::from_rotation_x(angle));
    }

    /// Rotate around the local Y axis by `angle` radians.
    pub fn rotate_y(&mut self, angle: f32) {
        self.set_quaternion(self.quaternion() * Quat::from_rotation_y(angle));
    }

    /// Rotate around the local Z axis by `angle` radians.
    pub fn rotate_z(&mut self, angle: f32) {
        self.set_quaternion(self.quaternion() * Quat::from_rotation_z(angle));
    }

    /// Get the local transformation matrix.
    ///
    /// Parent transforms are not included; the scene graph composes them.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }

    /// Get the forward direction vector.
    pub fn forward(&self) -> Vec3 {
        self.quaternion() * Vec3::NEG_Z
    }

    /// Get the right direction vector.
    pub fn right(&self) -> Vec3 {
        self.quaternion() * Vec3::X
    }

    /// Get the up direction vector.
    pub fn up(&self) -> Vec3 {
        self.quaternion() * Vec3::Y
    }
}

/// Get the normal matrix (inverse transpose) of a model matrix.
///
/// # Non-invertible matrices
///
/// If the matrix is not invertible (e.g., contains zero scale),
/// the identity matrix is returned as a fallback to avoid NaN/Inf values.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    const EPSILON: f32 = 1e-6;
    if model.determinant().abs() < EPSILON {
        Mat4::IDENTITY
    } else {
        model.inverse().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.local_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_transform_builder() {
        let t = Transform::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::splat(2.0));

        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_y_rotation_moves_offset_point() {
        let t = Transform::new().with_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        let p = t.local_matrix().transform_point3(Vec3::new(3.0, 0.0, 0.0));

        // +X rotated a quarter turn about +Y lands on -Z
        assert!(approx_eq_vec3(p, Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn test_quaternion_round_trip() {
        let mut t = Transform::new();
        t.set_quaternion(Quat::from_rotation_x(0.4));
        assert!(approx_eq_vec3(t.rotation, Vec3::new(0.4, 0.0, 0.0)));
    }

    #[test]
    fn test_incremental_rotation() {
        let mut t = Transform::new();
        t.rotate_x(-75.0_f32.to_radians());
        t.rotate_z(-20.0_f32.to_radians());

        let expected = Quat::from_rotation_x(-75.0_f32.to_radians())
            * Quat::from_rotation_z(-20.0_f32.to_radians());
        assert!(t.quaternion().abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn test_half_turn_forward() {
        let t = Transform::new().with_rotation(Vec3::new(0.0, PI, 0.0));
        assert!(approx_eq_vec3(t.forward(), Vec3::Z));
    }

    #[test]
    fn test_normal_matrix_with_scale() {
        let model = Transform::new()
            .with_scale(Vec3::new(1.0, 2.0, 1.0))
            .local_matrix();
        assert_eq!(normal_matrix(model), model.inverse().transpose());
    }

    #[test]
    fn test_normal_matrix_non_invertible() {
        let model = Transform::new().with_scale(Vec3::ZERO).local_matrix();
        let normal = normal_matrix(model);

        assert_eq!(normal, Mat4::IDENTITY);
        let cols = [normal.x_axis, normal.y_axis, normal.z_axis, normal.w_axis];
        for col in cols {
            assert!(!col.is_nan());
        }
    }

    #[test]
    fn test_direction_vectors() {
        let t = Transform::default();

        // Default orientation: -Z forward, +X right, +Y up
        assert_eq!(t.forward(), Vec3::NEG_Z);
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.up(), Vec3::Y);
    }
}
