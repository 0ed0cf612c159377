// Transform utilities for Mat4
//
// Object placement (scale, rotation, translation) and the camera matrix
// builders that glam does not provide directly.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Placement of an object in the world.
///
/// Applied as scale, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
}

impl Transform {
    /// Create a transform that only translates.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Set the scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set the rotation from an axis and an angle in radians.
    ///
    /// A zero-length axis leaves the rotation untouched.
    pub fn with_axis_angle(mut self, axis: Vec3, angle: f32) -> Self {
        if let Some(axis) = axis.try_normalize() {
            self.rotation = Quat::from_axis_angle(axis, angle);
        }
        self
    }

    /// Local-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a surface normal: inverse-transpose of the upper 3x3,
    /// renormalized. Falls back to the input for degenerate matrices.
    fn transform_normal(&self, normal: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let linear = Mat3::from_mat4(*self);
        if linear.determinant().abs() < f32::EPSILON {
            return normal;
        }
        let transformed = linear.inverse().transpose() * normal;
        transformed.try_normalize().unwrap_or(normal)
    }
}

/// OpenGL-style perspective projection.
///
/// `fov` is the vertical field of view in radians. With `invert_y` the Y
/// axis is flipped so that image row 0 is the top of the view.
pub fn perspective_matrix(aspect: f32, fov: f32, near: f32, far: f32, invert_y: bool) -> Mat4 {
    let mut proj = Mat4::perspective_rh_gl(fov, aspect, near, far);
    if invert_y {
        proj.y_axis.y = -proj.y_axis.y;
    }
    proj
}
