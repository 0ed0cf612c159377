use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};

use crate::perspective_matrix;

const PHI_MIN: f32 = 0.01;
const PHI_MAX: f32 = PI - 0.01;

/// Camera for 3D rendering, oriented by spherical angles.
///
/// `theta` is the azimuth around +Y, `phi` the polar angle measured from +Y.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub theta: f32,
    pub phi: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub invert_y: bool,
}

impl Camera {
    /// Create a new camera with the given position and angles (radians).
    pub fn new(position: Vec3, theta: f32, phi: f32) -> Self {
        Self {
            position,
            theta,
            phi,
            fov_y: FRAC_PI_4,
            near: 0.01,
            far: 1000.0,
            invert_y: true,
        }
    }

    /// Create a camera from normalized angle inputs.
    ///
    /// `theta` is given in units of π, `phi` in `[-1, 1]` where 0 looks at
    /// the horizon and 1 straight up. `phi` is clamped away from the poles
    /// and `theta` is wrapped into `[-π, π]`.
    pub fn from_normalized_angles(position: Vec3, theta: f32, phi: f32) -> Self {
        let mut theta = theta * PI;
        let phi = (phi * -FRAC_PI_2 + FRAC_PI_2).clamp(PHI_MIN, PHI_MAX);

        if theta < -PI {
            theta += TAU;
        }
        if theta > PI {
            theta -= TAU;
        }

        Self::new(position, theta, phi)
    }

    /// Unit vector the camera looks along.
    pub fn look_direction(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
    }

    /// Get the view matrix (world → camera space)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.look_direction(), Vec3::Y)
    }

    /// Get the projection matrix (camera → clip space)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        perspective_matrix(aspect, self.fov_y, self.near, self.far, self.invert_y)
    }

    /// Inverse matrices and origin consumed by the renderer.
    pub fn frame(&self, aspect: f32) -> CameraFrame {
        CameraFrame::new(self.view_matrix(), self.projection_matrix(aspect))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(4.0, 0.0, 0.0), PI, FRAC_PI_2)
    }
}

/// Inverse camera matrices plus the world-space ray origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub view_inverse: Mat4,
    pub projection_inverse: Mat4,
    pub origin: Vec3,
}

impl CameraFrame {
    /// Build a frame from a view and a projection matrix.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        let view_inverse = view.inverse();
        let origin = (view_inverse * Vec4::W).truncate();
        Self {
            view_inverse,
            projection_inverse: projection.inverse(),
            origin,
        }
    }

    /// World-space direction of the primary ray through the center of `pixel`.
    pub fn primary_direction(&self, pixel: UVec2, image_size: UVec2) -> Vec3 {
        let pixel_center = pixel.as_vec2() + Vec2::splat(0.5);
        let uv = pixel_center / image_size.as_vec2();
        let d = 2.0 * uv - Vec2::ONE;

        let target = self.projection_inverse.project_point3(Vec3::new(d.x, d.y, 1.0));
        self.view_inverse
            .transform_vector3(target.normalize())
            .normalize()
    }
}
