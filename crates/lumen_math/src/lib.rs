// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod camera;
mod optics;
mod ray;
mod transform;

pub use aabb::{Aabb, POINT_PADDING};
pub use camera::{Camera, CameraFrame};
pub use optics::{reflect, refract, refract_through};
pub use ray::Ray;
pub use transform::{perspective_matrix, Mat4Ext, Transform};

/// RGB color with linear components, nominally in `[0, 1]`.
pub type Color = Vec3;
