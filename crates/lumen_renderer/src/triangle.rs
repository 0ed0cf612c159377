//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection and
//! caches the dot products needed to recover barycentric coordinates.

use crate::object::ObjectId;
use lumen_math::{Aabb, Ray, Vec3};

/// Determinant and distance threshold for intersections.
const EPSILON: f32 = 1e-7;

/// A world-space triangle of a `GraphicsObject`.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Object this triangle belongs to (index into the scene's objects)
    owner: ObjectId,
    /// Indices into the owner's vertex array
    indices: [usize; 3],
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// v1 - v0
    edge0: Vec3,
    /// v2 - v0
    edge1: Vec3,
    d00: f32,
    d01: f32,
    d11: f32,
    denom: f32,
}

impl Triangle {
    /// Create a triangle from vertex indices into `positions`.
    pub fn new(indices: [usize; 3], positions: &[Vec3]) -> Self {
        let mut triangle = Self {
            owner: ObjectId::default(),
            indices,
            v0: Vec3::ZERO,
            v1: Vec3::ZERO,
            v2: Vec3::ZERO,
            edge0: Vec3::ZERO,
            edge1: Vec3::ZERO,
            d00: 0.0,
            d01: 0.0,
            d11: 0.0,
            denom: 0.0,
        };
        triangle.update(positions);
        triangle
    }

    /// Recompute vertices and cached coefficients after the positions moved.
    pub fn update(&mut self, positions: &[Vec3]) {
        let [i0, i1, i2] = self.indices;
        self.v0 = positions[i0];
        self.v1 = positions[i1];
        self.v2 = positions[i2];

        self.edge0 = self.v1 - self.v0;
        self.edge1 = self.v2 - self.v0;

        self.d00 = self.edge0.dot(self.edge0);
        self.d01 = self.edge0.dot(self.edge1);
        self.d11 = self.edge1.dot(self.edge1);
        self.denom = self.d00 * self.d11 - self.d01 * self.d01;
    }

    #[inline]
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: ObjectId) {
        self.owner = owner;
    }

    #[inline]
    pub fn indices(&self) -> [usize; 3] {
        self.indices
    }

    #[inline]
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns the world-space hit point, or `None` for parallel rays, misses
    /// and hits at or behind the ray origin.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let h = ray.direction().cross(self.edge1);
        let a = self.edge0.dot(h);

        // Ray is parallel to triangle
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge0);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.edge1.dot(q);
        if t > EPSILON {
            Some(ray.at(t))
        } else {
            None
        }
    }

    /// Barycentric weights of `point` for (v0, v1, v2).
    pub fn barycentric(&self, point: Vec3) -> Vec3 {
        let edge2 = point - self.v0;
        let d20 = edge2.dot(self.edge0);
        let d21 = edge2.dot(self.edge1);

        let v = (self.d11 * d20 - self.d01 * d21) / self.denom;
        let w = (self.d00 * d21 - self.d01 * d20) / self.denom;
        Vec3::new(1.0 - v - w, v, w)
    }

    /// Point at the given barycentric weights.
    #[inline]
    pub fn point_at(&self, weights: Vec3) -> Vec3 {
        self.v0 * weights.x + self.v1 * weights.y + self.v2 * weights.z
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points([self.v0, self.v1, self.v2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        // Triangle in XY plane at z=-1
        let positions = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        ];
        Triangle::new([0, 1, 2], &positions)
    }

    #[test]
    fn test_triangle_hit() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = tri.intersect(&ray).unwrap();
        assert!((hit - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = unit_triangle();

        // Ray pointing away
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.intersect(&away).is_none());

        // Ray passing beside the triangle
        let beside = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.intersect(&beside).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_hit_from_behind() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let hit = tri.intersect(&ray).unwrap();
        assert!((hit.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_barycentric_inside_sums_to_one() {
        let tri = unit_triangle();
        let samples = [
            Vec3::new(0.2, 0.3, 0.5),
            Vec3::new(0.9, 0.05, 0.05),
            Vec3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0),
        ];

        for weights in samples {
            let point = tri.point_at(weights);
            let recovered = tri.barycentric(point);

            assert!((recovered.x + recovered.y + recovered.z - 1.0).abs() < 1e-5);
            assert!(recovered.min_element() >= -1e-5);
            assert!(recovered.max_element() <= 1.0 + 1e-5);
            assert!((recovered - weights).length() < 1e-4);
        }
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let tri = unit_triangle();
        let [v0, v1, v2] = tri.vertices();

        assert!((tri.barycentric(v0) - Vec3::X).length() < 1e-6);
        assert!((tri.barycentric(v1) - Vec3::Y).length() < 1e-6);
        assert!((tri.barycentric(v2) - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_update_moves_triangle() {
        let mut tri = unit_triangle();
        let moved: Vec<Vec3> = tri
            .vertices()
            .iter()
            .map(|v| *v + Vec3::new(0.0, 0.0, -4.0))
            .collect();
        tri.update(&moved);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = tri.intersect(&ray).unwrap();
        assert!((hit.z + 5.0).abs() < 1e-5);
        assert!(tri.bounding_box().hit(&ray));
    }
}
