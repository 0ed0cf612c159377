//! Scene objects: a placed mesh with its material and acceleration structure.

use std::sync::Arc;

use lumen_core::{MaterialParams, Mesh, ObjectDescription};
use lumen_math::{Color, Mat4Ext, Ray, Transform, Vec3};

use crate::bvh::{Bvh, BvhElement};
use crate::error::{RenderError, RenderResult};
use crate::triangle::Triangle;

/// Index of an object in its `Scene`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// A world-space vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// What happens to a ray that hits a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Scatter into a uniformly sampled hemisphere direction
    Diffuse,
    /// Mirror reflection
    Reflect,
    /// Refraction (or total internal reflection)
    Refract,
}

/// Surface response, with weights normalized into cumulative thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub diffuse_threshold: f32,
    pub reflect_threshold: f32,
    pub refraction_index: f32,
}

impl Material {
    /// Normalize the raw weights of `params`. Fails unless the weights sum
    /// to a positive value.
    pub fn from_params(params: &MaterialParams) -> Option<Self> {
        let total = params.diffuse + params.reflect + params.transparent;
        if total <= 0.0 || !total.is_finite() {
            return None;
        }

        let diffuse_threshold = params.diffuse / total;
        Some(Self {
            color: params.color,
            diffuse_threshold,
            reflect_threshold: diffuse_threshold + params.reflect / total,
            refraction_index: params.refraction_index,
        })
    }

    /// Pick the reaction for a uniform random value `u` in `[0, 1)`.
    pub fn reaction(&self, u: f32) -> Reaction {
        if u < self.diffuse_threshold {
            Reaction::Diffuse
        } else if u < self.reflect_threshold {
            Reaction::Reflect
        } else {
            Reaction::Refract
        }
    }
}

/// One scene entity: transformed vertices, triangles, material and BVH.
///
/// Built and placed during initialization, read-only while rendering.
#[derive(Debug, Clone)]
pub struct GraphicsObject {
    name: String,
    mesh: Arc<Mesh>,
    transform: Transform,
    material: Material,
    light_strength: Option<f32>,
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    bvh: Bvh,
}

impl GraphicsObject {
    /// Place `mesh` in the world and build its BVH.
    pub fn new(
        name: impl Into<String>,
        mesh: Arc<Mesh>,
        transform: Transform,
        params: &MaterialParams,
        light_strength: Option<f32>,
    ) -> RenderResult<Self> {
        let name = name.into();
        let material =
            Material::from_params(params).ok_or_else(|| RenderError::InvalidMaterial(name.clone()))?;

        let mesh = if mesh.normals.as_ref().map(Vec::len) == Some(mesh.positions.len()) {
            mesh
        } else {
            let mut owned = (*mesh).clone();
            owned.ensure_normals();
            Arc::new(owned)
        };

        let vertices = Self::transform_vertices(&mesh, &transform);
        let positions: Vec<Vec3> = vertices.iter().map(|v| v.position).collect();
        let triangles: Vec<Triangle> = mesh
            .triangles()
            .map(|indices| Triangle::new(indices, &positions))
            .collect();

        let elements: Vec<BvhElement> = triangles
            .iter()
            .enumerate()
            .map(|(index, triangle)| BvhElement {
                bbox: triangle.bounding_box(),
                index,
            })
            .collect();
        let bvh = Bvh::new(&elements);

        log::debug!(
            "Object '{}': {} vertices, {} triangles, {} BVH nodes",
            name,
            vertices.len(),
            triangles.len(),
            bvh.node_count()
        );

        Ok(Self {
            name,
            mesh,
            transform,
            material,
            light_strength,
            vertices,
            triangles,
            bvh,
        })
    }

    /// Build an object from a scene file description.
    pub fn from_description(description: &ObjectDescription, mesh: Arc<Mesh>) -> RenderResult<Self> {
        Self::new(
            description.mesh.clone(),
            mesh,
            description.transform,
            &description.material,
            description.light_strength,
        )
    }

    fn transform_vertices(mesh: &Mesh, transform: &Transform) -> Vec<Vertex> {
        let matrix = transform.matrix();
        let normals = mesh.normals.as_deref().unwrap_or(&[]);

        mesh.positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                position: matrix.transform_point3(*p),
                normal: matrix.transform_normal(normals.get(i).copied().unwrap_or(Vec3::Y)),
            })
            .collect()
    }

    /// Move the object. Re-transforms the vertices, refreshes the triangles
    /// and refits the BVH without re-clustering.
    ///
    /// Only valid during initialization, before rendering starts.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.vertices = Self::transform_vertices(&self.mesh, &transform);

        let positions: Vec<Vec3> = self.vertices.iter().map(|v| v.position).collect();
        for triangle in &mut self.triangles {
            triangle.update(&positions);
        }

        let triangles = &self.triangles;
        self.bvh.rebuild(|index| triangles[index].bounding_box());
    }

    /// Closest triangle hit nearer than `max_distance_sq` (squared distance
    /// from the ray origin). Returns the triangle index, hit point and
    /// squared distance.
    pub fn closest_hit(&self, ray: &Ray, max_distance_sq: f32) -> Option<(usize, Vec3, f32)> {
        let mut closest = None;
        let mut min_distance = max_distance_sq;

        for index in self.bvh.hits(ray) {
            if let Some(point) = self.triangles[index].intersect(ray) {
                let distance = point.distance_squared(ray.origin());
                if distance < min_distance {
                    min_distance = distance;
                    closest = Some((index, point, distance));
                }
            }
        }

        closest
    }

    pub(crate) fn bind(&mut self, id: ObjectId) {
        for triangle in &mut self.triangles {
            triangle.set_owner(id);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn is_light(&self) -> bool {
        self.light_strength.is_some()
    }

    pub fn light_strength(&self) -> f32 {
        self.light_strength.unwrap_or(0.0)
    }

    /// Radiance leaving the surface: color scaled by light strength.
    pub fn emission(&self) -> Color {
        self.material.color * self.light_strength()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Barycentric-weighted vertex normal of a triangle, normalized.
    pub fn interpolated_normal(&self, triangle: &Triangle, weights: Vec3) -> Vec3 {
        let [i0, i1, i2] = triangle.indices();
        let normal = self.vertices[i0].normal * weights.x
            + self.vertices[i1].normal * weights.y
            + self.vertices[i2].normal * weights.z;
        normal.normalize_or_zero()
    }
}
