//! Mesh geometry representation for the lumen scene.
//!
//! This module provides a renderer-agnostic triangle mesh that can be
//! populated from OBJ files or built procedurally, and is later placed in
//! the world by the renderer's `GraphicsObject`.

use lumen_math::{Aabb, Vec3};

/// A mesh consisting of vertex positions, optional normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - computed by `ensure_normals` if missing)
    pub normals: Option<Vec<Vec3>>,

    /// Triangle indices (every 3 indices form a triangle, counter-clockwise)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    ///
    /// If normals are not provided, they will NOT be automatically computed.
    /// Call `compute_normals()` or `ensure_normals()` explicitly.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        let bounds = Aabb::from_points(positions.iter().copied());
        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    /// A single quad made of two triangles, facing `normal`.
    ///
    /// `center` is the middle of the quad and `u`, `v` are its half-extent
    /// edge vectors. The winding is chosen so the geometric normal agrees
    /// with `normal`.
    pub fn quad(center: Vec3, u: Vec3, v: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        let (u, v) = if u.cross(v).dot(normal) >= 0.0 { (u, v) } else { (v, u) };

        let positions = vec![
            center - u - v,
            center + u - v,
            center + u + v,
            center - u + v,
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        Self::new(positions, indices, Some(vec![normal; 4]))
    }

    /// An axis-aligned box with outward-facing flat normals.
    pub fn cuboid(center: Vec3, half_extent: Vec3) -> Self {
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Y, Vec3::Z),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::Z, Vec3::X),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::X, Vec3::Y),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let face = Self::quad(
                center + normal * half_extent,
                u * half_extent,
                v * half_extent,
                normal,
            );
            let base = positions.len() as u32;
            positions.extend_from_slice(&face.positions);
            normals.extend(std::iter::repeat(normal).take(4));
            indices.extend(face.indices.iter().map(|i| base + i));
        }

        Self::new(positions, indices, Some(normals))
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Each vertex normal is the normalized sum of the (area-weighted) face
    /// normals of the triangles sharing that vertex.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.indices.chunks_exact(3) {
            let i0 = face[0] as usize;
            let i1 = face[1] as usize;
            let i2 = face[2] as usize;

            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let edge1 = self.positions[i1] - p0;
            let edge2 = self.positions[i2] - p0;
            let face_normal = edge1.cross(edge2);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            // Default up normal for degenerate cases
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Ensure the mesh has one normal per vertex, computing them if necessary.
    pub fn ensure_normals(&mut self) {
        let should_compute = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };

        if should_compute {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "Normals array length ({}) doesn't match vertex count ({}), computing smooth normals",
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex index triplets, skipping triangles that reference missing vertices.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let vertex_count = self.positions.len();
        self.indices.chunks_exact(3).filter_map(move |chunk| {
            let tri = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
            if tri.iter().all(|&i| i < vertex_count) {
                Some(tri)
            } else {
                log::warn!(
                    "Invalid triangle indices: {:?}, vertex count: {}",
                    tri,
                    vertex_count
                );
                None
            }
        })
    }
}
