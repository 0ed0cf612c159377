//! Scene container and nearest-hit queries.

use lumen_core::{MeshLibrary, SceneDescription};
use lumen_math::{Ray, Vec3};

use crate::error::RenderResult;
use crate::object::{GraphicsObject, ObjectId};

/// Surface point found by a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitVertex {
    pub position: Vec3,
    /// Interpolated shading normal (unit length)
    pub normal: Vec3,
}

/// Nearest hit of a ray: the surface point and the object it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub vertex: HitVertex,
    pub object: ObjectId,
}

/// All objects of a render plus the subset that emits light.
///
/// Objects are never removed or reordered, so `ObjectId`s stay valid.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<GraphicsObject>,
    lights: Vec<ObjectId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its id. Light sources are also registered
    /// in the light list.
    pub fn add_object(&mut self, mut object: GraphicsObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        object.bind(id);
        if object.is_light() {
            self.lights.push(id);
        }
        self.objects.push(object);
        id
    }

    /// Build every object of a scene description, loading meshes through
    /// `meshes`.
    pub fn from_description(
        description: &SceneDescription,
        meshes: &mut MeshLibrary,
    ) -> RenderResult<Self> {
        let mut scene = Self::new();
        for object in &description.objects {
            let mesh = meshes.get(&object.mesh)?;
            scene.add_object(GraphicsObject::from_description(object, mesh)?);
        }

        log::info!(
            "Scene built: {} objects, {} lights, {} triangles",
            scene.objects.len(),
            scene.lights.len(),
            scene.triangle_count()
        );
        Ok(scene)
    }

    pub fn objects(&self) -> &[GraphicsObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> &GraphicsObject {
        &self.objects[id.0]
    }

    /// Ids of the light-emitting objects, in insertion order.
    pub fn lights(&self) -> &[ObjectId] {
        &self.lights
    }

    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.triangles().len()).sum()
    }

    /// Nearest surface hit along `ray` across all objects.
    pub fn trace_ray(&self, ray: &Ray) -> Option<SceneHit> {
        let mut min_distance = f32::INFINITY;
        let mut closest = None;

        for (i, object) in self.objects.iter().enumerate() {
            if let Some((triangle, point, distance)) = object.closest_hit(ray, min_distance) {
                min_distance = distance;
                closest = Some((i, triangle, point));
            }
        }

        let (object_index, triangle_index, position) = closest?;
        let object = &self.objects[object_index];
        let triangle = &object.triangles()[triangle_index];
        let weights = triangle.barycentric(position);

        Some(SceneHit {
            vertex: HitVertex {
                position,
                normal: object.interpolated_normal(triangle, weights),
            },
            object: triangle.owner(),
        })
    }

    /// Whether any surface lies between `from` and `to`.
    pub fn is_occluded(&self, from: Vec3, to: Vec3) -> bool {
        let offset = to - from;
        let Some(direction) = offset.try_normalize() else {
            return false;
        };

        match self.trace_ray(&Ray::new(from, direction)) {
            Some(hit) => hit.vertex.position.distance_squared(from) < offset.length_squared(),
            None => false,
        }
    }
}
