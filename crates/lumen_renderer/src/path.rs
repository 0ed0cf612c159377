//! Random walk through the scene shared by both integrators.
//!
//! A path starts from a ray and records one vertex per surface interaction.
//! Eye paths start at the camera and end successfully on the front face of a
//! light; light paths start on a light and stop when they reach another one.

use lumen_math::{reflect, refract_through, Color, Ray, Vec3};
use rand::RngCore;

use crate::object::Reaction;
use crate::sampling::{gen_f32, random_hemisphere_direction};
use crate::scene::Scene;

/// Distance new rays are pushed off a surface to avoid self-intersection.
pub const SURFACE_OFFSET: f32 = 0.01;

/// A recorded surface interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathVertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// Accumulated throughput up to and including this vertex
    pub throughput: Color,
    /// The path scattered diffusely at this vertex
    pub diffuse: bool,
    /// The path ended on the front face of a light here
    pub light_hit: bool,
}

/// Which end of the transport a path starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Eye,
    Light,
}

/// Follow `ray` for up to `max_bounces` surface interactions, appending the
/// vertices to `path`.
///
/// `throughput` is the starting throughput (one for eye paths, the emission
/// for light paths). Eye paths pass through back faces until their first
/// valid hit without using up a bounce.
pub fn trace_path(
    scene: &Scene,
    mut ray: Ray,
    kind: PathKind,
    max_bounces: usize,
    mut throughput: Color,
    path: &mut Vec<PathVertex>,
    rng: &mut dyn RngCore,
) {
    let mut skip_back_faces = kind == PathKind::Eye;
    let mut bounces = 0;

    while bounces < max_bounces {
        let Some(hit) = scene.trace_ray(&ray) else {
            break;
        };

        let position = hit.vertex.position;
        let normal = hit.vertex.normal;
        let incoming = ray.direction();
        let back_face = normal.dot(incoming) > 0.0;

        if skip_back_faces && back_face {
            ray.set_origin(position + SURFACE_OFFSET * incoming);
            continue;
        }
        skip_back_faces = false;
        bounces += 1;

        let object = scene.object(hit.object);
        if object.is_light() {
            if kind == PathKind::Eye && !back_face {
                path.push(PathVertex {
                    position,
                    normal,
                    throughput: throughput * object.emission(),
                    diffuse: false,
                    light_hit: true,
                });
            }
            break;
        }

        let material = object.material();
        let reaction = material.reaction(gen_f32(rng));
        let direction = match reaction {
            Reaction::Diffuse => random_hemisphere_direction(rng, normal),
            Reaction::Reflect => reflect(incoming, normal),
            Reaction::Refract => refract_through(incoming, normal, material.refraction_index),
        };

        if reaction == Reaction::Diffuse {
            let cos_theta = match kind {
                PathKind::Eye => normal.dot(direction),
                PathKind::Light => normal.dot(incoming).abs(),
            };
            throughput *= material.color * cos_theta;
        }

        path.push(PathVertex {
            position,
            normal,
            throughput,
            diffuse: reaction == Reaction::Diffuse,
            light_hit: false,
        });

        if direction == Vec3::ZERO {
            break;
        }
        ray = Ray::new(position + SURFACE_OFFSET * direction, direction);
    }
}
