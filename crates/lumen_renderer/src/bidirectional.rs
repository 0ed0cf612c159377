//! Bidirectional path tracer.
//!
//! Each sample traces an eye path and, unless that path already ends on a
//! light, a light path from a random point on a random light. Every pair of
//! eye and light vertices with a clear line of sight contributes.

use std::f32::consts::TAU;

use lumen_core::InputEntry;
use lumen_math::{Color, Ray};
use rand::RngCore;

use crate::error::{RenderError, RenderResult};
use crate::path::{trace_path, PathKind, PathVertex, SURFACE_OFFSET};
use crate::renderer::{positive_param, PixelRenderData};
use crate::sampling::{gen_f32, gen_index, random_hemisphere_direction, uniform_triangle_barycentric};
use crate::scene::Scene;

/// Scale applied to the averaged bidirectional estimate.
pub const BIDIRECTIONAL_NORMALIZATION: f32 = TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidirectionalPathTracer {
    pub vision_jump_count: u32,
    pub light_jump_count: u32,
    pub max_depth: u32,
    pub rays_per_pixel: u32,
}

impl BidirectionalPathTracer {
    pub fn new(
        vision_jump_count: u32,
        light_jump_count: u32,
        max_depth: u32,
        rays_per_pixel: u32,
    ) -> RenderResult<Self> {
        Ok(Self {
            vision_jump_count: positive_param("visionJumpCount", vision_jump_count)?,
            light_jump_count: positive_param("lightJumpCount", light_jump_count)?,
            max_depth: positive_param("maxDepth", max_depth)?,
            rays_per_pixel: positive_param("raysPerPixel", rays_per_pixel)?,
        })
    }

    pub fn from_entry(entry: &InputEntry) -> RenderResult<Self> {
        Self::new(
            entry.get("visionJumpCount", 0)?,
            entry.get("lightJumpCount", 0)?,
            entry.get("maxDepth", 0)?,
            entry.get("raysPerPixel", 0)?,
        )
    }

    /// The scene needs at least one light, and every light a triangle to
    /// sample.
    pub fn validate(&self, scene: &Scene) -> RenderResult<()> {
        if scene.lights().is_empty() {
            return Err(RenderError::NoLightSources);
        }
        for &id in scene.lights() {
            let light = scene.object(id);
            if light.triangles().is_empty() {
                return Err(RenderError::EmptyLightSource(light.name().to_string()));
            }
        }
        Ok(())
    }

    pub fn render_pixel(&self, data: &PixelRenderData, rng: &mut dyn RngCore) -> Color {
        let ray = data.primary_ray();
        let mut eye_path = Vec::with_capacity(self.vision_jump_count as usize);
        let mut light_path = Vec::with_capacity(self.light_jump_count as usize);
        let mut color = Color::ZERO;

        for _ in 0..self.rays_per_pixel {
            eye_path.clear();
            trace_path(
                data.scene,
                ray,
                PathKind::Eye,
                self.vision_jump_count as usize,
                Color::ONE,
                &mut eye_path,
                rng,
            );

            let Some(last) = eye_path.last() else {
                continue;
            };
            if last.light_hit {
                color += last.throughput;
                continue;
            }

            light_path.clear();
            self.trace_light_path(data.scene, &mut light_path, rng);

            let connected = connect_paths(data.scene, &eye_path, &light_path, self.max_depth as usize);
            color += connected / self.max_depth as f32;
        }

        color * BIDIRECTIONAL_NORMALIZATION / self.rays_per_pixel as f32
    }

    /// Start a light path on a uniformly chosen point of a uniformly chosen
    /// light and extend it to at most `light_jump_count` vertices.
    ///
    /// Lights are picked without regard to their area.
    fn trace_light_path(&self, scene: &Scene, path: &mut Vec<PathVertex>, rng: &mut dyn RngCore) {
        let lights = scene.lights();
        if lights.is_empty() {
            return;
        }
        let light = scene.object(lights[gen_index(rng, lights.len())]);
        if light.triangles().is_empty() {
            return;
        }

        let weights = uniform_triangle_barycentric(gen_f32(rng), gen_f32(rng));
        let triangle = &light.triangles()[gen_index(rng, light.triangles().len())];
        let position = triangle.point_at(weights);
        let normal = light.interpolated_normal(triangle, weights);
        let emission = light.emission();

        path.push(PathVertex {
            position,
            normal,
            throughput: emission,
            diffuse: true,
            light_hit: false,
        });

        let bounces = (self.light_jump_count as usize).saturating_sub(1);
        if bounces == 0 {
            return;
        }

        let direction = random_hemisphere_direction(rng, normal);
        let ray = Ray::new(position + SURFACE_OFFSET * direction, direction);
        trace_path(scene, ray, PathKind::Light, bounces, emission, path, rng);
    }
}

/// Sum of the contributions of all visible eye/light vertex pairs with
/// `i + j <= max_depth`.
///
/// Each endpoint is pushed off its surface along its normal before the
/// visibility test. A pair contributes the product of both throughputs,
/// weighted by the cosine at the eye vertex.
pub fn connect_paths(
    scene: &Scene,
    eye_path: &[PathVertex],
    light_path: &[PathVertex],
    max_depth: usize,
) -> Color {
    let mut color = Color::ZERO;

    for (i, eye) in eye_path.iter().enumerate() {
        for (j, light) in light_path.iter().enumerate() {
            if i + j > max_depth {
                continue;
            }

            let start = eye.position + SURFACE_OFFSET * eye.normal;
            let end = light.position + SURFACE_OFFSET * light.normal;
            if scene.is_occluded(start, end) {
                continue;
            }

            let direction = (end - start).normalize_or_zero();
            let cos_theta = direction.dot(eye.normal).max(0.0);
            color += eye.throughput * light.throughput * cos_theta;
        }
    }

    color
}
