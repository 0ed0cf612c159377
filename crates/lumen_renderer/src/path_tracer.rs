//! Unidirectional path tracer.

use std::f32::consts::TAU;

use lumen_core::InputEntry;
use lumen_math::Color;
use rand::RngCore;

use crate::error::RenderResult;
use crate::path::{trace_path, PathKind};
use crate::renderer::{positive_param, PixelRenderData};

/// Exposure constant applied to the averaged path tracer estimate.
pub const PATH_TRACER_NORMALIZATION: f32 = 15.0 * TAU;

/// Traces eye paths and keeps those that end on a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTracer {
    pub vision_jump_count: u32,
    pub rays_per_pixel: u32,
}

impl PathTracer {
    pub fn new(vision_jump_count: u32, rays_per_pixel: u32) -> RenderResult<Self> {
        Ok(Self {
            vision_jump_count: positive_param("visionJumpCount", vision_jump_count)?,
            rays_per_pixel: positive_param("raysPerPixel", rays_per_pixel)?,
        })
    }

    /// Read `visionJumpCount` and `raysPerPixel` from a renderer entry.
    pub fn from_entry(entry: &InputEntry) -> RenderResult<Self> {
        Self::new(
            entry.get("visionJumpCount", 0)?,
            entry.get("raysPerPixel", 0)?,
        )
    }

    /// Average of `rays_per_pixel` eye paths through the pixel center.
    pub fn render_pixel(&self, data: &PixelRenderData, rng: &mut dyn RngCore) -> Color {
        let ray = data.primary_ray();
        let mut path = Vec::with_capacity(self.vision_jump_count as usize);
        let mut color = Color::ZERO;

        for _ in 0..self.rays_per_pixel {
            path.clear();
            trace_path(
                data.scene,
                ray,
                PathKind::Eye,
                self.vision_jump_count as usize,
                Color::ONE,
                &mut path,
                rng,
            );

            if let Some(last) = path.last().filter(|v| v.light_hit) {
                color += last.throughput;
            }
        }

        color * PATH_TRACER_NORMALIZATION / self.rays_per_pixel as f32
    }
}
