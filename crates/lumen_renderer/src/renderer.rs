//! Renderer selection and the per-pixel contract.
//!
//! The set of integrators is closed, so the renderer is an enum chosen once
//! from the renderer configuration file.

use lumen_core::InputEntry;
use lumen_math::{CameraFrame, Color, Ray, UVec2};
use rand::RngCore;

use crate::bidirectional::BidirectionalPathTracer;
use crate::error::{RenderError, RenderResult};
use crate::path_tracer::PathTracer;
use crate::scene::Scene;

/// Everything an integrator needs to shade one pixel.
#[derive(Debug, Clone, Copy)]
pub struct PixelRenderData<'a> {
    pub scene: &'a Scene,
    pub frame: &'a CameraFrame,
    pub image_size: UVec2,
    pub pixel: UVec2,
}

impl PixelRenderData<'_> {
    /// Camera ray through the pixel center.
    pub fn primary_ray(&self) -> Ray {
        let direction = self.frame.primary_direction(self.pixel, self.image_size);
        Ray::new(self.frame.origin, direction)
    }
}

/// Reject zero for a renderer parameter named `key`.
pub(crate) fn positive_param(key: &'static str, value: u32) -> RenderResult<u32> {
    if value == 0 {
        Err(RenderError::ZeroValue { key })
    } else {
        Ok(value)
    }
}

/// The active per-pixel radiance estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    PathTracer(PathTracer),
    Bidirectional(BidirectionalPathTracer),
}

impl Renderer {
    pub const PATH_TRACER: &'static str = "PathTracer";
    pub const BIDIRECTIONAL: &'static str = "BidirectionalPathTracer";

    /// Select and configure a renderer from an entry named after it.
    pub fn from_entry(entry: &InputEntry) -> RenderResult<Self> {
        match entry.name.as_str() {
            Self::PATH_TRACER => Ok(Self::PathTracer(PathTracer::from_entry(entry)?)),
            Self::BIDIRECTIONAL => Ok(Self::Bidirectional(
                BidirectionalPathTracer::from_entry(entry)?,
            )),
            other => Err(RenderError::UnknownRenderer(other.to_string())),
        }
    }

    /// Configure from the first entry of a renderer file.
    pub fn from_entries(entries: &[InputEntry]) -> RenderResult<Self> {
        let entry = entries.first().ok_or(RenderError::NoRendererEntry)?;
        Self::from_entry(entry)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PathTracer(_) => Self::PATH_TRACER,
            Self::Bidirectional(_) => Self::BIDIRECTIONAL,
        }
    }

    pub fn rays_per_pixel(&self) -> u32 {
        match self {
            Self::PathTracer(tracer) => tracer.rays_per_pixel,
            Self::Bidirectional(tracer) => tracer.rays_per_pixel,
        }
    }

    /// Check that the renderer can work with `scene`.
    pub fn validate(&self, scene: &Scene) -> RenderResult<()> {
        match self {
            Self::PathTracer(_) => Ok(()),
            Self::Bidirectional(tracer) => tracer.validate(scene),
        }
    }

    /// Final, normalized radiance estimate of one pixel.
    pub fn render_pixel(&self, data: &PixelRenderData, rng: &mut dyn RngCore) -> Color {
        match self {
            Self::PathTracer(tracer) => tracer.render_pixel(data, rng),
            Self::Bidirectional(tracer) => tracer.render_pixel(data, rng),
        }
    }
}
