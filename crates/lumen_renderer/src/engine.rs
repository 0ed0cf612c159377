//! Multi-threaded frame rendering.
//!
//! Workers run on a dedicated rayon pool and claim pixels one at a time from
//! a shared atomic counter. Each worker owns its random generator and keeps
//! its finished pixels locally; the frame is assembled after all workers
//! have joined.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use lumen_math::{Camera, CameraFrame, UVec2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{RenderError, RenderResult};
use crate::output::{color_to_rgb, FrameBuffer};
use crate::renderer::{PixelRenderData, Renderer};
use crate::sampling::pixel_seed;
use crate::scene::Scene;

/// Image and scheduling settings for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub thread_count: usize,
    /// Seed for reproducible frames; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl RenderSettings {
    pub fn new(width: u32, height: u32, thread_count: usize) -> Self {
        Self {
            width,
            height,
            thread_count,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn image_size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Owns the scene and renderer and turns camera frames into images.
#[derive(Debug)]
pub struct GraphicsEngine {
    scene: Scene,
    renderer: Renderer,
    settings: RenderSettings,
}

impl GraphicsEngine {
    /// Validate the settings and the renderer against the scene.
    pub fn new(scene: Scene, renderer: Renderer, settings: RenderSettings) -> RenderResult<Self> {
        if settings.width == 0 || settings.height == 0 {
            return Err(RenderError::EmptyImage {
                width: settings.width,
                height: settings.height,
            });
        }
        if settings.thread_count == 0 {
            return Err(RenderError::ZeroThreads);
        }
        renderer.validate(&scene)?;

        Ok(Self {
            scene,
            renderer,
            settings,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render through `camera`, using the image aspect ratio.
    pub fn render_camera(&self, camera: &Camera) -> RenderResult<FrameBuffer> {
        self.render(&camera.frame(self.settings.aspect_ratio()))
    }

    /// Render one frame. Blocks until every pixel is done.
    pub fn render(&self, frame: &CameraFrame) -> RenderResult<FrameBuffer> {
        let settings = self.settings;
        let mut buffer = FrameBuffer::new(settings.width, settings.height);
        let total = buffer.pixel_count();
        let width = settings.width as usize;
        let image_size = settings.image_size();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.thread_count)
            .thread_name(|i| format!("lumen-worker-{i}"))
            .build()?;

        log::info!(
            "Rendering {}x{} with {} ({} rays/pixel) on {} threads",
            settings.width,
            settings.height,
            self.renderer.name(),
            self.renderer.rays_per_pixel(),
            settings.thread_count
        );
        let start = Instant::now();

        let next_pixel = AtomicUsize::new(0);
        let scene = &self.scene;
        let renderer = &self.renderer;

        let results: Vec<Vec<(usize, [u8; 3])>> = pool.broadcast(|ctx| {
            let mut rng = StdRng::from_entropy();
            let mut pixels = Vec::new();

            loop {
                let index = next_pixel.fetch_add(1, Ordering::Relaxed);
                if index >= total {
                    break;
                }
                if let Some(seed) = settings.seed {
                    rng = StdRng::seed_from_u64(pixel_seed(seed, index));
                }

                let data = PixelRenderData {
                    scene,
                    frame,
                    image_size,
                    pixel: UVec2::new((index % width) as u32, (index / width) as u32),
                };
                let color = renderer.render_pixel(&data, &mut rng);
                pixels.push((index, color_to_rgb(color)));
            }

            log::debug!("Worker {} rendered {} pixels", ctx.index(), pixels.len());
            pixels
        });

        for (index, rgb) in results.into_iter().flatten() {
            buffer.set_index(index, rgb);
        }

        log::info!("Render finished in {:.2?}", start.elapsed());
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_tracer::PathTracer;

    fn path_tracer() -> Renderer {
        Renderer::PathTracer(PathTracer::new(2, 1).unwrap())
    }

    #[test]
    fn test_rejects_empty_image() {
        let result = GraphicsEngine::new(Scene::new(), path_tracer(), RenderSettings::new(0, 4, 1));
        assert!(matches!(result, Err(RenderError::EmptyImage { width: 0, height: 4 })));
    }

    #[test]
    fn test_rejects_zero_threads() {
        let result = GraphicsEngine::new(Scene::new(), path_tracer(), RenderSettings::new(4, 4, 0));
        assert!(matches!(result, Err(RenderError::ZeroThreads)));
    }

    #[test]
    fn test_empty_scene_renders_black() {
        let engine =
            GraphicsEngine::new(Scene::new(), path_tracer(), RenderSettings::new(5, 3, 4)).unwrap();
        let frame = engine.render_camera(&Camera::default()).unwrap();

        assert_eq!(frame.width(), 5);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.as_bytes().len(), 45);
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_settings_helpers() {
        let settings = RenderSettings::new(200, 100, 2).with_seed(9);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.image_size(), UVec2::new(200, 100));
        assert_eq!(settings.aspect_ratio(), 2.0);
    }
}
