//! Error types for scene setup and rendering.

use lumen_core::{InputError, SceneError};
use thiserror::Error;

/// Errors that can occur while configuring or running a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Renderer parameter '{key}' must be greater than zero")]
    ZeroValue { key: &'static str },

    #[error("Unknown renderer: {0}")]
    UnknownRenderer(String),

    #[error("Renderer configuration contains no entries")]
    NoRendererEntry,

    #[error("Bidirectional renderer requires at least one light source")]
    NoLightSources,

    #[error("Light source '{0}' has no triangles")]
    EmptyLightSource(String),

    #[error("Material weights of '{0}' must sum to a positive value")]
    InvalidMaterial(String),

    #[error("Image size must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Thread count must be greater than zero")]
    ZeroThreads,

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
