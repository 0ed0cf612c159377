//! Lumen Renderer - CPU path tracing
//!
//! A Monte Carlo renderer over triangle meshes with two integrators:
//!
//! - [`PathTracer`]: unidirectional paths from the camera that must reach a light
//! - [`BidirectionalPathTracer`]: eye paths connected to paths started on lights
//!
//! Each object owns a BVH built by agglomerative clustering. Frames are
//! rendered by [`GraphicsEngine`] on a fixed pool of worker threads that
//! claim pixels from a shared counter.

mod bidirectional;
mod bvh;
mod engine;
mod error;
mod object;
mod output;
mod path;
mod path_tracer;
mod renderer;
mod sampling;
mod scene;
mod triangle;

pub use bidirectional::{connect_paths, BidirectionalPathTracer, BIDIRECTIONAL_NORMALIZATION};
pub use bvh::{Bvh, BvhElement, Node, NodeId, NodeKind};
pub use engine::{GraphicsEngine, RenderSettings};
pub use error::{RenderError, RenderResult};
pub use object::{GraphicsObject, Material, ObjectId, Reaction, Vertex};
pub use output::{color_to_rgb, FrameBuffer};
pub use path::{trace_path, PathKind, PathVertex, SURFACE_OFFSET};
pub use path_tracer::{PathTracer, PATH_TRACER_NORMALIZATION};
pub use renderer::{PixelRenderData, Renderer};
pub use sampling::{
    gen_f32, pixel_seed, random_hemisphere_direction, random_unit_vector, splitmix64,
    uniform_triangle_barycentric,
};
pub use scene::{HitVertex, Scene, SceneHit};
pub use triangle::Triangle;

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, CameraFrame, Color, Ray, Vec3};
