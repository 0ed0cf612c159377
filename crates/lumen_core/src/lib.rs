//! Lumen Core - Scene-side data for the lumen renderer.
//!
//! This crate provides:
//!
//! - **Geometry**: `Mesh` with normal generation and procedural shapes
//! - **Mesh loading**: OBJ files via `tobj` and STL files via `stl_io`, cached in a `MeshLibrary`
//! - **Input files**: the line-oriented `key(values)` configuration format
//! - **Descriptions**: scene objects, materials and the camera
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{MeshLibrary, SceneDescription};
//!
//! let scene = SceneDescription::load("scenes/box.txt")?;
//! let mut meshes = MeshLibrary::new("scenes");
//! for object in &scene.objects {
//!     let mesh = meshes.get(&object.mesh)?;
//!     println!("{}: {} triangles", object.mesh, mesh.triangle_count());
//! }
//! ```

pub mod input;
pub mod loader;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use input::{parse_input, parse_input_file, InputEntry, InputError, InputResult};
pub use loader::{load_obj, load_stl, MeshLibrary, STL_SMOOTHING_ANGLE};
pub use mesh::Mesh;
pub use scene::{
    camera_from_entry, load_camera, MaterialParams, ObjectDescription, SceneDescription,
    SceneError, SceneResult,
};
