//! Scene and camera descriptions read from input files.
//!
//! These are plain data: the renderer turns an [`ObjectDescription`] plus
//! its mesh into a world-space object with its own acceleration structure.

use std::path::{Path, PathBuf};

use lumen_math::{Camera, Color, Transform, Vec3};
use thiserror::Error;

use crate::input::{parse_input_file, InputEntry, InputError, InputResult};

/// Entries with this name describe light probes and are ignored.
pub const PROBES_ENTRY: &str = "Probes";

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("STL load error for {}: {source}", path.display())]
    Stl {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    #[error("Mesh file contains no triangles: {}", .0.display())]
    EmptyMesh(PathBuf),

    #[error("Camera file contains no entries")]
    NoCamera,
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;

/// Surface response weights and refraction index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub color: Color,
    pub diffuse: f32,
    pub reflect: f32,
    pub transparent: f32,
    pub refraction_index: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color: Color::ONE,
            diffuse: 1.0,
            reflect: 0.0,
            transparent: 0.0,
            refraction_index: 1.0,
        }
    }
}

/// One object of a scene file: which mesh, where, and how it looks.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescription {
    /// Mesh name, resolved through a `MeshLibrary`.
    pub mesh: String,
    pub transform: Transform,
    pub material: MaterialParams,
    /// Emission strength when the object is a light source.
    pub light_strength: Option<f32>,
}

impl ObjectDescription {
    /// Build a description from a scene file entry.
    ///
    /// `position` is required; every other key falls back to its default.
    pub fn from_entry(entry: &InputEntry) -> InputResult<Self> {
        let mut transform = Transform::from_position(entry.get_vec3("position")?)
            .with_scale(entry.get_vec3_or("scale", Vec3::ONE)?);

        if entry.has_key("rotation") {
            let axis = entry.get_vec3("rotation")?;
            let angle: f32 = entry.get("rotation", 3)?;
            transform = transform.with_axis_angle(axis, angle);
        }

        let defaults = MaterialParams::default();
        let material = MaterialParams {
            color: entry.get_vec3_or("color", defaults.color)?,
            diffuse: entry.get_or("diffuse", defaults.diffuse)?,
            reflect: entry.get_or("reflect", defaults.reflect)?,
            transparent: entry.get_or("transparent", defaults.transparent)?,
            refraction_index: entry.get_or("refractionIndex", defaults.refraction_index)?,
        };

        let light_strength = if entry.has_key("lightSource") {
            Some(entry.get("lightSource", 0)?)
        } else {
            None
        };

        Ok(Self {
            mesh: entry.name.clone(),
            transform,
            material,
            light_strength,
        })
    }

    pub fn is_light(&self) -> bool {
        self.light_strength.is_some()
    }
}

/// All objects listed in a scene file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescription {
    pub objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Build from parsed entries, skipping `Probes`.
    pub fn from_entries(entries: &[InputEntry]) -> InputResult<Self> {
        let objects = entries
            .iter()
            .filter(|entry| entry.name != PROBES_ENTRY)
            .map(ObjectDescription::from_entry)
            .collect::<InputResult<Vec<_>>>()?;

        Ok(Self { objects })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let entries = parse_input_file(path)?;
        let scene = Self::from_entries(&entries)?;
        log::info!("Scene file lists {} objects", scene.objects.len());
        Ok(scene)
    }

    pub fn light_count(&self) -> usize {
        self.objects.iter().filter(|o| o.is_light()).count()
    }
}

/// Build a camera from an entry with `position(x,y,z)` and `angle(theta, phi)`.
///
/// Angles are normalized: `theta` in units of π, `phi` in `[-1, 1]`.
pub fn camera_from_entry(entry: &InputEntry) -> InputResult<Camera> {
    let position = entry.get_vec3("position")?;
    let theta: f32 = entry.get("angle", 0)?;
    let phi: f32 = entry.get("angle", 1)?;
    Ok(Camera::from_normalized_angles(position, theta, phi))
}

/// Load the camera described by the first entry of a camera file.
pub fn load_camera<P: AsRef<Path>>(path: P) -> SceneResult<Camera> {
    let entries = parse_input_file(path)?;
    let entry = entries.first().ok_or(SceneError::NoCamera)?;
    Ok(camera_from_entry(entry)?)
}
