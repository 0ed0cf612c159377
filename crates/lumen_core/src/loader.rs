//! OBJ and STL mesh loading and the shared mesh cache.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_3;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::Vec3;

use crate::mesh::Mesh;
use crate::scene::{SceneError, SceneResult};

/// Load an OBJ file, merging all of its models into one triangulated mesh.
///
/// Normals from the file are kept when every model provides one per vertex;
/// otherwise smooth normals are computed.
pub fn load_obj<P: AsRef<Path>>(path: P) -> SceneResult<Mesh> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();
    let mut has_normals = true;

    for model in &models {
        let mesh = &model.mesh;
        let base = positions.len() as u32;

        positions.extend(mesh.positions.chunks_exact(3).map(Vec3::from_slice));
        if mesh.normals.len() == mesh.positions.len() {
            normals.extend(mesh.normals.chunks_exact(3).map(Vec3::from_slice));
        } else {
            has_normals = false;
        }
        indices.extend(mesh.indices.iter().map(|i| base + i));
    }

    if indices.is_empty() {
        return Err(SceneError::EmptyMesh(path.to_path_buf()));
    }

    log::debug!(
        "Loaded {} ({} models, {} vertices, {} triangles, normals: {})",
        path.display(),
        models.len(),
        positions.len(),
        indices.len() / 3,
        has_normals
    );

    let mut mesh = Mesh::new(positions, indices, has_normals.then_some(normals));
    mesh.ensure_normals();
    Ok(mesh)
}

/// Faces meeting at a shared STL position get one smoothed vertex when their
/// normals are less than this angle apart, and separate vertices otherwise.
pub const STL_SMOOTHING_ANGLE: f32 = FRAC_PI_3;

/// Load a binary or ASCII STL file.
///
/// STL is Z-up, so Y and Z are swapped on load (and the winding reversed to
/// stay counter-clockwise around the normal). Shading normals are the
/// average of the face normals grouped by [`STL_SMOOTHING_ANGLE`]; faces
/// with a zero normal in the file use their geometric normal.
pub fn load_stl<P: AsRef<Path>>(path: P) -> SceneResult<Mesh> {
    let path = path.as_ref();
    let stl_error = |source: std::io::Error| SceneError::Stl {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(stl_error)?);
    let stl = stl_io::read_stl(&mut reader).map_err(stl_error)?;
    if stl.faces.is_empty() {
        return Err(SceneError::EmptyMesh(path.to_path_buf()));
    }

    let to_y_up = |v: &stl_io::Vertex| Vec3::new(v[0], v[2], v[1]);
    let positions: Vec<Vec3> = stl.vertices.iter().map(to_y_up).collect();

    let face_normals: Vec<Vec3> = stl
        .faces
        .iter()
        .map(|face| {
            let [a, b, c] = face.vertices.map(|i| positions[i]);
            to_y_up(&face.normal)
                .try_normalize()
                .or_else(|| (c - a).cross(b - a).try_normalize())
                .unwrap_or(Vec3::Y)
        })
        .collect();

    // (face, corner) pairs using each position
    let mut corners: Vec<Vec<(usize, usize)>> = vec![Vec::new(); positions.len()];
    for (f, face) in stl.faces.iter().enumerate() {
        for (c, &v) in face.vertices.iter().enumerate() {
            corners[v].push((f, c));
        }
    }

    let mut mesh_positions = Vec::with_capacity(positions.len());
    let mut mesh_normals = Vec::with_capacity(positions.len());
    let mut face_indices = vec![[0u32; 3]; stl.faces.len()];

    for (v, uses) in corners.iter().enumerate() {
        let mut groups: Vec<Vec<(usize, usize)>> = Vec::new();
        for &(f, c) in uses {
            let normal = face_normals[f];
            let group = groups.iter_mut().find(|group| {
                face_normals[group[0].0].angle_between(normal) < STL_SMOOTHING_ANGLE
            });
            match group {
                Some(group) => group.push((f, c)),
                None => groups.push(vec![(f, c)]),
            }
        }

        for group in groups {
            let index = mesh_positions.len() as u32;
            let sum: Vec3 = group.iter().map(|&(f, _)| face_normals[f]).sum();
            mesh_positions.push(positions[v]);
            mesh_normals.push(sum.try_normalize().unwrap_or(face_normals[group[0].0]));
            for (f, c) in group {
                face_indices[f][c] = index;
            }
        }
    }

    let indices: Vec<u32> = face_indices.iter().flat_map(|&[a, b, c]| [a, c, b]).collect();

    log::debug!(
        "Loaded {} ({} positions, {} smoothed vertices, {} triangles)",
        path.display(),
        positions.len(),
        mesh_positions.len(),
        stl.faces.len()
    );

    Ok(Mesh::new(mesh_positions, indices, Some(mesh_normals)))
}

/// Loads meshes by name relative to a base directory and shares them.
///
/// Loading the same name twice returns the cached mesh.
#[derive(Debug, Default)]
pub struct MeshLibrary {
    base_path: PathBuf,
    meshes: HashMap<String, Arc<Mesh>>,
}

impl MeshLibrary {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            meshes: HashMap::new(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Register a mesh under `name` without touching the filesystem.
    pub fn insert(&mut self, name: impl Into<String>, mesh: Mesh) -> Arc<Mesh> {
        let mesh = Arc::new(mesh);
        self.meshes.insert(name.into(), Arc::clone(&mesh));
        mesh
    }

    /// Get the mesh named `name`, loading it on first use.
    pub fn get(&mut self, name: &str) -> SceneResult<Arc<Mesh>> {
        if let Some(mesh) = self.meshes.get(name) {
            return Ok(Arc::clone(mesh));
        }

        let path = self.base_path.join(name);
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let mesh = match extension.as_deref() {
            Some("obj") => load_obj(&path)?,
            Some("stl") => load_stl(&path)?,
            _ => return Err(SceneError::UnsupportedFormat(name.to_string())),
        };
        log::info!(
            "Loaded mesh '{}': {} triangles",
            name,
            mesh.triangle_count()
        );
        Ok(self.insert(name, mesh))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    /// Write `content` to a fresh file in the system temp directory.
    pub(crate) fn write_temp(name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lumen_core_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    const QUAD_OBJ: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn test_load_obj_triangulates() {
        let path = write_temp("quad.obj", QUAD_OBJ);
        let mesh = load_obj(&path).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);

        let normals = mesh.normals.as_ref().unwrap();
        assert!(normals.iter().all(|n| (*n - Vec3::Z).length() < 1e-5));
    }

    #[test]
    fn test_load_obj_merges_models() {
        let content = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o second
v 0 0 1
v 1 0 1
v 0 1 1
f 4 5 6
";
        let path = write_temp("two_models.obj", content);
        let mesh = load_obj(&path).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.indices[3..].iter().all(|&i| i >= 3));
    }

    #[test]
    fn test_load_obj_without_faces_is_an_error() {
        let path = write_temp("points.obj", "v 0 0 0\nv 1 0 0\n");
        assert!(load_obj(&path).is_err());
    }

    #[test]
    fn test_library_caches_meshes() {
        let path = write_temp("cached.obj", QUAD_OBJ);
        let mut library = MeshLibrary::new(path.parent().unwrap());

        let a = library.get("cached.obj").unwrap();
        let b = library.get("cached.obj").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_library_rejects_unknown_format() {
        let mut library = MeshLibrary::new(std::env::temp_dir());
        let err = library.get("model.ply").unwrap_err();
        assert!(matches!(err, SceneError::UnsupportedFormat(_)));
    }

    fn stl_triangle(normal: [f32; 3], vertices: [[f32; 3]; 3]) -> stl_io::Triangle {
        stl_io::Triangle {
            normal: stl_io::Normal::new(normal),
            vertices: vertices.map(stl_io::Vertex::new),
        }
    }

    fn write_stl(name: &str, triangles: &[stl_io::Triangle]) -> PathBuf {
        let mut bytes = Vec::new();
        stl_io::write_stl(&mut bytes, triangles.iter()).unwrap();
        write_temp(name, bytes)
    }

    #[test]
    fn test_load_stl_swaps_to_y_up() {
        let path = write_stl(
            "square.stl",
            &[
                stl_triangle([0.0, 0.0, 1.0], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]),
                stl_triangle([0.0, 0.0, 1.0], [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]),
            ],
        );
        let mesh = load_stl(&path).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.positions.iter().all(|p| p.y == 0.0));
        assert!(mesh.normals.as_ref().unwrap().iter().all(|n| (*n - Vec3::Y).length() < 1e-5));

        // Winding stays counter-clockwise around the normal
        let [a, b, c] = [0, 1, 2].map(|i| mesh.positions[mesh.indices[i] as usize]);
        assert!((b - a).cross(c - a).dot(Vec3::Y) > 0.0);
    }

    #[test]
    fn test_load_stl_splits_sharp_edges() {
        // Two faces folded at a right angle along the edge x = 0, y in [0, 1]
        let path = write_stl(
            "fold.stl",
            &[
                stl_triangle([0.0, 0.0, 1.0], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
                stl_triangle([-1.0, 0.0, 0.0], [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]),
            ],
        );
        let mesh = load_stl(&path).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_load_stl_smooths_shallow_edges() {
        // Second face tilted by about 17 degrees, with no normal stored
        let path = write_stl(
            "tent.stl",
            &[
                stl_triangle([0.0, 0.0, 1.0], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
                stl_triangle([0.0, 0.0, 0.0], [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.3]]),
            ],
        );
        let mesh = load_stl(&path).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        let normals = mesh.normals.as_ref().unwrap();
        assert!(normals.iter().all(|n| n.y > 0.9 && (n.length() - 1.0).abs() < 1e-5));
        // The shared edge blends both faces
        assert!(normals.iter().any(|n| n.x > 1e-3));
        assert!(normals.iter().any(|n| n.x.abs() < 1e-6));
    }

    #[test]
    fn test_load_stl_missing_file() {
        let err = load_stl("/nonexistent/model.stl").unwrap_err();
        assert!(matches!(err, SceneError::Stl { .. }));
    }

    #[test]
    fn test_library_loads_stl() {
        let path = write_stl(
            "library.stl",
            &[stl_triangle([0.0, 0.0, 1.0], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])],
        );
        let mut library = MeshLibrary::new(path.parent().unwrap());

        assert_eq!(library.get("library.STL").unwrap().triangle_count(), 1);
    }

    #[test]
    fn test_library_prefers_inserted_meshes() {
        let mut library = MeshLibrary::new("/nonexistent");
        library.insert("box", Mesh::cuboid(Vec3::ZERO, Vec3::ONE));

        assert_eq!(library.get("box").unwrap().triangle_count(), 12);
    }
}
