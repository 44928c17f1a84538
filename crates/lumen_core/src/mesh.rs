//! Indexed triangle meshes.
//!
//! `MeshData` is the validated, immutable vertex/index store shared by the
//! ray-traced mesh geometry and the raster draw items. Besides building from
//! raw buffers it provides the built-in unit models (quad, octahedron,
//! tessellated sphere) and OBJ loading through `tobj`.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::path::Path;

use lumen_math::{Vec2, Vec3};
use thiserror::Error;

/// Deepest sphere subdivision accepted (8 * 4^8 faces).
pub const MAX_SPHERE_LEVELS: u32 = 8;

/// Errors raised while building a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Mesh has no triangles")]
    Empty,

    #[error("Index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Expected {expected} {attribute}, found {found}")]
    AttributeMismatch {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Sphere tessellation level {0} exceeds {MAX_SPHERE_LEVELS}")]
    TessellationTooDeep(u32),

    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// Vertex positions, normals and texture coordinates plus a triangle list.
///
/// Every index is checked against the vertex count at construction and the
/// data cannot be changed afterwards.
#[derive(Clone, Debug)]
pub struct MeshData {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    indices: Vec<u32>,
}

impl MeshData {
    /// Build a mesh from complete vertex attributes.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        texcoords: Vec<Vec2>,
        indices: Vec<u32>,
    ) -> MeshResult<Self> {
        let vertex_count = positions.len();

        if indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(indices.len()));
        }
        if normals.len() != vertex_count {
            return Err(MeshError::AttributeMismatch {
                attribute: "normals",
                expected: vertex_count,
                found: normals.len(),
            });
        }
        if texcoords.len() != vertex_count {
            return Err(MeshError::AttributeMismatch {
                attribute: "texcoords",
                expected: vertex_count,
                found: texcoords.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        Ok(Self {
            positions,
            normals,
            texcoords,
            indices,
        })
    }

    /// Build a mesh from positions only; normals are averaged from the faces
    /// and texture coordinates are zero.
    pub fn from_positions(positions: Vec<Vec3>, indices: Vec<u32>) -> MeshResult<Self> {
        let vertex_count = positions.len();
        let mut mesh = Self::new(
            positions,
            vec![Vec3::Y; vertex_count],
            vec![Vec2::ZERO; vertex_count],
            indices,
        )?;
        mesh.compute_normals();
        Ok(mesh)
    }

    /// The unit quad: corners (±1, 0, ±1), normal +Y.
    pub fn quad() -> Self {
        Self {
            positions: vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(-1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, -1.0),
            ],
            normals: vec![Vec3::Y; 4],
            texcoords: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
            ],
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// Unit octahedron (the level-0 sphere).
    pub fn octahedron() -> Self {
        let (positions, texcoords) = octahedron_vertices();
        Self {
            normals: positions.clone(),
            positions,
            texcoords,
            indices: OCTAHEDRON_FACES.to_vec(),
        }
    }

    /// Unit sphere made by subdividing each octahedron face `levels` times.
    ///
    /// Produces `8 * 4^levels` triangles. Vertex normals equal positions.
    pub fn sphere(levels: u32) -> MeshResult<Self> {
        if levels > MAX_SPHERE_LEVELS {
            return Err(MeshError::TessellationTooDeep(levels));
        }
        if levels == 0 {
            return Ok(Self::octahedron());
        }

        let (positions, texcoords) = octahedron_vertices();
        let mut builder = SphereBuilder {
            lookup: HashMap::new(),
            positions: Vec::new(),
            texcoords: Vec::new(),
            indices: Vec::with_capacity(3 * 8 * 4usize.pow(levels)),
        };
        for (p, tc) in positions.into_iter().zip(texcoords) {
            builder.find_vertex(p, tc);
        }
        for face in OCTAHEDRON_FACES.chunks_exact(3) {
            builder.subdivide(levels, face[0], face[1], face[2]);
        }

        log::debug!(
            "Tessellated sphere: level {}, {} vertices, {} triangles",
            levels,
            builder.positions.len(),
            builder.indices.len() / 3
        );

        Ok(Self {
            normals: builder.positions.clone(),
            positions: builder.positions,
            texcoords: builder.texcoords,
            indices: builder.indices,
        })
    }

    /// Load every model of an OBJ file into one mesh.
    ///
    /// Missing normals are computed from the faces; missing texture
    /// coordinates are zero.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> MeshResult<Self> {
        let (models, _materials) = tobj::load_obj(
            path.as_ref(),
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )?;

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut texcoords = Vec::new();
        let mut indices = Vec::new();
        let mut needs_normals = false;

        for model in &models {
            let mesh = &model.mesh;
            let base = positions.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            positions.extend(mesh.positions.chunks_exact(3).map(Vec3::from_slice));

            if mesh.normals.len() == mesh.positions.len() {
                normals.extend(mesh.normals.chunks_exact(3).map(Vec3::from_slice));
            } else {
                needs_normals = true;
                normals.extend(std::iter::repeat(Vec3::Y).take(vertex_count));
            }

            if mesh.texcoords.len() == vertex_count * 2 {
                texcoords.extend(mesh.texcoords.chunks_exact(2).map(Vec2::from_slice));
            } else {
                texcoords.extend(std::iter::repeat(Vec2::ZERO).take(vertex_count));
            }

            indices.extend(mesh.indices.iter().map(|i| i + base));
        }

        let mut mesh = Self::new(positions, normals, texcoords, indices)?;
        if needs_normals {
            log::debug!("OBJ has no normals, computing smooth normals");
            mesh.compute_normals();
        }

        log::info!(
            "Loaded OBJ {}: {} models, {} vertices, {} triangles",
            path.as_ref().display(),
            models.len(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        Ok(mesh)
    }

    /// Replace the normals with area-weighted averages of the face normals
    /// (counter-clockwise winding is front facing).
    fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for face in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = normals;
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex indices of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|f| [f[0], f[1], f[2]])
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

// Octahedron with duplicated poles and +X seam so texture coordinates
// stay continuous inside every face.
const OCTAHEDRON_FACES: [u32; 24] = [
    0, 4, 5, 1, 5, 6, 2, 6, 7, 3, 7, 8, //
    9, 5, 4, 10, 6, 5, 11, 7, 6, 12, 8, 7,
];

fn octahedron_vertices() -> (Vec<Vec3>, Vec<Vec2>) {
    let positions = vec![
        Vec3::Y,
        Vec3::Y,
        Vec3::Y,
        Vec3::Y,
        Vec3::X,
        Vec3::NEG_Z,
        Vec3::NEG_X,
        Vec3::Z,
        Vec3::X,
        Vec3::NEG_Y,
        Vec3::NEG_Y,
        Vec3::NEG_Y,
        Vec3::NEG_Y,
    ];
    let texcoords = vec![
        Vec2::new(0.125, 0.0),
        Vec2::new(0.375, 0.0),
        Vec2::new(0.625, 0.0),
        Vec2::new(0.875, 0.0),
        Vec2::new(0.0, 0.5),
        Vec2::new(0.25, 0.5),
        Vec2::new(0.5, 0.5),
        Vec2::new(0.75, 0.5),
        Vec2::new(1.0, 0.5),
        Vec2::new(0.125, 1.0),
        Vec2::new(0.375, 1.0),
        Vec2::new(0.625, 1.0),
        Vec2::new(0.875, 1.0),
    ];
    (positions, texcoords)
}

/// Longitude/latitude mapping used by the tessellated sphere. Agrees with
/// the octahedron table above, including the s = 0 / s = 1 split on +X.
fn sphere_mesh_texcoords(p: Vec3) -> Vec2 {
    Vec2::new(
        (p.z.atan2(-p.x) / PI + 1.0) / 2.0,
        ((-p.y).asin() / PI + 1.0) / 2.0,
    )
}

struct SphereBuilder {
    lookup: HashMap<[u32; 5], u32>,
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    indices: Vec<u32>,
}

impl SphereBuilder {
    /// Index of the vertex with this position and texcoord, adding it if new.
    fn find_vertex(&mut self, p: Vec3, tc: Vec2) -> u32 {
        // Adding 0.0 folds -0.0 into +0.0 so both hash alike
        let key = [
            (p.x + 0.0).to_bits(),
            (p.y + 0.0).to_bits(),
            (p.z + 0.0).to_bits(),
            (tc.x + 0.0).to_bits(),
            (tc.y + 0.0).to_bits(),
        ];
        let next = self.positions.len() as u32;
        let index = *self.lookup.entry(key).or_insert(next);
        if index == next {
            self.positions.push(p);
            self.texcoords.push(tc);
        }
        index
    }

    fn midpoint(&mut self, a: u32, b: u32, on_positive_z: bool) -> u32 {
        let mut m = (self.positions[a as usize] + self.positions[b as usize]).normalize();
        // Points on the +X seam belong to s = 0 unless the face lies on +Z
        if !on_positive_z && m.x > 0.0 && m.z.abs() < 1e-5 {
            m.z = -0.0;
        }
        self.find_vertex(m, sphere_mesh_texcoords(m))
    }

    fn subdivide(&mut self, levels: u32, i0: u32, i1: u32, i2: u32) {
        if levels == 0 {
            self.indices.extend_from_slice(&[i0, i1, i2]);
            return;
        }

        let mids = [(i0, i1), (i1, i2), (i2, i0)]
            .map(|(a, b)| (self.positions[a as usize] + self.positions[b as usize]).normalize());
        let on_positive_z = mids.iter().any(|m| m.z > 0.0);

        let i01 = self.midpoint(i0, i1, on_positive_z);
        let i12 = self.midpoint(i1, i2, on_positive_z);
        let i20 = self.midpoint(i2, i0, on_positive_z);

        self.subdivide(levels - 1, i0, i01, i20);
        self.subdivide(levels - 1, i01, i1, i12);
        self.subdivide(levels - 1, i01, i12, i20);
        self.subdivide(levels - 1, i20, i12, i2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec<Vec3>, Vec<u32>) {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        (positions, vec![0, 1, 2])
    }

    #[test]
    fn test_mesh_creation() {
        let (positions, indices) = triangle();
        let mesh = MeshData::from_positions(positions, indices).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles().next(), Some([0, 1, 2]));
    }

    #[test]
    fn test_compute_normals_ccw() {
        // 0,1,2 is counter-clockwise seen from +Z
        let (positions, indices) = triangle();
        let mesh = MeshData::from_positions(positions, indices).unwrap();

        for normal in mesh.normals() {
            assert!((normal.z - 1.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_validation_errors() {
        let (positions, _) = triangle();

        let err = MeshData::from_positions(positions.clone(), vec![]).unwrap_err();
        assert!(matches!(err, MeshError::Empty));

        let err = MeshData::from_positions(positions.clone(), vec![0, 1]).unwrap_err();
        assert!(matches!(err, MeshError::PartialTriangle(2)));

        let err = MeshData::from_positions(positions.clone(), vec![0, 1, 3]).unwrap_err();
        assert!(matches!(err, MeshError::IndexOutOfRange { index: 3, .. }));

        let err = MeshData::new(positions, vec![Vec3::Z; 2], vec![Vec2::ZERO; 3], vec![0, 1, 2])
            .unwrap_err();
        assert!(matches!(
            err,
            MeshError::AttributeMismatch {
                attribute: "normals",
                ..
            }
        ));
    }

    #[test]
    fn test_quad_model() {
        let quad = MeshData::quad();
        assert_eq!(quad.triangle_count(), 2);
        assert!(quad.normals().iter().all(|n| *n == Vec3::Y));
        assert!(quad.positions().iter().all(|p| p.x.abs() == 1.0 && p.y == 0.0));
    }

    #[test]
    fn test_octahedron_faces_point_outward() {
        let mesh = MeshData::octahedron();
        assert_eq!(mesh.triangle_count(), 8);

        for [a, b, c] in mesh.triangles() {
            let p = mesh.positions();
            let (a, b, c) = (p[a as usize], p[b as usize], p[c as usize]);
            let n = (b - a).cross(c - a);
            assert!(n.dot(a + b + c) > 0.0);
        }
    }

    #[test]
    fn test_sphere_tessellation() {
        for levels in 0..4 {
            let mesh = MeshData::sphere(levels).unwrap();
            assert_eq!(mesh.triangle_count(), 8 * 4usize.pow(levels));

            for (p, n) in mesh.positions().iter().zip(mesh.normals()) {
                assert!((p.length() - 1.0).abs() < 1e-5);
                assert_eq!(p, n);
            }
            for tc in mesh.texcoords() {
                assert!((0.0..=1.0).contains(&tc.x) && (0.0..=1.0).contains(&tc.y));
            }
        }
    }

    #[test]
    fn test_sphere_shares_vertices() {
        let mesh = MeshData::sphere(2).unwrap();
        // 8 + faces/2 + seam duplicates (2^(levels+1) - 1)
        let faces = mesh.triangle_count();
        assert_eq!(mesh.vertex_count(), 8 + faces / 2 + 7);
    }

    #[test]
    fn test_sphere_too_deep() {
        let err = MeshData::sphere(MAX_SPHERE_LEVELS + 1).unwrap_err();
        assert!(matches!(err, MeshError::TessellationTooDeep(_)));
    }

    #[test]
    fn test_missing_obj() {
        assert!(matches!(
            MeshData::load_obj("/nonexistent/model.obj"),
            Err(MeshError::Obj(_))
        ));
    }
}
