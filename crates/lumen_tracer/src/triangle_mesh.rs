//! Indexed triangle mesh intersection (Möller-Trumbore per triangle).

use lumen_core::MeshData;
use lumen_math::{Interval, Ray, Vec3};

use crate::hit::{GeometryHit, HitPayload, SurfaceProperties};

/// Determinants below this are treated as rays parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-4;

/// A triangle mesh in object space. The scan over triangles is linear.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    data: MeshData,
}

impl TriangleMesh {
    pub fn new(data: MeshData) -> Self {
        Self { data }
    }

    /// Nearest triangle hit; every hit tightens the upper bound.
    pub fn intersect(&self, ray: &Ray, range: Interval) -> Option<GeometryHit> {
        let mut closest = None;
        let mut range = range;

        for indices in self.data.triangles() {
            if let Some((t, u, v)) = self.intersect_triangle(indices, ray, range) {
                range = range.with_max(t);
                closest = Some(GeometryHit {
                    t,
                    payload: HitPayload::Mesh { indices, u, v },
                });
            }
        }

        closest
    }

    /// True as soon as any triangle is hit.
    pub fn shadows(&self, ray: &Ray, range: Interval) -> bool {
        self.data
            .triangles()
            .any(|indices| self.intersect_triangle(indices, ray, range).is_some())
    }

    /// Barycentric blend of the vertex normals and texture coordinates.
    pub fn hit_properties(&self, indices: [u32; 3], u: f32, v: f32) -> SurfaceProperties {
        let [i0, i1, i2] = indices.map(|i| i as usize);
        let (w0, w1, w2) = (1.0 - u - v, u, v);

        let normals = self.data.normals();
        let texcoords = self.data.texcoords();

        let normal = normals[i0] * w0 + normals[i1] * w1 + normals[i2] * w2;
        SurfaceProperties {
            normal: normal.normalize(),
            texcoords: texcoords[i0] * w0 + texcoords[i1] * w1 + texcoords[i2] * w2,
        }
    }

    pub fn data(&self) -> &MeshData {
        &self.data
    }

    fn intersect_triangle(&self, indices: [u32; 3], ray: &Ray, range: Interval) -> Option<(f32, f32, f32)> {
        let positions = self.data.positions();
        let v0 = positions[indices[0] as usize];
        let edge1: Vec3 = positions[indices[1] as usize] - v0;
        let edge2: Vec3 = positions[indices[2] as usize] - v0;

        let p = ray.direction.cross(edge2);
        let det = p.dot(edge1);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t_vec = ray.origin - v0;
        let u = p.dot(t_vec) / det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = t_vec.cross(edge1);
        let v = q.dot(ray.direction) / det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = q.dot(edge2) / det;
        range.contains(t).then_some((t, u, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec2;

    fn single_triangle() -> TriangleMesh {
        let data = MeshData::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![Vec3::Z, Vec3::X, Vec3::Y],
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)],
            vec![0, 1, 2],
        )
        .unwrap();
        TriangleMesh::new(data)
    }

    #[test]
    fn test_triangle_hit() {
        let mesh = single_triangle();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);
        let hit = mesh.intersect(&ray, Interval::new(0.001, 100.0)).unwrap();

        assert!((hit.t - 1.0).abs() < 1e-5);
        let HitPayload::Mesh { indices, u, v } = hit.payload else {
            panic!("wrong payload: {:?}", hit.payload);
        };
        assert_eq!(indices, [0, 1, 2]);
        assert!((u - 0.25).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let mesh = single_triangle();
        let ray = Ray::new(Vec3::new(2.0, 2.0, -1.0), Vec3::Z);
        assert!(mesh.intersect(&ray, Interval::new(0.001, 100.0)).is_none());
        assert!(!mesh.shadows(&ray, Interval::new(0.001, 100.0)));
    }

    #[test]
    fn test_barycentric_properties() {
        let mesh = single_triangle();

        // At a vertex the attributes are that vertex's
        let at_v1 = mesh.hit_properties([0, 1, 2], 1.0, 0.0);
        assert!((at_v1.normal - Vec3::X).length() < 1e-5);
        assert_eq!(at_v1.texcoords, Vec2::new(1.0, 0.0));

        // Interior normals are renormalized
        let inside = mesh.hit_properties([0, 1, 2], 0.3, 0.3);
        assert!((inside.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_of_stacked_triangles() {
        // Two parallel triangles at z = 0 and z = 2, far one listed first
        let positions = vec![
            Vec3::new(-1.0, -1.0, 2.0),
            Vec3::new(1.0, -1.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let data = MeshData::from_positions(positions, vec![0, 1, 2, 3, 4, 5]).unwrap();
        let mesh = TriangleMesh::new(data);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);
        let hit = mesh.intersect(&ray, Interval::new(0.0, 100.0)).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!(matches!(hit.payload, HitPayload::Mesh { indices: [3, 4, 5], .. }));

        // Shadow test over a segment that stops before either
        assert!(!mesh.shadows(&ray, Interval::new(0.0, 0.5)));
        assert!(mesh.shadows(&ray, Interval::new(0.0, 5.0)));
    }

    #[test]
    fn test_octahedron_hit_from_outside() {
        let mesh = TriangleMesh::new(MeshData::octahedron());
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        let hit = mesh.intersect(&ray, Interval::new(0.0, 10.0)).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-4);

        let HitPayload::Mesh { indices, u, v } = hit.payload else {
            panic!("wrong payload");
        };
        let props = mesh.hit_properties(indices, u, v);
        assert!(props.normal.y > 0.99);
    }
}
