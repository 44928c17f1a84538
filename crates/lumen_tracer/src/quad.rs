//! Unit quad primitive: corners (±1, 0, ±1), facing +Y.

use lumen_core::MeshData;
use lumen_math::{Interval, Ray, Vec2, Vec3};

use crate::hit::{GeometryHit, HitPayload, SurfaceProperties};

const CORNER: Vec3 = Vec3::new(-1.0, 0.0, -1.0);
const EDGE_U: Vec3 = Vec3::new(0.0, 0.0, 2.0);
const EDGE_V: Vec3 = Vec3::new(2.0, 0.0, 0.0);

/// Determinants below this are treated as rays parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct Quad {
    mesh: MeshData,
}

impl Quad {
    pub fn new() -> Self {
        Self {
            mesh: MeshData::quad(),
        }
    }

    pub fn intersect(&self, ray: &Ray, range: Interval) -> Option<GeometryHit> {
        let (t, u, v) = Self::solve(ray, range)?;
        Some(GeometryHit {
            t,
            payload: HitPayload::Quad { u, v },
        })
    }

    pub fn shadows(&self, ray: &Ray, range: Interval) -> bool {
        Self::solve(ray, range).is_some()
    }

    pub fn hit_properties(&self, u: f32, v: f32) -> SurfaceProperties {
        SurfaceProperties {
            normal: Vec3::Y,
            texcoords: Vec2::new(u, v),
        }
    }

    pub fn raster_mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Solve `o + t d = corner + u E1 + v E2` by Cramer's rule.
    fn solve(ray: &Ray, range: Interval) -> Option<(f32, f32, f32)> {
        let p = ray.direction.cross(EDGE_V);
        let det = p.dot(EDGE_U);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let unit = Interval::new(0.0, 1.0);
        let to_origin = ray.origin - CORNER;
        let u = p.dot(to_origin) / det;
        if !unit.contains(u) {
            return None;
        }

        let q = to_origin.cross(EDGE_U);
        let v = q.dot(ray.direction) / det;
        if !unit.contains(v) {
            return None;
        }

        let t = q.dot(EDGE_V) / det;
        range.contains(t).then_some((t, u, v))
    }
}

impl Default for Quad {
    fn default() -> Self {
        Self::new()
    }
}
