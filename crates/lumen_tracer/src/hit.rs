//! Hit records produced by intersection queries.

use lumen_math::{Vec2, Vec3};

use crate::object::Object;

/// Variant-specific data recorded at an intersection.
///
/// Each geometry reads back only the payload it wrote, when the shading
/// code later asks it for the surface normal and texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitPayload {
    /// Object-space hit point on the unit sphere
    Sphere { position: Vec3 },
    /// Parametric position on the quad, both in [0, 1]
    Quad { u: f32, v: f32 },
    /// Triangle vertex indices and barycentric coordinates
    Mesh { indices: [u32; 3], u: f32, v: f32 },
}

/// A hit found by a geometry in its own local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryHit {
    /// Ray parameter of the hit
    pub t: f32,
    pub payload: HitPayload,
}

/// A hit found by a scene query: the local hit plus the object it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    pub t: f32,
    pub object: &'a Object<'a>,
    pub payload: HitPayload,
}

impl<'a> HitRecord<'a> {
    pub fn new(object: &'a Object<'a>, hit: GeometryHit) -> Self {
        Self {
            t: hit.t,
            object,
            payload: hit.payload,
        }
    }
}

/// Normal and texture coordinates at a hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProperties {
    /// Unit surface normal
    pub normal: Vec3,
    pub texcoords: Vec2,
}
