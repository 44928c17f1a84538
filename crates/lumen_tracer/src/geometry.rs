//! Local-space geometry and the pool that owns it.
//!
//! Geometry is immutable once built and shared: any number of objects may
//! reference the same entry of a [`GeometryPool`], and the borrow checker
//! keeps the pool alive for as long as a scene refers to it.

use std::path::Path;

use lumen_core::{Material, MeshData, MeshError};
use lumen_math::{Interval, Mat4, Ray, Vec2, Vec3};
use thiserror::Error;

use crate::hit::{GeometryHit, HitPayload, SurfaceProperties};
use crate::object::Object;
use crate::quad::Quad;
use crate::sphere::Sphere;
use crate::triangle_mesh::TriangleMesh;

/// Errors raised while building geometry or objects.
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("No geometry with id {0:?} in the pool")]
    UnknownGeometry(GeometryId),
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// The closed set of shapes the tracer understands.
#[derive(Debug, Clone)]
pub enum Geometry {
    Sphere(Sphere),
    Quad(Quad),
    Mesh(TriangleMesh),
}

impl Geometry {
    /// Unit sphere with a raster mesh subdivided `levels` times.
    pub fn sphere(levels: u32) -> GeometryResult<Self> {
        Ok(Geometry::Sphere(Sphere::new(levels)?))
    }

    pub fn quad() -> Self {
        Geometry::Quad(Quad::new())
    }

    pub fn mesh(data: MeshData) -> Self {
        Geometry::Mesh(TriangleMesh::new(data))
    }

    pub fn load_obj<P: AsRef<Path>>(path: P) -> GeometryResult<Self> {
        Ok(Self::mesh(MeshData::load_obj(path)?))
    }

    /// Nearest hit with `t` in `range`; the ray is in local space.
    pub fn intersect(&self, ray: &Ray, range: Interval) -> Option<GeometryHit> {
        match self {
            Geometry::Sphere(sphere) => sphere.intersect(ray, range),
            Geometry::Quad(quad) => quad.intersect(ray, range),
            Geometry::Mesh(mesh) => mesh.intersect(ray, range),
        }
    }

    /// Whether anything is hit with `t` in `range`.
    pub fn shadows(&self, ray: &Ray, range: Interval) -> bool {
        match self {
            Geometry::Sphere(sphere) => sphere.shadows(ray, range),
            Geometry::Quad(quad) => quad.shadows(ray, range),
            Geometry::Mesh(mesh) => mesh.shadows(ray, range),
        }
    }

    /// Local-space normal and texture coordinates for a payload this
    /// geometry produced.
    pub fn hit_properties(&self, payload: &HitPayload) -> SurfaceProperties {
        match (self, *payload) {
            (Geometry::Sphere(sphere), HitPayload::Sphere { position }) => sphere.hit_properties(position),
            (Geometry::Quad(quad), HitPayload::Quad { u, v }) => quad.hit_properties(u, v),
            (Geometry::Mesh(mesh), HitPayload::Mesh { indices, u, v }) => mesh.hit_properties(indices, u, v),
            (geometry, payload) => {
                debug_assert!(false, "{} cannot read payload {:?}", geometry.kind(), payload);
                SurfaceProperties {
                    normal: Vec3::Y,
                    texcoords: Vec2::ZERO,
                }
            }
        }
    }

    /// Triangles the rasterizer draws for this shape.
    pub fn raster_mesh(&self) -> &MeshData {
        match self {
            Geometry::Sphere(sphere) => sphere.raster_mesh(),
            Geometry::Quad(quad) => quad.raster_mesh(),
            Geometry::Mesh(mesh) => mesh.data(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Sphere(_) => "sphere",
            Geometry::Quad(_) => "quad",
            Geometry::Mesh(_) => "mesh",
        }
    }
}

/// Handle to an entry in a [`GeometryPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(usize);

/// Owner of all geometry. Build it first, then borrow it for the scene.
#[derive(Debug, Default)]
pub struct GeometryPool {
    geometry: Vec<Geometry>,
}

impl GeometryPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, geometry: Geometry) -> GeometryId {
        log::debug!("Geometry {}: {}", self.geometry.len(), geometry.kind());
        self.geometry.push(geometry);
        GeometryId(self.geometry.len() - 1)
    }

    pub fn get(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometry.get(id.0)
    }

    /// Place the geometry `id` in the world with a material.
    pub fn instantiate(&self, id: GeometryId, material: Material, object_to_world: Mat4) -> GeometryResult<Object<'_>> {
        let geometry = self.get(id).ok_or(GeometryError::UnknownGeometry(id))?;
        Ok(Object::new(geometry, material, object_to_world))
    }

    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }
}
