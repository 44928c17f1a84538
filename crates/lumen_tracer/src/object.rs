//! Placed instances of shared geometry.

use lumen_core::{DrawItem, Lighting, Material};
use lumen_math::{Interval, Mat4, Mat4Ext, ObjectTransform, Ray, Vec3};

use crate::geometry::Geometry;
use crate::hit::{GeometryHit, HitRecord, SurfaceProperties};

/// A geometry reference placed in the world with its own material.
///
/// The geometry is borrowed from a [`crate::GeometryPool`]; the material is
/// owned. Intersection happens in object space, so the query ray is carried
/// through the inverse placement first.
#[derive(Debug, Clone)]
pub struct Object<'g> {
    geometry: &'g Geometry,
    material: Material,
    transform: ObjectTransform,
}

impl<'g> Object<'g> {
    pub fn new(geometry: &'g Geometry, material: Material, object_to_world: Mat4) -> Self {
        Self {
            geometry,
            material,
            transform: ObjectTransform::new(object_to_world),
        }
    }

    /// Replace the placement; inverse and normal transforms follow.
    pub fn set_transform(&mut self, object_to_world: Mat4) {
        self.transform.set(object_to_world);
    }

    pub fn transform(&self) -> &ObjectTransform {
        &self.transform
    }

    pub fn geometry(&self) -> &'g Geometry {
        self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// World ray expressed in object space. The direction is not
    /// renormalized, so `t` means the same point in both spaces.
    pub fn to_object_space(&self, ray: &Ray) -> Ray {
        let world_to_object = self.transform.world_to_object();
        Ray::new(
            world_to_object.transform_point3(ray.origin),
            world_to_object.transform_vector3(ray.direction),
        )
    }

    pub fn intersect(&self, ray: &Ray, range: Interval) -> Option<GeometryHit> {
        self.geometry.intersect(&self.to_object_space(ray), range)
    }

    pub fn shadows(&self, ray: &Ray, range: Interval) -> bool {
        self.geometry.shadows(&self.to_object_space(ray), range)
    }

    /// World-space normal and texture coordinates of a hit on this object.
    pub fn hit_properties(&self, hit: &HitRecord) -> SurfaceProperties {
        let local = self.geometry.hit_properties(&hit.payload);
        SurfaceProperties {
            normal: self.transform.normal_to_world().transform_normal(local.normal),
            texcoords: local.texcoords,
        }
    }

    /// World-space point of an object-space position.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.transform.object_to_world().transform_point3(local)
    }

    pub fn draw_item(&self, world_view: Mat4, projection: Mat4, lighting: &Lighting) -> DrawItem<'_> {
        DrawItem::new(
            self.geometry.raster_mesh(),
            &self.material,
            self.transform.object_to_world(),
            world_view,
            projection,
            lighting,
        )
    }
}
