//! Unit sphere primitive (radius 1, centered at the origin).

use std::f32::consts::PI;

use lumen_core::MeshData;
use lumen_math::{Interval, Ray, Vec2, Vec3};

use crate::geometry::GeometryResult;
use crate::hit::{GeometryHit, HitPayload, SurfaceProperties};

/// Subdivision level of the raster mesh when none is given.
pub const DEFAULT_SPHERE_LEVELS: u32 = 4;

/// The unit sphere. Placement and size come from the owning object's
/// transform; the tessellated mesh is only used by the rasterizer.
#[derive(Debug, Clone)]
pub struct Sphere {
    mesh: MeshData,
}

impl Sphere {
    /// Create a sphere whose raster mesh is subdivided `levels` times.
    pub fn new(levels: u32) -> GeometryResult<Self> {
        Ok(Self {
            mesh: MeshData::sphere(levels)?,
        })
    }

    /// Nearest root of `|o + t d|^2 = 1` inside `range`.
    pub fn intersect(&self, ray: &Ray, range: Interval) -> Option<GeometryHit> {
        let t = Self::nearest_root(ray, range)?;
        Some(GeometryHit {
            t,
            payload: HitPayload::Sphere {
                position: ray.at(t),
            },
        })
    }

    pub fn shadows(&self, ray: &Ray, range: Interval) -> bool {
        Self::nearest_root(ray, range).is_some()
    }

    /// Normal and texture coordinates at an object-space hit position.
    pub fn hit_properties(&self, position: Vec3) -> SurfaceProperties {
        SurfaceProperties {
            normal: position.normalize(),
            texcoords: Self::texcoords(position),
        }
    }

    /// Longitude/latitude texture coordinates of a point on the sphere.
    pub fn texcoords(p: Vec3) -> Vec2 {
        Vec2::new(
            ((-p.x).atan2(p.z) / PI + 1.0) / 2.0,
            ((-p.y).clamp(-1.0, 1.0).asin() / PI + 1.0) / 2.0,
        )
    }

    pub fn raster_mesh(&self) -> &MeshData {
        &self.mesh
    }

    fn nearest_root(ray: &Ray, range: Interval) -> Option<f32> {
        let a = ray.direction.length_squared();
        if a <= 0.0 {
            return None;
        }
        let b = 2.0 * ray.direction.dot(ray.origin);
        let c = ray.origin.length_squared() - 1.0;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let near = (-b - sqrtd) / (2.0 * a);
        let far = (-b + sqrtd) / (2.0 * a);

        // Smaller root first, then the larger one
        [near, far].into_iter().find(|&t| range.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere() -> Sphere {
        Sphere::new(0).unwrap()
    }

    #[test]
    fn test_head_on_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = sphere().intersect(&ray, Interval::new(0.0, 10.0)).unwrap();

        assert!((hit.t - 4.0).abs() < 1e-4);
        let HitPayload::Sphere { position } = hit.payload else {
            panic!("wrong payload: {:?}", hit.payload);
        };
        assert!((position - Vec3::Z).length() < 1e-4);

        let props = sphere().hit_properties(position);
        assert!((props.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_miss() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere().intersect(&ray, Interval::new(0.0, 10.0)).is_none());
        assert!(!sphere().shadows(&ray, Interval::new(0.0, 10.0)));
    }

    #[test]
    fn test_far_root_when_near_out_of_range() {
        // From inside the sphere only the exit point is ahead
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = sphere().intersect(&ray, Interval::new(0.001, 10.0)).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);

        // Both roots beyond t1
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(sphere().intersect(&ray, Interval::new(0.0, 3.0)).is_none());
    }

    #[test]
    fn test_unnormalized_direction() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0));
        let hit = sphere().intersect(&ray, Interval::new(0.0, 10.0)).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_texcoords_range() {
        let props = sphere().hit_properties(Vec3::new(0.0, 0.0, 1.0));
        assert!((props.texcoords - Vec2::new(0.5, 0.5)).length() < 1e-5);

        // Latitude spans [0.25, 0.75] from pole to pole
        let top = Sphere::texcoords(Vec3::Y);
        assert!((top.y - 0.25).abs() < 1e-5);
        let bottom = Sphere::texcoords(Vec3::NEG_Y);
        assert!((bottom.y - 0.75).abs() < 1e-5);
    }
}
