//! Scene aggregate: objects, the point light and the recursive shader.

use lumen_core::{DrawItem, Lighting};
use lumen_math::{Interval, Mat4, Ray, Vec3};
use rand::RngCore;

use crate::config::{IndirectMode, TraceConfig};
use crate::hit::HitRecord;
use crate::object::Object;
use crate::shading::{shade, ShaderValues};

/// An ordered list of objects lit by one point light.
///
/// Queries scan every object; there is no acceleration structure. Objects
/// cannot be removed individually, the scene is dropped as a whole.
pub struct Scene<'g> {
    objects: Vec<Object<'g>>,
    lighting: Lighting,
    epsilon: f32,
    indirect: IndirectMode,
}

impl<'g> Scene<'g> {
    pub fn new() -> Self {
        let config = TraceConfig::default();
        Self {
            objects: Vec::new(),
            lighting: Lighting::default(),
            epsilon: config.epsilon,
            indirect: config.indirect,
        }
    }

    /// Take the secondary-ray epsilon and indirect estimator from `config`.
    pub fn configure(&mut self, config: &TraceConfig) {
        self.epsilon = config.epsilon;
        self.indirect = config.indirect;
    }

    /// Append an object and return its index.
    pub fn add(&mut self, object: Object<'g>) -> usize {
        log::debug!(
            "Scene object {}: {} ({:?})",
            self.objects.len(),
            object.geometry().kind(),
            object.material().shading()
        );
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[Object<'g>] {
        &self.objects
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut Object<'g>> {
        self.objects.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn set_light(&mut self, position: Vec3, radiance: Vec3) {
        self.lighting.position = position;
        self.lighting.radiance = radiance;
    }

    pub fn set_ambient(&mut self, ambient: Vec3) {
        self.lighting.ambient = ambient;
    }

    pub fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    /// Closest hit with `t` in `range`. When two objects report the same
    /// distance the one added first wins.
    pub fn nearest_hit(&self, ray: &Ray, range: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord> = None;
        let mut range = range;

        for object in &self.objects {
            if let Some(hit) = object.intersect(ray, range) {
                if closest.map_or(true, |c| hit.t < c.t) {
                    range = range.with_max(hit.t);
                    closest = Some(HitRecord::new(object, hit));
                }
            }
        }

        closest
    }

    /// Whether any object is hit with `t` in `range`.
    pub fn shadows(&self, ray: &Ray, range: Interval) -> bool {
        self.objects.iter().any(|object| object.shadows(ray, range))
    }

    /// Radiance carried back along `ray` from `hit`.
    ///
    /// Direct light from the point light (zero when the shadow ray is
    /// blocked), then, while `depth > 0`, a mirror ray for mirror materials
    /// and one cosine-weighted indirect bounce, each recursing with
    /// `depth - 1`.
    pub fn shade_ray(&self, ray: &Ray, hit: &HitRecord, depth: u32, rng: &mut dyn RngCore) -> Vec3 {
        let object = hit.object;
        let material = object.material();
        let surface = object.hit_properties(hit);
        let point = ray.at(hit.t);
        let normal = surface.normal;

        let to_light = self.lighting.position - point;
        let light_distance = to_light.length();

        let mut values = ShaderValues {
            material,
            point,
            normal,
            eye_dir: (-ray.direction).normalize(),
            texcoords: surface.texcoords,
            light_dir: to_light.try_normalize().unwrap_or(normal),
            light_radiance: self.lighting.radiance,
            ambient: self.lighting.ambient,
        };

        let shadow_ray = Ray::new(point, values.light_dir);
        let mut color = if self.shadows(&shadow_ray, Interval::new(self.epsilon, light_distance)) {
            Vec3::ZERO
        } else {
            shade(&values)
        };

        if depth == 0 {
            return color;
        }

        let secondary = Interval::from_min(self.epsilon);

        if material.is_mirror() {
            let d = ray.direction.normalize();
            let mirror_ray = Ray::new(point, d - 2.0 * d.dot(normal) * normal);
            if let Some(mirror_hit) = self.nearest_hit(&mirror_ray, secondary) {
                let reflected = self.shade_ray(&mirror_ray, &mirror_hit, depth - 1, rng);
                color += material.mirror_reflectance() * reflected;
            }
        }

        let bounce = Ray::cosine_hemisphere(point, normal, rng);
        if let Some(bounce_hit) = self.nearest_hit(&bounce, secondary) {
            let incoming = self.shade_ray(&bounce, &bounce_hit, depth - 1, rng);
            color += match self.indirect {
                IndirectMode::Legacy => {
                    values.light_dir = bounce.direction;
                    values.light_radiance = incoming;
                    shade(&values)
                }
                IndirectMode::Unbiased => values.reflectance() * incoming,
            };
        }

        color
    }

    /// One raster draw item per object, in insertion order.
    pub fn draw_items(&self, world_view: Mat4, projection: Mat4) -> Vec<DrawItem<'_>> {
        self.objects
            .iter()
            .map(|object| object.draw_item(world_view, projection, &self.lighting))
            .collect()
    }
}

impl Default for Scene<'_> {
    fn default() -> Self {
        Self::new()
    }
}
