//! The demo room: a textured floor, coloured walls, a flattened sphere
//! blocking the light, and three objects on the floor.

use std::f32::consts::{FRAC_PI_2, PI};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumen_core::{Lighting, Material, MeshData, Texture, TextureCache};
use lumen_math::{Camera, Mat4, Vec3};
use lumen_tracer::{Geometry, GeometryId, GeometryPool, Scene};

const BEIGE: Vec3 = Vec3::new(0.76, 0.75, 0.5);
const RED: Vec3 = Vec3::new(0.63, 0.06, 0.04);
const GREEN: Vec3 = Vec3::new(0.15, 0.48, 0.09);

/// Pool entries the room is built from.
pub struct DemoGeometry {
    pub pool: GeometryPool,
    sphere: GeometryId,
    plane: GeometryId,
    centerpiece: GeometryId,
}

impl DemoGeometry {
    /// `obj` replaces the octahedron in the middle of the room.
    pub fn build(sphere_levels: u32, obj: Option<&Path>) -> Result<Self> {
        let mut pool = GeometryPool::new();
        let sphere = pool.add(Geometry::sphere(sphere_levels)?);
        let plane = pool.add(Geometry::quad());
        let centerpiece = match obj {
            Some(path) => pool.add(
                Geometry::load_obj(path)
                    .with_context(|| format!("Failed to load model {}", path.display()))?,
            ),
            None => pool.add(Geometry::mesh(MeshData::octahedron())),
        };

        Ok(Self {
            pool,
            sphere,
            plane,
            centerpiece,
        })
    }

    pub fn scene(&self, floor: Arc<Texture>) -> Result<Scene<'_>> {
        let pool = &self.pool;
        let mut scene = Scene::new();
        scene.set_lighting(demo_lighting());

        let walls = [
            // Floor and ceiling
            (
                Material::textured(floor),
                Mat4::from_scale(Vec3::new(5.0, 1.0, 5.0)),
            ),
            (
                Material::diffuse(BEIGE),
                Mat4::from_translation(Vec3::new(0.5, 5.0, 0.0))
                    * Mat4::from_rotation_z(PI)
                    * Mat4::from_scale(Vec3::new(5.0, 1.0, 5.0)),
            ),
            (
                Material::diffuse(GREEN),
                Mat4::from_translation(Vec3::new(5.0, 2.5, 0.0))
                    * Mat4::from_rotation_z(FRAC_PI_2)
                    * Mat4::from_scale(Vec3::new(2.5, 1.0, 5.0)),
            ),
            (
                Material::diffuse(GREEN),
                Mat4::from_translation(Vec3::new(-5.0, 2.5, 0.0))
                    * Mat4::from_rotation_z(-FRAC_PI_2)
                    * Mat4::from_scale(Vec3::new(2.5, 1.0, 5.0)),
            ),
            (
                Material::diffuse(RED),
                Mat4::from_translation(Vec3::new(0.0, 2.5, 5.0))
                    * Mat4::from_rotation_x(-FRAC_PI_2)
                    * Mat4::from_scale(Vec3::new(5.0, 1.0, 2.5)),
            ),
            (
                Material::diffuse(RED),
                Mat4::from_translation(Vec3::new(0.0, 2.5, -5.0))
                    * Mat4::from_rotation_x(FRAC_PI_2)
                    * Mat4::from_scale(Vec3::new(5.0, 1.0, 2.5)),
            ),
        ];
        for (material, transform) in walls {
            scene.add(pool.instantiate(self.plane, material, transform)?);
        }

        // Light blocker
        scene.add(pool.instantiate(
            self.sphere,
            Material::diffuse(BEIGE),
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))
                * Mat4::from_scale(Vec3::new(1.5, 0.15, 2.5)),
        )?);

        let rot_scale =
            Mat4::from_rotation_y(25.0_f32.to_radians()) * Mat4::from_scale(Vec3::splat(0.5));
        scene.add(pool.instantiate(
            self.centerpiece,
            Material::diffuse(BEIGE),
            Mat4::from_translation(Vec3::new(0.0, 0.75, 0.0)) * rot_scale,
        )?);
        scene.add(pool.instantiate(
            self.sphere,
            Material::diffuse(Vec3::ZERO).with_mirror(Vec3::ONE),
            Mat4::from_translation(Vec3::new(-2.0, 0.75, -2.0)) * rot_scale,
        )?);
        scene.add(pool.instantiate(
            self.sphere,
            Material::diffuse(BEIGE),
            Mat4::from_translation(Vec3::new(2.0, 0.75, -2.0)) * rot_scale,
        )?);

        log::info!("Demo scene: {} objects", scene.len());
        Ok(scene)
    }
}

pub fn demo_lighting() -> Lighting {
    Lighting {
        position: Vec3::new(0.0, 4.5, 0.0),
        radiance: Vec3::ONE,
        ambient: Vec3::ZERO,
    }
}

pub fn demo_camera() -> Camera {
    let mut camera = Camera::new();
    camera.look_at(Vec3::new(0.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
    camera.set_depth_clip(0.5, 30.0);
    camera
}

/// Floor texture: the given image, or a beige checkerboard.
pub fn floor_texture(cache: &mut TextureCache, path: Option<&Path>) -> Result<Arc<Texture>> {
    match path {
        Some(path) => Ok(cache.load(&path.to_string_lossy())?),
        None => Ok(cache.insert("checker", Texture::checker(256, 8, BEIGE, BEIGE * 0.5))),
    }
}
