//! Local shading models evaluated at a ray hit.

use lumen_core::{Material, ShadingModel};
use lumen_math::{Vec2, Vec3};

/// Inputs of a shading model at one surface point.
///
/// `light_dir` and `light_radiance` describe the point light for direct
/// lighting, or the bounce direction and its radiance for indirect light.
#[derive(Debug, Clone, Copy)]
pub struct ShaderValues<'a> {
    pub material: &'a Material,
    /// World-space point being shaded
    pub point: Vec3,
    /// Unit surface normal
    pub normal: Vec3,
    /// Unit direction towards the eye
    pub eye_dir: Vec3,
    pub texcoords: Vec2,
    /// Unit direction towards the light
    pub light_dir: Vec3,
    pub light_radiance: Vec3,
    pub ambient: Vec3,
}

impl ShaderValues<'_> {
    pub fn reflectance(&self) -> Vec3 {
        self.material.reflectance_at(self.texcoords)
    }
}

/// Radiance leaving the point towards the eye.
pub fn shade(values: &ShaderValues) -> Vec3 {
    match values.material.shading() {
        ShadingModel::Simple => values.reflectance(),
        ShadingModel::Diffuse => lambertian(values),
        ShadingModel::Specular => lambertian(values) + phong_specular(values),
    }
}

/// `rho * L * max(0, n.l) + rho * ambient`
fn lambertian(values: &ShaderValues) -> Vec3 {
    let rho = values.reflectance();
    let cos_theta = values.normal.dot(values.light_dir).max(0.0);
    rho * values.light_radiance * cos_theta + rho * values.ambient
}

/// `ks * L * max(0, r.e)^p` with `r` the light direction mirrored about `n`
fn phong_specular(values: &ShaderValues) -> Vec3 {
    let n = values.normal;
    let l = values.light_dir;
    if n.dot(l) <= 0.0 {
        return Vec3::ZERO;
    }

    let r = 2.0 * n.dot(l) * n - l;
    let highlight = r.dot(values.eye_dir).max(0.0).powf(values.material.specular_exponent());
    values.material.specular_reflectance() * values.light_radiance * highlight
}
