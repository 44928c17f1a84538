//! Surface materials shared by the rasterizer and the ray tracer.

use std::sync::Arc;

use lumen_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::texture::Texture;

/// How a surface point is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingModel {
    /// Surface reflectance returned as is, no lighting.
    Simple,
    /// Lambertian plus ambient.
    #[default]
    Diffuse,
    /// Lambertian plus a Phong specular lobe.
    Specular,
}

/// Where the Lambertian reflectance comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectanceSource {
    Constant,
    Texture,
}

/// Material properties of an object.
///
/// Cloning is cheap: the texture is shared through `Arc` and owned by the
/// caller (usually a [`crate::TextureCache`]).
#[derive(Debug, Clone)]
pub struct Material {
    shading: ShadingModel,
    surface_reflectance: Vec3,
    texture: Option<Arc<Texture>>,

    /// Specular lobe is disabled when <= 0
    specular_exponent: f32,
    specular_reflectance: Vec3,

    mirror: bool,
    mirror_reflectance: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shading: ShadingModel::Diffuse,
            surface_reflectance: Vec3::ONE,
            texture: None,
            specular_exponent: 0.0,
            specular_reflectance: Vec3::ONE,
            mirror: false,
            mirror_reflectance: Vec3::ONE,
        }
    }
}

impl Material {
    /// Diffuse material with a constant reflectance.
    pub fn diffuse(reflectance: Vec3) -> Self {
        Self {
            surface_reflectance: reflectance,
            ..Default::default()
        }
    }

    /// Diffuse material reading its reflectance from a texture.
    pub fn textured(texture: Arc<Texture>) -> Self {
        Self {
            texture: Some(texture),
            ..Default::default()
        }
    }

    /// Set the shading model (builder pattern)
    pub fn with_shading(mut self, shading: ShadingModel) -> Self {
        self.shading = shading;
        self
    }

    /// Add a Phong lobe and switch to the specular model (builder pattern)
    pub fn with_specular(mut self, exponent: f32, reflectance: Vec3) -> Self {
        self.specular_exponent = exponent;
        self.specular_reflectance = reflectance;
        self.shading = ShadingModel::Specular;
        self
    }

    /// Make the surface a mirror (builder pattern)
    pub fn with_mirror(mut self, reflectance: Vec3) -> Self {
        self.mirror = true;
        self.mirror_reflectance = reflectance;
        self
    }

    /// Set a constant reflectance; drops any texture.
    pub fn set_surface_reflectance(&mut self, reflectance: Vec3) {
        self.surface_reflectance = reflectance;
        self.texture = None;
    }

    /// Use a texture for reflectance, or `None` to go back to the constant.
    pub fn set_texture(&mut self, texture: Option<Arc<Texture>>) {
        self.texture = texture;
    }

    pub fn set_shading(&mut self, shading: ShadingModel) {
        self.shading = shading;
    }

    /// A value <= 0 turns the specular lobe off.
    pub fn set_specular_exponent(&mut self, exponent: f32) {
        self.specular_exponent = exponent;
    }

    pub fn set_specular_reflectance(&mut self, reflectance: Vec3) {
        self.specular_reflectance = reflectance;
    }

    pub fn set_mirror(&mut self, mirror: bool) {
        self.mirror = mirror;
    }

    pub fn set_mirror_reflectance(&mut self, reflectance: Vec3) {
        self.mirror_reflectance = reflectance;
    }

    /// The model actually used for shading: `Specular` without a positive
    /// exponent degrades to `Diffuse`.
    pub fn shading(&self) -> ShadingModel {
        match self.shading {
            ShadingModel::Specular if !self.has_specular() => ShadingModel::Diffuse,
            model => model,
        }
    }

    pub fn reflectance_source(&self) -> ReflectanceSource {
        if self.texture.is_some() {
            ReflectanceSource::Texture
        } else {
            ReflectanceSource::Constant
        }
    }

    /// Lambertian reflectance at the given texture coordinates.
    pub fn reflectance_at(&self, uv: Vec2) -> Vec3 {
        match &self.texture {
            Some(texture) => texture.lookup(uv),
            None => self.surface_reflectance,
        }
    }

    pub fn surface_reflectance(&self) -> Vec3 {
        self.surface_reflectance
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    pub fn has_specular(&self) -> bool {
        self.specular_exponent > 0.0
    }

    pub fn specular_exponent(&self) -> f32 {
        self.specular_exponent
    }

    pub fn specular_reflectance(&self) -> Vec3 {
        self.specular_reflectance
    }

    pub fn is_mirror(&self) -> bool {
        self.mirror
    }

    pub fn mirror_reflectance(&self) -> Vec3 {
        self.mirror_reflectance
    }
}
