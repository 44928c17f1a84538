//! Input contract of the rasterization path.
//!
//! The rasterizer itself lives outside this workspace. What it consumes is
//! one [`DrawItem`] per object: the mesh to draw, a `Pod` uniform block laid
//! out for a std140 uniform buffer and the key of the fixed pipeline program
//! that should shade it.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use lumen_math::{Mat4, Mat4Ext, Vec3};

use crate::light::Lighting;
use crate::material::{Material, ReflectanceSource, ShadingModel};
use crate::mesh::MeshData;
use crate::texture::Texture;

/// Which pipeline program draws an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKey {
    Simple,
    Lambertian,
    Specular,
    Textured,
}

impl ShaderKey {
    pub fn for_material(material: &Material) -> Self {
        match (material.shading(), material.reflectance_source()) {
            (ShadingModel::Simple, _) => ShaderKey::Simple,
            (_, ReflectanceSource::Texture) => ShaderKey::Textured,
            (ShadingModel::Specular, _) => ShaderKey::Specular,
            (ShadingModel::Diffuse, _) => ShaderKey::Lambertian,
        }
    }
}

/// Per-object uniform block. Vectors are padded to vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal_transform: [[f32; 4]; 4],
    /// Eye-space light position
    pub light_position: [f32; 4],
    pub light_radiance: [f32; 4],
    pub ambient: [f32; 4],
    pub surface_reflectance: [f32; 4],
    pub specular_reflectance: [f32; 4],
    pub specular_exponent: f32,
    pub _padding: [f32; 3],
}

/// Interleaved vertex for the raster vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RasterVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

/// Interleave a mesh's attributes for upload.
pub fn vertices(mesh: &MeshData) -> Vec<RasterVertex> {
    mesh.positions()
        .iter()
        .zip(mesh.normals())
        .zip(mesh.texcoords())
        .map(|((p, n), t)| RasterVertex {
            position: p.to_array(),
            normal: n.to_array(),
            texcoord: t.to_array(),
        })
        .collect()
}

/// Everything needed to draw one object.
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    pub mesh: &'a MeshData,
    pub shader: ShaderKey,
    pub texture: Option<&'a Arc<Texture>>,
    pub uniforms: DrawUniforms,
}

impl<'a> DrawItem<'a> {
    pub fn new(
        mesh: &'a MeshData,
        material: &'a Material,
        object_to_world: Mat4,
        world_view: Mat4,
        projection: Mat4,
        lighting: &Lighting,
    ) -> Self {
        let model_view = world_view * object_to_world;
        let light_position = world_view.transform_point3(lighting.position);

        let (specular_exponent, specular_reflectance) = if material.has_specular() {
            (material.specular_exponent(), material.specular_reflectance())
        } else {
            (0.0, Vec3::ZERO)
        };

        let uniforms = DrawUniforms {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal_transform: model_view.normal_matrix().to_cols_array_2d(),
            light_position: light_position.extend(1.0).to_array(),
            light_radiance: lighting.radiance.extend(0.0).to_array(),
            ambient: lighting.ambient.extend(0.0).to_array(),
            surface_reflectance: material.surface_reflectance().extend(1.0).to_array(),
            specular_reflectance: specular_reflectance.extend(0.0).to_array(),
            specular_exponent,
            _padding: [0.0; 3],
        };

        Self {
            mesh,
            shader: ShaderKey::for_material(material),
            texture: material.texture(),
            uniforms,
        }
    }
}
