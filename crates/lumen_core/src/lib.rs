//! Lumen Core - scene resources shared by the rasterizer and the ray tracer.
//!
//! This crate provides:
//!
//! - **Materials**: shading model, constant or textured reflectance, Phong
//!   specular lobe and mirror settings
//! - **Textures**: decoding through `image` and an `Arc`-sharing cache
//! - **Meshes**: validated indexed triangle data, built-in unit models and
//!   OBJ loading
//! - **Raster contract**: per-object draw items with `Pod` uniform blocks

pub mod light;
pub mod material;
pub mod mesh;
pub mod raster;
pub mod texture;

// Re-export commonly used types
pub use light::Lighting;
pub use material::{Material, ReflectanceSource, ShadingModel};
pub use mesh::{MeshData, MeshError, MeshResult};
pub use raster::{DrawItem, DrawUniforms, RasterVertex, ShaderKey};
pub use texture::{
    Texture, TextureCache, TextureError, TextureFilter, TextureResult, WrapMode,
};
