//! Lumen Tracer - progressive CPU ray tracing of a small object scene.
//!
//! Geometry lives in a [`GeometryPool`] and is shared by any number of
//! [`Object`]s, each with its own material and transform. A [`Scene`]
//! answers nearest-hit and shadow queries and shades hits recursively;
//! the [`ProgressiveRenderer`] refines an image pass by pass under a time
//! budget, and a [`Session`] drives it from a host event loop.

mod config;
mod geometry;
mod hit;
mod object;
mod output;
mod progressive;
mod quad;
mod scene;
mod session;
mod shading;
mod sphere;
mod triangle_mesh;

pub use config::{IndirectMode, TraceConfig};
pub use geometry::{Geometry, GeometryError, GeometryId, GeometryPool, GeometryResult};
pub use hit::{GeometryHit, HitPayload, HitRecord, SurfaceProperties};
pub use object::Object;
pub use output::{color_to_rgba, linear_to_gamma, save_png, to_rgba, Encoding, OutputError};
pub use progressive::{
    AccumulationBuffer, PixelSampler, ProgressiveRenderer, SceneSampler, TraceState,
};
pub use quad::Quad;
pub use scene::Scene;
pub use session::{IdleOutcome, Motion, Session};
pub use shading::{shade, ShaderValues};
pub use sphere::{Sphere, DEFAULT_SPHERE_LEVELS};
pub use triangle_mesh::TriangleMesh;
