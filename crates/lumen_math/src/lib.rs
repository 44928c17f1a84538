// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod camera;
mod interval;
mod ray;
mod transform;

pub use camera::{Camera, Projection};
pub use interval::Interval;
pub use ray::{gen_f32, Ray};
pub use transform::{rotate_axis, Mat4Ext, ObjectTransform};
