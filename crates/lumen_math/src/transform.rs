// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); this adds the pieces needed to carry rays and normals between
// object and world space.

use glam::{Mat3, Mat4, Vec3};

/// Extension trait for Mat4 with normal-transform helpers.
pub trait Mat4Ext {
    /// The matrix that carries surface normals: transpose of the inverse.
    fn normal_matrix(&self) -> Mat4;

    /// Transform a normal (w = 0) and renormalize it.
    fn transform_normal(&self, normal: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn normal_matrix(&self) -> Mat4 {
        self.inverse().transpose()
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.transform_vector3(normal).normalize()
    }
}

/// Rotation by `angle` radians about the unit `axis` (Rodrigues' formula).
///
/// `R = cos(a) I + sin(a) [k]x + (1 - cos(a)) k k^T`
pub fn rotate_axis(angle: f32, axis: Vec3) -> Mat3 {
    let k = axis;
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;

    // Columns of R
    Mat3::from_cols(
        Vec3::new(c + t * k.x * k.x, t * k.x * k.y + s * k.z, t * k.x * k.z - s * k.y),
        Vec3::new(t * k.x * k.y - s * k.z, c + t * k.y * k.y, t * k.y * k.z + s * k.x),
        Vec3::new(t * k.x * k.z + s * k.y, t * k.y * k.z - s * k.x, c + t * k.z * k.z),
    )
}

/// Object <-> world placement.
///
/// Holds the object-to-world matrix together with its inverse and the
/// normal transform. All three are only ever written together, so they
/// cannot drift out of sync.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    object_to_world: Mat4,
    world_to_object: Mat4,
    normal_to_world: Mat4,
}

impl ObjectTransform {
    /// Build the transform triple from an affine object-to-world matrix.
    pub fn new(object_to_world: Mat4) -> Self {
        let world_to_object = object_to_world.inverse();
        Self {
            object_to_world,
            world_to_object,
            normal_to_world: world_to_object.transpose(),
        }
    }

    /// Replace the placement, recomputing the derived matrices.
    pub fn set(&mut self, object_to_world: Mat4) {
        *self = Self::new(object_to_world);
    }

    pub fn object_to_world(&self) -> Mat4 {
        self.object_to_world
    }

    pub fn world_to_object(&self) -> Mat4 {
        self.world_to_object
    }

    pub fn normal_to_world(&self) -> Mat4 {
        self.normal_to_world
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}
