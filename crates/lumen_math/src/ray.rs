use crate::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// A parametric ray `r(t) = origin + t * direction`.
///
/// The direction is not required to be unit length; intersection routines
/// work with whatever scale they are handed (rays transformed into object
/// space generally are not unit length).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray leaving `origin` in a cosine-weighted random direction
    /// about the unit normal `n`.
    pub fn cosine_hemisphere(origin: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Self {
        let mut ray = Self::new(origin, n);
        ray.random_direction(n, rng);
        ray
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Replace the direction with a random unit vector from the hemisphere
    /// centred on the unit normal `n`, distributed proportionally to the
    /// cosine of the angle with `n`.
    pub fn random_direction(&mut self, n: Vec3, rng: &mut dyn RngCore) {
        let (u, v) = tangent_frame(n);

        let phi = 2.0 * PI * gen_f32(rng);
        let r2 = gen_f32(rng);
        let r = r2.sqrt();

        let d = u * (phi.cos() * r) + v * (phi.sin() * r) + n * (1.0 - r2).max(0.0).sqrt();
        self.direction = d.normalize();
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::ZERO,
        }
    }
}

/// Uniform float in [0, 1) from a type-erased generator.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Build two unit tangents completing `n` to an orthonormal frame.
///
/// The helper vector is `n` with its largest-magnitude component swapped into
/// the next slot and negated there, which can never be parallel to `n`.
fn tangent_frame(n: Vec3) -> (Vec3, Vec3) {
    let a = n.abs();
    let i = if a.x >= a.y && a.x >= a.z {
        0
    } else if a.y >= a.z {
        1
    } else {
        2
    };
    let j = (i + 1) % 3;

    let mut t = n.to_array();
    t.swap(i, j);
    t[j] = -t[j];

    let u = n.cross(Vec3::from_array(t)).normalize();
    let v = n.cross(u);
    (u, v)
}
