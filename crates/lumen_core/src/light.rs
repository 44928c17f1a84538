use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

/// The scene's single point light and its ambient term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    /// World-space light position
    pub position: Vec3,
    pub radiance: Vec3,
    pub ambient: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radiance: Vec3::splat(0.6),
            ambient: Vec3::splat(0.025),
        }
    }
}
