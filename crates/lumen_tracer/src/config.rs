//! Ray tracing settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the single indirect bounce is turned into radiance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndirectMode {
    /// Run the surface's shading model again with the bounce direction and
    /// radiance standing in for the light.
    #[default]
    Legacy,
    /// Reflectance times incoming radiance: the cosine and 1/pi of the
    /// Lambertian BRDF cancel against the cosine-weighted sampling pdf.
    Unbiased,
}

/// Settings for the progressive ray tracer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Recursion depth of mirror and indirect rays
    pub max_depth: u32,
    /// Number of passes after which refinement stops
    pub max_passes: u32,
    /// Wall-clock budget of one renderer slice, in milliseconds
    pub slice_budget_ms: u64,
    /// Offset that keeps secondary rays off their own surface
    pub epsilon: f32,
    pub indirect: IndirectMode,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_passes: 500,
            slice_budget_ms: 100,
            epsilon: 0.001,
            indirect: IndirectMode::Legacy,
        }
    }
}

impl TraceConfig {
    pub fn slice_budget(&self) -> Duration {
        Duration::from_millis(self.slice_budget_ms)
    }
}
