//! Viewer settings loaded from JSON.

use std::path::Path;

use anyhow::{Context, Result};
use lumen_core::Lighting;
use lumen_tracer::{Encoding, TraceConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub trace: TraceConfig,
    pub encoding: Encoding,
    /// Subdivision levels of the sphere raster mesh
    pub sphere_levels: u32,
    /// Replaces the demo room's light when present
    pub lighting: Option<Lighting>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trace: TraceConfig::default(),
            encoding: Encoding::Gamma,
            sphere_levels: 3,
            lighting: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_tracer::IndirectMode;

    #[test]
    fn test_partial_settings() {
        let json = r#"{
            "trace": { "max_passes": 16, "indirect": "unbiased" },
            "encoding": "linear",
            "lighting": { "radiance": [2.0, 2.0, 2.0] }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.trace.max_passes, 16);
        assert_eq!(settings.trace.max_depth, 2);
        assert_eq!(settings.trace.indirect, IndirectMode::Unbiased);
        assert_eq!(settings.encoding, Encoding::Linear);
        assert_eq!(settings.sphere_levels, 3);

        let lighting = settings.lighting.unwrap();
        assert_eq!(lighting.radiance.x, 2.0);
        assert_eq!(lighting.ambient, Lighting::default().ambient);
    }

    #[test]
    fn test_empty_settings() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
