use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::Canvas,
    error::{FigError, FigResult},
};

/// Knobs for one render pass. Every field has a default, so `{}` is a valid
/// settings file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Overrides the root frame's size.
    pub canvas: Option<Canvas>,
    /// Attach the nearest palette token name to every resolved color.
    pub emit_tokens: bool,
    /// Maximum RGB distance for a palette token match.
    pub token_threshold: f64,
    /// Drop unsupported design-export nodes instead of failing the load.
    pub skip_unsupported: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            canvas: None,
            emit_tokens: false,
            token_threshold: crate::tokens::DEFAULT_COLOR_THRESHOLD,
            skip_unsupported: false,
        }
    }
}

impl RenderSettings {
    pub fn from_json_str(s: &str) -> FigResult<Self> {
        let settings: Self = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> FigResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            FigError::Other(anyhow::Error::new(e).context(format!(
                "read settings '{}'",
                path.display()
            )))
        })?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> FigResult<()> {
        if let Some(c) = self.canvas {
            if !crate::foundation::core::is_valid_extent(c.width)
                || !crate::foundation::core::is_valid_extent(c.height)
            {
                return Err(FigError::serde(
                    "settings canvas width/height must be finite and >= 0",
                ));
            }
        }
        if !self.token_threshold.is_finite() || self.token_threshold < 0.0 {
            return Err(FigError::serde(
                "settings token_threshold must be finite and >= 0",
            ));
        }
        Ok(())
    }
}
