use crate::foundation::core::Dp;
use crate::foundation::error::{HazeError, HazeResult};
use crate::render::surface_pool::SurfacePoolOpts;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Engine-wide defaults and limits.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HazeConfig {
    /// Realized filter graphs kept per effect.
    pub cache_capacity: usize,
    /// Height of one band of the multi-layer progressive path.
    pub progressive_step_height: Dp,
    /// Blur radius used when no style sets one.
    pub default_blur_radius: Dp,
    /// Noise factor used when no style sets one.
    pub default_noise_factor: f32,
    /// Alpha of the tint derived from the background colour.
    pub default_tint_alpha: f32,
    /// Input scale picked by [`crate::InputScale::Auto`] on the multi-layer progressive path.
    pub auto_input_scale: f32,
    /// Offscreen layer pool limits.
    pub surface_pool: SurfacePoolOpts,
    /// Largest blur radius the software path computes, in pixels.
    pub software_blur_max_radius: f32,
}

impl Default for HazeConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 10,
            progressive_step_height: Dp(64.0),
            default_blur_radius: Dp(20.0),
            default_noise_factor: 0.15,
            default_tint_alpha: 0.7,
            auto_input_scale: 1.0 / 3.0,
            surface_pool: SurfacePoolOpts::default(),
            software_blur_max_radius: 25.0,
        }
    }
}

impl HazeConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json_str(s: &str) -> HazeResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| HazeError::serde(format!("parse haze config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> HazeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            HazeError::config(format!("open haze config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            HazeError::serde(format!("parse haze config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check ranges.
    pub fn validate(&self) -> HazeResult<()> {
        if self.cache_capacity == 0 {
            return Err(HazeError::config("cache_capacity must be > 0"));
        }
        let step = self.progressive_step_height.value();
        if !step.is_finite() || step <= 0.0 {
            return Err(HazeError::config("progressive_step_height must be > 0"));
        }
        let radius = self.default_blur_radius.value();
        if !radius.is_finite() || radius < 0.0 {
            return Err(HazeError::config("default_blur_radius must be >= 0"));
        }
        for (name, v) in [
            ("default_noise_factor", self.default_noise_factor),
            ("default_tint_alpha", self.default_tint_alpha),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(HazeError::config(format!("{name} must be in [0, 1], got {v}")));
            }
        }
        if !(self.auto_input_scale > 0.0 && self.auto_input_scale <= 1.0) {
            return Err(HazeError::config("auto_input_scale must be in (0, 1]"));
        }
        if self.surface_pool.max_surfaces == 0 {
            return Err(HazeError::config("surface_pool.max_surfaces must be > 0"));
        }
        if !self.software_blur_max_radius.is_finite() || self.software_blur_max_radius <= 0.0 {
            return Err(HazeError::config("software_blur_max_radius must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
