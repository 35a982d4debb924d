use crate::effects::blend::TileMode;
use crate::effects::params::EffectParameters;
use crate::effects::tint::Tint;
use crate::foundation::core::{Dp, Point, RoundedRectRadii, Size, Vec2};
use crate::foundation::error::{HazeError, HazeResult};
use crate::foundation::math::clamp_unit;

/// Outline of a liquid-glass panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum GlassShape {
    /// Sharp rectangle.
    #[default]
    Rectangle,
    /// Rounded rectangle with per-corner radii in pixels.
    RoundedRectangle(RoundedRectRadii),
    /// Circle / capsule inscribed in the layer.
    Capsule,
}

/// Configuration of the liquid-glass refraction effect.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiquidGlassParameters {
    /// How strongly content bends at the glass edge, `[0, 1]`.
    pub refraction_strength: f32,
    /// Specular highlight intensity, `[0, 1]`.
    pub specular_intensity: f32,
    /// Perceived thickness of the glass, `[0, 1]`.
    pub depth: f32,
    /// How much the glass picks up ambient colour, `[0, 1]`.
    pub ambient_response: f32,
    /// Tint drawn over the refracted content.
    pub tint: Tint,
    /// Width of the refracting rim.
    pub edge_softness: Dp,
    /// Light source in layer pixels, `None` for the top-left corner.
    pub light_position: Option<Point>,
    /// Frost blur applied before refraction.
    pub blur_radius: Dp,
    /// Colour fringing at the rim, `[0, 1]`.
    pub chromatic_aberration: f32,
    /// Panel outline.
    pub shape: GlassShape,
    /// Size of the content being refracted, in pixels.
    pub content_size: Size,
    /// Offset of the effect layer relative to the recorded content, in pixels.
    pub content_offset: Vec2,
    /// Input scale factor in `(0, 1]`.
    pub scale: f32,
}

impl Default for LiquidGlassParameters {
    fn default() -> Self {
        Self {
            refraction_strength: 0.7,
            specular_intensity: 0.4,
            depth: 0.4,
            ambient_response: 0.5,
            tint: Tint::Unspecified,
            edge_softness: Dp(12.0),
            light_position: None,
            blur_radius: Dp(4.0),
            chromatic_aberration: 0.0,
            shape: GlassShape::Rectangle,
            content_size: Size::ZERO,
            content_offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl LiquidGlassParameters {
    /// Validate preconditions and clamp soft ranges.
    pub fn normalized(mut self) -> HazeResult<Self> {
        self.blur_radius = self.blur_radius.require_non_negative("liquid glass blur radius")?;
        self.edge_softness = self.edge_softness.require_non_negative("edge softness")?;
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(HazeError::precondition(format!(
                "input scale must be > 0, got {}",
                self.scale
            )));
        }
        self.refraction_strength = clamp_unit(self.refraction_strength);
        self.specular_intensity = clamp_unit(self.specular_intensity);
        self.depth = clamp_unit(self.depth);
        self.ambient_response = clamp_unit(self.ambient_response);
        self.chromatic_aberration = clamp_unit(self.chromatic_aberration);
        Ok(self)
    }

    /// Frosted blur used when no runtime shader can evaluate the refraction.
    pub fn frosted_fallback(&self) -> EffectParameters {
        let tints = if self.tint.is_specified() {
            vec![self.tint.clone()]
        } else {
            Vec::new()
        };
        EffectParameters {
            blur_radius: self.blur_radius,
            tints,
            content_size: self.content_size,
            content_offset: self.content_offset,
            scale: self.scale,
            blur_tile_mode: TileMode::Clamp,
            ..EffectParameters::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/liquid_glass.rs"]
mod tests;
