use crate::effects::blend::BlendMode;
use crate::effects::brush::{Brush, ColorFilter};
use crate::foundation::core::{Color, Dp};

/// Blur radius at which a fallback scrim is considered close to opaque.
const FALLBACK_OPAQUE_RADIUS_DP: f32 = 72.0;

/// A colour or brush drawn over the blurred content.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Tint {
    /// No tint.
    #[default]
    Unspecified,
    /// Flat colour tint.
    Color {
        /// Tint colour.
        color: Color,
        /// Blend mode against the blurred content.
        blend_mode: BlendMode,
    },
    /// Brush tint with an optional colour filter.
    Brush {
        /// Tint brush.
        brush: Brush,
        /// Blend mode against the blurred content.
        blend_mode: BlendMode,
        /// Filter applied to the brush before blending.
        color_filter: Option<ColorFilter>,
    },
}

impl Tint {
    /// Flat colour tint drawn with [`BlendMode::SrcOver`].
    pub fn color(color: Color) -> Self {
        Self::Color {
            color,
            blend_mode: BlendMode::SrcOver,
        }
    }

    /// Brush tint drawn with [`BlendMode::SrcOver`].
    pub fn brush(brush: Brush) -> Self {
        Self::Brush {
            brush,
            blend_mode: BlendMode::SrcOver,
            color_filter: None,
        }
    }

    /// Copy with a different blend mode. `Unspecified` stays unspecified.
    pub fn with_blend_mode(self, mode: BlendMode) -> Self {
        match self {
            Self::Unspecified => Self::Unspecified,
            Self::Color { color, .. } => Self::Color {
                color,
                blend_mode: mode,
            },
            Self::Brush {
                brush,
                color_filter,
                ..
            } => Self::Brush {
                brush,
                blend_mode: mode,
                color_filter,
            },
        }
    }

    /// Return `true` when this tint draws anything.
    pub fn is_specified(&self) -> bool {
        match self {
            Self::Unspecified => false,
            Self::Color { color, .. } => color.is_visible(),
            Self::Brush { brush, .. } => brush.is_visible(),
        }
    }

    /// Blend mode of a specified tint.
    pub fn blend_mode(&self) -> BlendMode {
        match self {
            Self::Unspecified => BlendMode::SrcOver,
            Self::Color { blend_mode, .. } | Self::Brush { blend_mode, .. } => *blend_mode,
        }
    }

    /// Copy with alpha multiplied by `factor` (progressive intensity, global alpha).
    pub fn mul_alpha(&self, factor: f32) -> Self {
        match self {
            Self::Unspecified => Self::Unspecified,
            Self::Color { color, blend_mode } => Self::Color {
                color: color.mul_alpha(factor),
                blend_mode: *blend_mode,
            },
            Self::Brush {
                brush,
                blend_mode,
                color_filter,
            } => Self::Brush {
                brush: brush.mul_alpha(factor),
                blend_mode: *blend_mode,
                color_filter: *color_filter,
            },
        }
    }

    /// Boost a colour tint for drawing as a scrim when no blur is available.
    ///
    /// Alpha grows linearly with the blur radius, reaching `2x` at 72dp, and is capped at `1.0`.
    /// Brush tints cannot be boosted and are returned unchanged.
    pub fn boosted_for_fallback(&self, blur_radius: Dp) -> Self {
        match self {
            Self::Color { color, blend_mode } => {
                let factor = 1.0 + blur_radius.value().max(0.0) / FALLBACK_OPAQUE_RADIUS_DP;
                Self::Color {
                    color: color.with_alpha((color.a * factor).min(1.0)),
                    blend_mode: *blend_mode,
                }
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/tint.rs"]
mod tests;
