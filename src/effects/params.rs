use crate::effects::blend::TileMode;
use crate::effects::brush::Brush;
use crate::effects::progressive::ProgressiveSpec;
use crate::effects::tint::Tint;
use crate::foundation::core::{Dp, RoundedRect, Size, Vec2};
use crate::foundation::error::{HazeError, HazeResult};
use crate::foundation::math::clamp_unit;

/// Noise factors below this threshold are not drawn.
pub const NOISE_THRESHOLD: f32 = 0.005;

/// How the blurred output treats its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum EdgeTreatment {
    /// Clip to the layer bounds; edge pixels are clamped.
    #[default]
    Rectangle,
    /// Clip to a rounded shape in layer coordinates; edge pixels are clamped.
    Shape(RoundedRect),
    /// No clip; pixels outside the input are transparent.
    Unbounded,
}

impl EdgeTreatment {
    /// Tile mode the blur stage uses for this treatment.
    pub fn tile_mode(&self) -> TileMode {
        match self {
            Self::Rectangle | Self::Shape(_) => TileMode::Clamp,
            Self::Unbounded => TileMode::Decal,
        }
    }

    /// Return `true` when the composite must be clipped.
    pub fn is_bounded(&self) -> bool {
        !matches!(self, Self::Unbounded)
    }
}

/// Every effect-tunable input of the blur effect.
///
/// Two normalized parameter sets that compare equal produce identical filter graphs, so this type
/// (together with the resolved geometry) is the render-effect cache key.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectParameters {
    /// Blur radius. Must be `>= 0`.
    pub blur_radius: Dp,
    /// Noise overlay strength, clamped to `[0, 1]`.
    pub noise_factor: f32,
    /// Tints drawn in order; later tints draw on top.
    pub tints: Vec<Tint>,
    /// Static alpha mask.
    pub mask: Option<Brush>,
    /// Progressive (gradient) blur descriptor.
    pub progressive: Option<ProgressiveSpec>,
    /// Multiplier applied to tint alpha, clamped to `[0, 1]`.
    pub tint_alpha_modulate: f32,
    /// Size of the content being blurred, in pixels.
    pub content_size: Size,
    /// Offset of the effect layer relative to the recorded content, in pixels.
    pub content_offset: Vec2,
    /// Input scale factor in `(0, 1]`.
    pub scale: f32,
    /// Blur tile mode.
    pub blur_tile_mode: TileMode,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            blur_radius: Dp::ZERO,
            noise_factor: 0.0,
            tints: Vec::new(),
            mask: None,
            progressive: None,
            tint_alpha_modulate: 1.0,
            content_size: Size::ZERO,
            content_offset: Vec2::ZERO,
            scale: 1.0,
            blur_tile_mode: TileMode::Clamp,
        }
    }
}

impl EffectParameters {
    /// Parameters with the given blur radius and everything else at its default.
    pub fn new(blur_radius: Dp) -> Self {
        Self {
            blur_radius,
            ..Self::default()
        }
    }

    /// Set the noise factor.
    pub fn with_noise_factor(mut self, noise_factor: f32) -> Self {
        self.noise_factor = noise_factor;
        self
    }

    /// Append a tint.
    pub fn with_tint(mut self, tint: Tint) -> Self {
        self.tints.push(tint);
        self
    }

    /// Replace the tint list.
    pub fn with_tints(mut self, tints: Vec<Tint>) -> Self {
        self.tints = tints;
        self
    }

    /// Set the static mask.
    pub fn with_mask(mut self, mask: Option<Brush>) -> Self {
        self.mask = mask;
        self
    }

    /// Set the progressive descriptor.
    pub fn with_progressive(mut self, progressive: Option<ProgressiveSpec>) -> Self {
        self.progressive = progressive;
        self
    }

    /// Set the tint alpha multiplier.
    pub fn with_tint_alpha_modulate(mut self, modulate: f32) -> Self {
        self.tint_alpha_modulate = modulate;
        self
    }

    /// Set the content size.
    pub fn with_content_size(mut self, size: Size) -> Self {
        self.content_size = size;
        self
    }

    /// Set the content offset.
    pub fn with_content_offset(mut self, offset: Vec2) -> Self {
        self.content_offset = offset;
        self
    }

    /// Set the input scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the blur tile mode.
    pub fn with_tile_mode(mut self, mode: TileMode) -> Self {
        self.blur_tile_mode = mode;
        self
    }

    /// Validate preconditions and clamp soft ranges.
    ///
    /// A negative or non-finite blur radius, a non-positive scale and out-of-range progressive
    /// intensities are errors. Noise factor and tint alpha modulation are clamped into `[0, 1]`.
    /// Unspecified tints are dropped.
    pub fn normalized(mut self) -> HazeResult<Self> {
        self.blur_radius = self.blur_radius.require_non_negative("blur radius")?;
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(HazeError::precondition(format!(
                "input scale must be > 0, got {}",
                self.scale
            )));
        }
        if let Some(p) = &self.progressive {
            p.validate()?;
        }
        self.noise_factor = clamp_unit(self.noise_factor);
        self.tint_alpha_modulate = clamp_unit(self.tint_alpha_modulate);
        self.tints.retain(Tint::is_specified);
        Ok(self)
    }

    /// Return `true` when the noise stage is drawn.
    pub fn has_noise(&self) -> bool {
        self.noise_factor >= NOISE_THRESHOLD
    }

    /// Return `true` when the graph would be a pure passthrough.
    ///
    /// Tints count only if they stay visible after alpha modulation.
    pub fn is_identity(&self) -> bool {
        let modulate = clamp_unit(self.tint_alpha_modulate);
        self.blur_radius.value() <= 0.0
            && !self.has_noise()
            && self.mask.is_none()
            && self.progressive.is_none()
            && !self.tints.iter().any(|t| t.mul_alpha(modulate).is_specified())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/params.rs"]
mod tests;
