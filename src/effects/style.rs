//! Default-resolution precedence for blur styling.
//!
//! Every styled property resolves as: explicit property on the effect, then the effect's own
//! [`HazeStyle`], then the ambient (inherited) style, then the engine defaults from
//! [`HazeConfig`](crate::HazeConfig).

use crate::effects::tint::Tint;
use crate::foundation::core::{Color, Dp};
use crate::foundation::error::HazeResult;

/// A reusable bundle of blur styling. Unset fields defer to the next level of precedence.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HazeStyle {
    /// Colour drawn behind the blurred content.
    #[serde(default)]
    pub background_color: Option<Color>,
    /// Tints; an empty list defers.
    #[serde(default)]
    pub tints: Vec<Tint>,
    /// Blur radius.
    #[serde(default)]
    pub blur_radius: Option<Dp>,
    /// Noise factor.
    #[serde(default)]
    pub noise_factor: Option<f32>,
    /// Tint drawn when blurring is unavailable.
    #[serde(default)]
    pub fallback_tint: Tint,
}

impl HazeStyle {
    /// Style with a background colour and a single tint.
    pub fn new(background_color: Color, tint: Tint) -> Self {
        Self {
            background_color: Some(background_color),
            tints: vec![tint],
            ..Self::default()
        }
    }
}

/// Fallback values used when no level of the precedence chain sets a property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StyleDefaults {
    pub(crate) blur_radius: Dp,
    pub(crate) noise_factor: f32,
    pub(crate) tint_alpha: f32,
}

/// Fully resolved styling for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStyle {
    /// Resolved blur radius.
    pub blur_radius: Dp,
    /// Resolved noise factor.
    pub noise_factor: f32,
    /// Resolved tints (possibly empty).
    pub tints: Vec<Tint>,
    /// Resolved fallback tint (possibly unspecified).
    pub fallback_tint: Tint,
    /// Resolved background colour, transparent when unset.
    pub background_color: Color,
}

impl ResolvedStyle {
    /// Tint drawn by the scrim strategy.
    ///
    /// The fallback tint wins when specified; otherwise the first tint is boosted to compensate
    /// for the missing blur. `None` means the scrim has nothing to draw.
    pub fn scrim_tint(&self) -> Option<Tint> {
        if self.fallback_tint.is_specified() {
            return Some(self.fallback_tint.clone());
        }
        self.tints
            .iter()
            .find(|t| t.is_specified())
            .map(|t| t.boosted_for_fallback(self.blur_radius))
    }
}

/// Resolve styling through the precedence chain.
///
/// `explicit` carries properties set directly on the effect. When no tints resolve and a
/// background colour does, a tint is derived from the background colour at the default tint
/// alpha.
pub(crate) fn resolve_style(
    explicit: &HazeStyle,
    style: &HazeStyle,
    ambient: &HazeStyle,
    defaults: &StyleDefaults,
) -> HazeResult<ResolvedStyle> {
    let levels = [explicit, style, ambient];

    let blur_radius = levels
        .iter()
        .find_map(|s| s.blur_radius)
        .unwrap_or(defaults.blur_radius)
        .require_non_negative("blur radius")?;
    let noise_factor = levels
        .iter()
        .find_map(|s| s.noise_factor)
        .unwrap_or(defaults.noise_factor);
    let background_color = levels
        .iter()
        .find_map(|s| s.background_color)
        .unwrap_or(Color::TRANSPARENT);
    let fallback_tint = levels
        .iter()
        .map(|s| &s.fallback_tint)
        .find(|t| t.is_specified())
        .cloned()
        .unwrap_or_default();

    let mut tints = levels
        .iter()
        .map(|s| &s.tints)
        .find(|t| t.iter().any(Tint::is_specified))
        .cloned()
        .unwrap_or_default();
    if tints.is_empty() && background_color.is_visible() {
        tints.push(Tint::color(background_color.with_alpha(defaults.tint_alpha)));
    }

    Ok(ResolvedStyle {
        blur_radius,
        noise_factor,
        tints,
        fallback_tint,
        background_color,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/style.rs"]
mod tests;
