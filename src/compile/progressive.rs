//! Progressive blur planning.
//!
//! A progressive spec is drawn one of three ways: a runtime shader evaluating the gradient per
//! pixel, a stack of uniformly blurred layers with banded masks, or a single blur under a static
//! alpha mask.

use crate::effects::brush::{Brush, GradientStop};
use crate::effects::params::EffectParameters;
use crate::effects::progressive::ProgressiveSpec;
use crate::foundation::core::{Color, Dp, Size};
use crate::foundation::math::lerp;

/// Half-width of a layer's mask band, in steps.
const BAND_HALF_STEPS: f32 = 2.0;

/// One uniformly blurred layer of a multi-layer progressive blur.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressiveLayer {
    /// Fraction of the full blur radius drawn by this layer.
    pub intensity: f32,
    /// Alpha band limiting where the layer shows; `None` covers the whole layer.
    pub mask: Option<Brush>,
}

/// How a progressive spec will be drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressivePlan {
    /// A runtime blur shader evaluates the gradient directly.
    Shader,
    /// Layers in draw order, bottom first.
    MultiLayer(Vec<ProgressiveLayer>),
    /// One blur under a static alpha mask.
    Mask(Brush),
}

impl ProgressivePlan {
    /// Return `true` for the multi-layer approximation.
    pub fn is_multi_layer(&self) -> bool {
        matches!(self, Self::MultiLayer(_))
    }

    /// Expand `params` into the parameter sets to draw, bottom first.
    ///
    /// Only the shader plan keeps the progressive spec; every other plan rewrites it into masks.
    pub fn expand(&self, params: &EffectParameters) -> Vec<EffectParameters> {
        match self {
            Self::Shader => vec![params.clone()],
            Self::Mask(brush) => vec![EffectParameters {
                progressive: None,
                mask: Some(brush.clone()),
                ..params.clone()
            }],
            Self::MultiLayer(layers) => layers
                .iter()
                .map(|layer| EffectParameters {
                    blur_radius: Dp(params.blur_radius.value() * layer.intensity),
                    noise_factor: params.noise_factor * layer.intensity,
                    tint_alpha_modulate: params.tint_alpha_modulate * layer.intensity,
                    progressive: None,
                    mask: layer.mask.clone(),
                    ..params.clone()
                })
                .collect(),
        }
    }
}

/// Choose how to draw `spec`.
///
/// With a runtime shader, gradients are evaluated per pixel. Without one, linear gradients are
/// approximated with stepped layers (or a static mask when `prefer_performance` is set), radial
/// gradients fall back to a static mask, and custom brushes are sliced into layers by alpha.
#[tracing::instrument(level = "debug", skip(spec))]
pub fn plan_progressive(
    spec: &ProgressiveSpec,
    runtime_shader: bool,
    layer_size: Size,
    step_height_px: f32,
) -> ProgressivePlan {
    match spec {
        ProgressiveSpec::LinearGradient { .. } | ProgressiveSpec::RadialGradient { .. }
            if runtime_shader =>
        {
            ProgressivePlan::Shader
        }
        ProgressiveSpec::LinearGradient {
            start,
            end,
            start_intensity,
            end_intensity,
            easing,
            prefer_performance,
        } => {
            if *prefer_performance {
                return ProgressivePlan::Mask(spec.as_mask_brush(layer_size));
            }
            let (start, end) = ProgressiveSpec::resolve_linear(*start, *end, layer_size);
            let length = (end - start).hypot() as f32;
            let steps = step_count(length, step_height_px);
            let ascending = end_intensity >= start_intensity;

            let band = |i: usize| {
                let (lower, upper) = band_bounds(i, steps);
                let (c0, c1) = if ascending {
                    (Color::TRANSPARENT, Color::BLACK)
                } else {
                    (Color::BLACK, Color::TRANSPARENT)
                };
                Brush::LinearGradient {
                    start,
                    end,
                    stops: vec![GradientStop::new(lower, c0), GradientStop::new(upper, c1)],
                }
            };
            let intensity = |i: usize| {
                lerp(
                    *start_intensity,
                    *end_intensity,
                    easing.apply(i as f32 / steps as f32),
                )
            };

            let order: Vec<usize> = if ascending {
                (0..=steps).collect()
            } else {
                (0..=steps).rev().collect()
            };
            ProgressivePlan::MultiLayer(layers_in_order(&order, intensity, band))
        }
        ProgressiveSpec::RadialGradient { .. } => {
            ProgressivePlan::Mask(spec.as_mask_brush(layer_size))
        }
        ProgressiveSpec::CustomBrush(brush) => {
            let extent = layer_size.width.max(layer_size.height) as f32;
            let steps = step_count(extent, step_height_px);
            let order: Vec<usize> = (0..=steps).collect();
            let band = |i: usize| {
                let (lower, upper) = band_bounds(i, steps);
                Brush::AlphaBand {
                    source: Box::new(brush.clone()),
                    lower,
                    upper,
                }
            };
            ProgressivePlan::MultiLayer(layers_in_order(
                &order,
                |i| i as f32 / steps as f32,
                band,
            ))
        }
    }
}

fn step_count(length_px: f32, step_height_px: f32) -> usize {
    if step_height_px.is_nan() || step_height_px <= 0.0 || !length_px.is_finite() {
        return 2;
    }
    ((length_px / step_height_px).ceil() as usize).max(2)
}

/// Band of layer `i`, four steps wide and centred on the layer's own step, clamped to `[0, 1]`.
fn band_bounds(i: usize, steps: usize) -> (f32, f32) {
    let s = steps as f32;
    let i = i as f32;
    (
        ((i - BAND_HALF_STEPS) / s).clamp(0.0, 1.0),
        ((i + BAND_HALF_STEPS) / s).clamp(0.0, 1.0),
    )
}

fn layers_in_order(
    order: &[usize],
    intensity: impl Fn(usize) -> f32,
    band: impl Fn(usize) -> Brush,
) -> Vec<ProgressiveLayer> {
    order
        .iter()
        .enumerate()
        .map(|(n, &i)| ProgressiveLayer {
            intensity: intensity(i),
            // The bottom layer is the base everything else fades over.
            mask: (n > 0).then(|| band(i)),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/compile/progressive.rs"]
mod tests;
