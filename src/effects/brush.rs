use crate::effects::blend::BlendMode;
use crate::foundation::core::{Color, Point};

/// One colour stop of a gradient brush.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f32,
    /// Stop colour.
    pub color: Color,
}

impl GradientStop {
    /// Build a stop.
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Paint source used by tints, masks and progressive specs.
///
/// Gradient coordinates are in the effect layer's local pixel space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Brush {
    /// Flat colour.
    Solid(Color),
    /// Linear gradient between two points.
    LinearGradient {
        /// Gradient start.
        start: Point,
        /// Gradient end.
        end: Point,
        /// Colour stops, ascending offsets.
        stops: Vec<GradientStop>,
    },
    /// Radial gradient around a centre.
    RadialGradient {
        /// Gradient centre.
        center: Point,
        /// Radius in pixels.
        radius: f64,
        /// Colour stops, ascending offsets.
        stops: Vec<GradientStop>,
    },
    /// Alpha of `source` remapped so that `lower..upper` maps to `0..1`.
    ///
    /// Produced by the multi-layer progressive path to slice a custom brush into intensity bands.
    AlphaBand {
        /// Brush whose alpha is remapped.
        source: Box<Brush>,
        /// Alpha mapped to fully transparent.
        lower: f32,
        /// Alpha mapped to fully opaque.
        upper: f32,
    },
}

impl Brush {
    /// Vertical linear gradient from `start_y` to `end_y`.
    pub fn vertical_gradient(start_y: f64, end_y: f64, stops: Vec<GradientStop>) -> Self {
        Self::LinearGradient {
            start: Point::new(0.0, start_y),
            end: Point::new(0.0, end_y),
            stops,
        }
    }

    /// Copy with every colour's alpha multiplied by `factor`.
    pub fn mul_alpha(&self, factor: f32) -> Self {
        let scale = |stops: &[GradientStop]| {
            stops
                .iter()
                .map(|s| GradientStop::new(s.offset, s.color.mul_alpha(factor)))
                .collect()
        };
        match self {
            Self::Solid(c) => Self::Solid(c.mul_alpha(factor)),
            Self::LinearGradient { start, end, stops } => Self::LinearGradient {
                start: *start,
                end: *end,
                stops: scale(stops),
            },
            Self::RadialGradient {
                center,
                radius,
                stops,
            } => Self::RadialGradient {
                center: *center,
                radius: *radius,
                stops: scale(stops),
            },
            Self::AlphaBand {
                source,
                lower,
                upper,
            } => Self::AlphaBand {
                source: Box::new(source.mul_alpha(factor)),
                lower: *lower,
                upper: *upper,
            },
        }
    }

    /// Copy with geometry scaled by `factor` (input downscaling).
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Self::Solid(c) => Self::Solid(*c),
            Self::LinearGradient { start, end, stops } => Self::LinearGradient {
                start: Point::new(start.x * factor, start.y * factor),
                end: Point::new(end.x * factor, end.y * factor),
                stops: stops.clone(),
            },
            Self::RadialGradient {
                center,
                radius,
                stops,
            } => Self::RadialGradient {
                center: Point::new(center.x * factor, center.y * factor),
                radius: radius * factor,
                stops: stops.clone(),
            },
            Self::AlphaBand {
                source,
                lower,
                upper,
            } => Self::AlphaBand {
                source: Box::new(source.scaled(factor)),
                lower: *lower,
                upper: *upper,
            },
        }
    }

    /// Return `true` when at least one colour of the brush is visible.
    pub fn is_visible(&self) -> bool {
        match self {
            Self::Solid(c) => c.is_visible(),
            Self::LinearGradient { stops, .. } | Self::RadialGradient { stops, .. } => {
                stops.iter().any(|s| s.color.is_visible())
            }
            Self::AlphaBand { source, .. } => source.is_visible(),
        }
    }
}

/// Colour filter applied to an effect input.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ColorFilter {
    /// Blend a flat colour into the input.
    Blend {
        /// Filter colour.
        color: Color,
        /// How the colour combines with the input.
        mode: BlendMode,
    },
    /// Saturation matrix, `1.0` is identity and `0.0` greyscale.
    Saturation(f32),
}

#[cfg(test)]
#[path = "../../tests/unit/effects/brush.rs"]
mod tests;
