use crate::effects::brush::{Brush, GradientStop};
use crate::foundation::core::{Color, Point, Size};
use crate::foundation::error::{HazeError, HazeResult};
use crate::foundation::math::lerp;

/// Number of colour stops used when a progressive spec is flattened into an alpha brush.
pub(crate) const MASK_BRUSH_STOPS: usize = 20;

/// Easing curves mapping normalized gradient progress to intensity progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Easing {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Easing {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }

    pub(crate) fn tag(self) -> u8 {
        self as u8
    }
}

/// Spatially varying blur intensity.
///
/// Points are in the effect layer's local pixel space. Infinite coordinates resolve to the layer's
/// far edge, so `Point::new(0.0, f64::INFINITY)` means "bottom of the layer".
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ProgressiveSpec {
    /// Intensity varies along the line from `start` to `end`.
    LinearGradient {
        /// Gradient start.
        start: Point,
        /// Gradient end.
        end: Point,
        /// Intensity at `start`, in `[0, 1]`.
        start_intensity: f32,
        /// Intensity at `end`, in `[0, 1]`.
        end_intensity: f32,
        /// Easing between the two intensities.
        easing: Easing,
        /// Prefer a cheap static mask over the multi-layer approximation when shaders are
        /// unavailable.
        prefer_performance: bool,
    },
    /// Intensity varies with the distance from `center`.
    RadialGradient {
        /// Centre, `None` for the layer centre.
        center: Option<Point>,
        /// Radius in pixels, infinite for half the layer's smaller dimension.
        radius: f64,
        /// Intensity at the centre, in `[0, 1]`.
        center_intensity: f32,
        /// Intensity at `radius`, in `[0, 1]`.
        radius_intensity: f32,
        /// Easing between the two intensities.
        easing: Easing,
    },
    /// Arbitrary brush whose alpha is the blur intensity.
    CustomBrush(Brush),
}

impl ProgressiveSpec {
    /// Validated linear gradient.
    pub fn linear_gradient(
        start: Point,
        start_intensity: f32,
        end: Point,
        end_intensity: f32,
        easing: Easing,
    ) -> HazeResult<Self> {
        let spec = Self::LinearGradient {
            start,
            end,
            start_intensity,
            end_intensity,
            easing,
            prefer_performance: false,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Validated top-to-bottom gradient between `start_y` and `end_y`.
    pub fn vertical_gradient(
        easing: Easing,
        start_y: f64,
        start_intensity: f32,
        end_y: f64,
        end_intensity: f32,
    ) -> HazeResult<Self> {
        Self::linear_gradient(
            Point::new(0.0, start_y),
            start_intensity,
            Point::new(0.0, end_y),
            end_intensity,
            easing,
        )
    }

    /// Validated left-to-right gradient between `start_x` and `end_x`.
    pub fn horizontal_gradient(
        easing: Easing,
        start_x: f64,
        start_intensity: f32,
        end_x: f64,
        end_intensity: f32,
    ) -> HazeResult<Self> {
        Self::linear_gradient(
            Point::new(start_x, 0.0),
            start_intensity,
            Point::new(end_x, 0.0),
            end_intensity,
            easing,
        )
    }

    /// Validated radial gradient.
    pub fn radial_gradient(
        center: Option<Point>,
        center_intensity: f32,
        radius: f64,
        radius_intensity: f32,
        easing: Easing,
    ) -> HazeResult<Self> {
        let spec = Self::RadialGradient {
            center,
            radius,
            center_intensity,
            radius_intensity,
            easing,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Copy of a linear gradient with `prefer_performance` set. Other variants are unchanged.
    pub fn prefer_performance(self, prefer: bool) -> Self {
        match self {
            Self::LinearGradient {
                start,
                end,
                start_intensity,
                end_intensity,
                easing,
                ..
            } => Self::LinearGradient {
                start,
                end,
                start_intensity,
                end_intensity,
                easing,
                prefer_performance: prefer,
            },
            other => other,
        }
    }

    /// Check intensity preconditions. Out-of-range intensities are never clamped.
    pub fn validate(&self) -> HazeResult<()> {
        fn check(name: &str, v: f32) -> HazeResult<()> {
            if !(0.0..=1.0).contains(&v) {
                return Err(HazeError::precondition(format!(
                    "progressive {name} must be in [0, 1], got {v}"
                )));
            }
            Ok(())
        }

        match self {
            Self::LinearGradient {
                start_intensity,
                end_intensity,
                ..
            } => {
                check("start_intensity", *start_intensity)?;
                check("end_intensity", *end_intensity)
            }
            Self::RadialGradient {
                center_intensity,
                radius_intensity,
                radius,
                ..
            } => {
                check("center_intensity", *center_intensity)?;
                check("radius_intensity", *radius_intensity)?;
                if radius.is_nan() || *radius <= 0.0 {
                    return Err(HazeError::precondition(
                        "progressive radius must be > 0",
                    ));
                }
                Ok(())
            }
            Self::CustomBrush(_) => Ok(()),
        }
    }

    /// Largest intensity anywhere in the gradient.
    pub fn max_intensity(&self) -> f32 {
        match self {
            Self::LinearGradient {
                start_intensity,
                end_intensity,
                ..
            } => start_intensity.max(*end_intensity),
            Self::RadialGradient {
                center_intensity,
                radius_intensity,
                ..
            } => center_intensity.max(*radius_intensity),
            Self::CustomBrush(_) => 1.0,
        }
    }

    /// Resolve a linear gradient's endpoints against the layer size.
    pub(crate) fn resolve_linear(start: Point, end: Point, size: Size) -> (Point, Point) {
        (resolve_point(start, size), resolve_point(end, size))
    }

    /// Resolve a radial gradient's centre and radius against the layer size.
    pub(crate) fn resolve_radial(center: Option<Point>, radius: f64, size: Size) -> (Point, f64) {
        let c = center.unwrap_or_else(|| Point::new(size.width / 2.0, size.height / 2.0));
        let r = if radius.is_finite() {
            radius
        } else {
            size.width.min(size.height) / 2.0
        };
        (c, r)
    }

    /// Flatten into an alpha brush whose alpha is the eased intensity.
    ///
    /// Used where no shader can evaluate the gradient per pixel: the static mask path and scrims.
    pub fn as_mask_brush(&self, size: Size) -> Brush {
        let stops = |from: f32, to: f32, easing: Easing| -> Vec<GradientStop> {
            (0..MASK_BRUSH_STOPS)
                .map(|i| {
                    let t = i as f32 / (MASK_BRUSH_STOPS - 1) as f32;
                    let a = lerp(from, to, easing.apply(t));
                    GradientStop::new(t, Color::BLACK.with_alpha(a))
                })
                .collect()
        };

        match self {
            Self::LinearGradient {
                start,
                end,
                start_intensity,
                end_intensity,
                easing,
                ..
            } => {
                let (start, end) = Self::resolve_linear(*start, *end, size);
                Brush::LinearGradient {
                    start,
                    end,
                    stops: stops(*start_intensity, *end_intensity, *easing),
                }
            }
            Self::RadialGradient {
                center,
                radius,
                center_intensity,
                radius_intensity,
                easing,
            } => {
                let (center, radius) = Self::resolve_radial(*center, *radius, size);
                Brush::RadialGradient {
                    center,
                    radius,
                    stops: stops(*center_intensity, *radius_intensity, *easing),
                }
            }
            Self::CustomBrush(brush) => brush.clone(),
        }
    }
}

fn resolve_point(p: Point, size: Size) -> Point {
    let axis = |v: f64, extent: f64| {
        if v.is_infinite() {
            if v > 0.0 { extent } else { 0.0 }
        } else {
            v
        }
    };
    Point::new(axis(p.x, size.width), axis(p.y, size.height))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/progressive.rs"]
mod tests;
