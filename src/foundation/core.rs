use crate::foundation::error::{HazeError, HazeResult};

pub use kurbo::{Affine, Point, Rect, RoundedRect, RoundedRectRadii, Size, Vec2};

/// Density-independent length.
///
/// Effect authors express radii, step heights and edge softness in `Dp`; the pipeline converts to
/// physical pixels with the host density.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Dp(pub f32);

impl Dp {
    /// Zero length.
    pub const ZERO: Dp = Dp(0.0);

    /// Raw value in dp.
    pub fn value(self) -> f32 {
        self.0
    }

    /// Convert to physical pixels using `density` (pixels per dp).
    pub fn to_px(self, density: f32) -> f32 {
        self.0 * density
    }

    /// Validate that the length is finite and non-negative.
    pub(crate) fn require_non_negative(self, what: &str) -> HazeResult<Self> {
        if !self.0.is_finite() || self.0 < 0.0 {
            return Err(HazeError::precondition(format!(
                "{what} must be finite and >= 0, got {}",
                self.0
            )));
        }
        Ok(self)
    }
}

/// Straight-alpha RGBA colour with `f32` channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    /// Build a colour from straight-alpha channels.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque colour.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Copy with a replaced alpha, clamped to `[0, 1]`.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Copy with alpha multiplied by `factor`, clamped to `[0, 1]`.
    pub fn mul_alpha(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Return `true` when the colour would draw anything.
    pub fn is_visible(self) -> bool {
        self.a > 0.0
    }

    /// Convert to premultiplied RGBA8.
    pub fn to_premul_rgba8(self) -> [u8; 4] {
        let a = self.a.clamp(0.0, 1.0);
        let q = |c: f32| ((c.clamp(0.0, 1.0) * a * 255.0).round() as i32).clamp(0, 255) as u8;
        [
            q(self.r),
            q(self.g),
            q(self.b),
            ((a * 255.0).round() as i32).clamp(0, 255) as u8,
        ]
    }
}

/// Identity of the host window an area or effect lives in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct WindowId(pub u64);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
