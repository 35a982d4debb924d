use crate::foundation::core::{Point, Size, Vec2};
use crate::foundation::error::{HazeError, HazeResult};

/// Content downscaling applied before blurring.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum InputScale {
    /// Draw content at full resolution.
    #[default]
    None,
    /// Let the engine pick a factor.
    Auto,
    /// Fixed factor in `(0, 1]`.
    Fixed(f32),
}

impl InputScale {
    /// Validate a fixed factor.
    pub fn validated(self) -> HazeResult<Self> {
        if let Self::Fixed(f) = self
            && (!f.is_finite() || f <= 0.0 || f > 1.0)
        {
            return Err(HazeError::precondition(format!(
                "fixed input scale must be in (0, 1], got {f}"
            )));
        }
        Ok(self)
    }

    /// Resolve to a concrete factor.
    ///
    /// `Auto` only downscales when a progressive blur is drawn as multiple layers, where the cost
    /// of many offscreen composites dominates.
    pub fn resolve(self, auto_scale: f32, multi_layer: bool) -> f32 {
        match self {
            Self::None => 1.0,
            Self::Auto if multi_layer => auto_scale,
            Self::Auto => 1.0,
            Self::Fixed(f) => f,
        }
    }
}

/// Immutable per-frame record of where and how large the effect is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometrySnapshot {
    /// Size of the effect's content bounds, in pixels.
    pub content_size: Size,
    /// Size of the layer the effect draws into, in pixels (content size plus any edge inflation).
    pub layer_size: Size,
    /// Offset of the content within the layer, in pixels.
    pub layer_offset: Vec2,
    /// Pixels per dp.
    pub density: f32,
    /// Top-left of the content bounds in screen pixels.
    pub position_on_screen: Point,
    /// Input scale policy.
    pub input_scale: InputScale,
}

impl GeometrySnapshot {
    /// Snapshot whose layer matches its content bounds.
    pub fn new(position_on_screen: Point, content_size: Size, density: f32) -> Self {
        Self {
            content_size,
            layer_size: content_size,
            layer_offset: Vec2::ZERO,
            density,
            position_on_screen,
            input_scale: InputScale::None,
        }
    }

    /// Copy with an input scale policy.
    pub fn with_input_scale(mut self, input_scale: InputScale) -> Self {
        self.input_scale = input_scale;
        self
    }

    /// Return `true` once layout has produced a drawable, non-empty size.
    pub fn is_ready(&self) -> bool {
        self.content_size.width > 0.0
            && self.content_size.height > 0.0
            && self.density.is_finite()
            && self.density > 0.0
    }

    /// Copy whose layer is inflated by `inflate_px` on every side.
    ///
    /// Unbounded edge treatments need room for the blur to bleed past the content bounds.
    pub fn inflated(mut self, inflate_px: f64) -> Self {
        let inflate_px = inflate_px.max(0.0);
        self.layer_size = Size::new(
            self.content_size.width + 2.0 * inflate_px,
            self.content_size.height + 2.0 * inflate_px,
        );
        self.layer_offset = Vec2::new(inflate_px, inflate_px);
        self
    }
}

/// The subset of geometry that shapes a filter graph. Part of the render-effect cache key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedGeometry {
    /// Layer size in pixels, before input scaling.
    pub layer_size: Size,
    /// Pixels per dp.
    pub density: f32,
    /// Resolved input scale factor.
    pub input_scale: f32,
}

impl ResolvedGeometry {
    /// Offscreen size after input scaling, rounded up to whole pixels.
    pub fn scaled_layer_px(&self) -> (u32, u32) {
        let s = f64::from(self.input_scale);
        (
            (self.layer_size.width * s).ceil().max(0.0) as u32,
            (self.layer_size.height * s).ceil().max(0.0) as u32,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/geometry.rs"]
mod tests;
