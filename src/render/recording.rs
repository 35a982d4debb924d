//! Headless backend that records every primitive call.
//!
//! Implements both [`HostCanvas`] and [`EffectFactory`], tracks live handles so leaks and double
//! frees are observable, and can be told to fail surface or effect creation.

use crate::compile::graph::Shader;
use crate::effects::blend::{BlendMode, TileMode};
use crate::effects::brush::{Brush, ColorFilter};
use crate::foundation::core::{Affine, Rect, Vec2};
use crate::foundation::error::{HazeError, HazeResult};
use crate::render::backend::{
    EffectFactory, EffectHandle, HostCanvas, PixelBuffer, RedrawRequester, SurfaceDesc,
    SurfaceDraw, SurfaceId,
};
use crate::scene::area::ContentLayer;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// One recorded [`EffectFactory`] call.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum EffectCall {
    Blur {
        handle: EffectHandle,
        radius_x: f32,
        radius_y: f32,
        tile_mode: TileMode,
        input: Option<EffectHandle>,
    },
    Shader {
        handle: EffectHandle,
        shader: Shader,
    },
    ColorFilter {
        handle: EffectHandle,
        filter: ColorFilter,
        input: Option<EffectHandle>,
    },
    Blend {
        handle: EffectHandle,
        background: Option<EffectHandle>,
        foreground: Option<EffectHandle>,
        mode: BlendMode,
    },
    Offset {
        handle: EffectHandle,
        offset: Vec2,
        input: Option<EffectHandle>,
    },
    Chain {
        handle: EffectHandle,
        outer: EffectHandle,
        inner: EffectHandle,
    },
    RuntimeBlur {
        handle: EffectHandle,
        radius: f32,
        crop: Rect,
        masked: bool,
    },
    Release(EffectHandle),
}

/// One recorded [`HostCanvas`] call.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum CanvasCall {
    CreateOffscreen {
        id: SurfaceId,
        desc: SurfaceDesc,
    },
    ReleaseOffscreen(SurfaceId),
    Clear {
        target: SurfaceId,
        color: [u8; 4],
    },
    RecordArea {
        target: SurfaceId,
        layer: ContentLayer,
        transform: Affine,
    },
    RecordContent {
        target: SurfaceId,
        transform: Affine,
    },
    DrawSurface {
        source: SurfaceId,
        effect: Option<EffectHandle>,
        draw: SurfaceDraw,
    },
    DrawArea {
        layer: ContentLayer,
        transform: Affine,
    },
    DrawContent,
    Fill {
        rect: Rect,
        brush: Brush,
        mode: BlendMode,
        draw: SurfaceDraw,
    },
    ReadPixels(SurfaceId),
    DrawPixels {
        width: u32,
        height: u32,
        draw: SurfaceDraw,
    },
    RequestRedraw,
}

/// Recording [`HostCanvas`] + [`EffectFactory`].
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_handle: u64,
    next_surface: u64,
    live_effects: HashSet<EffectHandle>,
    live_surfaces: HashMap<SurfaceId, SurfaceDesc>,
    effect_calls: Vec<EffectCall>,
    canvas_calls: Vec<CanvasCall>,
    double_releases: u32,
    fail_offscreen: bool,
    fail_effects: bool,
    readback_color: [u8; 4],
}

impl RecordingBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent offscreen allocation fail.
    pub fn set_fail_offscreen(&mut self, fail: bool) {
        self.fail_offscreen = fail;
    }

    /// Make every subsequent effect primitive fail.
    pub fn set_fail_effects(&mut self, fail: bool) {
        self.fail_effects = fail;
    }

    /// Colour returned for every pixel by [`HostCanvas::read_pixels`].
    pub fn set_readback_color(&mut self, premul_rgba: [u8; 4]) {
        self.readback_color = premul_rgba;
    }

    /// Recorded effect calls.
    pub fn effect_calls(&self) -> &[EffectCall] {
        &self.effect_calls
    }

    /// Recorded canvas calls.
    pub fn canvas_calls(&self) -> &[CanvasCall] {
        &self.canvas_calls
    }

    /// Forget recorded calls, keeping live-handle bookkeeping.
    pub fn clear_calls(&mut self) {
        self.effect_calls.clear();
        self.canvas_calls.clear();
    }

    /// Effect handles created and not yet released.
    pub fn live_effects(&self) -> usize {
        self.live_effects.len()
    }

    /// Offscreen surfaces created and not yet released.
    pub fn live_surfaces(&self) -> usize {
        self.live_surfaces.len()
    }

    /// Releases of handles that were not live.
    pub fn double_releases(&self) -> u32 {
        self.double_releases
    }

    /// Number of recorded offscreen allocations.
    pub fn offscreens_created(&self) -> usize {
        self.canvas_calls
            .iter()
            .filter(|c| matches!(c, CanvasCall::CreateOffscreen { .. }))
            .count()
    }

    fn new_effect(&mut self) -> HazeResult<EffectHandle> {
        if self.fail_effects {
            return Err(HazeError::capability("recording backend: effects disabled"));
        }
        self.next_handle += 1;
        let h = EffectHandle(self.next_handle);
        self.live_effects.insert(h);
        Ok(h)
    }
}

impl EffectFactory for RecordingBackend {
    fn create_blur(
        &mut self,
        radius_x: f32,
        radius_y: f32,
        tile_mode: TileMode,
        input: Option<EffectHandle>,
    ) -> HazeResult<EffectHandle> {
        let handle = self.new_effect()?;
        self.effect_calls.push(EffectCall::Blur {
            handle,
            radius_x,
            radius_y,
            tile_mode,
            input,
        });
        Ok(handle)
    }

    fn create_shader_effect(&mut self, shader: &Shader) -> HazeResult<EffectHandle> {
        let handle = self.new_effect()?;
        self.effect_calls.push(EffectCall::Shader {
            handle,
            shader: shader.clone(),
        });
        Ok(handle)
    }

    fn create_color_filter(
        &mut self,
        filter: &ColorFilter,
        input: Option<EffectHandle>,
    ) -> HazeResult<EffectHandle> {
        let handle = self.new_effect()?;
        self.effect_calls.push(EffectCall::ColorFilter {
            handle,
            filter: *filter,
            input,
        });
        Ok(handle)
    }

    fn create_blend(
        &mut self,
        background: Option<EffectHandle>,
        foreground: Option<EffectHandle>,
        mode: BlendMode,
        _offset: Vec2,
    ) -> HazeResult<EffectHandle> {
        let handle = self.new_effect()?;
        self.effect_calls.push(EffectCall::Blend {
            handle,
            background,
            foreground,
            mode,
        });
        Ok(handle)
    }

    fn create_offset(
        &mut self,
        offset: Vec2,
        input: Option<EffectHandle>,
    ) -> HazeResult<EffectHandle> {
        let handle = self.new_effect()?;
        self.effect_calls.push(EffectCall::Offset {
            handle,
            offset,
            input,
        });
        Ok(handle)
    }

    fn create_chain(
        &mut self,
        outer: EffectHandle,
        inner: EffectHandle,
    ) -> HazeResult<EffectHandle> {
        let handle = self.new_effect()?;
        self.effect_calls.push(EffectCall::Chain {
            handle,
            outer,
            inner,
        });
        Ok(handle)
    }

    fn create_runtime_blur(
        &mut self,
        radius: f32,
        crop: Rect,
        mask: Option<&Shader>,
        _tile_mode: TileMode,
        _input: Option<EffectHandle>,
    ) -> HazeResult<EffectHandle> {
        let handle = self.new_effect()?;
        self.effect_calls.push(EffectCall::RuntimeBlur {
            handle,
            radius,
            crop,
            masked: mask.is_some(),
        });
        Ok(handle)
    }

    fn release(&mut self, handle: EffectHandle) {
        if !self.live_effects.remove(&handle) {
            self.double_releases += 1;
        }
        self.effect_calls.push(EffectCall::Release(handle));
    }
}

impl HostCanvas for RecordingBackend {
    fn create_offscreen(&mut self, desc: SurfaceDesc) -> HazeResult<SurfaceId> {
        if self.fail_offscreen || desc.width == 0 || desc.height == 0 {
            return Err(HazeError::surface(format!(
                "cannot allocate {}x{} offscreen",
                desc.width, desc.height
            )));
        }
        self.next_surface += 1;
        let id = SurfaceId(self.next_surface);
        self.live_surfaces.insert(id, desc);
        self.canvas_calls
            .push(CanvasCall::CreateOffscreen { id, desc });
        Ok(id)
    }

    fn release_offscreen(&mut self, id: SurfaceId) {
        if self.live_surfaces.remove(&id).is_none() {
            self.double_releases += 1;
        }
        self.canvas_calls.push(CanvasCall::ReleaseOffscreen(id));
    }

    fn clear_offscreen(&mut self, target: SurfaceId, color: [u8; 4]) -> HazeResult<()> {
        self.canvas_calls.push(CanvasCall::Clear { target, color });
        Ok(())
    }

    fn record_area(
        &mut self,
        target: SurfaceId,
        layer: ContentLayer,
        transform: Affine,
    ) -> HazeResult<()> {
        self.canvas_calls.push(CanvasCall::RecordArea {
            target,
            layer,
            transform,
        });
        Ok(())
    }

    fn record_content(&mut self, target: SurfaceId, transform: Affine) -> HazeResult<()> {
        self.canvas_calls
            .push(CanvasCall::RecordContent { target, transform });
        Ok(())
    }

    fn draw_surface(
        &mut self,
        source: SurfaceId,
        effect: Option<EffectHandle>,
        draw: &SurfaceDraw,
    ) -> HazeResult<()> {
        self.canvas_calls.push(CanvasCall::DrawSurface {
            source,
            effect,
            draw: draw.clone(),
        });
        Ok(())
    }

    fn draw_area(&mut self, layer: ContentLayer, transform: Affine) -> HazeResult<()> {
        self.canvas_calls
            .push(CanvasCall::DrawArea { layer, transform });
        Ok(())
    }

    fn draw_content(&mut self) -> HazeResult<()> {
        self.canvas_calls.push(CanvasCall::DrawContent);
        Ok(())
    }

    fn fill(
        &mut self,
        rect: Rect,
        brush: &Brush,
        mode: BlendMode,
        draw: &SurfaceDraw,
    ) -> HazeResult<()> {
        self.canvas_calls.push(CanvasCall::Fill {
            rect,
            brush: brush.clone(),
            mode,
            draw: draw.clone(),
        });
        Ok(())
    }

    fn read_pixels(&mut self, source: SurfaceId) -> HazeResult<PixelBuffer> {
        let desc = self
            .live_surfaces
            .get(&source)
            .copied()
            .ok_or_else(|| HazeError::surface(format!("unknown surface {source:?}")))?;
        self.canvas_calls.push(CanvasCall::ReadPixels(source));
        Ok(PixelBuffer::from_pixel(
            desc.width,
            desc.height,
            image::Rgba(self.readback_color),
        ))
    }

    fn draw_pixels(&mut self, pixels: &PixelBuffer, draw: &SurfaceDraw) -> HazeResult<()> {
        self.canvas_calls.push(CanvasCall::DrawPixels {
            width: pixels.width(),
            height: pixels.height(),
            draw: draw.clone(),
        });
        Ok(())
    }

    fn request_redraw(&mut self) {
        self.canvas_calls.push(CanvasCall::RequestRedraw);
    }
}

/// Thread-safe redraw counter.
#[derive(Debug, Default)]
pub struct RedrawCounter(AtomicUsize);

impl RedrawCounter {
    /// Zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Redraws requested so far.
    pub fn count(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

impl RedrawRequester for RedrawCounter {
    fn request_redraw(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}
