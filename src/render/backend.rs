use crate::compile::graph::{FilterGraphNode, Shader};
use crate::effects::blend::{BlendMode, TileMode};
use crate::effects::brush::{Brush, ColorFilter};
use crate::foundation::core::{Affine, Rect, RoundedRect, Vec2};
use crate::foundation::error::{HazeError, HazeResult};
use crate::scene::area::ContentLayer;

/// Premultiplied RGBA8 pixels read back from, or drawn into, a host surface.
pub type PixelBuffer = image::RgbaImage;

/// Opaque handle to a native filter-graph node owned by an [`EffectFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectHandle(pub u64);

/// Opaque handle to a host offscreen surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Offscreen surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceDesc {
    /// Pixel count.
    pub fn pixels(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Platform graphics primitives used to realize filter graphs.
///
/// An input of `None` means "the content the effect is applied to". Every handle returned stays
/// valid until passed to [`EffectFactory::release`].
pub trait EffectFactory {
    /// Gaussian blur.
    fn create_blur(
        &mut self,
        radius_x: f32,
        radius_y: f32,
        tile_mode: TileMode,
        input: Option<EffectHandle>,
    ) -> HazeResult<EffectHandle>;

    /// Full-layer shader output.
    fn create_shader_effect(&mut self, shader: &Shader) -> HazeResult<EffectHandle>;

    /// Colour filter over an input.
    fn create_color_filter(
        &mut self,
        filter: &ColorFilter,
        input: Option<EffectHandle>,
    ) -> HazeResult<EffectHandle>;

    /// Blend `foreground` (translated by `offset`) onto `background`.
    fn create_blend(
        &mut self,
        background: Option<EffectHandle>,
        foreground: Option<EffectHandle>,
        mode: BlendMode,
        offset: Vec2,
    ) -> HazeResult<EffectHandle>;

    /// Translate an input.
    fn create_offset(
        &mut self,
        offset: Vec2,
        input: Option<EffectHandle>,
    ) -> HazeResult<EffectHandle>;

    /// Evaluate `inner`, then `outer` with `inner` as its source.
    fn create_chain(
        &mut self,
        outer: EffectHandle,
        inner: EffectHandle,
    ) -> HazeResult<EffectHandle>;

    /// Two-pass runtime-shader blur with an optional intensity mask.
    fn create_runtime_blur(
        &mut self,
        radius: f32,
        crop: Rect,
        mask: Option<&Shader>,
        tile_mode: TileMode,
        input: Option<EffectHandle>,
    ) -> HazeResult<EffectHandle>;

    /// Free a handle.
    fn release(&mut self, handle: EffectHandle);
}

/// How a surface or pixel buffer is composited onto the destination.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceDraw {
    /// Destination rectangle in destination pixels. The source is stretched to fill it.
    pub dest: Rect,
    /// Clip applied to the composite, `None` for unbounded.
    pub clip: Option<RoundedRect>,
    /// Global alpha.
    pub alpha: f32,
    /// Alpha mask in destination-local pixels.
    pub mask: Option<Brush>,
}

/// Host drawing surface the compositing pipeline draws through.
pub trait HostCanvas {
    /// Allocate an offscreen surface. Fails with [`HazeError::Surface`] when it cannot.
    fn create_offscreen(&mut self, desc: SurfaceDesc) -> HazeResult<SurfaceId>;

    /// Free an offscreen surface.
    fn release_offscreen(&mut self, id: SurfaceId);

    /// Clear `target` to `color`, premultiplied RGBA8.
    fn clear_offscreen(&mut self, target: SurfaceId, color: [u8; 4]) -> HazeResult<()>;

    /// Draw a recorded area's content layer into `target` with `transform`.
    fn record_area(
        &mut self,
        target: SurfaceId,
        layer: ContentLayer,
        transform: Affine,
    ) -> HazeResult<()>;

    /// Draw the effect node's own content into `target` with `transform`.
    fn record_content(&mut self, target: SurfaceId, transform: Affine) -> HazeResult<()>;

    /// Composite `source` onto the destination through `effect`.
    fn draw_surface(
        &mut self,
        source: SurfaceId,
        effect: Option<EffectHandle>,
        draw: &SurfaceDraw,
    ) -> HazeResult<()>;

    /// Draw an area's content directly onto the destination with `transform`.
    fn draw_area(&mut self, layer: ContentLayer, transform: Affine) -> HazeResult<()>;

    /// Draw the effect node's own content onto the destination.
    fn draw_content(&mut self) -> HazeResult<()>;

    /// Fill `rect` on the destination with `brush`.
    fn fill(
        &mut self,
        rect: Rect,
        brush: &Brush,
        mode: BlendMode,
        draw: &SurfaceDraw,
    ) -> HazeResult<()>;

    /// Read back `source` as premultiplied RGBA8.
    fn read_pixels(&mut self, source: SurfaceId) -> HazeResult<PixelBuffer>;

    /// Composite CPU pixels onto the destination.
    fn draw_pixels(&mut self, pixels: &PixelBuffer, draw: &SurfaceDraw) -> HazeResult<()>;

    /// Ask the host to draw another frame.
    fn request_redraw(&mut self);
}

/// Thread-safe redraw trigger for work that completes off the render thread.
pub trait RedrawRequester: Send + Sync {
    /// Ask the host to draw another frame.
    fn request_redraw(&self);
}

/// A realized filter graph and every native handle it owns.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NativeEffect {
    root: Option<EffectHandle>,
    handles: Vec<EffectHandle>,
}

impl NativeEffect {
    /// Root handle, `None` for an identity graph.
    pub fn root(&self) -> Option<EffectHandle> {
        self.root
    }

    /// Number of native handles owned.
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Free every owned handle, innermost first.
    pub fn release<F: EffectFactory + ?Sized>(self, factory: &mut F) {
        for h in self.handles {
            factory.release(h);
        }
    }
}

/// Realize `graph` with `factory`.
///
/// On failure every handle created so far is released and a [`HazeError::Capability`] is
/// returned.
#[tracing::instrument(level = "debug", skip_all)]
pub fn realize<F: EffectFactory + ?Sized>(
    graph: &FilterGraphNode,
    factory: &mut F,
) -> HazeResult<NativeEffect> {
    let mut handles = Vec::new();
    match realize_node(graph, factory, &mut handles) {
        Ok(root) => Ok(NativeEffect { root, handles }),
        Err(e) => {
            for h in handles {
                factory.release(h);
            }
            Err(match e {
                HazeError::Capability(_) => e,
                other => HazeError::capability(format!("filter graph realization failed: {other}")),
            })
        }
    }
}

fn realize_node<F: EffectFactory + ?Sized>(
    node: &FilterGraphNode,
    f: &mut F,
    handles: &mut Vec<EffectHandle>,
) -> HazeResult<Option<EffectHandle>> {
    let h = match node {
        FilterGraphNode::Source => return Ok(None),
        FilterGraphNode::Blur {
            input,
            radius_x,
            radius_y,
            tile_mode,
        } => {
            let input = realize_node(input, f, handles)?;
            f.create_blur(*radius_x, *radius_y, *tile_mode, input)?
        }
        FilterGraphNode::ShaderEffect(shader) => f.create_shader_effect(shader)?,
        FilterGraphNode::ColorFilter { input, filter } => {
            let input = realize_node(input, f, handles)?;
            f.create_color_filter(filter, input)?
        }
        FilterGraphNode::Blend {
            background,
            foreground,
            mode,
            offset,
        } => {
            let bg = realize_node(background, f, handles)?;
            let fg = realize_node(foreground, f, handles)?;
            f.create_blend(bg, fg, *mode, *offset)?
        }
        FilterGraphNode::Offset { input, offset } => {
            let input = realize_node(input, f, handles)?;
            f.create_offset(*offset, input)?
        }
        FilterGraphNode::Chain { inner, outer } => {
            let inner = realize_node(inner, f, handles)?;
            let outer = realize_node(outer, f, handles)?;
            match (outer, inner) {
                (Some(o), Some(i)) => f.create_chain(o, i)?,
                (Some(only), None) | (None, Some(only)) => return Ok(Some(only)),
                (None, None) => return Ok(None),
            }
        }
        FilterGraphNode::RuntimeBlur {
            input,
            radius,
            crop,
            mask,
            tile_mode,
        } => {
            let input = realize_node(input, f, handles)?;
            f.create_runtime_blur(*radius, *crop, mask.as_ref(), *tile_mode, input)?
        }
    };
    handles.push(h);
    Ok(Some(h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
