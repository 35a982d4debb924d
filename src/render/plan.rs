//! Per-frame draw plans and their execution against a host canvas.
//!
//! The session decides what to draw and emits a [`FramePlan`]; [`execute_plan`] is the only code
//! that touches the canvas. Every offscreen slot is acquired before the first pass runs, so a
//! surface failure leaves the destination untouched instead of half drawn.

use crate::effects::blend::BlendMode;
use crate::effects::brush::Brush;
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::HazeResult;
use crate::render::backend::{
    EffectHandle, HostCanvas, PixelBuffer, SurfaceDesc, SurfaceDraw, SurfaceId,
};
use crate::render::surface_pool::LayerPool;
use crate::scene::area::ContentLayer;

/// Content recorded into an offscreen slot.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordSource {
    /// A source area's content layer.
    Area {
        /// Recorded layer.
        layer: ContentLayer,
        /// Layer-to-offscreen transform.
        transform: Affine,
    },
    /// The effect node's own content.
    Content {
        /// Content-to-offscreen transform.
        transform: Affine,
    },
}

/// One step of a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Pass {
    /// Clear a slot and record content into it.
    Record {
        /// Target slot index.
        slot: usize,
        /// Premultiplied clear colour.
        clear: [u8; 4],
        /// Content drawn in order.
        sources: Vec<RecordSource>,
    },
    /// Composite a slot onto the destination through a realized effect.
    Composite {
        /// Source slot index.
        slot: usize,
        /// Root of the realized graph, `None` for passthrough.
        effect: Option<EffectHandle>,
        /// Placement.
        draw: SurfaceDraw,
    },
    /// Read a slot back for CPU processing.
    Capture {
        /// Source slot index.
        slot: usize,
    },
    /// Draw the latest CPU result.
    Pixels {
        /// Placement.
        draw: SurfaceDraw,
    },
    /// Fill the destination with a brush.
    Fill {
        /// Filled rectangle.
        rect: Rect,
        /// Paint.
        brush: Brush,
        /// Blend against the destination.
        mode: BlendMode,
        /// Clip, alpha and mask.
        draw: SurfaceDraw,
    },
    /// Draw source areas directly, without an offscreen.
    DrawAreas {
        /// Layers and their destination transforms.
        areas: Vec<(ContentLayer, Affine)>,
    },
    /// Draw the effect node's own content directly.
    Content,
}

/// Slots and passes for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FramePlan {
    /// Offscreen slots, indexed by the passes.
    pub slots: Vec<SurfaceDesc>,
    /// Passes in execution order.
    pub passes: Vec<Pass>,
}

impl FramePlan {
    /// Return `true` when the plan draws nothing.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Declare an offscreen slot and return its index.
    pub fn add_slot(&mut self, desc: SurfaceDesc) -> usize {
        self.slots.push(desc);
        self.slots.len() - 1
    }

    /// Append a pass.
    pub fn push(&mut self, pass: Pass) {
        self.passes.push(pass);
    }
}

/// What executing a plan produced besides pixels on the destination.
#[derive(Debug, Default)]
pub struct FrameOutcome {
    /// Pixels read back by a [`Pass::Capture`].
    pub captured: Option<PixelBuffer>,
    /// Passes executed.
    pub passes_run: usize,
}

/// Execute `plan` on `canvas`, borrowing offscreens from `pool`.
///
/// `pixels` is the CPU result drawn by [`Pass::Pixels`]; the pass is skipped without one.
/// Surfaces are returned to the pool on success and on failure.
pub fn execute_plan<C: HostCanvas + ?Sized>(
    plan: &FramePlan,
    canvas: &mut C,
    pool: &mut LayerPool,
    pixels: Option<&PixelBuffer>,
) -> HazeResult<FrameOutcome> {
    let mut surfaces: Vec<SurfaceId> = Vec::with_capacity(plan.slots.len());
    for desc in &plan.slots {
        match pool.acquire(canvas, *desc) {
            Ok(id) => surfaces.push(id),
            Err(e) => {
                release_all(plan, canvas, pool, &surfaces);
                return Err(e);
            }
        }
    }

    let result = run_passes(plan, canvas, &surfaces, pixels);
    release_all(plan, canvas, pool, &surfaces);
    result
}

fn run_passes<C: HostCanvas + ?Sized>(
    plan: &FramePlan,
    canvas: &mut C,
    surfaces: &[SurfaceId],
    pixels: Option<&PixelBuffer>,
) -> HazeResult<FrameOutcome> {
    let mut outcome = FrameOutcome::default();
    for pass in &plan.passes {
        match pass {
            Pass::Record {
                slot,
                clear,
                sources,
            } => {
                let target = surfaces[*slot];
                canvas.clear_offscreen(target, *clear)?;
                for s in sources {
                    match s {
                        RecordSource::Area { layer, transform } => {
                            canvas.record_area(target, *layer, *transform)?
                        }
                        RecordSource::Content { transform } => {
                            canvas.record_content(target, *transform)?
                        }
                    }
                }
            }
            Pass::Composite { slot, effect, draw } => {
                canvas.draw_surface(surfaces[*slot], *effect, draw)?;
            }
            Pass::Capture { slot } => {
                outcome.captured = Some(canvas.read_pixels(surfaces[*slot])?);
            }
            Pass::Pixels { draw } => {
                if let Some(px) = pixels {
                    canvas.draw_pixels(px, draw)?;
                }
            }
            Pass::Fill {
                rect,
                brush,
                mode,
                draw,
            } => canvas.fill(*rect, brush, *mode, draw)?,
            Pass::DrawAreas { areas } => {
                for (layer, transform) in areas {
                    canvas.draw_area(*layer, *transform)?;
                }
            }
            Pass::Content => canvas.draw_content()?,
        }
        outcome.passes_run += 1;
    }
    Ok(outcome)
}

fn release_all<C: HostCanvas + ?Sized>(
    plan: &FramePlan,
    canvas: &mut C,
    pool: &mut LayerPool,
    surfaces: &[SurfaceId],
) {
    for (desc, id) in plan.slots.iter().zip(surfaces) {
        pool.release(canvas, *desc, *id);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
