//! Per-frame resolution of effect inputs into graph inputs and draw passes.
//!
//! [`resolve`] is recomputed only when a dirty flag says its output may change. The frame plan
//! helpers are pure: given a [`Resolution`] and the source areas they emit passes.

use crate::compile::builder::{GraphInputs, build_graph};
use crate::compile::graph::FilterGraphNode;
use crate::compile::progressive::{ProgressivePlan, plan_progressive};
use crate::config::HazeConfig;
use crate::effects::blend::BlendMode;
use crate::effects::brush::Brush;
use crate::effects::kind::VisualEffect;
use crate::effects::liquid_glass::LiquidGlassParameters;
use crate::effects::params::{EdgeTreatment, EffectParameters};
use crate::effects::progressive::ProgressiveSpec;
use crate::effects::style::{HazeStyle, ResolvedStyle, StyleDefaults, resolve_style};
use crate::effects::tint::Tint;
use crate::foundation::core::{Affine, Point, Rect, RoundedRect, Vec2, WindowId};
use crate::foundation::error::HazeResult;
use crate::render::backend::{SurfaceDesc, SurfaceDraw};
use crate::render::capability::{BlurCapability, Capabilities};
use crate::render::plan::{FramePlan, Pass, RecordSource};
use crate::render::strategy::StrategyKind;
use crate::scene::area::HazeArea;
use crate::scene::geometry::{GeometrySnapshot, ResolvedGeometry};

/// What an effect blurs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EffectMode {
    /// Blur the source areas drawn below the effect.
    #[default]
    Background,
    /// Blur the effect node's own content.
    Content,
}

/// Everything the effect author sets.
#[derive(Clone, Debug)]
pub(crate) struct EffectInputs {
    pub(crate) explicit: HazeStyle,
    pub(crate) style: HazeStyle,
    pub(crate) ambient: HazeStyle,
    pub(crate) mask: Option<Brush>,
    pub(crate) progressive: Option<ProgressiveSpec>,
    pub(crate) tint_alpha_modulate: f32,
    pub(crate) liquid_glass: Option<LiquidGlassParameters>,
    pub(crate) edge: EdgeTreatment,
    pub(crate) mode: EffectMode,
    pub(crate) draw_content_behind: bool,
    pub(crate) alpha: f32,
    pub(crate) z_index: f32,
    pub(crate) window: Option<WindowId>,
}

impl Default for EffectInputs {
    fn default() -> Self {
        Self {
            explicit: HazeStyle::default(),
            style: HazeStyle::default(),
            ambient: HazeStyle::default(),
            mask: None,
            progressive: None,
            tint_alpha_modulate: 1.0,
            liquid_glass: None,
            edge: EdgeTreatment::default(),
            mode: EffectMode::default(),
            draw_content_behind: false,
            alpha: 1.0,
            z_index: 0.0,
            window: None,
        }
    }
}

impl EffectInputs {
    /// Return `true` when the tint list is derived from the background colour.
    pub(crate) fn tints_follow_background(&self) -> bool {
        [&self.explicit, &self.style, &self.ambient]
            .iter()
            .all(|s| !s.tints.iter().any(Tint::is_specified))
    }
}

/// The resolved state a frame draws from.
#[derive(Clone, Debug)]
pub(crate) struct Resolution {
    pub(crate) strategy: StrategyKind,
    pub(crate) capabilities: Capabilities,
    pub(crate) style: ResolvedStyle,
    /// Geometry after edge inflation.
    pub(crate) geometry: GeometrySnapshot,
    pub(crate) input_scale: f32,
    pub(crate) runtime_shader: bool,
    /// Graph inputs per drawn layer, bottom first.
    pub(crate) layers: Vec<GraphInputs>,
    pub(crate) scrim: Option<(Brush, BlendMode)>,
    pub(crate) scrim_mask: Option<Brush>,
    /// All layers folded into one graph, only for the software strategy.
    pub(crate) software_graph: Option<FilterGraphNode>,
}

impl Resolution {
    /// Return `true` when every layer is a passthrough of the content.
    pub(crate) fn is_identity(&self) -> bool {
        self.layers.iter().all(|l| l.effect.is_identity())
    }

    /// Offscreen size for the recorded content.
    pub(crate) fn surface_desc(&self) -> SurfaceDesc {
        let (width, height) = ResolvedGeometry {
            layer_size: self.geometry.layer_size,
            density: self.geometry.density,
            input_scale: self.input_scale,
        }
        .scaled_layer_px();
        SurfaceDesc { width, height }
    }

    /// Layer rectangle in content-local pixels.
    pub(crate) fn dest(&self) -> Rect {
        let off = self.geometry.layer_offset;
        Rect::from_origin_size(Point::new(-off.x, -off.y), self.geometry.layer_size)
    }
}

/// Resolve `inputs` for one strategy and geometry.
#[tracing::instrument(level = "debug", skip_all, fields(strategy = ?strategy))]
pub(crate) fn resolve(
    inputs: &EffectInputs,
    config: &HazeConfig,
    strategy: StrategyKind,
    capabilities: &Capabilities,
    geometry: GeometrySnapshot,
) -> HazeResult<Resolution> {
    let defaults = StyleDefaults {
        blur_radius: config.default_blur_radius,
        noise_factor: config.default_noise_factor,
        tint_alpha: config.default_tint_alpha,
    };
    let style = resolve_style(&inputs.explicit, &inputs.style, &inputs.ambient, &defaults)?;
    let runtime_shader = strategy.uses_filter_graph()
        && capabilities.contains(&BlurCapability::GpuRuntimeShader);
    let density = geometry.density;

    let radius = match &inputs.liquid_glass {
        Some(p) => p.blur_radius,
        None => style.blur_radius,
    };
    let geometry = match inputs.edge {
        EdgeTreatment::Unbounded => geometry.inflated(f64::from(radius.to_px(density)).ceil()),
        EdgeTreatment::Rectangle | EdgeTreatment::Shape(_) => geometry,
    };

    let plan = match (&inputs.liquid_glass, &inputs.progressive) {
        (None, Some(spec)) => Some(plan_progressive(
            spec,
            runtime_shader,
            geometry.layer_size,
            config.progressive_step_height.to_px(density),
        )),
        _ => None,
    };
    let multi_layer = plan.as_ref().is_some_and(ProgressivePlan::is_multi_layer);
    let input_scale = geometry
        .input_scale
        .resolve(config.auto_input_scale, multi_layer);
    let resolved_geometry = ResolvedGeometry {
        layer_size: geometry.layer_size,
        density,
        input_scale,
    };

    let effects: Vec<VisualEffect> = match &inputs.liquid_glass {
        Some(p) => {
            let p = LiquidGlassParameters {
                content_size: geometry.content_size,
                content_offset: geometry.layer_offset,
                scale: input_scale,
                ..p.clone()
            };
            if runtime_shader {
                vec![VisualEffect::LiquidGlass(p)]
            } else {
                vec![VisualEffect::Blur(p.frosted_fallback())]
            }
        }
        None => {
            let base = EffectParameters {
                blur_radius: style.blur_radius,
                noise_factor: style.noise_factor,
                tints: style.tints.clone(),
                mask: inputs.mask.clone(),
                progressive: inputs.progressive.clone(),
                tint_alpha_modulate: inputs.tint_alpha_modulate,
                content_size: geometry.content_size,
                content_offset: geometry.layer_offset,
                scale: input_scale,
                blur_tile_mode: inputs.edge.tile_mode(),
            };
            match &plan {
                Some(plan) => plan.expand(&base),
                None => vec![base],
            }
            .into_iter()
            .map(VisualEffect::Blur)
            .collect()
        }
    };
    let layers = effects
        .into_iter()
        .map(|effect| {
            Ok(GraphInputs {
                effect: effect.normalized()?,
                geometry: resolved_geometry,
            })
        })
        .collect::<HazeResult<Vec<_>>>()?;

    let scrim_tint = if style.fallback_tint.is_specified() {
        Some(style.fallback_tint.clone())
    } else if let Some(p) = &inputs.liquid_glass
        && p.tint.is_specified()
    {
        Some(p.tint.boosted_for_fallback(p.blur_radius))
    } else {
        style.scrim_tint()
    };
    let scrim = scrim_tint.and_then(|t| match t {
        Tint::Unspecified => None,
        Tint::Color { color, blend_mode } => Some((Brush::Solid(color), blend_mode)),
        Tint::Brush {
            brush, blend_mode, ..
        } => Some((brush, blend_mode)),
    });
    let scrim_mask = match &inputs.progressive {
        Some(spec) => Some(spec.as_mask_brush(geometry.content_size)),
        None => inputs.mask.clone(),
    };

    let software_graph = (strategy == StrategyKind::Software).then(|| fold_layers(&layers));

    tracing::debug!(
        layers = layers.len(),
        input_scale,
        runtime_shader,
        "effect resolved"
    );
    Ok(Resolution {
        strategy,
        capabilities: capabilities.clone(),
        style,
        geometry,
        input_scale,
        runtime_shader,
        layers,
        scrim,
        scrim_mask,
        software_graph,
    })
}

/// Fold every layer graph into one, drawing later layers over earlier ones.
fn fold_layers(layers: &[GraphInputs]) -> FilterGraphNode {
    layers
        .iter()
        .map(build_graph)
        .reduce(|background, foreground| FilterGraphNode::Blend {
            background: Box::new(background),
            foreground: Box::new(foreground),
            mode: BlendMode::SrcOver,
            offset: Vec2::ZERO,
        })
        .unwrap_or(FilterGraphNode::Source)
}

/// Clip for the composite, in content-local pixels.
pub(crate) fn clip_for(edge: &EdgeTreatment, res: &Resolution) -> Option<RoundedRect> {
    match edge {
        EdgeTreatment::Rectangle => Some(RoundedRect::from_rect(
            Rect::from_origin_size(Point::ZERO, res.geometry.content_size),
            0.0,
        )),
        EdgeTreatment::Shape(shape) => Some(*shape),
        EdgeTreatment::Unbounded => None,
    }
}

/// Draw the content without an offscreen.
pub(crate) fn push_passthrough(
    plan: &mut FramePlan,
    inputs: &EffectInputs,
    areas: &[HazeArea],
    res: &Resolution,
) {
    match inputs.mode {
        EffectMode::Content => plan.push(Pass::Content),
        EffectMode::Background => {
            let origin = res.geometry.position_on_screen;
            let areas = areas
                .iter()
                .filter_map(|a| {
                    a.content
                        .map(|layer| (layer, Affine::translate(a.position_on_screen - origin)))
                })
                .collect();
            plan.push(Pass::DrawAreas { areas });
        }
    }
}

/// Declare the offscreen slot and record the blurred content into it. Returns the slot.
pub(crate) fn push_record(
    plan: &mut FramePlan,
    inputs: &EffectInputs,
    areas: &[HazeArea],
    res: &Resolution,
) -> usize {
    let slot = plan.add_slot(res.surface_desc());
    let scale = Affine::scale(f64::from(res.input_scale));
    let (clear, sources) = match inputs.mode {
        EffectMode::Content => (
            [0; 4],
            vec![RecordSource::Content {
                transform: scale * Affine::translate(res.geometry.layer_offset),
            }],
        ),
        EffectMode::Background => {
            let layer_origin = res.geometry.position_on_screen - res.geometry.layer_offset;
            let sources = areas
                .iter()
                .filter_map(|a| {
                    a.content.map(|layer| RecordSource::Area {
                        layer,
                        transform: scale * Affine::translate(a.position_on_screen - layer_origin),
                    })
                })
                .collect();
            (res.style.background_color.to_premul_rgba8(), sources)
        }
    };
    plan.push(Pass::Record {
        slot,
        clear,
        sources,
    });
    slot
}

/// Flat tint fill drawn when no blur is available.
pub(crate) fn push_scrim(plan: &mut FramePlan, res: &Resolution, draw: &SurfaceDraw) {
    let Some((brush, mode)) = &res.scrim else {
        return;
    };
    plan.push(Pass::Fill {
        rect: draw.dest,
        brush: brush.clone(),
        mode: *mode,
        draw: SurfaceDraw {
            mask: res.scrim_mask.clone(),
            ..draw.clone()
        },
    });
}

#[cfg(test)]
#[path = "../../tests/unit/session/resolve.rs"]
mod tests;
