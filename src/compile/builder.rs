//! Filter graph construction.
//!
//! Stage order is fixed: blur, noise, tints, then mask. Each stage only exists when its input
//! would change the output, so a zero-radius effect with nothing else set builds `Source`.

use crate::compile::graph::{FilterGraphNode, GradientMask, LiquidGlassUniforms, Shader};
use crate::effects::blend::{BlendMode, TileMode};
use crate::effects::brush::{Brush, ColorFilter};
use crate::effects::kind::VisualEffect;
use crate::effects::liquid_glass::{GlassShape, LiquidGlassParameters};
use crate::effects::params::EffectParameters;
use crate::effects::progressive::ProgressiveSpec;
use crate::effects::tint::Tint;
use crate::foundation::core::{Point, Rect, Size, Vec2};
use crate::scene::geometry::ResolvedGeometry;

/// Everything a filter graph depends on. Equal inputs build equal graphs.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphInputs {
    /// Normalized effect parameters.
    pub effect: VisualEffect,
    /// Resolved layer geometry.
    pub geometry: ResolvedGeometry,
}

/// Build the filter graph for `inputs`.
///
/// A progressive spec left on blur parameters is drawn with a runtime blur shader; the planner
/// rewrites the parameters for every other progressive path before they reach the builder.
#[tracing::instrument(level = "debug", skip_all)]
pub fn build_graph(inputs: &GraphInputs) -> FilterGraphNode {
    match &inputs.effect {
        VisualEffect::Blur(p) => build_blur(p, &inputs.geometry),
        VisualEffect::LiquidGlass(p) => build_liquid_glass(p, &inputs.geometry),
    }
}

fn build_blur(p: &EffectParameters, geometry: &ResolvedGeometry) -> FilterGraphNode {
    if p.is_identity() {
        return FilterGraphNode::Source;
    }

    let scale = f64::from(p.scale);
    let radius_px = p.blur_radius.to_px(geometry.density) * p.scale;
    let layer = scaled_size(geometry.layer_size, scale);
    let offset = p.content_offset * scale;

    let mut node = match &p.progressive {
        Some(spec) if radius_px > 0.0 && !matches!(spec, ProgressiveSpec::CustomBrush(_)) => {
            FilterGraphNode::RuntimeBlur {
                input: Box::new(FilterGraphNode::Source),
                radius: radius_px,
                crop: Rect::from_origin_size(Point::ZERO, layer),
                mask: gradient_mask(spec, geometry.layer_size, scale).map(Shader::GradientMask),
                tile_mode: p.blur_tile_mode,
            }
        }
        _ => blur_or_source(FilterGraphNode::Source, radius_px, p.blur_tile_mode),
    };

    if p.has_noise() {
        node = FilterGraphNode::Blend {
            background: Box::new(node),
            foreground: Box::new(FilterGraphNode::ShaderEffect(Shader::Noise {
                scale: 1.0 / p.scale,
                alpha: p.noise_factor,
            })),
            mode: BlendMode::SrcAtop,
            offset: Vec2::ZERO,
        };
    }

    // Tints follow the progressive intensity when one is set, otherwise the static mask.
    let tint_mask = match &p.progressive {
        Some(spec) => Some(spec.as_mask_brush(geometry.layer_size).scaled(scale)),
        None => p.mask.as_ref().map(|m| m.scaled(scale)),
    };
    for tint in &p.tints {
        node = apply_tint(node, tint, p.tint_alpha_modulate, tint_mask.as_ref(), offset);
    }

    let static_mask = match &p.progressive {
        None => p.mask.as_ref(),
        Some(ProgressiveSpec::CustomBrush(b)) => Some(b),
        Some(_) => None,
    };
    if let Some(mask) = static_mask {
        node = FilterGraphNode::Blend {
            background: Box::new(node),
            foreground: Box::new(FilterGraphNode::ShaderEffect(Shader::Brush(
                mask.scaled(scale),
            ))),
            mode: BlendMode::DstIn,
            offset,
        };
    }

    node
}

fn build_liquid_glass(p: &LiquidGlassParameters, geometry: &ResolvedGeometry) -> FilterGraphNode {
    let scale = f64::from(p.scale);
    let radius_px = p.blur_radius.to_px(geometry.density) * p.scale;
    let layer = scaled_size(geometry.layer_size, scale);

    let corner_radii = match p.shape {
        GlassShape::Rectangle => [0.0; 4],
        GlassShape::RoundedRectangle(r) => [
            r.top_left * scale,
            r.top_right * scale,
            r.bottom_right * scale,
            r.bottom_left * scale,
        ],
        GlassShape::Capsule => [layer.width.min(layer.height) / 2.0; 4],
    };
    let light = p
        .light_position
        .map(|pt| Point::new(pt.x * scale, pt.y * scale))
        .unwrap_or(Point::ZERO);

    let uniforms = LiquidGlassUniforms {
        size: layer,
        refraction_strength: p.refraction_strength,
        specular_intensity: p.specular_intensity,
        depth: p.depth,
        ambient_response: p.ambient_response,
        edge_softness_px: p.edge_softness.to_px(geometry.density) * p.scale,
        light_position: light,
        chromatic_aberration: p.chromatic_aberration,
        corner_radii,
    };

    let node = FilterGraphNode::Chain {
        inner: Box::new(blur_or_source(FilterGraphNode::Source, radius_px, TileMode::Clamp)),
        outer: Box::new(FilterGraphNode::ShaderEffect(Shader::LiquidGlass(uniforms))),
    };
    apply_tint(node, &p.tint, 1.0, None, Vec2::ZERO)
}

fn blur_or_source(input: FilterGraphNode, radius_px: f32, tile_mode: TileMode) -> FilterGraphNode {
    if radius_px > 0.0 {
        FilterGraphNode::Blur {
            input: Box::new(input),
            radius_x: radius_px,
            radius_y: radius_px,
            tile_mode,
        }
    } else {
        input
    }
}

/// Fold one tint onto `node`.
///
/// Colour tints without a mask are colour filters. Masked colour tints blend a `SrcIn`-filtered
/// copy of the mask. Brush tints blend a shader, masked with `DstIn` when a mask is present.
fn apply_tint(
    node: FilterGraphNode,
    tint: &Tint,
    alpha_modulate: f32,
    mask: Option<&Brush>,
    offset: Vec2,
) -> FilterGraphNode {
    match tint {
        Tint::Unspecified => node,
        Tint::Color { color, blend_mode } => {
            let color = color.mul_alpha(alpha_modulate);
            if !color.is_visible() {
                return node;
            }
            match mask {
                Some(mask) => FilterGraphNode::Blend {
                    background: Box::new(node),
                    foreground: Box::new(FilterGraphNode::ColorFilter {
                        input: Box::new(FilterGraphNode::ShaderEffect(Shader::Brush(
                            mask.clone(),
                        ))),
                        filter: ColorFilter::Blend {
                            color,
                            mode: BlendMode::SrcIn,
                        },
                    }),
                    mode: *blend_mode,
                    offset,
                },
                None => FilterGraphNode::ColorFilter {
                    input: Box::new(node),
                    filter: ColorFilter::Blend {
                        color,
                        mode: *blend_mode,
                    },
                },
            }
        }
        Tint::Brush {
            brush,
            blend_mode,
            color_filter,
        } => {
            let brush = brush.mul_alpha(alpha_modulate);
            if !brush.is_visible() {
                return node;
            }
            let mut fg = FilterGraphNode::ShaderEffect(Shader::Brush(brush));
            if let Some(filter) = color_filter {
                fg = FilterGraphNode::ColorFilter {
                    input: Box::new(fg),
                    filter: *filter,
                };
            }
            if let Some(mask) = mask {
                fg = FilterGraphNode::Blend {
                    background: Box::new(fg),
                    foreground: Box::new(FilterGraphNode::ShaderEffect(Shader::Brush(
                        mask.clone(),
                    ))),
                    mode: BlendMode::DstIn,
                    offset: Vec2::ZERO,
                };
            }
            FilterGraphNode::Blend {
                background: Box::new(node),
                foreground: Box::new(fg),
                mode: *blend_mode,
                offset,
            }
        }
    }
}

fn gradient_mask(spec: &ProgressiveSpec, layer_size: Size, scale: f64) -> Option<GradientMask> {
    let sp = |p: Point| Point::new(p.x * scale, p.y * scale);
    match spec {
        ProgressiveSpec::LinearGradient {
            start,
            end,
            start_intensity,
            end_intensity,
            easing,
            ..
        } => {
            let (start, end) = ProgressiveSpec::resolve_linear(*start, *end, layer_size);
            Some(GradientMask::Linear {
                start: sp(start),
                end: sp(end),
                start_intensity: *start_intensity,
                end_intensity: *end_intensity,
                easing: *easing,
            })
        }
        ProgressiveSpec::RadialGradient {
            center,
            radius,
            center_intensity,
            radius_intensity,
            easing,
        } => {
            let (center, radius) = ProgressiveSpec::resolve_radial(*center, *radius, layer_size);
            Some(GradientMask::Radial {
                center: sp(center),
                radius: radius * scale,
                center_intensity: *center_intensity,
                radius_intensity: *radius_intensity,
                easing: *easing,
            })
        }
        ProgressiveSpec::CustomBrush(_) => None,
    }
}

fn scaled_size(size: Size, scale: f64) -> Size {
    Size::new(size.width * scale, size.height * scale)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/builder.rs"]
mod tests;
