use crate::effects::blend::{BlendMode, TileMode};
use crate::effects::brush::{Brush, ColorFilter};
use crate::effects::progressive::Easing;
use crate::foundation::core::{Point, Rect, Size, Vec2};
use crate::foundation::math::lerp;

/// Per-pixel intensity ramp evaluated by a runtime blur shader.
///
/// Coordinates are in offscreen pixels (already multiplied by the input scale).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientMask {
    /// Intensity along `start -> end`.
    Linear {
        /// Gradient start.
        start: Point,
        /// Gradient end.
        end: Point,
        /// Intensity at `start`.
        start_intensity: f32,
        /// Intensity at `end`.
        end_intensity: f32,
        /// Easing between the intensities.
        easing: Easing,
    },
    /// Intensity by distance from `center`.
    Radial {
        /// Centre.
        center: Point,
        /// Radius.
        radius: f64,
        /// Intensity at `center`.
        center_intensity: f32,
        /// Intensity at `radius`.
        radius_intensity: f32,
        /// Easing between the intensities.
        easing: Easing,
    },
}

impl GradientMask {
    /// Eased intensity at `p`.
    pub fn intensity_at(&self, p: Point) -> f32 {
        match *self {
            Self::Linear {
                start,
                end,
                start_intensity,
                end_intensity,
                easing,
            } => {
                let d = end - start;
                let len2 = d.hypot2();
                let t = if len2 > 0.0 {
                    ((p - start).dot(d) / len2) as f32
                } else {
                    0.0
                };
                lerp(start_intensity, end_intensity, easing.apply(t))
            }
            Self::Radial {
                center,
                radius,
                center_intensity,
                radius_intensity,
                easing,
            } => {
                let t = if radius > 0.0 {
                    ((p - center).hypot() / radius) as f32
                } else {
                    1.0
                };
                lerp(center_intensity, radius_intensity, easing.apply(t))
            }
        }
    }
}

/// Uniform block of the liquid-glass shader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiquidGlassUniforms {
    /// Offscreen size in pixels.
    pub size: Size,
    /// Refraction strength.
    pub refraction_strength: f32,
    /// Specular intensity.
    pub specular_intensity: f32,
    /// Glass depth.
    pub depth: f32,
    /// Ambient colour pickup.
    pub ambient_response: f32,
    /// Rim width in offscreen pixels.
    pub edge_softness_px: f32,
    /// Light source in offscreen pixels.
    pub light_position: Point,
    /// Chromatic aberration.
    pub chromatic_aberration: f32,
    /// Corner radii (top-left, top-right, bottom-right, bottom-left) in offscreen pixels.
    pub corner_radii: [f64; 4],
}

/// Shader sources that can appear as graph leaves.
#[derive(Clone, Debug, PartialEq)]
pub enum Shader {
    /// Tiled monochrome noise texture.
    Noise {
        /// Texture scale, the inverse of the input scale so grain stays screen-sized.
        scale: f32,
        /// Noise alpha.
        alpha: f32,
    },
    /// Brush paint.
    Brush(Brush),
    /// Alpha ramp consumed by a runtime blur.
    GradientMask(GradientMask),
    /// Liquid-glass refraction, sampling the chain input as its content.
    LiquidGlass(LiquidGlassUniforms),
}

/// Node of an immutable filter graph.
///
/// `Source` is the content the graph is applied to. Inside a [`FilterGraphNode::Chain`], the
/// outer graph's `Source` (and any content-sampling shader) reads the inner graph's output.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterGraphNode {
    /// The input content.
    Source,
    /// Separable Gaussian blur.
    Blur {
        /// Input node.
        input: Box<FilterGraphNode>,
        /// Horizontal radius in pixels.
        radius_x: f32,
        /// Vertical radius in pixels.
        radius_y: f32,
        /// Edge sampling.
        tile_mode: TileMode,
    },
    /// Shader output covering the whole layer.
    ShaderEffect(Shader),
    /// Colour filter over an input.
    ColorFilter {
        /// Input node.
        input: Box<FilterGraphNode>,
        /// Filter.
        filter: ColorFilter,
    },
    /// Porter-Duff or separable blend of `foreground` onto `background`.
    Blend {
        /// Destination.
        background: Box<FilterGraphNode>,
        /// Source, translated by `offset`.
        foreground: Box<FilterGraphNode>,
        /// Blend mode.
        mode: BlendMode,
        /// Translation applied to `foreground`.
        offset: Vec2,
    },
    /// Translate an input.
    Offset {
        /// Input node.
        input: Box<FilterGraphNode>,
        /// Translation.
        offset: Vec2,
    },
    /// Feed `inner`'s output into `outer`.
    Chain {
        /// Evaluated first.
        inner: Box<FilterGraphNode>,
        /// Evaluated with `inner` as its source.
        outer: Box<FilterGraphNode>,
    },
    /// Variable-radius blur driven by a mask shader.
    RuntimeBlur {
        /// Input node.
        input: Box<FilterGraphNode>,
        /// Radius at full intensity, in pixels.
        radius: f32,
        /// Region the blur samples from.
        crop: Rect,
        /// Intensity mask; `None` means uniform full intensity.
        mask: Option<Shader>,
        /// Edge sampling.
        tile_mode: TileMode,
    },
}

/// Stage counts of a filter graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// All nodes.
    pub nodes: u32,
    /// Fixed and runtime blur nodes.
    pub blurs: u32,
    /// Noise shader leaves.
    pub noise: u32,
    /// Tint stages (colour-filter or shader blends).
    pub tints: u32,
    /// Alpha mask stages.
    pub masks: u32,
}

impl FilterGraphNode {
    /// Return `true` when the graph passes its input through unchanged.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Source)
    }

    /// Count the stages in the graph.
    pub fn stats(&self) -> GraphStats {
        let mut s = GraphStats::default();
        self.collect_stats(&mut s);
        s
    }

    fn collect_stats(&self, s: &mut GraphStats) {
        s.nodes += 1;
        match self {
            Self::Source => {}
            Self::Blur { input, .. } | Self::RuntimeBlur { input, .. } => {
                s.blurs += 1;
                input.collect_stats(s);
            }
            Self::ShaderEffect(shader) => {
                if matches!(shader, Shader::Noise { .. }) {
                    s.noise += 1;
                }
            }
            Self::ColorFilter { input, filter } => {
                if matches!(filter, ColorFilter::Blend { .. }) && !input.is_shader_leaf() {
                    s.tints += 1;
                }
                input.collect_stats(s);
            }
            Self::Blend {
                background,
                foreground,
                mode,
                ..
            } => {
                match stage_kind(foreground, *mode) {
                    StageKind::Noise => {}
                    StageKind::Mask => s.masks += 1,
                    StageKind::Tint => s.tints += 1,
                }
                background.collect_stats(s);
                foreground.collect_stats(s);
            }
            Self::Offset { input, .. } => input.collect_stats(s),
            Self::Chain { inner, outer } => {
                inner.collect_stats(s);
                outer.collect_stats(s);
            }
        }
    }

    fn is_shader_leaf(&self) -> bool {
        matches!(self, Self::ShaderEffect(_))
    }

    /// Stage-nesting summary such as `Tint(Noise(Blur(Source)))`.
    ///
    /// Foreground subtrees of blends are folded into the stage name, so the summary reads as the
    /// order in which stages wrap the content.
    pub fn summary(&self) -> String {
        self.summary_with_source("Source")
    }

    fn summary_with_source(&self, source: &str) -> String {
        match self {
            Self::Source => source.to_owned(),
            Self::Blur { input, .. } => format!("Blur({})", input.summary_with_source(source)),
            Self::RuntimeBlur { input, .. } => {
                format!("ProgressiveBlur({})", input.summary_with_source(source))
            }
            Self::ShaderEffect(Shader::LiquidGlass(_)) => format!("LiquidGlass({source})"),
            Self::ShaderEffect(Shader::Noise { .. }) => "Noise".to_owned(),
            Self::ShaderEffect(_) => "Shader".to_owned(),
            Self::ColorFilter { input, filter } => {
                let inner = input.summary_with_source(source);
                match filter {
                    ColorFilter::Blend { .. } => format!("Tint({inner})"),
                    ColorFilter::Saturation(_) => format!("Saturation({inner})"),
                }
            }
            Self::Blend {
                background,
                foreground,
                mode,
                ..
            } => {
                let bg = background.summary_with_source(source);
                match stage_kind(foreground, *mode) {
                    StageKind::Noise => format!("Noise({bg})"),
                    StageKind::Mask => format!("Mask({bg})"),
                    StageKind::Tint => format!("Tint({bg})"),
                }
            }
            Self::Offset { input, .. } => format!("Offset({})", input.summary_with_source(source)),
            Self::Chain { inner, outer } => {
                let inner = inner.summary_with_source(source);
                outer.summary_with_source(&inner)
            }
        }
    }
}

enum StageKind {
    Noise,
    Mask,
    Tint,
}

fn stage_kind(foreground: &FilterGraphNode, mode: BlendMode) -> StageKind {
    match foreground {
        FilterGraphNode::ShaderEffect(Shader::Noise { .. }) => StageKind::Noise,
        FilterGraphNode::ShaderEffect(Shader::Brush(_)) if mode == BlendMode::DstIn => {
            StageKind::Mask
        }
        _ => StageKind::Tint,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/graph.rs"]
mod tests;
