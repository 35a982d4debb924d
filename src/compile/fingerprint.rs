use crate::compile::builder::GraphInputs;
use crate::effects::brush::{Brush, ColorFilter, GradientStop};
use crate::effects::kind::VisualEffect;
use crate::effects::liquid_glass::{GlassShape, LiquidGlassParameters};
use crate::effects::params::EffectParameters;
use crate::effects::progressive::ProgressiveSpec;
use crate::effects::tint::Tint;
use crate::foundation::core::{Color, Point, Size, Vec2};
use crate::scene::geometry::ResolvedGeometry;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5a2e_71c3_9b04_d6f8;

/// Stable 128-bit fingerprint of a graph's inputs.
///
/// Used as the bucket key of the render-effect cache. Buckets compare full inputs, so a
/// collision costs a rebuild, never a wrong effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphKey {
    pub(crate) hi: u64,
    pub(crate) lo: u64,
}

/// Fingerprint everything a filter graph is built from.
pub(crate) fn fingerprint_inputs(inputs: &GraphInputs) -> GraphKey {
    let mut h = StableHasher::new();
    write_effect(&mut h, &inputs.effect);
    write_geometry(&mut h, &inputs.geometry);
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        // -0.0 and 0.0 compare equal, so they must hash equal.
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u32(v.to_bits());
    }

    fn write_f64(&mut self, v: f64) {
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    fn finish(self) -> GraphKey {
        let v = self.inner.digest128();
        GraphKey {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_effect(h: &mut StableHasher, effect: &VisualEffect) {
    match effect {
        VisualEffect::Blur(p) => {
            h.write_u8(0);
            write_params(h, p);
        }
        VisualEffect::LiquidGlass(p) => {
            h.write_u8(1);
            write_liquid_glass(h, p);
        }
    }
}

fn write_params(h: &mut StableHasher, p: &EffectParameters) {
    h.write_f32(p.blur_radius.value());
    h.write_f32(p.noise_factor);
    h.write_u32(p.tints.len() as u32);
    for t in &p.tints {
        write_tint(h, t);
    }
    write_opt_brush(h, p.mask.as_ref());
    match &p.progressive {
        Some(spec) => {
            h.write_u8(1);
            write_progressive(h, spec);
        }
        None => h.write_u8(0),
    }
    h.write_f32(p.tint_alpha_modulate);
    write_size(h, p.content_size);
    write_vec2(h, p.content_offset);
    h.write_f32(p.scale);
    h.write_u8(p.blur_tile_mode.tag());
}

fn write_liquid_glass(h: &mut StableHasher, p: &LiquidGlassParameters) {
    h.write_f32(p.refraction_strength);
    h.write_f32(p.specular_intensity);
    h.write_f32(p.depth);
    h.write_f32(p.ambient_response);
    write_tint(h, &p.tint);
    h.write_f32(p.edge_softness.value());
    match p.light_position {
        Some(pt) => {
            h.write_u8(1);
            write_point(h, pt);
        }
        None => h.write_u8(0),
    }
    h.write_f32(p.blur_radius.value());
    h.write_f32(p.chromatic_aberration);
    match p.shape {
        GlassShape::Rectangle => h.write_u8(0),
        GlassShape::RoundedRectangle(r) => {
            h.write_u8(1);
            h.write_f64(r.top_left);
            h.write_f64(r.top_right);
            h.write_f64(r.bottom_right);
            h.write_f64(r.bottom_left);
        }
        GlassShape::Capsule => h.write_u8(2),
    }
    write_size(h, p.content_size);
    write_vec2(h, p.content_offset);
    h.write_f32(p.scale);
}

fn write_geometry(h: &mut StableHasher, g: &ResolvedGeometry) {
    write_size(h, g.layer_size);
    h.write_f32(g.density);
    h.write_f32(g.input_scale);
}

fn write_tint(h: &mut StableHasher, t: &Tint) {
    match t {
        Tint::Unspecified => h.write_u8(0),
        Tint::Color { color, blend_mode } => {
            h.write_u8(1);
            write_color(h, *color);
            h.write_u8(blend_mode.tag());
        }
        Tint::Brush {
            brush,
            blend_mode,
            color_filter,
        } => {
            h.write_u8(2);
            write_brush(h, brush);
            h.write_u8(blend_mode.tag());
            match color_filter {
                None => h.write_u8(0),
                Some(ColorFilter::Blend { color, mode }) => {
                    h.write_u8(1);
                    write_color(h, *color);
                    h.write_u8(mode.tag());
                }
                Some(ColorFilter::Saturation(s)) => {
                    h.write_u8(2);
                    h.write_f32(*s);
                }
            }
        }
    }
}

fn write_progressive(h: &mut StableHasher, spec: &ProgressiveSpec) {
    match spec {
        ProgressiveSpec::LinearGradient {
            start,
            end,
            start_intensity,
            end_intensity,
            easing,
            prefer_performance,
        } => {
            h.write_u8(0);
            write_point(h, *start);
            write_point(h, *end);
            h.write_f32(*start_intensity);
            h.write_f32(*end_intensity);
            h.write_u8(easing.tag());
            h.write_bool(*prefer_performance);
        }
        ProgressiveSpec::RadialGradient {
            center,
            radius,
            center_intensity,
            radius_intensity,
            easing,
        } => {
            h.write_u8(1);
            match center {
                Some(c) => {
                    h.write_u8(1);
                    write_point(h, *c);
                }
                None => h.write_u8(0),
            }
            h.write_f64(*radius);
            h.write_f32(*center_intensity);
            h.write_f32(*radius_intensity);
            h.write_u8(easing.tag());
        }
        ProgressiveSpec::CustomBrush(b) => {
            h.write_u8(2);
            write_brush(h, b);
        }
    }
}

fn write_opt_brush(h: &mut StableHasher, b: Option<&Brush>) {
    match b {
        Some(b) => {
            h.write_u8(1);
            write_brush(h, b);
        }
        None => h.write_u8(0),
    }
}

fn write_brush(h: &mut StableHasher, b: &Brush) {
    match b {
        Brush::Solid(c) => {
            h.write_u8(0);
            write_color(h, *c);
        }
        Brush::LinearGradient { start, end, stops } => {
            h.write_u8(1);
            write_point(h, *start);
            write_point(h, *end);
            write_stops(h, stops);
        }
        Brush::RadialGradient {
            center,
            radius,
            stops,
        } => {
            h.write_u8(2);
            write_point(h, *center);
            h.write_f64(*radius);
            write_stops(h, stops);
        }
        Brush::AlphaBand {
            source,
            lower,
            upper,
        } => {
            h.write_u8(3);
            write_brush(h, source);
            h.write_f32(*lower);
            h.write_f32(*upper);
        }
    }
}

fn write_stops(h: &mut StableHasher, stops: &[GradientStop]) {
    h.write_u32(stops.len() as u32);
    for s in stops {
        h.write_f32(s.offset);
        write_color(h, s.color);
    }
}

fn write_color(h: &mut StableHasher, c: Color) {
    h.write_f32(c.r);
    h.write_f32(c.g);
    h.write_f32(c.b);
    h.write_f32(c.a);
}

fn write_point(h: &mut StableHasher, p: Point) {
    h.write_f64(p.x);
    h.write_f64(p.y);
}

fn write_vec2(h: &mut StableHasher, v: Vec2) {
    h.write_f64(v.x);
    h.write_f64(v.y);
}

fn write_size(h: &mut StableHasher, s: Size) {
    h.write_f64(s.width);
    h.write_f64(s.height);
}

#[cfg(test)]
#[path = "../../tests/unit/compile/fingerprint.rs"]
mod tests;
