//! Premultiplied RGBA8 pixel arithmetic for the software path.

use crate::effects::blend::BlendMode;
use crate::effects::brush::{Brush, ColorFilter, GradientStop};
use crate::foundation::core::{Color, Point};
use crate::foundation::math::mul_div255_u8;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Composite `src` onto `dst` with `mode`.
///
/// Porter-Duff modes and the separable blend modes are exact; the non-separable modes (hue,
/// saturation, color, luminosity) are drawn as source-over.
pub fn blend(dst: PremulRgba8, src: PremulRgba8, mode: BlendMode) -> PremulRgba8 {
    if mode == BlendMode::SrcOver {
        return over(dst, src, 1.0);
    }
    let s = to_unit(src);
    let d = to_unit(dst);
    let (sa, da) = (s[3], d[3]);

    let porter_duff = |fa: f32, fb: f32| -> [f32; 4] {
        std::array::from_fn(|i| s[i] * fa + d[i] * fb)
    };
    let out = match mode {
        BlendMode::Clear => [0.0; 4],
        BlendMode::Src => s,
        BlendMode::Dst => d,
        BlendMode::SrcOver => porter_duff(1.0, 1.0 - sa),
        BlendMode::DstOver => porter_duff(1.0 - da, 1.0),
        BlendMode::SrcIn => porter_duff(da, 0.0),
        BlendMode::DstIn => porter_duff(0.0, sa),
        BlendMode::SrcOut => porter_duff(1.0 - da, 0.0),
        BlendMode::DstOut => porter_duff(0.0, 1.0 - sa),
        BlendMode::SrcAtop => porter_duff(da, 1.0 - sa),
        BlendMode::DstAtop => porter_duff(1.0 - da, sa),
        BlendMode::Xor => porter_duff(1.0 - da, 1.0 - sa),
        BlendMode::Plus => porter_duff(1.0, 1.0),
        BlendMode::Modulate => std::array::from_fn(|i| s[i] * d[i]),
        BlendMode::Screen => std::array::from_fn(|i| s[i] + d[i] - s[i] * d[i]),
        BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity => {
            porter_duff(1.0, 1.0 - sa)
        }
        separable => {
            let mut out = [0.0; 4];
            for i in 0..3 {
                let cs = if sa > 0.0 { s[i] / sa } else { 0.0 };
                let cd = if da > 0.0 { d[i] / da } else { 0.0 };
                let b = separable_channel(separable, cs, cd);
                out[i] = (1.0 - da) * s[i] + (1.0 - sa) * d[i] + sa * da * b;
            }
            out[3] = sa + da - sa * da;
            out
        }
    };
    from_unit(out)
}

fn separable_channel(mode: BlendMode, cs: f32, cd: f32) -> f32 {
    match mode {
        BlendMode::Multiply => cs * cd,
        BlendMode::Overlay => hard_light(cd, cs),
        BlendMode::Darken => cs.min(cd),
        BlendMode::Lighten => cs.max(cd),
        BlendMode::ColorDodge => {
            if cd <= 0.0 {
                0.0
            } else if cs >= 1.0 {
                1.0
            } else {
                (cd / (1.0 - cs)).min(1.0)
            }
        }
        BlendMode::ColorBurn => {
            if cd >= 1.0 {
                1.0
            } else if cs <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - cd) / cs).min(1.0)
            }
        }
        BlendMode::HardLight => hard_light(cs, cd),
        BlendMode::SoftLight => {
            if cs <= 0.5 {
                cd - (1.0 - 2.0 * cs) * cd * (1.0 - cd)
            } else {
                let d = if cd <= 0.25 {
                    ((16.0 * cd - 12.0) * cd + 4.0) * cd
                } else {
                    cd.sqrt()
                };
                cd + (2.0 * cs - 1.0) * (d - cd)
            }
        }
        BlendMode::Difference => (cs - cd).abs(),
        BlendMode::Exclusion => cs + cd - 2.0 * cs * cd,
        _ => cs,
    }
}

fn hard_light(cs: f32, cd: f32) -> f32 {
    if cs <= 0.5 {
        cd * 2.0 * cs
    } else {
        let s = 2.0 * cs - 1.0;
        cd + s - cd * s
    }
}

/// Apply a colour filter to one premultiplied pixel.
pub fn filter_pixel(px: PremulRgba8, filter: &ColorFilter) -> PremulRgba8 {
    match filter {
        ColorFilter::Blend { color, mode } => blend(px, color.to_premul_rgba8(), *mode),
        ColorFilter::Saturation(s) => {
            // Rec. 709 luma weights; linear in premultiplied space.
            let c = to_unit(px);
            let luma = 0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2];
            let out: [f32; 4] = std::array::from_fn(|i| {
                if i == 3 {
                    c[3]
                } else {
                    (luma + (c[i] - luma) * s).clamp(0.0, c[3])
                }
            });
            from_unit(out)
        }
    }
}

/// Straight-alpha colour of `brush` at `p`.
pub fn sample_brush(brush: &Brush, p: Point) -> Color {
    match brush {
        Brush::Solid(c) => *c,
        Brush::LinearGradient { start, end, stops } => {
            let d = *end - *start;
            let len2 = d.hypot2();
            let t = if len2 > 0.0 {
                (p - *start).dot(d) / len2
            } else {
                0.0
            };
            sample_stops(stops, t as f32)
        }
        Brush::RadialGradient {
            center,
            radius,
            stops,
        } => {
            let t = if *radius > 0.0 {
                (p - *center).hypot() / radius
            } else {
                1.0
            };
            sample_stops(stops, t as f32)
        }
        Brush::AlphaBand {
            source,
            lower,
            upper,
        } => {
            let c = sample_brush(source, p);
            let span = upper - lower;
            let a = if span > 0.0 {
                ((c.a - lower) / span).clamp(0.0, 1.0)
            } else if c.a >= *upper {
                1.0
            } else {
                0.0
            };
            c.with_alpha(a)
        }
    }
}

/// Gradient colour at `t`, clamped to the end stops.
fn sample_stops(stops: &[GradientStop], t: f32) -> Color {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Color::TRANSPARENT;
    };
    let t = if t.is_nan() { 0.0 } else { t };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return Color {
                r: a.color.r + (b.color.r - a.color.r) * k,
                g: a.color.g + (b.color.g - a.color.g) * k,
                b: a.color.b + (b.color.b - a.color.b) * k,
                a: a.color.a + (b.color.a - a.color.a) * k,
            };
        }
    }
    last.color
}

/// Per-channel `a + (b - a) * t`.
pub fn mix(a: PremulRgba8, b: PremulRgba8, t: f32) -> PremulRgba8 {
    let t = t.clamp(0.0, 1.0);
    std::array::from_fn(|i| {
        let v = f32::from(a[i]) + (f32::from(b[i]) - f32::from(a[i])) * t;
        v.round().clamp(0.0, 255.0) as u8
    })
}

fn to_unit(px: PremulRgba8) -> [f32; 4] {
    px.map(|c| f32::from(c) / 255.0)
}

fn from_unit(c: [f32; 4]) -> PremulRgba8 {
    let a = c[3].clamp(0.0, 1.0);
    let q = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    // Premultiplied channels never exceed alpha.
    [q(c[0].min(a)), q(c[1].min(a)), q(c[2].min(a)), q(a)]
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
