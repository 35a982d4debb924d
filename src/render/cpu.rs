//! CPU evaluation of filter graphs for the software strategy.
//!
//! Every node evaluates to a buffer the size of the source. Shaders are sampled at pixel
//! centres in the same offscreen pixel space the graph builder emits.

use rayon::prelude::*;

use crate::compile::graph::{FilterGraphNode, Shader};
use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{HazeError, HazeResult};
use crate::render::backend::PixelBuffer;
use crate::render::blur_cpu::blur_image;
use crate::render::composite::{PremulRgba8, blend, filter_pixel, mix, sample_brush};
use crate::render::registry::NoiseTexture;

/// Inputs shared by one evaluation.
#[derive(Clone, Copy)]
pub struct CpuContext<'a> {
    /// Noise tile. Noise stages are skipped when absent.
    pub noise: Option<&'a NoiseTexture>,
}

/// Evaluate `graph` over `source`.
///
/// Runtime shaders that sample content (liquid glass) have no CPU form and fail with
/// [`HazeError::Capability`].
pub fn evaluate(
    graph: &FilterGraphNode,
    source: &PixelBuffer,
    ctx: CpuContext<'_>,
) -> HazeResult<PixelBuffer> {
    match graph {
        FilterGraphNode::Source => Ok(source.clone()),
        FilterGraphNode::Blur {
            input,
            radius_x,
            radius_y,
            tile_mode,
        } => {
            let input = evaluate(input, source, ctx)?;
            blur_image(&input, *radius_x, *radius_y, *tile_mode)
        }
        FilterGraphNode::ShaderEffect(shader) => {
            let (w, h) = source.dimensions();
            render_shader(shader, w, h, ctx)
        }
        FilterGraphNode::ColorFilter { input, filter } => {
            let mut out = evaluate(input, source, ctx)?;
            for_each_row(&mut out, |_, row| {
                for px in row.chunks_exact_mut(4) {
                    let f = filter_pixel([px[0], px[1], px[2], px[3]], filter);
                    px.copy_from_slice(&f);
                }
            });
            Ok(out)
        }
        FilterGraphNode::Blend {
            background,
            foreground,
            mode,
            offset,
        } => {
            let mut out = evaluate(background, source, ctx)?;
            let fg = evaluate(foreground, source, ctx)?;
            let (dx, dy) = pixel_offset(*offset);
            for_each_row(&mut out, |y, row| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let src = texel(&fg, x as i64 - dx, i64::from(y) - dy);
                    let b = blend([px[0], px[1], px[2], px[3]], src, *mode);
                    px.copy_from_slice(&b);
                }
            });
            Ok(out)
        }
        FilterGraphNode::Offset { input, offset } => {
            let input = evaluate(input, source, ctx)?;
            let (dx, dy) = pixel_offset(*offset);
            let mut out = PixelBuffer::new(input.width(), input.height());
            for_each_row(&mut out, |y, row| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    px.copy_from_slice(&texel(&input, x as i64 - dx, i64::from(y) - dy));
                }
            });
            Ok(out)
        }
        FilterGraphNode::Chain { inner, outer } => {
            let inner = evaluate(inner, source, ctx)?;
            evaluate(outer, &inner, ctx)
        }
        FilterGraphNode::RuntimeBlur {
            input,
            radius,
            crop,
            mask,
            tile_mode,
        } => {
            let input = evaluate(input, source, ctx)?;
            let blurred = blur_image(&input, *radius, *radius, *tile_mode)?;
            let mask = match mask {
                Some(Shader::GradientMask(m)) => Some(*m),
                Some(other) => {
                    return Err(HazeError::capability(format!(
                        "runtime blur mask {other:?} has no CPU form"
                    )));
                }
                None => None,
            };
            let mut out = input;
            for_each_row(&mut out, |y, row| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let p = pixel_centre(x as u32, y);
                    if !contains(crop, p) {
                        continue;
                    }
                    let t = mask.map_or(1.0, |m| m.intensity_at(p));
                    let b = blurred.get_pixel(x as u32, y).0;
                    let m = mix([px[0], px[1], px[2], px[3]], b, t);
                    px.copy_from_slice(&m);
                }
            });
            Ok(out)
        }
    }
}

fn render_shader(shader: &Shader, w: u32, h: u32, ctx: CpuContext<'_>) -> HazeResult<PixelBuffer> {
    let mut out = PixelBuffer::new(w, h);
    match shader {
        Shader::Noise { scale, alpha } => {
            let Some(noise) = ctx.noise else {
                tracing::debug!("no noise texture, noise stage left transparent");
                return Ok(out);
            };
            let a = alpha.clamp(0.0, 1.0);
            let scale = f64::from(*scale);
            for_each_row(&mut out, |y, row| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let tx = (x as f64 * scale).floor() as i64;
                    let ty = (f64::from(y) * scale).floor() as i64;
                    let n = f32::from(noise.sample(tx, ty)) / 255.0;
                    let c = (n * a * 255.0).round() as u8;
                    px.copy_from_slice(&[c, c, c, (a * 255.0).round() as u8]);
                }
            });
        }
        Shader::Brush(brush) => {
            for_each_row(&mut out, |y, row| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let c = sample_brush(brush, pixel_centre(x as u32, y));
                    px.copy_from_slice(&c.to_premul_rgba8());
                }
            });
        }
        Shader::GradientMask(m) => {
            for_each_row(&mut out, |y, row| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let a = m.intensity_at(pixel_centre(x as u32, y)).clamp(0.0, 1.0);
                    px[3] = (a * 255.0).round() as u8;
                }
            });
        }
        Shader::LiquidGlass(_) => {
            return Err(HazeError::capability(
                "liquid glass needs a runtime shader and has no CPU form",
            ));
        }
    }
    Ok(out)
}

fn for_each_row<F>(img: &mut PixelBuffer, f: F)
where
    F: Fn(u32, &mut [u8]) + Sync,
{
    let row_bytes = img.width() as usize * 4;
    if row_bytes == 0 {
        return;
    }
    img.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| f(y as u32, row));
}

/// Pixel at `(x, y)`, transparent outside the buffer.
fn texel(img: &PixelBuffer, x: i64, y: i64) -> PremulRgba8 {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return [0; 4];
    }
    img.get_pixel(x as u32, y as u32).0
}

fn pixel_offset(offset: Vec2) -> (i64, i64) {
    (offset.x.round() as i64, offset.y.round() as i64)
}

fn pixel_centre(x: u32, y: u32) -> Point {
    Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5)
}

fn contains(r: &Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x < r.x1 && p.y >= r.y0 && p.y < r.y1
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
