use rayon::prelude::*;

use crate::effects::blend::TileMode;
use crate::foundation::error::{HazeError, HazeResult};
use crate::render::backend::PixelBuffer;

/// Convert a blur radius in pixels to a Gaussian sigma, matching the platform blur filters.
pub fn radius_to_sigma(radius_px: f32) -> f32 {
    if radius_px > 0.0 {
        0.577_35 * radius_px + 0.5
    } else {
        0.0
    }
}

/// Blur a premultiplied RGBA8 image with Gaussians of the given pixel radii.
///
/// A non-positive radius leaves that axis unblurred.
#[tracing::instrument(level = "trace", skip(src), fields(w = src.width(), h = src.height()))]
pub fn blur_image(
    src: &PixelBuffer,
    radius_x: f32,
    radius_y: f32,
    tile: TileMode,
) -> HazeResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    let kx = kernel_for_radius(radius_x)?;
    let ky = kernel_for_radius(radius_y)?;
    if kx.len() == 1 && ky.len() == 1 {
        return Ok(src.clone());
    }
    let out = blur_separable(src.as_raw(), w, h, &kx, &ky, tile)?;
    PixelBuffer::from_raw(w, h, out)
        .ok_or_else(|| HazeError::job("blurred buffer does not match its dimensions"))
}

fn kernel_for_radius(radius_px: f32) -> HazeResult<Vec<u32>> {
    if !radius_px.is_finite() || radius_px <= 0.0 {
        return Ok(vec![1 << 16]);
    }
    let sigma = radius_to_sigma(radius_px);
    gaussian_kernel_q16((sigma * 3.0).ceil() as u32, sigma)
}

/// Separable Gaussian blur over a premultiplied RGBA8 buffer.
///
/// Weights are Q16 fixed point and sum to exactly `1 << 16`, so a constant image stays constant
/// under [`TileMode::Clamp`] and [`TileMode::Repeat`]. Rows are processed in parallel.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
    tile: TileMode,
) -> HazeResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| HazeError::job("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(HazeError::precondition(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    blur_separable(src, width, height, &kernel, &kernel, tile)
}

fn blur_separable(
    src: &[u8],
    width: u32,
    height: u32,
    kx: &[u32],
    ky: &[u32],
    tile: TileMode,
) -> HazeResult<Vec<u8>> {
    let len = src.len();
    if len != width as usize * height as usize * 4 {
        return Err(HazeError::precondition("blur buffer does not match its dimensions"));
    }
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut tmp = vec![0u8; len];
    let mut out = vec![0u8; len];

    horizontal_pass(src, &mut tmp, width, kx, tile);
    vertical_pass(&tmp, &mut out, width, height, ky, tile);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> HazeResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(HazeError::precondition("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(HazeError::job("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Rounding drift goes to the centre tap.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

/// Map a sample coordinate into `0..len`, or `None` when it falls outside under decal tiling.
fn sample_index(i: i32, len: i32, tile: TileMode) -> Option<i32> {
    if (0..len).contains(&i) {
        return Some(i);
    }
    match tile {
        TileMode::Clamp => Some(i.clamp(0, len - 1)),
        TileMode::Decal => None,
        TileMode::Repeat => Some(i.rem_euclid(len)),
    }
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32], tile: TileMode) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let row_bytes = width as usize * 4;
    dst.par_chunks_mut(row_bytes)
        .zip(src.par_chunks(row_bytes))
        .for_each(|(out_row, in_row)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let Some(sx) = sample_index(x + ki as i32 - radius, w, tile) else {
                        continue;
                    };
                    let idx = sx as usize * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(in_row[idx + c]);
                    }
                }
                let o = x as usize * 4;
                for c in 0..4 {
                    out_row[o + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], tile: TileMode) {
    let radius = (k.len() / 2) as i32;
    let h = height as i32;
    let row_bytes = width as usize * 4;
    dst.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, out_row)| {
            for x in 0..width as usize {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let Some(sy) = sample_index(y as i32 + ki as i32 - radius, h, tile) else {
                        continue;
                    };
                    let idx = sy as usize * row_bytes + x * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                    }
                }
                for c in 0..4 {
                    out_row[x * 4 + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur_cpu.rs"]
mod tests;
