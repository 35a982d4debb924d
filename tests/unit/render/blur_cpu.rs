use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0, TileMode::Clamp).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity_when_clamped_or_repeated() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8, 40u8];
    let src = px.repeat((w * h) as usize);
    for tile in [TileMode::Clamp, TileMode::Repeat] {
        let out = blur_rgba8_premul(&src, w, h, 3, 2.0, tile).unwrap();
        assert_eq!(out, src, "{tile:?}");
    }
}

#[test]
fn decal_tiling_fades_edges() {
    let (w, h) = (6u32, 6u32);
    let src = [200u8, 200, 200, 255].repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 2, 1.5, TileMode::Decal).unwrap();
    let corner = out[3];
    let centre = out[((3 * w + 3) * 4 + 3) as usize];
    assert!(corner < centre, "corner {corner} centre {centre}");
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2, TileMode::Clamp).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);

    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}

#[test]
fn mismatched_buffer_is_rejected() {
    assert!(blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0, TileMode::Clamp).is_err());
}

#[test]
fn image_blur_keeps_dimensions() {
    let img = PixelBuffer::from_pixel(9, 4, image::Rgba([0, 0, 0, 255]));
    let out = blur_image(&img, 3.0, 3.0, TileMode::Clamp).unwrap();
    assert_eq!(out.dimensions(), (9, 4));
    assert_eq!(out, img);
    assert_eq!(radius_to_sigma(0.0), 0.0);
}

#[test]
fn horizontal_only_blur_keeps_rows_apart() {
    let mut img = PixelBuffer::new(5, 3);
    img.put_pixel(2, 1, image::Rgba([255, 255, 255, 255]));
    let out = blur_image(&img, 2.0, 0.0, TileMode::Decal).unwrap();
    assert!(out.get_pixel(1, 1).0[3] > 0);
    assert_eq!(out.get_pixel(2, 0).0[3], 0);
    assert_eq!(out.get_pixel(2, 2).0[3], 0);
}
