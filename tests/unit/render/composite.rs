use super::*;

#[test]
fn over_with_zero_opacity_keeps_dst() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 255], 0.0), dst);
}

#[test]
fn opaque_src_over_replaces_dst() {
    assert_eq!(
        over([10, 20, 30, 255], [200, 100, 50, 255], 1.0),
        [200, 100, 50, 255]
    );
}

#[test]
fn porter_duff_in_modes_follow_alpha() {
    let opaque = [255, 0, 0, 255];
    let clear = [0, 0, 0, 0];
    assert_eq!(blend(opaque, clear, BlendMode::DstIn), clear);
    assert_eq!(blend(opaque, [0, 0, 0, 255], BlendMode::DstIn), opaque);
    assert_eq!(blend(clear, opaque, BlendMode::SrcIn), clear);
    assert_eq!(blend(opaque, opaque, BlendMode::Clear), clear);
}

#[test]
fn src_atop_keeps_destination_alpha() {
    let dst = [0, 0, 128, 128];
    let src = [255, 255, 255, 255];
    let out = blend(dst, src, BlendMode::SrcAtop);
    assert_eq!(out[3], 128);
    assert_eq!(out[0], 128);
}

#[test]
fn multiply_with_white_is_identity_on_opaque() {
    let dst = [90, 140, 200, 255];
    assert_eq!(blend(dst, [255, 255, 255, 255], BlendMode::Multiply), dst);
}

#[test]
fn zero_saturation_is_grey() {
    let px = filter_pixel([255, 0, 0, 255], &ColorFilter::Saturation(0.0));
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
    assert_eq!(px[3], 255);
}

#[test]
fn linear_gradient_samples_clamp_to_end_stops() {
    let b = Brush::vertical_gradient(
        0.0,
        10.0,
        vec![
            GradientStop::new(0.0, Color::BLACK),
            GradientStop::new(1.0, Color::TRANSPARENT),
        ],
    );
    assert_eq!(sample_brush(&b, Point::new(0.0, -5.0)).a, 1.0);
    assert_eq!(sample_brush(&b, Point::new(0.0, 20.0)).a, 0.0);
    assert!((sample_brush(&b, Point::new(3.0, 5.0)).a - 0.5).abs() < 1e-6);
}

#[test]
fn alpha_band_remaps_alpha() {
    let band = Brush::AlphaBand {
        source: Box::new(Brush::Solid(Color::BLACK.with_alpha(0.5))),
        lower: 0.25,
        upper: 0.75,
    };
    assert!((sample_brush(&band, Point::ZERO).a - 0.5).abs() < 1e-6);
}

#[test]
fn mix_interpolates_channels() {
    assert_eq!(mix([0, 0, 0, 0], [200, 100, 50, 255], 0.5), [100, 50, 25, 128]);
}
