use super::*;

#[test]
fn unspecified_and_transparent_tints_draw_nothing() {
    assert!(!Tint::Unspecified.is_specified());
    assert!(!Tint::color(Color::TRANSPARENT).is_specified());
    assert!(Tint::color(Color::WHITE.with_alpha(0.1)).is_specified());
}

#[test]
fn fallback_boost_scales_with_radius() {
    let tint = Tint::color(Color::WHITE.with_alpha(0.1));
    let Tint::Color { color, .. } = tint.boosted_for_fallback(Dp(8.0)) else {
        panic!("expected colour tint");
    };
    let expected = 0.1 * (1.0 + 8.0 / 72.0);
    assert!((color.a - expected).abs() < 1e-6);
}

#[test]
fn fallback_boost_is_capped_at_opaque() {
    let tint = Tint::color(Color::BLACK.with_alpha(0.8));
    let Tint::Color { color, .. } = tint.boosted_for_fallback(Dp(72.0)) else {
        panic!("expected colour tint");
    };
    assert_eq!(color.a, 1.0);
}

#[test]
fn brush_tints_are_not_boosted() {
    let tint = Tint::brush(Brush::Solid(Color::WHITE.with_alpha(0.2)));
    assert_eq!(tint.boosted_for_fallback(Dp(36.0)), tint);
}

#[test]
fn with_blend_mode_keeps_payload() {
    let tint = Tint::color(Color::WHITE).with_blend_mode(BlendMode::Multiply);
    assert_eq!(tint.blend_mode(), BlendMode::Multiply);
    assert_eq!(
        Tint::Unspecified.with_blend_mode(BlendMode::Multiply),
        Tint::Unspecified
    );
}
