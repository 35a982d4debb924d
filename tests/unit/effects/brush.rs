use super::*;

#[test]
fn mul_alpha_scales_every_stop() {
    let b = Brush::vertical_gradient(
        0.0,
        100.0,
        vec![
            GradientStop::new(0.0, Color::WHITE),
            GradientStop::new(1.0, Color::BLACK.with_alpha(0.5)),
        ],
    );
    let Brush::LinearGradient { stops, .. } = b.mul_alpha(0.5) else {
        panic!("expected linear gradient");
    };
    assert_eq!(stops[0].color.a, 0.5);
    assert_eq!(stops[1].color.a, 0.25);
}

#[test]
fn visibility_follows_stops() {
    assert!(!Brush::Solid(Color::TRANSPARENT).is_visible());
    let band = Brush::AlphaBand {
        source: Box::new(Brush::Solid(Color::WHITE)),
        lower: 0.0,
        upper: 0.5,
    };
    assert!(band.is_visible());
    assert!(!band.mul_alpha(0.0).is_visible());
}

#[test]
fn scaled_moves_geometry_not_colours() {
    let b = Brush::RadialGradient {
        center: Point::new(10.0, 20.0),
        radius: 8.0,
        stops: vec![GradientStop::new(0.0, Color::WHITE)],
    };
    let Brush::RadialGradient {
        center,
        radius,
        stops,
    } = b.scaled(0.5)
    else {
        panic!("expected radial gradient");
    };
    assert_eq!(center, Point::new(5.0, 10.0));
    assert_eq!(radius, 4.0);
    assert_eq!(stops[0].color, Color::WHITE);
}
