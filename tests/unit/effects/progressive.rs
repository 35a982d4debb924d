use super::*;

#[test]
fn easing_endpoints_are_fixed() {
    for e in [
        Easing::Linear,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
    ] {
        assert_eq!(e.apply(0.0), 0.0);
        assert!((e.apply(1.0) - 1.0).abs() < 1e-6);
    }
    assert_eq!(Easing::InQuad.apply(0.5), 0.25);
}

#[test]
fn out_of_range_intensities_fail_fast() {
    assert!(ProgressiveSpec::vertical_gradient(Easing::Linear, 0.0, -0.1, 100.0, 1.0).is_err());
    assert!(ProgressiveSpec::vertical_gradient(Easing::Linear, 0.0, 0.0, 100.0, 1.5).is_err());
    assert!(
        ProgressiveSpec::radial_gradient(None, 1.0, f64::INFINITY, 2.0, Easing::Linear).is_err()
    );
    assert!(ProgressiveSpec::vertical_gradient(Easing::Linear, 0.0, 0.0, 100.0, 1.0).is_ok());
}

#[test]
fn infinite_points_resolve_to_layer_edges() {
    let size = Size::new(200.0, 400.0);
    let (s, e) = ProgressiveSpec::resolve_linear(
        Point::new(0.0, 0.0),
        Point::new(0.0, f64::INFINITY),
        size,
    );
    assert_eq!(s, Point::new(0.0, 0.0));
    assert_eq!(e, Point::new(0.0, 400.0));

    let (c, r) = ProgressiveSpec::resolve_radial(None, f64::INFINITY, size);
    assert_eq!(c, Point::new(100.0, 200.0));
    assert_eq!(r, 100.0);
}

#[test]
fn mask_brush_alpha_tracks_intensity() {
    let spec =
        ProgressiveSpec::vertical_gradient(Easing::Linear, 0.0, 0.0, f64::INFINITY, 1.0).unwrap();
    let Brush::LinearGradient { end, stops, .. } = spec.as_mask_brush(Size::new(10.0, 50.0))
    else {
        panic!("expected linear brush");
    };
    assert_eq!(end.y, 50.0);
    assert_eq!(stops.len(), MASK_BRUSH_STOPS);
    assert_eq!(stops[0].color.a, 0.0);
    assert_eq!(stops[MASK_BRUSH_STOPS - 1].color.a, 1.0);
    assert!(stops.windows(2).all(|w| w[0].color.a <= w[1].color.a));
}

#[test]
fn prefer_performance_only_touches_linear() {
    let spec = ProgressiveSpec::vertical_gradient(Easing::Linear, 0.0, 0.0, 10.0, 1.0)
        .unwrap()
        .prefer_performance(true);
    assert!(matches!(
        spec,
        ProgressiveSpec::LinearGradient {
            prefer_performance: true,
            ..
        }
    ));
    assert_eq!(spec.max_intensity(), 1.0);
}
