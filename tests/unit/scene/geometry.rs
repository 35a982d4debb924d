use super::*;

#[test]
fn auto_scale_only_applies_to_multi_layer() {
    assert_eq!(InputScale::Auto.resolve(0.33, true), 0.33);
    assert_eq!(InputScale::Auto.resolve(0.33, false), 1.0);
    assert_eq!(InputScale::None.resolve(0.33, true), 1.0);
    assert_eq!(InputScale::Fixed(0.5).resolve(0.33, false), 0.5);
}

#[test]
fn fixed_scale_must_be_in_unit_interval() {
    assert!(InputScale::Fixed(0.0).validated().is_err());
    assert!(InputScale::Fixed(1.5).validated().is_err());
    assert!(InputScale::Fixed(1.0).validated().is_ok());
    assert!(InputScale::Auto.validated().is_ok());
}

#[test]
fn zero_sized_geometry_is_not_ready() {
    assert!(!GeometrySnapshot::new(Point::ZERO, Size::new(0.0, 10.0), 2.0).is_ready());
    assert!(!GeometrySnapshot::new(Point::ZERO, Size::new(10.0, 10.0), 0.0).is_ready());
    assert!(GeometrySnapshot::new(Point::ZERO, Size::new(10.0, 10.0), 2.0).is_ready());
}

#[test]
fn inflation_grows_layer_and_offsets_content() {
    let g = GeometrySnapshot::new(Point::ZERO, Size::new(100.0, 50.0), 1.0).inflated(8.0);
    assert_eq!(g.layer_size, Size::new(116.0, 66.0));
    assert_eq!(g.layer_offset, Vec2::new(8.0, 8.0));
    assert_eq!(g.content_size, Size::new(100.0, 50.0));
}

#[test]
fn scaled_layer_rounds_up() {
    let r = ResolvedGeometry {
        layer_size: Size::new(101.0, 50.0),
        density: 1.0,
        input_scale: 0.5,
    };
    assert_eq!(r.scaled_layer_px(), (51, 25));
}
