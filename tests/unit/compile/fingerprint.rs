use super::*;
use crate::foundation::core::Dp;

fn inputs(radius: f32, density: f32) -> GraphInputs {
    GraphInputs {
        effect: VisualEffect::Blur(
            EffectParameters::new(Dp(radius))
                .with_tint(Tint::color(Color::WHITE.with_alpha(0.5))),
        ),
        geometry: ResolvedGeometry {
            layer_size: Size::new(64.0, 32.0),
            density,
            input_scale: 1.0,
        },
    }
}

#[test]
fn equal_inputs_fingerprint_equal() {
    assert_eq!(
        fingerprint_inputs(&inputs(8.0, 2.0)),
        fingerprint_inputs(&inputs(8.0, 2.0))
    );
}

#[test]
fn parameter_and_geometry_changes_change_the_key() {
    let base = fingerprint_inputs(&inputs(8.0, 2.0));
    assert_ne!(base, fingerprint_inputs(&inputs(9.0, 2.0)));
    assert_ne!(base, fingerprint_inputs(&inputs(8.0, 3.0)));
}

#[test]
fn negative_zero_hashes_like_zero() {
    assert_eq!(
        fingerprint_inputs(&inputs(0.0, 1.0)),
        fingerprint_inputs(&inputs(-0.0, 1.0))
    );
}

#[test]
fn effect_kind_is_part_of_the_key() {
    let blur = inputs(4.0, 1.0);
    let glass = GraphInputs {
        effect: VisualEffect::LiquidGlass(LiquidGlassParameters::default()),
        geometry: blur.geometry,
    };
    assert_ne!(fingerprint_inputs(&blur), fingerprint_inputs(&glass));
}
