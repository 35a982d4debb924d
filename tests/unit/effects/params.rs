use super::*;
use crate::foundation::core::Color;

#[test]
fn clamped_fields_normalize_to_equal_parameters() {
    let a = EffectParameters::new(Dp(8.0))
        .with_noise_factor(1.5)
        .with_tint_alpha_modulate(-0.2)
        .normalized()
        .unwrap();
    let b = EffectParameters::new(Dp(8.0))
        .with_noise_factor(1.0)
        .with_tint_alpha_modulate(0.0)
        .normalized()
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn negative_radius_is_rejected_not_clamped() {
    let err = EffectParameters::new(Dp(-2.0)).normalized().unwrap_err();
    assert!(matches!(err, HazeError::Precondition(_)));
}

#[test]
fn zero_scale_is_rejected() {
    assert!(
        EffectParameters::new(Dp(4.0))
            .with_scale(0.0)
            .normalized()
            .is_err()
    );
}

#[test]
fn unspecified_tints_are_dropped() {
    let p = EffectParameters::new(Dp(4.0))
        .with_tint(Tint::Unspecified)
        .with_tint(Tint::color(Color::WHITE.with_alpha(0.2)))
        .normalized()
        .unwrap();
    assert_eq!(p.tints.len(), 1);
}

#[test]
fn identity_requires_every_stage_off() {
    assert!(EffectParameters::default().is_identity());
    assert!(!EffectParameters::new(Dp(1.0)).is_identity());
    assert!(!EffectParameters::default().with_noise_factor(0.1).is_identity());
    assert!(EffectParameters::default().with_noise_factor(0.004).is_identity());
    assert!(
        !EffectParameters::default()
            .with_tint(Tint::color(Color::BLACK))
            .is_identity()
    );
}

#[test]
fn tints_modulated_to_invisible_keep_identity() {
    let p = EffectParameters::default()
        .with_tint(Tint::color(Color::WHITE.with_alpha(0.4)))
        .with_tint_alpha_modulate(0.0);
    assert!(p.is_identity());
    assert!(!p.clone().with_tint_alpha_modulate(0.5).is_identity());

    let graph = crate::compile::builder::build_graph(&crate::compile::builder::GraphInputs {
        effect: crate::effects::kind::VisualEffect::Blur(p.normalized().unwrap()),
        geometry: crate::scene::geometry::ResolvedGeometry {
            layer_size: Size::new(16.0, 16.0),
            density: 1.0,
            input_scale: 1.0,
        },
    });
    assert_eq!(graph.summary(), "Source");
}

#[test]
fn edge_treatment_picks_tile_mode() {
    assert_eq!(EdgeTreatment::Rectangle.tile_mode(), TileMode::Clamp);
    assert_eq!(EdgeTreatment::Unbounded.tile_mode(), TileMode::Decal);
    assert!(!EdgeTreatment::Unbounded.is_bounded());
}
