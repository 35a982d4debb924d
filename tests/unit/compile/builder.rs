use super::*;
use crate::effects::brush::GradientStop;
use crate::effects::progressive::Easing;
use crate::foundation::core::{Color, Dp};

fn geometry(w: f64, h: f64, density: f32) -> ResolvedGeometry {
    ResolvedGeometry {
        layer_size: Size::new(w, h),
        density,
        input_scale: 1.0,
    }
}

fn blur_inputs(p: EffectParameters) -> GraphInputs {
    GraphInputs {
        effect: VisualEffect::Blur(p.normalized().unwrap()),
        geometry: geometry(200.0, 100.0, 1.0),
    }
}

#[test]
fn zero_radius_without_stages_is_source() {
    let g = build_graph(&blur_inputs(EffectParameters::new(Dp::ZERO)));
    assert!(g.is_identity());
}

#[test]
fn blur_radius_is_scaled_by_density_and_input_scale() {
    let p = EffectParameters::new(Dp(10.0)).with_scale(0.5);
    let g = build_graph(&GraphInputs {
        effect: VisualEffect::Blur(p),
        geometry: geometry(100.0, 100.0, 2.0),
    });
    let FilterGraphNode::Blur {
        radius_x, radius_y, ..
    } = g
    else {
        panic!("expected a blur root, got {g:?}");
    };
    assert_eq!(radius_x, 10.0);
    assert_eq!(radius_y, 10.0);
}

#[test]
fn noise_below_threshold_is_skipped() {
    let g = build_graph(&blur_inputs(
        EffectParameters::new(Dp(8.0)).with_noise_factor(0.004),
    ));
    assert_eq!(g.summary(), "Blur(Source)");
}

#[test]
fn stages_apply_in_fixed_order() {
    let p = EffectParameters::new(Dp(8.0))
        .with_noise_factor(0.15)
        .with_tint(Tint::color(Color::WHITE.with_alpha(0.3)));
    let g = build_graph(&blur_inputs(p));
    assert_eq!(g.summary(), "Tint(Noise(Blur(Source)))");
}

#[test]
fn mask_is_the_last_stage() {
    let mask = Brush::vertical_gradient(
        0.0,
        100.0,
        vec![
            GradientStop::new(0.0, Color::BLACK),
            GradientStop::new(1.0, Color::TRANSPARENT),
        ],
    );
    let p = EffectParameters::new(Dp(8.0))
        .with_noise_factor(0.15)
        .with_tint(Tint::color(Color::WHITE.with_alpha(0.3)))
        .with_mask(Some(mask));
    let g = build_graph(&blur_inputs(p));
    assert_eq!(g.summary(), "Mask(Tint(Noise(Blur(Source))))");
    let s = g.stats();
    assert_eq!((s.blurs, s.noise, s.tints, s.masks), (1, 1, 1, 1));
}

#[test]
fn noise_scale_compensates_input_scale() {
    let p = EffectParameters::new(Dp(8.0))
        .with_noise_factor(0.2)
        .with_scale(0.25);
    let g = build_graph(&blur_inputs(p));
    let FilterGraphNode::Blend {
        foreground, mode, ..
    } = g
    else {
        panic!("expected noise blend");
    };
    assert_eq!(mode, BlendMode::SrcAtop);
    assert_eq!(
        *foreground,
        FilterGraphNode::ShaderEffect(Shader::Noise {
            scale: 4.0,
            alpha: 0.2
        })
    );
}

#[test]
fn masked_colour_tint_uses_src_in_shader() {
    let mask = Brush::Solid(Color::BLACK);
    let tint = Tint::color(Color::rgb(1.0, 0.0, 0.0)).with_blend_mode(BlendMode::Multiply);
    let p = EffectParameters::new(Dp(4.0))
        .with_tint(tint)
        .with_mask(Some(mask));
    let g = build_graph(&blur_inputs(p));
    let FilterGraphNode::Blend { background, .. } = g else {
        panic!("expected mask blend");
    };
    let FilterGraphNode::Blend {
        foreground, mode, ..
    } = *background
    else {
        panic!("expected tint blend");
    };
    assert_eq!(mode, BlendMode::Multiply);
    assert!(matches!(
        *foreground,
        FilterGraphNode::ColorFilter {
            filter: ColorFilter::Blend {
                mode: BlendMode::SrcIn,
                ..
            },
            ..
        }
    ));
}

#[test]
fn fully_modulated_tint_is_dropped() {
    let p = EffectParameters::new(Dp(4.0))
        .with_tint(Tint::color(Color::WHITE.with_alpha(0.5)))
        .with_tint_alpha_modulate(0.0);
    let g = build_graph(&blur_inputs(p));
    assert_eq!(g.summary(), "Blur(Source)");
}

#[test]
fn linear_progressive_uses_runtime_blur_with_scaled_mask() {
    let spec = ProgressiveSpec::vertical_gradient(Easing::Linear, 0.0, 0.0, f64::INFINITY, 1.0)
        .unwrap();
    let p = EffectParameters::new(Dp(20.0))
        .with_progressive(Some(spec))
        .with_scale(0.5);
    let g = build_graph(&blur_inputs(p));
    let FilterGraphNode::RuntimeBlur {
        radius, crop, mask, ..
    } = g
    else {
        panic!("expected runtime blur, got {g:?}");
    };
    assert_eq!(radius, 10.0);
    assert_eq!(crop, Rect::new(0.0, 0.0, 100.0, 50.0));
    let Some(Shader::GradientMask(GradientMask::Linear { start, end, .. })) = mask else {
        panic!("expected linear gradient mask");
    };
    assert_eq!(start, Point::new(0.0, 0.0));
    assert_eq!(end, Point::new(0.0, 50.0));
}

#[test]
fn liquid_glass_chains_blur_into_refraction() {
    let p = LiquidGlassParameters {
        tint: Tint::color(Color::WHITE.with_alpha(0.2)),
        shape: GlassShape::Capsule,
        ..LiquidGlassParameters::default()
    };
    let g = build_graph(&GraphInputs {
        effect: VisualEffect::LiquidGlass(p),
        geometry: geometry(120.0, 40.0, 1.0),
    });
    assert_eq!(g.summary(), "Tint(LiquidGlass(Blur(Source)))");

    let FilterGraphNode::ColorFilter { input, .. } = g else {
        panic!("expected tint filter");
    };
    let FilterGraphNode::Chain { outer, .. } = *input else {
        panic!("expected chain");
    };
    let FilterGraphNode::ShaderEffect(Shader::LiquidGlass(u)) = *outer else {
        panic!("expected liquid glass shader");
    };
    assert_eq!(u.corner_radii, [20.0; 4]);
}

#[test]
fn equal_inputs_build_equal_graphs() {
    let p = EffectParameters::new(Dp(6.0))
        .with_noise_factor(0.1)
        .with_tint(Tint::color(Color::BLACK.with_alpha(0.4)));
    assert_eq!(
        build_graph(&blur_inputs(p.clone())),
        build_graph(&blur_inputs(p))
    );
}
