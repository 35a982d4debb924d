use super::*;
use crate::compile::builder::{GraphInputs, build_graph};
use crate::effects::kind::VisualEffect;
use crate::effects::params::EffectParameters;
use crate::foundation::core::{Dp, Size};
use crate::render::capability::{AvailabilityLatch, Platform, PlatformInfo, resolve};
use crate::render::recording::RecordingBackend;
use crate::render::software::QueueSpawner;
use crate::scene::geometry::ResolvedGeometry;
use smallvec::smallvec;

struct NoRedraw;

impl RedrawRequester for NoRedraw {
    fn request_redraw(&self) {}
}

fn inputs(caps: Capabilities) -> StrategyInputs {
    StrategyInputs {
        capabilities: caps,
        blur_enabled: None,
        force_scrim: false,
    }
}

fn env() -> StrategyEnv {
    StrategyEnv {
        cache_capacity: 4,
        spawner: Arc::new(QueueSpawner::new()),
        redraw: Arc::new(NoRedraw),
        software_max_radius_px: 25.0,
    }
}

#[test]
fn best_capability_wins() {
    let caps = resolve(
        &PlatformInfo::new(Platform::Android { sdk: 34 }),
        &AvailabilityLatch::new(),
    );
    assert_eq!(select(&inputs(caps)), StrategyKind::Hardware);
}

#[test]
fn fallback_chain_skips_missing_capabilities() {
    let software = smallvec![BlurCapability::SoftwareBlurScript, BlurCapability::None];
    assert_eq!(select(&inputs(software)), StrategyKind::Software);

    let nothing = smallvec![BlurCapability::None];
    assert_eq!(select(&inputs(nothing)), StrategyKind::Scrim);

    let shader_only = smallvec![BlurCapability::GpuRuntimeShader, BlurCapability::None];
    assert_eq!(select(&inputs(shader_only)), StrategyKind::GpuShader);
}

#[test]
fn overrides_take_priority() {
    let caps: Capabilities = smallvec![BlurCapability::HardwareFilterGraph, BlurCapability::None];
    let mut i = inputs(caps);
    i.blur_enabled = Some(false);
    assert_eq!(select(&i), StrategyKind::Scrim);

    i.blur_enabled = Some(true);
    i.force_scrim = true;
    assert_eq!(select(&i), StrategyKind::Scrim);
}

#[test]
fn update_reports_only_changes() {
    let mut s = StrategySelector::new();
    let hw = inputs(smallvec![BlurCapability::HardwareFilterGraph, BlurCapability::None]);
    assert_eq!(
        s.update(&hw),
        Some(Transition {
            from: StrategyKind::Unresolved,
            to: StrategyKind::Hardware
        })
    );
    assert_eq!(s.update(&hw), None);

    let mut off = hw.clone();
    off.blur_enabled = Some(false);
    assert_eq!(
        s.update(&off).map(|t| t.to),
        Some(StrategyKind::Scrim)
    );

    s.reset();
    assert_eq!(s.state(), StrategyKind::Unresolved);
}

#[test]
fn detaching_a_graph_strategy_releases_its_cache() {
    let mut b = RecordingBackend::new();
    let mut active = ActiveStrategy::attach(StrategyKind::Hardware, &env());
    let ActiveStrategy::Graph { cache, .. } = &mut active else {
        panic!("expected graph strategy");
    };
    let gi = GraphInputs {
        effect: VisualEffect::Blur(EffectParameters::new(Dp(4.0))),
        geometry: ResolvedGeometry {
            layer_size: Size::new(10.0, 10.0),
            density: 1.0,
            input_scale: 1.0,
        },
    };
    cache.get_or_create(&gi, &mut b, build_graph).unwrap();
    assert_eq!(b.live_effects(), 1);

    active.detach(&mut b);
    assert_eq!(b.live_effects(), 0);
}

#[test]
fn attach_maps_kinds() {
    assert_eq!(
        ActiveStrategy::attach(StrategyKind::Software, &env()).kind(),
        StrategyKind::Software
    );
    assert_eq!(
        ActiveStrategy::attach(StrategyKind::Unresolved, &env()).kind(),
        StrategyKind::Scrim
    );
}
