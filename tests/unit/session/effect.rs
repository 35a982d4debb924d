use super::*;
use crate::foundation::core::{Point, Size};
use crate::render::capability::Platform;
use crate::render::recording::{CanvasCall, RecordingBackend, RedrawCounter};
use crate::render::software::QueueSpawner;
use crate::scene::area::ContentLayer;

struct Fixture {
    effect: HazeEffect,
    backend: RecordingBackend,
    state: HazeState,
    spawner: Arc<QueueSpawner>,
    redraw: Arc<RedrawCounter>,
}

fn fixture(platform: PlatformInfo) -> Fixture {
    let registry = ResourceRegistry::init(&HazeConfig::default());
    let spawner = Arc::new(QueueSpawner::new());
    let redraw = Arc::new(RedrawCounter::new());
    let mut effect = HazeEffect::new(registry, platform, spawner.clone(), redraw.clone());
    effect.set_placement(1.0, None);
    effect
        .set_geometry(GeometrySnapshot::new(
            Point::new(0.0, 100.0),
            Size::new(100.0, 50.0),
            1.0,
        ))
        .unwrap();
    effect.set_blur_radius(Dp(8.0)).unwrap();

    let mut state = HazeState::new();
    let id = state.attach(0.0, None);
    state.update_placement(id, Point::ZERO, Size::new(100.0, 300.0));
    state.record_content(id, ContentLayer(1));

    Fixture {
        effect,
        backend: RecordingBackend::new(),
        state,
        spawner,
        redraw,
    }
}

fn desktop() -> PlatformInfo {
    PlatformInfo::new(Platform::Desktop)
}

fn count(b: &RecordingBackend, pred: impl Fn(&CanvasCall) -> bool) -> usize {
    b.canvas_calls().iter().filter(|c| pred(c)).count()
}

#[test]
fn first_draw_attaches_hardware_and_composites_once() {
    let mut f = fixture(desktop());
    let out = f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(out, DrawOutcome::Drawn(StrategyKind::Hardware));
    assert_eq!(f.effect.stats().graph_builds, 1);
    assert_eq!(
        count(&f.backend, |c| matches!(c, CanvasCall::RecordArea { .. })),
        1
    );
    assert_eq!(
        count(&f.backend, |c| matches!(c, CanvasCall::DrawSurface { effect: Some(_), .. })),
        1
    );
    assert!(f.effect.dirty_fields().is_empty());
    assert!(!f.effect.needs_redraw());
}

#[test]
fn geometry_changes_mark_only_what_moved() {
    let mut f = fixture(desktop());
    f.effect.draw(&mut f.backend, &f.state).unwrap();

    f.effect
        .set_geometry(GeometrySnapshot::new(
            Point::new(0.0, 120.0),
            Size::new(100.0, 50.0),
            1.0,
        ))
        .unwrap();
    assert_eq!(f.effect.dirty_fields(), DirtyFields::SCREEN_POSITION);
    f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(f.effect.stats().graph_builds, 1);

    f.effect
        .set_geometry(GeometrySnapshot::new(
            Point::new(0.0, 120.0),
            Size::new(100.0, 60.0),
            1.0,
        ))
        .unwrap();
    assert_eq!(f.effect.dirty_fields(), DirtyFields::SIZE);
    f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(f.effect.stats().graph_builds, 2);
}

#[test]
fn background_colour_is_draw_only_unless_tints_derive_from_it() {
    let mut f = fixture(desktop());
    f.effect.draw(&mut f.backend, &f.state).unwrap();

    f.effect.set_background_color(Some(Color::WHITE));
    assert!(f.effect.dirty_fields().contains(DirtyFields::STYLE));
    f.effect.draw(&mut f.backend, &f.state).unwrap();

    f.effect.set_tints(vec![Tint::color(Color::BLACK.with_alpha(0.2))]);
    f.effect.draw(&mut f.backend, &f.state).unwrap();
    f.effect.set_background_color(Some(Color::BLACK));
    assert_eq!(f.effect.dirty_fields(), DirtyFields::BACKGROUND_COLOR);
}

#[test]
fn area_changes_redraw_without_rebuilding() {
    let mut f = fixture(desktop());
    f.effect.draw(&mut f.backend, &f.state).unwrap();
    let id = f.state.areas()[0].id;
    f.state.record_content(id, ContentLayer(2));
    f.backend.clear_calls();
    f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(f.effect.stats().graph_builds, 1);
    assert!(f.backend.canvas_calls().contains(&CanvasCall::RecordArea {
        target: crate::render::backend::SurfaceId(1),
        layer: ContentLayer(2),
        transform: crate::foundation::core::Affine::translate((0.0, -100.0)),
    }));
}

#[test]
fn not_ready_geometry_skips_without_touching_the_canvas() {
    let mut f = fixture(desktop());
    f.effect
        .set_geometry(GeometrySnapshot::new(Point::ZERO, Size::ZERO, 1.0))
        .unwrap();
    let out = f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(out, DrawOutcome::NotReady);
    assert!(f.backend.canvas_calls().is_empty());
    assert_eq!(f.effect.stats().frames_skipped, 1);
}

#[test]
fn surface_failure_skips_the_frame_and_keeps_dirty_flags() {
    let mut f = fixture(desktop());
    f.backend.set_fail_offscreen(true);
    let out = f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(out, DrawOutcome::Skipped);
    assert!(f.effect.needs_redraw());
    assert!(f.backend.canvas_calls().contains(&CanvasCall::RequestRedraw));
    assert_eq!(
        count(&f.backend, |c| matches!(c, CanvasCall::DrawSurface { .. })),
        0
    );

    f.backend.set_fail_offscreen(false);
    let out = f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(out, DrawOutcome::Drawn(StrategyKind::Hardware));
}

#[test]
fn failing_effects_fall_back_within_the_frame() {
    let mut f = fixture(desktop());
    f.backend.set_fail_effects(true);
    let out = f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(out, DrawOutcome::Drawn(StrategyKind::Software));
    assert_eq!(f.backend.live_effects(), 0);
    assert!(
        !f.effect
            .registry
            .latch()
            .is_available(BlurCapability::HardwareFilterGraph)
    );
    // No result yet, so the first software frame captured and drew nothing blurred.
    assert_eq!(count(&f.backend, |c| matches!(c, CanvasCall::ReadPixels(_))), 1);
    assert_eq!(f.spawner.pending(), 1);
}

#[test]
fn software_result_lands_on_a_later_frame() {
    let platform = PlatformInfo {
        platform: Platform::Headless,
        hardware_accelerated: false,
        pixel_readback: true,
    };
    let mut f = fixture(platform);
    f.effect.set_tints(vec![Tint::color(Color::WHITE.with_alpha(0.4))]);
    let out = f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(out, DrawOutcome::Drawn(StrategyKind::Software));
    assert_eq!(count(&f.backend, |c| matches!(c, CanvasCall::Fill { .. })), 1);
    assert!(f.effect.pending_job().is_some_and(|t| t.is_current()));

    assert_eq!(f.spawner.run_all(), 1);
    assert_eq!(f.redraw.count(), 1);
    f.backend.clear_calls();
    f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert_eq!(count(&f.backend, |c| matches!(c, CanvasCall::DrawPixels { .. })), 1);
    // A delivered result alone does not trigger another capture.
    assert_eq!(count(&f.backend, |c| matches!(c, CanvasCall::ReadPixels(_))), 0);
    assert_eq!(f.effect.stats().software_started, 1);
}

#[test]
fn content_mode_records_own_content() {
    let mut f = fixture(desktop());
    f.effect.set_mode(EffectMode::Content);
    f.effect.set_draw_content_behind(true);
    f.effect.draw(&mut f.backend, &f.state).unwrap();
    let calls = f.backend.canvas_calls();
    let content = calls
        .iter()
        .position(|c| matches!(c, CanvasCall::DrawContent))
        .unwrap();
    let composite = calls
        .iter()
        .position(|c| matches!(c, CanvasCall::DrawSurface { .. }))
        .unwrap();
    assert!(content < composite);
    assert_eq!(
        count(&f.backend, |c| matches!(c, CanvasCall::RecordContent { .. })),
        1
    );
    assert_eq!(
        count(&f.backend, |c| matches!(c, CanvasCall::RecordArea { .. })),
        0
    );
}

#[test]
fn detach_releases_everything() {
    let mut f = fixture(desktop());
    f.effect.draw(&mut f.backend, &f.state).unwrap();
    assert!(f.backend.live_effects() > 0);
    assert!(f.backend.live_surfaces() > 0);
    f.effect.detach(&mut f.backend);
    assert_eq!(f.backend.live_effects(), 0);
    assert_eq!(f.backend.live_surfaces(), 0);
    assert_eq!(f.backend.double_releases(), 0);
}

#[test]
fn precondition_violations_are_rejected_at_the_setter() {
    let mut f = fixture(desktop());
    assert!(matches!(
        f.effect.set_blur_radius(Dp(-1.0)),
        Err(HazeError::Precondition(_))
    ));
    let err = f.effect.set_geometry(
        GeometrySnapshot::new(Point::ZERO, Size::new(1.0, 1.0), 1.0)
            .with_input_scale(crate::scene::geometry::InputScale::Fixed(2.0)),
    );
    assert!(matches!(err, Err(HazeError::Precondition(_))));
}
