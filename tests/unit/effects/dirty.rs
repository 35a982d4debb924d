use super::*;

#[test]
fn set_operations() {
    let mut f = DirtyFields::BLUR_RADIUS | DirtyFields::ALPHA;
    assert!(f.contains(DirtyFields::ALPHA));
    assert!(!f.contains(DirtyFields::ALPHA | DirtyFields::MASK));
    assert!(f.intersects(DirtyFields::ALPHA | DirtyFields::MASK));

    f -= DirtyFields::ALPHA;
    assert_eq!(f, DirtyFields::BLUR_RADIUS);
    f |= DirtyFields::TINTS;
    assert_eq!(f - DirtyFields::TINTS, DirtyFields::BLUR_RADIUS);
    assert!((f - f).is_empty());
}

#[test]
fn alpha_redraws_without_rebuild() {
    let mut t = DirtyTracker::default();
    t.mark(DirtyFields::ALPHA);
    assert!(t.needs_redraw());
    assert!(!t.needs_graph_rebuild());
}

#[test]
fn blur_radius_rebuilds_and_redraws() {
    let mut t = DirtyTracker::default();
    t.mark(DirtyFields::BLUR_RADIUS);
    assert!(t.needs_redraw());
    assert!(t.needs_graph_rebuild());
    t.clear();
    assert!(!t.needs_redraw());
    assert!(t.fields().is_empty());
}

#[test]
fn draw_only_fields_stay_out_of_the_graph_tier() {
    for f in [
        DirtyFields::ALPHA,
        DirtyFields::BACKGROUND_COLOR,
        DirtyFields::FALLBACK_TINT,
        DirtyFields::SCREEN_POSITION,
        DirtyFields::AREAS,
    ] {
        assert!(!DirtyFields::RENDER_EFFECT_AFFECTING.intersects(f));
        assert!(DirtyFields::INVALIDATE_DRAW.contains(f));
    }
}

#[test]
fn platform_changes_reselect_strategy() {
    let mut t = DirtyTracker::default();
    t.mark(DirtyFields::PLATFORM);
    assert!(t.needs_strategy_update());
    assert!(DirtyTracker::all_dirty().needs_strategy_update());
}
