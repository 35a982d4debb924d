use super::*;

fn ready_area(state: &mut HazeState, z: f32, window: Option<WindowId>, pos: Point) -> AreaId {
    let id = state.attach(z, window);
    state.update_placement(id, pos, Size::new(100.0, 100.0));
    state.record_content(id, ContentLayer(id.0));
    id
}

#[test]
fn mutations_bump_generation() {
    let mut s = HazeState::new();
    let g0 = s.generation();
    let id = s.attach(0.0, None);
    assert!(s.generation() > g0);

    let g1 = s.generation();
    s.update_placement(id, Point::ZERO, Size::ZERO);
    assert_eq!(s.generation(), g1, "unchanged placement must not bump");

    s.update_placement(id, Point::new(1.0, 1.0), Size::new(5.0, 5.0));
    assert!(s.generation() > g1);
    assert!(s.detach(id).is_some());
    assert!(s.detach(id).is_none());
}

#[test]
fn effect_reads_only_lower_ready_overlapping_areas_in_its_window() {
    let mut s = HazeState::new();
    let w = Some(WindowId(1));
    let below = ready_area(&mut s, 0.0, w, Point::ZERO);
    let _above = ready_area(&mut s, 5.0, w, Point::ZERO);
    let _other_window = ready_area(&mut s, 0.0, Some(WindowId(2)), Point::ZERO);
    let _far_away = ready_area(&mut s, 0.0, w, Point::new(1000.0, 1000.0));
    let _unrecorded = s.attach(0.0, w);

    let effect = Rect::new(10.0, 10.0, 60.0, 60.0);
    let areas = s.areas_for_effect(effect, 1.0, w);
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].id, below);
}

#[test]
fn areas_are_sorted_bottom_first() {
    let mut s = HazeState::new();
    let high = ready_area(&mut s, 0.5, None, Point::ZERO);
    let low = ready_area(&mut s, -1.0, None, Point::ZERO);
    let areas = s.areas_for_effect(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, None);
    assert_eq!(
        areas.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![low, high]
    );
}
