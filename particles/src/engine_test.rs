#![allow(clippy::float_cmp)]

use std::f64::consts::PI;

use super::*;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn key(name: &str) -> Key {
    Key(name.to_owned())
}

fn shift() -> Modifiers {
    Modifiers { shift: true }
}

fn bare_core() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_image_size(200.0, 100.0);
    core.set_viewport(800.0, 600.0);
    core
}

/// Two particles: id 1 at (30, 50) r 10 and id 2 at (80, 50) r 20. Camera is identity.
fn core_with_particles() -> EngineCore {
    let mut core = bare_core();
    core.load_detection(vec![Particle::new(1, 30.0, 50.0, 10.0), Particle::new(2, 80.0, 50.0, 20.0)]);
    core
}

fn edit_core() -> EngineCore {
    let mut core = core_with_particles();
    core.set_mode(Mode::Edit);
    core
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_render_needed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::RenderNeeded))
}

fn cursor_of(actions: &[Action]) -> Option<&str> {
    actions.iter().find_map(|a| match a {
        Action::SetCursor(c) => Some(c.as_str()),
        _ => None,
    })
}

fn assert_derived_consistent(particle: &Particle) {
    assert_eq!(particle.diameter(), particle.radius() * 2.0);
    assert_eq!(particle.area(), (PI * particle.radius() * particle.radius()).round());
    assert!(particle.radius() >= 5.0);
}

// =============================================================
// Construction and defaults
// =============================================================

#[test]
fn core_new_has_no_selection() {
    let core = EngineCore::new();
    assert!(core.selection().is_none());
}

#[test]
fn core_default_camera_is_identity() {
    let cam = EngineCore::new().camera();
    assert_eq!((cam.pan_x, cam.pan_y, cam.zoom), (0.0, 0.0, 1.0));
}

#[test]
fn core_default_mode_is_view() {
    assert_eq!(EngineCore::new().ui.mode, Mode::View);
}

#[test]
fn core_default_store_is_empty() {
    assert!(EngineCore::new().particles().is_empty());
}

// =============================================================
// load_detection
// =============================================================

#[test]
fn load_detection_populates_store() {
    let core = core_with_particles();
    assert_eq!(core.particles().len(), 2);
    assert_eq!(core.particle(2).unwrap().radius(), 20.0);
}

#[test]
fn load_detection_clears_selection() {
    let mut core = core_with_particles();
    core.on_pointer_down(pt(30.0, 50.0), Button::Primary);
    assert_eq!(core.selection(), Some(1));

    let actions = core.load_detection(vec![Particle::new(1, 10.0, 10.0, 8.0)]);
    assert!(core.selection().is_none());
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(has_render_needed(&actions));
}

#[test]
fn load_detection_discards_live_edits() {
    let mut core = edit_core();
    core.add_particle();
    core.load_detection(vec![Particle::new(1, 10.0, 10.0, 8.0)]);
    assert!(!core.store.is_dirty());
    assert_eq!(core.particles().len(), 1);
}

// =============================================================
// Mode switching
// =============================================================

#[test]
fn leaving_edit_commits() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.on_pointer_move(pt(120.0, 60.0));
    core.on_pointer_up();
    assert!(core.store.is_dirty());

    core.set_mode(Mode::View);
    assert!(!core.store.is_dirty());
    let committed = core.store.committed().iter().find(|p| p.id == 2).unwrap();
    assert_eq!((committed.x, committed.y), (120.0, 60.0));
}

#[test]
fn entering_edit_does_not_commit() {
    let mut core = core_with_particles();
    core.add_particle();
    core.set_mode(Mode::Edit);
    assert!(core.store.is_dirty());
}

#[test]
fn pan_mode_sets_grab_cursor() {
    let mut core = core_with_particles();
    let actions = core.set_mode(Mode::Pan);
    assert_eq!(cursor_of(&actions), Some("grab"));
    assert_eq!(core.ui.cursor.as_deref(), Some("grab"));
}

#[test]
fn set_mode_resets_gesture() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.set_mode(Mode::View);
    assert!(!core.input.is_active());
}

#[test]
fn cancel_edit_discards_and_returns_to_view() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.on_pointer_move(pt(150.0, 20.0));
    core.on_pointer_up();

    core.cancel_edit();
    assert_eq!(core.ui.mode, Mode::View);
    let p = core.particle(2).unwrap();
    assert_eq!((p.x, p.y), (80.0, 50.0));
    assert!(!core.store.is_dirty());
}

#[test]
fn cancel_edit_drops_selection_of_discarded_particle() {
    let mut core = edit_core();
    core.add_particle();
    let actions = core.cancel_edit();
    assert!(core.selection().is_none());
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

// =============================================================
// add_particle / delete_selected / deselect
// =============================================================

#[test]
fn add_on_empty_assigns_10_then_20_at_image_center() {
    let mut core = bare_core();
    let first = core.add_particle();
    let second = core.add_particle();

    let ids: Vec<_> = core.particles().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![10, 20]);
    for p in core.particles() {
        assert_eq!((p.x, p.y, p.radius()), (100.0, 50.0, 20.0));
    }
    assert!(has_action(&first, |a| matches!(a, Action::ParticleCreated(p) if p.id == 10)));
    assert!(second.contains(&Action::SelectionChanged(Some(20))));
    assert_eq!(core.selection(), Some(20));
}

#[test]
fn add_after_detection_continues_after_max_id() {
    let mut core = core_with_particles();
    core.add_particle();
    assert_eq!(core.selection(), Some(12));
}

#[test]
fn delete_selected_clears_selection() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.on_pointer_up();

    let actions = core.delete_selected();
    assert!(core.particle(2).is_none());
    assert!(core.selection().is_none());
    assert!(actions.contains(&Action::ParticleDeleted { id: 2 }));
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(has_render_needed(&actions));
}

#[test]
fn delete_without_selection_is_noop() {
    let mut core = edit_core();
    assert!(core.delete_selected().is_empty());
    assert_eq!(core.particles().len(), 2);
}

#[test]
fn delete_mid_drag_ends_gesture() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.delete_selected();
    assert!(!core.input.is_active());
    assert!(core.on_pointer_move(pt(10.0, 10.0)).is_empty());
}

#[test]
fn deselect_only_reports_when_something_was_selected() {
    let mut core = core_with_particles();
    assert!(core.deselect().is_empty());
    core.on_pointer_down(pt(30.0, 50.0), Button::Primary);
    assert_eq!(core.deselect(), vec![Action::SelectionChanged(None), Action::RenderNeeded]);
}

// =============================================================
// focus_particle / set_zoom
// =============================================================

#[test]
fn focus_zooms_in_and_centers() {
    let mut core = core_with_particles();
    let actions = core.focus_particle(1);

    assert_eq!(core.selection(), Some(1));
    assert_eq!(core.camera.zoom, 2.0);
    assert_eq!(core.camera.image_to_screen(pt(30.0, 50.0)), pt(400.0, 300.0));
    assert!(has_action(&actions, |a| matches!(a, Action::ViewChanged(_))));
}

#[test]
fn focus_keeps_stronger_zoom() {
    let mut core = core_with_particles();
    core.set_zoom(4.0);
    core.focus_particle(2);
    assert_eq!(core.camera.zoom, 4.0);
    assert_eq!(core.camera.image_to_screen(pt(80.0, 50.0)), pt(400.0, 300.0));
}

#[test]
fn focus_unknown_is_noop() {
    let mut core = core_with_particles();
    assert!(core.focus_particle(77).is_empty());
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn set_zoom_anchors_at_viewport_center() {
    let mut core = core_with_particles();
    let center = pt(400.0, 300.0);
    let before = core.camera.screen_to_image(center);
    core.set_zoom(3.0);
    let after = core.camera.screen_to_image(center);
    assert_eq!(core.camera.zoom, 3.0);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn set_zoom_to_one_resets_pan() {
    let mut core = core_with_particles();
    core.set_zoom(5.0);
    core.set_zoom(1.0);
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn set_zoom_unchanged_emits_nothing() {
    let mut core = core_with_particles();
    assert!(core.set_zoom(0.5).is_empty());
}

// =============================================================
// Pointer down
// =============================================================

#[test]
fn pan_mode_down_always_pans() {
    let mut core = core_with_particles();
    core.set_mode(Mode::Pan);
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    assert!(matches!(core.input, InputState::Panning { .. }));
    assert!(core.selection().is_none());
}

#[test]
fn edit_down_on_interior_starts_move() {
    let mut core = edit_core();
    let actions = core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    assert!(matches!(core.input, InputState::MovingParticle { id: 2 }));
    assert_eq!(core.selection(), Some(2));
    assert!(actions.contains(&Action::SelectionChanged(Some(2))));
}

#[test]
fn edit_down_on_edge_starts_resize() {
    let mut core = edit_core();
    core.on_pointer_down(pt(100.0, 50.0), Button::Primary);
    assert!(matches!(core.input, InputState::ResizingParticle { id: 2 }));
}

#[test]
fn edit_down_on_empty_clears_selection() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.on_pointer_up();
    let actions = core.on_pointer_down(pt(180.0, 95.0), Button::Primary);
    assert!(core.selection().is_none());
    assert!(!core.input.is_active());
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn view_down_on_particle_selects_without_gesture() {
    let mut core = core_with_particles();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    assert_eq!(core.selection(), Some(2));
    assert!(!core.input.is_active());
}

#[test]
fn view_down_on_empty_when_zoomed_pans() {
    let mut core = core_with_particles();
    core.camera.zoom = 2.0;
    core.on_pointer_down(pt(190.0, 190.0), Button::Primary);
    assert!(matches!(core.input, InputState::Panning { .. }));
}

#[test]
fn view_down_on_empty_unzoomed_clears_selection() {
    let mut core = core_with_particles();
    core.on_pointer_down(pt(30.0, 50.0), Button::Primary);
    core.on_pointer_down(pt(180.0, 95.0), Button::Primary);
    assert!(core.selection().is_none());
    assert!(!core.input.is_active());
}

#[test]
fn down_uses_image_coordinates() {
    let mut core = edit_core();
    core.camera = Camera { pan_x: 100.0, pan_y: 0.0, zoom: 2.0 };
    // Screen (160, 100) is image (30, 50): particle 1's center.
    core.on_pointer_down(pt(160.0, 100.0), Button::Primary);
    assert!(matches!(core.input, InputState::MovingParticle { id: 1 }));
}

#[test]
fn middle_button_pans_in_any_mode() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Middle);
    assert!(matches!(core.input, InputState::Panning { .. }));
    assert!(core.selection().is_none());
}

#[test]
fn secondary_button_is_ignored() {
    let mut core = edit_core();
    assert!(core.on_pointer_down(pt(80.0, 50.0), Button::Secondary).is_empty());
    assert!(!core.input.is_active());
}

// =============================================================
// Pointer move
// =============================================================

#[test]
fn panning_applies_sensitivity() {
    let mut core = core_with_particles();
    core.set_mode(Mode::Pan);
    core.on_pointer_down(pt(100.0, 100.0), Button::Primary);
    let actions = core.on_pointer_move(pt(120.0, 90.0));
    assert_eq!((core.camera.pan_x, core.camera.pan_y), (10.0, -5.0));
    assert!(has_render_needed(&actions));

    core.on_pointer_move(pt(140.0, 90.0));
    assert_eq!(core.camera.pan_x, 20.0);
}

#[test]
fn panning_uses_configured_sensitivity() {
    let mut core = core_with_particles();
    core.set_config(EditorConfig { pan_sensitivity: 1.0, ..EditorConfig::default() });
    core.on_pointer_down(pt(0.0, 0.0), Button::Middle);
    core.on_pointer_move(pt(30.0, 40.0));
    assert_eq!((core.camera.pan_x, core.camera.pan_y), (30.0, 40.0));
}

#[test]
fn moving_places_center_at_pointer() {
    let mut core = edit_core();
    core.on_pointer_down(pt(75.0, 55.0), Button::Primary);
    let actions = core.on_pointer_move(pt(120.0, 70.0));
    let p = core.particle(2).unwrap();
    assert_eq!((p.x, p.y), (120.0, 70.0));
    assert_eq!(p.radius(), 20.0);
    assert!(has_action(&actions, |a| matches!(a, Action::ParticleUpdated(p) if p.id == 2)));
}

#[test]
fn moving_respects_zoom() {
    let mut core = edit_core();
    core.camera.zoom = 2.0;
    core.on_pointer_down(pt(160.0, 100.0), Button::Primary);
    core.on_pointer_move(pt(100.0, 60.0));
    let p = core.particle(2).unwrap();
    assert_eq!((p.x, p.y), (50.0, 30.0));
}

#[test]
fn resizing_follows_pointer_distance() {
    let mut core = edit_core();
    core.on_pointer_down(pt(100.0, 50.0), Button::Primary);
    core.on_pointer_move(pt(110.0, 50.0));
    let p = core.particle(2).unwrap();
    assert_eq!(p.radius(), 30.0);
    assert_eq!(p.diameter(), 60.0);
    assert_derived_consistent(p);
}

#[test]
fn resizing_floors_at_min_radius() {
    let mut core = edit_core();
    core.on_pointer_down(pt(100.0, 50.0), Button::Primary);
    core.on_pointer_move(pt(82.0, 50.0));
    assert_eq!(core.particle(2).unwrap().radius(), 5.0);
}

#[test]
fn hover_in_edit_mode_sets_cursor_once() {
    let mut core = edit_core();
    assert_eq!(cursor_of(&core.on_pointer_move(pt(80.0, 50.0))), Some("move"));
    assert!(core.on_pointer_move(pt(81.0, 50.0)).is_empty());
    assert_eq!(cursor_of(&core.on_pointer_move(pt(100.0, 50.0))), Some("nwse-resize"));
    assert_eq!(cursor_of(&core.on_pointer_move(pt(150.0, 90.0))), Some("default"));
}

#[test]
fn hover_in_view_mode_is_silent() {
    let mut core = core_with_particles();
    assert!(core.on_pointer_move(pt(80.0, 50.0)).is_empty());
}

// =============================================================
// Pointer up / leave
// =============================================================

#[test]
fn pointer_up_ends_gesture_and_keeps_selection() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    let actions = core.on_pointer_up();
    assert!(!core.input.is_active());
    assert_eq!(core.selection(), Some(2));
    assert!(has_render_needed(&actions));
}

#[test]
fn pointer_up_when_idle_is_noop() {
    let mut core = core_with_particles();
    assert!(core.on_pointer_up().is_empty());
}

#[test]
fn leave_cancels_panning() {
    let mut core = core_with_particles();
    core.on_pointer_down(pt(0.0, 0.0), Button::Middle);
    core.on_pointer_leave();
    assert!(!core.input.is_active());
}

#[test]
fn leave_does_not_cancel_particle_drag() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.on_pointer_leave();
    assert!(matches!(core.input, InputState::MovingParticle { id: 2 }));
    core.on_pointer_move(pt(90.0, 40.0));
    assert_eq!(core.particle(2).unwrap().x, 90.0);
}

#[test]
fn leave_does_not_cancel_resize() {
    let mut core = edit_core();
    core.on_pointer_down(pt(100.0, 50.0), Button::Primary);
    core.on_pointer_leave();
    assert!(matches!(core.input, InputState::ResizingParticle { id: 2 }));
}

// =============================================================
// Wheel
// =============================================================

#[test]
fn wheel_up_zooms_in_by_sensitivity() {
    let mut core = core_with_particles();
    let actions = core.on_wheel(pt(400.0, 300.0), WheelDelta { dx: 0.0, dy: -100.0 });
    assert!((core.camera.zoom - 1.05).abs() < 1e-9);
    assert!(has_action(&actions, |a| matches!(a, Action::ViewChanged(_))));
}

#[test]
fn wheel_down_at_min_zoom_is_noop() {
    let mut core = core_with_particles();
    assert!(core.on_wheel(pt(400.0, 300.0), WheelDelta { dx: 0.0, dy: 100.0 }).is_empty());
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn wheel_zoom_preserves_image_point_under_cursor() {
    let mut core = core_with_particles();
    core.set_zoom(3.0);
    let screen = pt(123.0, 77.0);
    let before = core.camera.screen_to_image(screen);
    core.on_wheel(screen, WheelDelta { dx: 0.0, dy: -10.0 });
    let after = core.camera.screen_to_image(screen);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn wheel_zoom_clamps_max() {
    let mut core = core_with_particles();
    core.set_zoom(9.98);
    core.on_wheel(pt(400.0, 300.0), WheelDelta { dx: 0.0, dy: -1.0 });
    assert_eq!(core.camera.zoom, 10.0);
}

#[test]
fn wheel_ignored_while_resizing() {
    let mut core = edit_core();
    core.on_pointer_down(pt(100.0, 50.0), Button::Primary);
    assert!(core.on_wheel(pt(100.0, 50.0), WheelDelta { dx: 0.0, dy: -10.0 }).is_empty());
    assert_eq!(core.camera.zoom, 1.0);
}

#[test]
fn horizontal_only_wheel_is_ignored() {
    let mut core = core_with_particles();
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 40.0, dy: 0.0 }).is_empty());
}

// =============================================================
// Keyboard
// =============================================================

fn edit_core_with_selection() -> EngineCore {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.on_pointer_up();
    core
}

#[test]
fn delete_key_removes_selected() {
    let mut core = edit_core_with_selection();
    let actions = core.on_key_down(&key("Delete"), Modifiers::default());
    assert!(core.particle(2).is_none());
    assert!(actions.contains(&Action::ParticleDeleted { id: 2 }));
}

#[test]
fn backspace_removes_selected() {
    let mut core = edit_core_with_selection();
    core.on_key_down(&key("Backspace"), Modifiers::default());
    assert!(core.particle(2).is_none());
}

#[test]
fn delete_key_ignored_outside_edit_mode() {
    let mut core = core_with_particles();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    assert!(core.on_key_down(&key("Delete"), Modifiers::default()).is_empty());
    assert!(core.particle(2).is_some());
}

#[test]
fn escape_deselects_in_any_mode() {
    let mut core = core_with_particles();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.on_key_down(&key("Escape"), Modifiers::default());
    assert!(core.selection().is_none());
}

#[test]
fn escape_mid_move_ends_gesture() {
    let mut core = edit_core();
    core.on_pointer_down(pt(80.0, 50.0), Button::Primary);
    core.on_key_down(&key("Escape"), Modifiers::default());
    assert!(!core.input.is_active());
    let actions = core.on_pointer_move(pt(150.0, 70.0));
    assert!(!actions.iter().any(|a| matches!(a, Action::ParticleUpdated(_))));
    let p = core.particle(2).unwrap();
    assert_eq!((p.x, p.y), (80.0, 50.0));
}

#[test]
fn escape_mid_resize_ends_gesture() {
    let mut core = edit_core();
    core.on_pointer_down(pt(100.0, 50.0), Button::Primary);
    core.on_key_down(&key("Escape"), Modifiers::default());
    assert!(!core.input.is_active());
    core.on_pointer_move(pt(130.0, 50.0));
    assert_eq!(core.particle(2).unwrap().radius(), 20.0);
}

#[test]
fn plus_and_minus_nudge_diameter() {
    let mut core = edit_core_with_selection();
    core.on_key_down(&key("+"), Modifiers::default());
    assert_eq!(core.particle(2).unwrap().diameter(), 42.0);
    core.on_key_down(&key("="), Modifiers::default());
    assert_eq!(core.particle(2).unwrap().diameter(), 44.0);
    core.on_key_down(&key("-"), Modifiers::default());
    let p = core.particle(2).unwrap();
    assert_eq!(p.diameter(), 42.0);
    assert_derived_consistent(p);
}

#[test]
fn minus_stops_at_floor() {
    let mut core = edit_core();
    core.on_pointer_down(pt(30.0, 50.0), Button::Primary);
    core.on_pointer_up();
    for _ in 0..10 {
        core.on_key_down(&key("-"), Modifiers::default());
    }
    assert_eq!(core.particle(1).unwrap().radius(), 5.0);
}

#[test]
fn arrow_keys_move_selected() {
    let mut core = edit_core_with_selection();
    core.on_key_down(&key("ArrowRight"), Modifiers::default());
    core.on_key_down(&key("ArrowUp"), Modifiers::default());
    let p = core.particle(2).unwrap();
    assert_eq!((p.x, p.y), (81.0, 49.0));
}

#[test]
fn shift_arrow_moves_ten() {
    let mut core = edit_core_with_selection();
    core.on_key_down(&key("ArrowLeft"), shift());
    core.on_key_down(&key("ArrowDown"), shift());
    let p = core.particle(2).unwrap();
    assert_eq!((p.x, p.y), (70.0, 60.0));
}

#[test]
fn keys_without_selection_are_noop() {
    let mut core = edit_core();
    assert!(core.on_key_down(&key("+"), Modifiers::default()).is_empty());
    assert!(core.on_key_down(&key("ArrowLeft"), Modifiers::default()).is_empty());
}

#[test]
fn unknown_key_is_noop() {
    let mut core = edit_core_with_selection();
    assert!(core.on_key_down(&key("q"), Modifiers::default()).is_empty());
}

// =============================================================
// Scene
// =============================================================

#[test]
fn scene_reflects_working_copy_and_selection() {
    let mut core = edit_core_with_selection();
    core.load_detection(vec![Particle::new(1, 30.0, 50.0, 10.0), Particle::new(9, 500.0, 50.0, 10.0)]);
    core.on_pointer_down(pt(30.0, 50.0), Button::Primary);

    let prims = core.scene(LabelMode::Id);
    let outlines = prims.iter().filter(|p| matches!(p, Primitive::Outline { .. })).count();
    let handles = prims.iter().filter(|p| matches!(p, Primitive::Handle { .. })).count();
    assert_eq!(outlines, 1);
    assert_eq!(handles, 4);
}

// =============================================================
// Edit sequences keep measurements consistent
// =============================================================

#[test]
fn mixed_edit_sequence_keeps_derived_fields() {
    let mut core = edit_core();
    core.add_particle();
    core.on_key_down(&key("+"), Modifiers::default());
    core.on_pointer_down(pt(100.0, 50.0), Button::Primary);
    core.on_pointer_move(pt(130.0, 50.0));
    core.on_pointer_up();
    core.on_key_down(&key("-"), Modifiers::default());

    for p in core.particles() {
        assert_derived_consistent(p);
    }
}
