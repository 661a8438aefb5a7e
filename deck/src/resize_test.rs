#![allow(clippy::float_cmp)]

use super::*;

const THRESHOLD: f64 = 10.0;
const DEBOUNCE: Millis = 200;
const HOTZONE: f64 = 16.0;

fn controller() -> ResizeController {
    ResizeController::new(THRESHOLD, DEBOUNCE, HOTZONE)
}

fn panel() -> Rect {
    Rect::new(10.0, 10.0, 280.0, 150.0)
}

fn limits() -> Limits {
    Limits { min_w: 150.0, min_h: 100.0, max_w: 400.0, max_h: 500.0 }
}

/// Corner grab point inside the hotzone.
fn corner() -> Point {
    Point::new(285.0, 155.0)
}

fn resize_by(ctl: &mut ResizeController, rect: Rect, dx: f64, dy: f64, now: Millis) -> ResizeOutcome {
    let grab = Point::new(rect.right() - 5.0, rect.bottom() - 5.0);
    assert!(ctl.pointer_down(grab, rect, false));
    ctl.pointer_move(Point::new(grab.x + dx, grab.y + dy), limits());
    ctl.pointer_up(now)
}

// =============================================================
// Activation
// =============================================================

#[test]
fn pointer_down_outside_hotzone_is_rejected() {
    let mut ctl = controller();
    assert!(!ctl.pointer_down(Point::new(100.0, 100.0), panel(), false));
    assert!(!ctl.is_active());
}

#[test]
fn pointer_down_on_pinned_panel_is_rejected() {
    let mut ctl = controller();
    assert!(!ctl.pointer_down(corner(), panel(), true));
}

#[test]
fn pointer_down_in_hotzone_starts_resizing() {
    let mut ctl = controller();
    assert!(ctl.pointer_down(corner(), panel(), false));
    assert!(ctl.is_active());
    assert_eq!(
        ctl.state(),
        ResizeState::Resizing { pointer_start: corner(), start: panel().size(), current: panel().size() }
    );
}

// =============================================================
// Live sizing
// =============================================================

#[test]
fn move_grows_by_pointer_delta() {
    let mut ctl = controller();
    ctl.pointer_down(corner(), panel(), false);
    assert_eq!(ctl.pointer_move(Point::new(305.0, 185.0), limits()), Some(Size::new(300.0, 180.0)));
}

#[test]
fn move_is_clamped_to_limits_only() {
    let mut ctl = controller();
    ctl.pointer_down(corner(), panel(), false);
    assert_eq!(ctl.pointer_move(Point::new(2000.0, 2000.0), limits()), Some(Size::new(400.0, 500.0)));
    assert_eq!(ctl.pointer_move(Point::new(0.0, 0.0), limits()), Some(Size::new(150.0, 100.0)));
}

#[test]
fn move_while_idle_is_none() {
    let mut ctl = controller();
    assert_eq!(ctl.pointer_move(corner(), limits()), None);
}

// =============================================================
// Threshold + debounce
// =============================================================

#[test]
fn small_resize_is_discarded() {
    let mut ctl = controller();
    assert_eq!(resize_by(&mut ctl, panel(), 6.0, 9.0, 0), ResizeOutcome::Discard);
    assert_eq!(ctl.pending(), None);
}

#[test]
fn significant_resize_is_scheduled_after_debounce() {
    let mut ctl = controller();
    let outcome = resize_by(&mut ctl, panel(), 40.0, 0.0, 1_000);
    assert_eq!(outcome, ResizeOutcome::Scheduled { size: Size::new(320.0, 150.0), due_at: 1_200 });
    assert_eq!(ctl.take_due(1_199), None);
    assert_eq!(ctl.take_due(1_200), Some(Size::new(320.0, 150.0)));
    assert_eq!(ctl.take_due(5_000), None);
}

#[test]
fn burst_of_resize_ends_coalesces_into_last_size() {
    let mut ctl = controller();
    let mut rect = panel();
    resize_by(&mut ctl, rect, 40.0, 0.0, 1_000);
    rect.w = 320.0;
    resize_by(&mut ctl, rect, 30.0, 20.0, 1_050);
    rect.w = 350.0;
    rect.h = 170.0;
    let last = resize_by(&mut ctl, rect, 2.0, 1.0, 1_100);

    assert_eq!(last, ResizeOutcome::Scheduled { size: Size::new(352.0, 171.0), due_at: 1_300 });
    assert_eq!(ctl.take_due(1_250), None);
    assert_eq!(ctl.take_due(1_300), Some(Size::new(352.0, 171.0)));
    assert_eq!(ctl.take_due(2_000), None);
}

#[test]
fn cancel_drops_pending_commit() {
    let mut ctl = controller();
    resize_by(&mut ctl, panel(), 40.0, 40.0, 0);
    assert!(ctl.pending().is_some());
    ctl.cancel();
    assert_eq!(ctl.pending(), None);
    assert_eq!(ctl.take_due(10_000), None);
}

#[test]
fn pointer_up_without_gesture_is_ignored() {
    let mut ctl = controller();
    assert_eq!(ctl.pointer_up(0), ResizeOutcome::Ignored);
}

// =============================================================
// Native resize
// =============================================================

#[test]
fn native_resize_below_threshold_is_discarded() {
    let mut ctl = controller();
    let outcome = ctl.observe_native_size(Size::new(284.0, 152.0), panel().size(), limits(), 0);
    assert_eq!(outcome, ResizeOutcome::Discard);
}

#[test]
fn native_resize_is_clamped_and_scheduled() {
    let mut ctl = controller();
    let outcome = ctl.observe_native_size(Size::new(900.0, 152.0), panel().size(), limits(), 50);
    assert_eq!(outcome, ResizeOutcome::Scheduled { size: Size::new(400.0, 152.0), due_at: 250 });
}
