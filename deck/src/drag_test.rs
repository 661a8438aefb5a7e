#![allow(clippy::float_cmp)]

use super::*;

const THRESHOLD: f64 = 3.0;

fn panel() -> Rect {
    Rect::new(10.0, 10.0, 280.0, 150.0)
}

fn container() -> Size {
    Size::new(500.0, 600.0)
}

fn drag(from: Point, to: Point) -> DragOutcome {
    let mut ctl = DragController::new(THRESHOLD);
    assert!(ctl.pointer_down(from, panel(), false));
    ctl.pointer_move(to, panel().size(), container());
    ctl.pointer_up()
}

// =============================================================
// State machine
// =============================================================

#[test]
fn starts_idle() {
    let ctl = DragController::new(THRESHOLD);
    assert_eq!(ctl.state(), DragState::Idle);
    assert!(!ctl.is_active());
}

#[test]
fn pointer_down_captures_offset() {
    let mut ctl = DragController::new(THRESHOLD);
    assert!(ctl.pointer_down(Point::new(30.0, 15.0), panel(), false));
    assert_eq!(
        ctl.state(),
        DragState::Dragging {
            offset: Point::new(20.0, 5.0),
            start: Point::new(10.0, 10.0),
            current: Point::new(10.0, 10.0),
        }
    );
}

#[test]
fn pinned_panel_does_not_start_drag() {
    let mut ctl = DragController::new(THRESHOLD);
    assert!(!ctl.pointer_down(Point::new(30.0, 15.0), panel(), true));
    assert!(!ctl.is_active());
    assert_eq!(ctl.pointer_up(), DragOutcome::Ignored);
}

#[test]
fn second_pointer_down_is_rejected_while_dragging() {
    let mut ctl = DragController::new(THRESHOLD);
    ctl.pointer_down(Point::new(30.0, 15.0), panel(), false);
    assert!(!ctl.pointer_down(Point::new(50.0, 15.0), panel(), false));
}

#[test]
fn move_while_idle_is_none() {
    let mut ctl = DragController::new(THRESHOLD);
    assert_eq!(ctl.pointer_move(Point::new(1.0, 1.0), panel().size(), container()), None);
}

#[test]
fn move_follows_pointer_minus_offset() {
    let mut ctl = DragController::new(THRESHOLD);
    ctl.pointer_down(Point::new(30.0, 15.0), panel(), false);
    let p = ctl.pointer_move(Point::new(130.0, 215.0), panel().size(), container());
    assert_eq!(p, Some(Point::new(110.0, 210.0)));
}

#[test]
fn move_is_clamped_to_container() {
    let mut ctl = DragController::new(THRESHOLD);
    ctl.pointer_down(Point::new(30.0, 15.0), panel(), false);
    let p = ctl.pointer_move(Point::new(1000.0, -50.0), panel().size(), container());
    assert_eq!(p, Some(Point::new(220.0, 0.0)));
}

#[test]
fn cancel_returns_to_idle() {
    let mut ctl = DragController::new(THRESHOLD);
    ctl.pointer_down(Point::new(30.0, 15.0), panel(), false);
    ctl.cancel();
    assert_eq!(ctl.pointer_up(), DragOutcome::Ignored);
}

// =============================================================
// Noise threshold
// =============================================================

#[test]
fn click_without_move_is_discarded() {
    let mut ctl = DragController::new(THRESHOLD);
    ctl.pointer_down(Point::new(30.0, 15.0), panel(), false);
    assert_eq!(ctl.pointer_up(), DragOutcome::Discard);
}

#[test]
fn jitter_below_threshold_is_discarded() {
    assert_eq!(drag(Point::new(30.0, 15.0), Point::new(32.0, 17.0)), DragOutcome::Discard);
    assert_eq!(drag(Point::new(30.0, 15.0), Point::new(27.5, 12.5)), DragOutcome::Discard);
}

#[test]
fn displacement_at_threshold_commits() {
    assert_eq!(drag(Point::new(30.0, 15.0), Point::new(33.0, 15.0)), DragOutcome::Commit { x: 13.0, y: 10.0 });
}

#[test]
fn displacement_on_one_axis_is_enough() {
    assert_eq!(drag(Point::new(30.0, 15.0), Point::new(30.0, 115.0)), DragOutcome::Commit { x: 10.0, y: 110.0 });
}

#[test]
fn commit_reports_clamped_position() {
    assert_eq!(drag(Point::new(30.0, 15.0), Point::new(900.0, 900.0)), DragOutcome::Commit { x: 220.0, y: 450.0 });
}

#[test]
fn returning_to_start_is_discarded() {
    let mut ctl = DragController::new(THRESHOLD);
    ctl.pointer_down(Point::new(30.0, 15.0), panel(), false);
    ctl.pointer_move(Point::new(130.0, 115.0), panel().size(), container());
    ctl.pointer_move(Point::new(31.0, 15.0), panel().size(), container());
    assert_eq!(ctl.pointer_up(), DragOutcome::Discard);
}

#[test]
fn pointer_up_resets_to_idle() {
    let mut ctl = DragController::new(THRESHOLD);
    ctl.pointer_down(Point::new(30.0, 15.0), panel(), false);
    ctl.pointer_up();
    assert!(!ctl.is_active());
    assert_eq!(ctl.pointer_up(), DragOutcome::Ignored);
}
